// 该文件是 Fenjian （分拣） 项目的一部分。
// src/input.rs - 检测结果输入
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use thiserror::Error;

use crate::{FromUrl, model::DetectionFrame};

#[cfg(feature = "json_input")]
mod json_input;

#[cfg(feature = "json_input")]
pub use self::json_input::{JsonFileInput, JsonInputError, JsonLinesInput};

#[derive(Error, Debug)]
pub enum InputError {
  #[cfg(feature = "json_input")]
  #[error("JSON input error: {0}")]
  JsonInputError(#[from] JsonInputError),
  #[error("URI scheme mismatch: {0}")]
  SchemeMismatch(String),
}

/// 检测结果来源，按 URI 方案选择具体实现
pub enum InputWrapper {
  #[cfg(feature = "json_input")]
  JsonFile(JsonFileInput),
  #[cfg(feature = "json_input")]
  JsonLines(JsonLinesInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "json_input")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == JsonFileInput::SCHEME {
        let input = JsonFileInput::from_url(url)?;
        return Ok(InputWrapper::JsonFile(input));
      }
      if url.scheme() == JsonLinesInput::SCHEME {
        let input = JsonLinesInput::from_url(url)?;
        return Ok(InputWrapper::JsonLines(input));
      }
    }
    Err(InputError::SchemeMismatch(url.scheme().to_string()))
  }
}

impl Iterator for InputWrapper {
  type Item = DetectionFrame;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      #[cfg(feature = "json_input")]
      InputWrapper::JsonFile(input) => input.next(),
      #[cfg(feature = "json_input")]
      InputWrapper::JsonLines(input) => input.next(),
    }
  }
}
