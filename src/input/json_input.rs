// 该文件是 Fenjian （分拣） 项目的一部分。
// src/input/json_input.rs - JSON 检测结果输入
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

use std::{
  fs::File,
  io::{BufRead, BufReader},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, model::DetectionFrame};

#[derive(Error, Debug)]
pub enum JsonInputError {
  #[error("URI schema mismatch: expected '{0}', found '{1}'")]
  SchemaMismatch(&'static str, String),
  #[error("Invalid path: {0}")]
  InvalidPath(String),
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON parse error: {0}")]
  ParseError(#[from] serde_json::Error),
}

const STDIN_PATH: &str = "-";

fn decode_path(url: &Url) -> Result<String, JsonInputError> {
  let path = urlencoding::decode(url.path())
    .map_err(|e| JsonInputError::InvalidPath(e.to_string()))?;
  if path.is_empty() {
    return Err(JsonInputError::InvalidPath(url.to_string()));
  }
  Ok(path.into_owned())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FrameDocument {
  Many(Vec<DetectionFrame>),
  One(DetectionFrame),
}

/// 从单个 JSON 文档读取检测帧（数组或单帧）
pub struct JsonFileInput {
  frames: std::vec::IntoIter<DetectionFrame>,
}

impl FromUrlWithScheme for JsonFileInput {
  const SCHEME: &'static str = "json";
}

impl FromUrl for JsonFileInput {
  type Error = JsonInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(JsonInputError::SchemaMismatch(
        Self::SCHEME,
        url.scheme().to_string(),
      ));
    }

    let path = decode_path(url)?;
    info!("读取检测结果文件: {}", path);
    let text = std::fs::read_to_string(&path)?;
    JsonFileInput::from_json(&text)
  }
}

impl JsonFileInput {
  pub fn from_json(text: &str) -> Result<Self, JsonInputError> {
    let frames = match serde_json::from_str(text)? {
      FrameDocument::Many(frames) => frames,
      FrameDocument::One(frame) => vec![frame],
    };
    info!("共 {} 帧检测结果", frames.len());
    Ok(JsonFileInput {
      frames: frames.into_iter(),
    })
  }
}

impl Iterator for JsonFileInput {
  type Item = DetectionFrame;

  fn next(&mut self) -> Option<Self::Item> {
    self.frames.next()
  }
}

/// 每行一个检测帧，路径为 `-` 时读取标准输入。
///
/// 无法解析的行会记录错误并跳过，读取失败时结束迭代。
pub struct JsonLinesInput {
  reader: Box<dyn BufRead + Send>,
  line_number: usize,
}

impl FromUrlWithScheme for JsonLinesInput {
  const SCHEME: &'static str = "jsonl";
}

impl FromUrl for JsonLinesInput {
  type Error = JsonInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(JsonInputError::SchemaMismatch(
        Self::SCHEME,
        url.scheme().to_string(),
      ));
    }

    let path = decode_path(url)?;
    if path == STDIN_PATH {
      info!("从标准输入读取检测结果");
      return Ok(JsonLinesInput::from_reader(BufReader::new(std::io::stdin())));
    }

    info!("读取检测结果流: {}", path);
    let file = File::open(&path)?;
    Ok(JsonLinesInput::from_reader(BufReader::new(file)))
  }
}

impl JsonLinesInput {
  pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
    Self {
      reader: Box::new(reader),
      line_number: 0,
    }
  }
}

impl Iterator for JsonLinesInput {
  type Item = DetectionFrame;

  fn next(&mut self) -> Option<Self::Item> {
    let mut line = String::new();
    loop {
      line.clear();
      match self.reader.read_line(&mut line) {
        Ok(0) => return None,
        Ok(_) => {
          self.line_number += 1;
          let trimmed = line.trim();
          if trimmed.is_empty() {
            continue;
          }
          match serde_json::from_str(trimmed) {
            Ok(frame) => return Some(frame),
            Err(e) => {
              warn!("第 {} 行解析失败，已跳过: {}", self.line_number, e);
            }
          }
        }
        Err(e) => {
          error!("读取检测结果失败: {}", e);
          return None;
        }
      }
    }
  }
}
