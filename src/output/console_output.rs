// 该文件是 Fenjian （分拣） 项目的一部分。
// src/output/console_output.rs - 控制台输出
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
  io::Write,
  sync::{Arc, Mutex},
};

use thiserror::Error;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{ClassifiedFrame, DetectionFrame},
  output::Render,
};

#[derive(Error, Debug)]
pub enum ConsoleOutputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("输出被占用")]
  Poisoned,
}

/// 逐帧打印 `label → category → instruction` 以及按垃圾桶的汇总
pub struct ConsoleOutput {
  quiet: bool,
  writer: Arc<Mutex<dyn Write + Send>>,
}

impl FromUrlWithScheme for ConsoleOutput {
  const SCHEME: &'static str = "console";
}

impl FromUrl for ConsoleOutput {
  type Error = ConsoleOutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ConsoleOutputError::SchemeMismatch(format!(
        "期望输出方式 '{}', 实际输出方式 '{}'",
        Self::SCHEME,
        url.scheme()
      )));
    }

    let quiet = url.query_pairs().any(|(k, _)| k == "quiet");
    Ok(ConsoleOutput::with_writer(std::io::stdout(), quiet))
  }
}

impl ConsoleOutput {
  pub fn with_writer<W: Write + Send + 'static>(writer: W, quiet: bool) -> Self {
    Self {
      quiet,
      writer: Arc::new(Mutex::new(writer)),
    }
  }

  fn write_frame(&self, out: &mut dyn Write, result: &ClassifiedFrame) -> std::io::Result<()> {
    if let Some(image) = &result.image {
      writeln!(out, "📁 {}", image)?;
    }

    if result.is_empty() {
      writeln!(out, "⚠️ 未检测到可识别的垃圾")?;
      return Ok(());
    }

    if !self.quiet {
      for item in &result.results {
        writeln!(
          out,
          "  {} ({}) {:.2} → {} → {}",
          item.label, item.category, item.confidence, item.bin, item.instruction
        )?;
      }
    }

    for (bin, labels) in result.bin_summary() {
      writeln!(out, "🗑️ {}: {}", bin, labels.join(", "))?;
    }

    Ok(())
  }
}

impl Render<DetectionFrame, ClassifiedFrame> for ConsoleOutput {
  type Error = ConsoleOutputError;

  fn render_result(
    &self,
    _frame: &DetectionFrame,
    result: &ClassifiedFrame,
  ) -> Result<(), Self::Error> {
    let mut writer = self
      .writer
      .lock()
      .map_err(|_| ConsoleOutputError::Poisoned)?;
    self.write_frame(&mut *writer, result)?;
    writer.flush()?;
    Ok(())
  }
}
