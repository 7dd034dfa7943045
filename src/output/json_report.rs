// 该文件是 Fenjian （分拣） 项目的一部分。
// src/output/json_report.rs - JSON 报告输出
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
  io::{BufWriter, Seek, SeekFrom, Write},
  path::{Path, PathBuf},
  sync::Mutex,
};

use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{ClassifiedFrame, DetectionFrame},
  output::Render,
};

// 每帧写入后文件都以该结尾收尾，下一帧写入前回退覆盖
const CLOSING: &[u8] = b"\n]\n";

#[derive(Error, Debug)]
pub enum JsonReportOutputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("路径无效: {0}")]
  InvalidPath(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("报告被占用")]
  Poisoned,
}

struct ReportFile {
  writer: BufWriter<File>,
  frames: usize,
}

impl ReportFile {
  fn append(&mut self, frame: &ClassifiedFrame) -> Result<(), JsonReportOutputError> {
    let text = serde_json::to_vec_pretty(frame)?;
    if self.frames == 0 {
      self.writer.write_all(b"[\n")?;
    } else {
      self.writer.seek(SeekFrom::End(-(CLOSING.len() as i64)))?;
      self.writer.write_all(b",\n")?;
    }
    self.writer.write_all(&text)?;
    self.writer.write_all(CLOSING)?;
    self.writer.flush()?;
    self.frames += 1;
    Ok(())
  }
}

/// 以 JSON 数组记录所有帧的分类结果。
///
/// 文件在第一帧时创建，之后每帧只追加该帧内容，文件在任意两帧之间都是完整的 JSON。
pub struct JsonReportOutput {
  path: PathBuf,
  report: Mutex<Option<ReportFile>>,
}

impl FromUrlWithScheme for JsonReportOutput {
  const SCHEME: &'static str = "report";
}

impl FromUrl for JsonReportOutput {
  type Error = JsonReportOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(JsonReportOutputError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    let path = urlencoding::decode(uri.path())
      .map_err(|e| JsonReportOutputError::InvalidPath(e.to_string()))?;
    if path.is_empty() {
      return Err(JsonReportOutputError::InvalidPath(uri.to_string()));
    }

    Ok(JsonReportOutput::new(&*path))
  }
}

impl JsonReportOutput {
  pub fn new<P: AsRef<Path>>(path: P) -> Self {
    Self {
      path: path.as_ref().to_path_buf(),
      report: Mutex::new(None),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn open_report(&self) -> Result<ReportFile, JsonReportOutputError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let file = File::create(&self.path)?;
    info!("创建报告文件: {}", self.path.display());
    Ok(ReportFile {
      writer: BufWriter::new(file),
      frames: 0,
    })
  }
}

impl Render<DetectionFrame, ClassifiedFrame> for JsonReportOutput {
  type Error = JsonReportOutputError;

  fn render_result(
    &self,
    _frame: &DetectionFrame,
    result: &ClassifiedFrame,
  ) -> Result<(), Self::Error> {
    let mut report = self
      .report
      .lock()
      .map_err(|_| JsonReportOutputError::Poisoned)?;
    if report.is_none() {
      *report = Some(self.open_report()?);
    }
    if let Some(report) = report.as_mut() {
      report.append(result)?;
      debug!("报告已写入: {} ({} 帧)", self.path.display(), report.frames);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    classify::{Category, WasteClassifier},
    model::{Detection, FrameClassifier, Model},
    rules::RuleTable,
  };

  #[test]
  fn test_report_accumulates_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("report.json");
    let url = Url::parse(&format!("report://{}", path.display())).unwrap();
    let output = JsonReportOutput::from_url(&url).unwrap();
    assert_eq!(output.path(), path.as_path());

    let classifier = FrameClassifier::new(WasteClassifier::new(RuleTable::standard()));
    for label in ["battery", "newspaper"] {
      let frame = DetectionFrame {
        image: Some(format!("{label}.jpg")),
        context: None,
        detections: vec![Detection::new(label, 0.6)],
      };
      let result = classifier.infer(&frame).unwrap();
      output.render_result(&frame, &result).unwrap();
    }

    let text = std::fs::read_to_string(&path).unwrap();
    let frames: Vec<ClassifiedFrame> = serde_json::from_str(&text).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].results[0].category, Category::Hazardous);
    assert_eq!(frames[1].results[0].category, Category::Recyclable);
  }

  #[test]
  fn test_report_valid_after_every_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    let output = JsonReportOutput::new(&path);
    assert!(!path.exists());

    let classifier = FrameClassifier::new(WasteClassifier::new(RuleTable::standard()));
    for i in 0..50 {
      let frame = DetectionFrame {
        image: Some(format!("{i}.jpg")),
        context: None,
        detections: vec![Detection::new("cup", 0.5); i % 4],
      };
      let result = classifier.infer(&frame).unwrap();
      output.render_result(&frame, &result).unwrap();

      let frames: Vec<ClassifiedFrame> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
      assert_eq!(frames.len(), i + 1);
      assert_eq!(frames[i].image.as_deref(), Some(format!("{i}.jpg").as_str()));
      assert_eq!(frames[i].results.len(), i % 4);
    }
  }

  #[test]
  fn test_report_size_grows_by_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    let output = JsonReportOutput::new(&path);

    let classifier = FrameClassifier::new(WasteClassifier::new(RuleTable::standard()));
    let frame = DetectionFrame {
      image: Some("same.jpg".to_string()),
      context: None,
      detections: vec![Detection::new("battery", 0.9)],
    };
    let result = classifier.infer(&frame).unwrap();

    let mut sizes = Vec::new();
    for _ in 0..3 {
      output.render_result(&frame, &result).unwrap();
      sizes.push(std::fs::metadata(&path).unwrap().len());
    }
    // 除第一帧外每帧增量相同，已写入的内容不会重写
    assert_eq!(sizes[2] - sizes[1], sizes[1] - sizes[0]);
  }
}
