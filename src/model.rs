// 该文件是 Fenjian （分拣） 项目的一部分。
// src/model.rs - 检测结果与分类模型
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

use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classify::{ClassificationResult, ClassifyError, WasteClassifier, sanitize_confidence};

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 上游检测器给出的单个目标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Detection {
  #[serde(alias = "class_name")]
  pub label: String,
  #[serde(alias = "score")]
  pub confidence: f32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bbox: Option<[f32; 4]>, // [x_min, y_min, x_max, y_max]
}

impl Detection {
  pub fn new(label: impl Into<String>, confidence: f32) -> Self {
    Self {
      label: label.into(),
      confidence,
      bbox: None,
    }
  }

  pub fn with_bbox(mut self, bbox: [f32; 4]) -> Self {
    self.bbox = Some(bbox);
    self
  }
}

/// 一张图像的全部检测结果。
///
/// `detections` 必须存在（可以为空数组），未知字段视为格式错误。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectionFrame {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub context: Option<String>,
  pub detections: Vec<Detection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedFrame {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub context: Option<String>,
  pub results: Vec<ClassificationResult>,
  /// 因标签为空被跳过的检测数量
  #[serde(default)]
  pub rejected: usize,
  /// 低于最低置信度被过滤的检测数量
  #[serde(default)]
  pub filtered: usize,
}

impl ClassifiedFrame {
  pub fn is_empty(&self) -> bool {
    self.results.is_empty()
  }

  /// 按垃圾桶汇总标签，保持首次出现的顺序
  pub fn bin_summary(&self) -> Vec<(&str, Vec<&str>)> {
    let mut summary: Vec<(&str, Vec<&str>)> = Vec::new();
    for result in &self.results {
      let (bin, label) = (result.bin.as_str(), result.label.as_str());
      match summary.iter_mut().find(|(b, _)| *b == bin) {
        Some((_, labels)) => labels.push(label),
        None => summary.push((bin, vec![label])),
      }
    }
    summary
  }
}

/// 把分类器包装为 [`Model`]，逐帧处理检测结果。
///
/// 帧自带的场景优先于默认场景；标签为空的检测会被跳过并记录警告。
/// 设置最低置信度后，低于该值的检测在分类前被过滤，分类本身不看置信度。
#[derive(Debug, Clone, Default)]
pub struct FrameClassifier {
  classifier: WasteClassifier,
  default_context: Option<String>,
  min_confidence: Option<f32>,
}

impl FrameClassifier {
  pub fn new(classifier: WasteClassifier) -> Self {
    Self {
      classifier,
      default_context: None,
      min_confidence: None,
    }
  }

  pub fn with_default_context(mut self, context: Option<String>) -> Self {
    self.default_context = context;
    self
  }

  pub fn with_min_confidence(mut self, min_confidence: Option<f32>) -> Self {
    self.min_confidence = min_confidence;
    self
  }

  fn passes_threshold(&self, detection: &Detection) -> bool {
    self
      .min_confidence
      .is_none_or(|min| sanitize_confidence(detection.confidence) >= min)
  }

  pub fn classify_detection(
    &self,
    detection: &Detection,
    context: Option<&str>,
  ) -> Result<ClassificationResult, ClassifyError> {
    let mut result = self
      .classifier
      .classify(&detection.label, detection.confidence, context)?;
    result.bbox = detection.bbox;
    Ok(result)
  }
}

impl Model for FrameClassifier {
  type Input = DetectionFrame;
  type Output = ClassifiedFrame;
  type Error = Infallible;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let context = input.context.as_deref().or(self.default_context.as_deref());

    let mut results = Vec::with_capacity(input.detections.len());
    let mut rejected = 0;
    let mut filtered = 0;
    for detection in &input.detections {
      if !self.passes_threshold(detection) {
        debug!(
          "置信度低于阈值，过滤: {} ({})",
          detection.label, detection.confidence
        );
        filtered += 1;
        continue;
      }
      if !(0.0..=1.0).contains(&detection.confidence) {
        warn!(
          "置信度超出范围: {} ({})，已截断",
          detection.confidence, detection.label
        );
      }
      match self.classify_detection(detection, context) {
        Ok(result) => {
          debug!(
            "{} → {} → {}",
            result.label, result.category, result.instruction
          );
          results.push(result);
        }
        Err(ClassifyError::EmptyLabel) => {
          warn!("检测标签为空，跳过该目标: {:?}", detection);
          rejected += 1;
        }
      }
    }

    Ok(ClassifiedFrame {
      image: input.image.clone(),
      context: context.map(str::to_string),
      results,
      rejected,
      filtered,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{classify::Category, rules::RuleTable};

  fn frame_classifier() -> FrameClassifier {
    FrameClassifier::new(WasteClassifier::new(RuleTable::standard()))
  }

  #[test]
  fn test_detection_accepts_detector_field_names() {
    let detection: Detection =
      serde_json::from_str(r#"{ "class_name": "cup", "score": 0.66, "bbox": [1, 2, 3, 4] }"#)
        .unwrap();
    assert_eq!(
      detection,
      Detection::new("cup", 0.66).with_bbox([1.0, 2.0, 3.0, 4.0])
    );
  }

  #[test]
  fn test_infer_passes_bbox_and_skips_empty_labels() {
    let frame = DetectionFrame {
      image: Some("desk.jpg".to_string()),
      context: None,
      detections: vec![
        Detection::new("laptop", 0.91).with_bbox([0.1, 0.1, 0.5, 0.5]),
        Detection::new("  ", 0.40),
        Detection::new("cup", 0.77),
      ],
    };
    let output = frame_classifier().infer(&frame).unwrap();
    assert_eq!(output.image.as_deref(), Some("desk.jpg"));
    assert_eq!(output.results.len(), 2);
    assert_eq!(output.rejected, 1);
    assert_eq!(output.results[0].category, Category::Hazardous);
    assert_eq!(output.results[0].bbox, Some([0.1, 0.1, 0.5, 0.5]));
    assert_eq!(output.results[1].category, Category::Recyclable);
  }

  #[test]
  fn test_frame_context_wins_over_default() {
    let classifier = frame_classifier().with_default_context(Some("street".to_string()));

    let frame = DetectionFrame {
      image: None,
      context: Some("kitchen".to_string()),
      detections: vec![Detection::new("banana", 0.9)],
    };
    let output = classifier.infer(&frame).unwrap();
    assert_eq!(output.context.as_deref(), Some("kitchen"));
    assert!(output.results[0].instruction.contains("Compost immediately"));

    let frame = DetectionFrame {
      context: None,
      ..frame
    };
    let output = classifier.infer(&frame).unwrap();
    assert_eq!(output.context.as_deref(), Some("street"));
    assert!(!output.results[0].instruction.contains("Compost immediately"));
  }

  #[test]
  fn test_bin_summary_keeps_first_seen_order() {
    let frame = DetectionFrame {
      detections: vec![
        Detection::new("bottle", 0.9),
        Detection::new("banana", 0.8),
        Detection::new("cup", 0.7),
      ],
      ..Default::default()
    };
    let output = frame_classifier().infer(&frame).unwrap();
    assert_eq!(
      output.bin_summary(),
      vec![
        ("Recycling Bin", vec!["bottle", "cup"]),
        ("Organic Waste Bin", vec!["banana"]),
      ]
    );
  }

  #[test]
  fn test_min_confidence_filters_before_classification() {
    let frame = DetectionFrame {
      image: None,
      context: None,
      detections: vec![
        Detection::new("battery", 0.9),
        Detection::new("banana", 0.39),
        Detection::new("cup", 0.4),
        Detection::new("can", f32::NAN),
      ],
    };

    let output = frame_classifier().infer(&frame).unwrap();
    assert_eq!(output.results.len(), 4);
    assert_eq!(output.filtered, 0);

    let output = frame_classifier()
      .with_min_confidence(Some(0.4))
      .infer(&frame)
      .unwrap();
    let labels: Vec<&str> = output.results.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["battery", "cup"]);
    assert_eq!(output.filtered, 2);
    assert_eq!(output.rejected, 0);
  }
}
