// 该文件是 Fenjian （分拣） 项目的一部分。
// src/classify.rs - 垃圾分类决策
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

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::RuleTable;

mod category;
mod normalize;

pub use self::category::Category;
pub use self::normalize::normalize_label;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
  #[error("检测标签为空")]
  EmptyLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
  pub label: String,
  pub confidence: f32,
  pub category: Category,
  pub bin: String,
  pub instruction: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bbox: Option<[f32; 4]>, // [x_min, y_min, x_max, y_max]
}

/// NaN 视为 0，其余截断到 [0, 1]
pub fn sanitize_confidence(confidence: f32) -> f32 {
  if confidence.is_nan() {
    0.0
  } else {
    confidence.clamp(0.0, 1.0)
  }
}

/// 根据规则表对单个检测标签分类。
///
/// - 标签先经过 [`normalize_label`] 归一化，再按顺序匹配规则，首个命中的规则生效；
///   未命中时使用规则表的默认类别。
/// - 有害垃圾总是返回安全处理说明，与场景无关。
/// - 厨余垃圾在食物相关场景（如 `kitchen`）下返回尽快堆肥的说明。
/// - 空白标签返回 [`ClassifyError::EmptyLabel`]；只含标点的标签归入默认类别。
///
/// 置信度只做透传，不参与决策。
pub fn classify(
  table: &RuleTable,
  label: &str,
  confidence: f32,
  context: Option<&str>,
) -> Result<ClassificationResult, ClassifyError> {
  if label.trim().is_empty() {
    return Err(ClassifyError::EmptyLabel);
  }

  let normalized = normalize_label(label);
  let (category, bin, base_instruction) = match table.find_rule(&normalized) {
    Some(rule) => (rule.category, &rule.bin, &rule.instruction),
    None => {
      let fallback = table.fallback();
      (fallback.category, &fallback.bin, &fallback.instruction)
    }
  };

  let food_context = context
    .map(normalize_label)
    .is_some_and(|c| table.is_food_context(&c));

  let instruction = match category {
    Category::Hazardous => table.hazardous_instruction(),
    Category::Organic if food_context => table.urgent_organic_instruction(),
    _ => base_instruction.as_str(),
  };

  Ok(ClassificationResult {
    label: label.to_string(),
    confidence: sanitize_confidence(confidence),
    category,
    bin: bin.clone(),
    instruction: instruction.to_string(),
    bbox: None,
  })
}

/// 持有不可变规则表的分类器，可跨线程共享
#[derive(Debug, Clone, Default)]
pub struct WasteClassifier {
  table: Arc<RuleTable>,
}

impl WasteClassifier {
  pub fn new(table: RuleTable) -> Self {
    Self {
      table: Arc::new(table),
    }
  }

  pub fn classify(
    &self,
    label: &str,
    confidence: f32,
    context: Option<&str>,
  ) -> Result<ClassificationResult, ClassifyError> {
    classify(&self.table, label, confidence, context)
  }
}
