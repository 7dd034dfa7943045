// 该文件是 Fenjian （分拣） 项目的一部分。
// src/rules.rs - 分类规则表
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

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  classify::{Category, normalize_label},
};

mod presets;
pub use self::presets::{COLOR_BINS_PRESET, PRESET_NAMES, SORTING_BINS_PRESET, STANDARD_PRESET};

pub const DEFAULT_FOOD_CONTEXTS: [&str; 2] = ["kitchen", "food waste"];
pub const DEFAULT_URGENT_ORGANIC_INSTRUCTION: &str = "Compost immediately to prevent odor.";
pub const DEFAULT_HAZARDOUS_INSTRUCTION: &str =
  "Wear gloves and avoid contact. Dispose at hazardous waste center.";

#[derive(Error, Debug)]
pub enum RuleTableError {
  #[error("第 {0} 条规则没有关键词")]
  NoKeywords(usize),
  #[error("第 {0} 条规则包含空关键词: {1:?}")]
  EmptyKeyword(usize, String),
  #[error("第 {0} 条规则的垃圾桶名称为空")]
  EmptyBin(usize),
  #[error("第 {0} 条规则的处理说明为空")]
  EmptyInstruction(usize),
  #[error("默认类别的垃圾桶名称或处理说明为空")]
  EmptyFallback,
  #[error("场景标签为空: {0:?}")]
  EmptyContext(String),
  #[error("未知的预设规则表: {0}")]
  UnknownPreset(String),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("规则文件路径无效: {0}")]
  InvalidPath(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("规则文件解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 单条分类规则：关键词任一为归一化标签的子串即命中
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
  pub keywords: Vec<String>,
  pub category: Category,
  pub bin: String,
  pub instruction: String,
}

impl ClassificationRule {
  pub fn new(
    keywords: &[&str],
    category: Category,
    bin: impl Into<String>,
    instruction: impl Into<String>,
  ) -> Self {
    Self {
      keywords: keywords.iter().map(|k| k.to_string()).collect(),
      category,
      bin: bin.into(),
      instruction: instruction.into(),
    }
  }

  pub fn matches(&self, normalized_label: &str) -> bool {
    self
      .keywords
      .iter()
      .any(|keyword| normalized_label.contains(keyword.as_str()))
  }
}

/// 未命中任何规则时的默认结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fallback {
  pub category: Category,
  pub bin: String,
  pub instruction: String,
}

impl Fallback {
  pub fn new(category: Category, bin: impl Into<String>, instruction: impl Into<String>) -> Self {
    Self {
      category,
      bin: bin.into(),
      instruction: instruction.into(),
    }
  }
}

impl Default for Fallback {
  fn default() -> Self {
    Fallback::new(
      Category::General,
      "General Waste Bin",
      "Dispose in general waste bin.",
    )
  }
}

/// 有序规则表，首个命中的规则生效。
///
/// 构建完成后不可变，可在线程间共享。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleTable {
  rules: Vec<ClassificationRule>,
  fallback: Fallback,
  food_contexts: Vec<String>,
  urgent_organic_instruction: String,
  hazardous_instruction: String,
}

impl Default for RuleTable {
  fn default() -> Self {
    RuleTable::standard()
  }
}

impl RuleTable {
  pub fn builder() -> RuleTableBuilder {
    RuleTableBuilder::default()
  }

  pub fn rules(&self) -> &[ClassificationRule] {
    &self.rules
  }

  pub fn fallback(&self) -> &Fallback {
    &self.fallback
  }

  pub fn food_contexts(&self) -> &[String] {
    &self.food_contexts
  }

  pub fn urgent_organic_instruction(&self) -> &str {
    &self.urgent_organic_instruction
  }

  pub fn hazardous_instruction(&self) -> &str {
    &self.hazardous_instruction
  }

  /// 返回第一个命中的规则
  pub fn find_rule(&self, normalized_label: &str) -> Option<&ClassificationRule> {
    if normalized_label.is_empty() {
      return None;
    }
    self.rules.iter().find(|rule| rule.matches(normalized_label))
  }

  pub fn is_food_context(&self, normalized_context: &str) -> bool {
    self
      .food_contexts
      .iter()
      .any(|tag| tag.as_str() == normalized_context)
  }

  pub fn validate(&self) -> Result<(), RuleTableError> {
    for (index, rule) in self.rules.iter().enumerate() {
      if rule.keywords.is_empty() {
        return Err(RuleTableError::NoKeywords(index));
      }
      if let Some(keyword) = rule.keywords.iter().find(|k| k.is_empty()) {
        return Err(RuleTableError::EmptyKeyword(index, keyword.clone()));
      }
      if rule.bin.trim().is_empty() {
        return Err(RuleTableError::EmptyBin(index));
      }
      if rule.instruction.trim().is_empty() {
        return Err(RuleTableError::EmptyInstruction(index));
      }
    }

    if self.fallback.bin.trim().is_empty() || self.fallback.instruction.trim().is_empty() {
      return Err(RuleTableError::EmptyFallback);
    }

    if let Some(tag) = self.food_contexts.iter().find(|t| t.is_empty()) {
      return Err(RuleTableError::EmptyContext(tag.clone()));
    }

    Ok(())
  }

  pub fn from_json(text: &str) -> Result<Self, RuleTableError> {
    let file: RuleFile = serde_json::from_str(text)?;
    file.into_builder().build()
  }

  pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, RuleTableError> {
    let path = path.as_ref();
    info!("加载规则文件: {}", path.display());
    let text = std::fs::read_to_string(path)?;
    let table = Self::from_json(&text)?;
    debug!("规则文件包含 {} 条规则", table.rules.len());
    Ok(table)
  }
}

#[derive(Debug, Clone)]
pub struct RuleTableBuilder {
  rules: Vec<ClassificationRule>,
  fallback: Fallback,
  food_contexts: Vec<String>,
  urgent_organic_instruction: String,
  hazardous_instruction: String,
}

impl Default for RuleTableBuilder {
  fn default() -> Self {
    Self {
      rules: Vec::new(),
      fallback: Fallback::default(),
      food_contexts: DEFAULT_FOOD_CONTEXTS.iter().map(|c| c.to_string()).collect(),
      urgent_organic_instruction: DEFAULT_URGENT_ORGANIC_INSTRUCTION.to_string(),
      hazardous_instruction: DEFAULT_HAZARDOUS_INSTRUCTION.to_string(),
    }
  }
}

impl RuleTableBuilder {
  pub fn rule(mut self, rule: ClassificationRule) -> Self {
    self.rules.push(rule);
    self
  }

  pub fn fallback(mut self, fallback: Fallback) -> Self {
    self.fallback = fallback;
    self
  }

  pub fn food_contexts<I, S>(mut self, contexts: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.food_contexts = contexts.into_iter().map(Into::into).collect();
    self
  }

  pub fn urgent_organic_instruction(mut self, instruction: impl Into<String>) -> Self {
    self.urgent_organic_instruction = instruction.into();
    self
  }

  pub fn hazardous_instruction(mut self, instruction: impl Into<String>) -> Self {
    self.hazardous_instruction = instruction.into();
    self
  }

  pub fn build(self) -> Result<RuleTable, RuleTableError> {
    let table = self.build_unchecked();
    table.validate()?;
    Ok(table)
  }

  // 仅用于内置预设，调用方保证内容合法
  fn build_unchecked(self) -> RuleTable {
    let rules = self
      .rules
      .into_iter()
      .map(|rule| ClassificationRule {
        keywords: rule.keywords.iter().map(|k| normalize_label(k)).collect(),
        ..rule
      })
      .collect();

    RuleTable {
      rules,
      fallback: self.fallback,
      food_contexts: self.food_contexts.iter().map(|c| normalize_label(c)).collect(),
      urgent_organic_instruction: self.urgent_organic_instruction,
      hazardous_instruction: self.hazardous_instruction,
    }
  }
}

/// 规则文件格式
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
  rules: Vec<ClassificationRule>,
  #[serde(default)]
  fallback: Option<Fallback>,
  #[serde(default)]
  food_contexts: Option<Vec<String>>,
  #[serde(default)]
  urgent_organic_instruction: Option<String>,
  #[serde(default)]
  hazardous_instruction: Option<String>,
}

impl RuleFile {
  fn into_builder(self) -> RuleTableBuilder {
    let mut builder = RuleTable::builder();
    for rule in self.rules {
      builder = builder.rule(rule);
    }
    if let Some(fallback) = self.fallback {
      builder = builder.fallback(fallback);
    }
    if let Some(contexts) = self.food_contexts {
      builder = builder.food_contexts(contexts);
    }
    if let Some(instruction) = self.urgent_organic_instruction {
      builder = builder.urgent_organic_instruction(instruction);
    }
    if let Some(instruction) = self.hazardous_instruction {
      builder = builder.hazardous_instruction(instruction);
    }
    builder
  }
}

const PRESET_SCHEME: &str = "preset";
const RULE_FILE_SCHEME: &str = "rules";

impl FromUrlWithScheme for RuleTable {
  const SCHEME: &'static str = PRESET_SCHEME;
}

impl FromUrl for RuleTable {
  type Error = RuleTableError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      PRESET_SCHEME => {
        let name = url.path().trim_matches('/');
        info!("使用预设规则表: {}", name);
        RuleTable::preset(name).ok_or_else(|| RuleTableError::UnknownPreset(name.to_string()))
      }
      RULE_FILE_SCHEME => {
        let path = urlencoding::decode(url.path())
          .map_err(|e| RuleTableError::InvalidPath(e.to_string()))?;
        RuleTable::from_json_file(&*path)
      }
      other => Err(RuleTableError::SchemeMismatch(format!(
        "期望 '{}' 或 '{}', 实际 '{}'",
        PRESET_SCHEME, RULE_FILE_SCHEME, other
      ))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_builder_normalizes_keywords_and_contexts() {
    let table = RuleTable::builder()
      .rule(ClassificationRule::new(
        &["Cell_Phone", " TV "],
        Category::EWaste,
        "E-Waste Bin",
        "Take to an electronics drop-off.",
      ))
      .food_contexts(["Food-Waste"])
      .build()
      .unwrap();

    assert_eq!(table.rules()[0].keywords, vec!["cell phone", "tv"]);
    assert_eq!(table.food_contexts(), ["food waste"]);
  }

  #[test]
  fn test_rule_without_keywords_rejected() {
    let result = RuleTable::builder()
      .rule(ClassificationRule::new(&[], Category::Paper, "Paper Bin", "Flatten."))
      .build();
    assert!(matches!(result, Err(RuleTableError::NoKeywords(0))));
  }

  #[test]
  fn test_punctuation_keyword_rejected() {
    let result = RuleTable::builder()
      .rule(ClassificationRule::new(&["paper"], Category::Paper, "Paper Bin", "Flatten."))
      .rule(ClassificationRule::new(&["--"], Category::Paper, "Paper Bin", "Flatten."))
      .build();
    assert!(matches!(result, Err(RuleTableError::EmptyKeyword(1, _))));
  }

  #[test]
  fn test_blank_bin_and_instruction_rejected() {
    let result = RuleTable::builder()
      .rule(ClassificationRule::new(&["paper"], Category::Paper, " ", "Flatten."))
      .build();
    assert!(matches!(result, Err(RuleTableError::EmptyBin(0))));

    let result = RuleTable::builder()
      .rule(ClassificationRule::new(&["paper"], Category::Paper, "Paper Bin", ""))
      .build();
    assert!(matches!(result, Err(RuleTableError::EmptyInstruction(0))));

    let result = RuleTable::builder()
      .fallback(Fallback::new(Category::Other, "", "Dispose."))
      .build();
    assert!(matches!(result, Err(RuleTableError::EmptyFallback)));
  }

  #[test]
  fn test_find_rule_is_first_match() {
    let table = RuleTable::builder()
      .rule(ClassificationRule::new(&["bottle"], Category::Recyclable, "Blue", "Rinse."))
      .rule(ClassificationRule::new(&["plastic"], Category::Plastic, "Yellow", "Squash."))
      .build()
      .unwrap();

    let rule = table.find_rule("plastic bottle").unwrap();
    assert_eq!(rule.category, Category::Recyclable);
    assert!(table.find_rule("").is_none());
    assert!(table.find_rule("stone").is_none());
  }

  #[test]
  fn test_from_json_with_defaults() {
    let text = r#"{
      "rules": [
        { "keywords": ["Glass"], "category": "recyclable", "bin": "Blue Bin", "instruction": "Rinse." }
      ]
    }"#;
    let table = RuleTable::from_json(text).unwrap();
    assert_eq!(table.rules().len(), 1);
    assert_eq!(table.rules()[0].keywords, vec!["glass"]);
    assert_eq!(table.fallback(), &Fallback::default());
    assert_eq!(table.urgent_organic_instruction(), DEFAULT_URGENT_ORGANIC_INSTRUCTION);
    assert_eq!(table.hazardous_instruction(), DEFAULT_HAZARDOUS_INSTRUCTION);
    assert!(table.is_food_context("kitchen"));
  }

  #[test]
  fn test_from_json_overrides() {
    let text = r#"{
      "rules": [
        { "keywords": ["leaf"], "category": "organic", "bin": "Green Bin", "instruction": "Compost." }
      ],
      "fallback": { "category": "other", "bin": "Grey Bin", "instruction": "Landfill." },
      "food_contexts": ["restaurant"],
      "urgent_organic_instruction": "Compost today.",
      "hazardous_instruction": "Call the depot."
    }"#;
    let table = RuleTable::from_json(text).unwrap();
    assert_eq!(table.fallback().category, Category::Other);
    assert!(table.is_food_context("restaurant"));
    assert!(!table.is_food_context("kitchen"));
    assert_eq!(table.urgent_organic_instruction(), "Compost today.");
    assert_eq!(table.hazardous_instruction(), "Call the depot.");
  }

  #[test]
  fn test_from_json_rejects_unknown_category_and_fields() {
    let text = r#"{ "rules": [ { "keywords": ["x"], "category": "compost", "bin": "B", "instruction": "I" } ] }"#;
    assert!(matches!(RuleTable::from_json(text), Err(RuleTableError::JsonError(_))));

    let text = r#"{ "rules": [], "colour": "red" }"#;
    assert!(matches!(RuleTable::from_json(text), Err(RuleTableError::JsonError(_))));
  }

  #[test]
  fn test_from_url_preset_and_file() {
    let table = RuleTable::from_url(&Url::parse("preset:sorting-bins").unwrap()).unwrap();
    assert_eq!(table, RuleTable::sorting_bins());

    let unknown = RuleTable::from_url(&Url::parse("preset:nope").unwrap());
    assert!(matches!(unknown, Err(RuleTableError::UnknownPreset(name)) if name == "nope"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my rules.json");
    std::fs::write(
      &path,
      r#"{ "rules": [ { "keywords": ["can"], "category": "metal", "bin": "Metal Bin", "instruction": "Crush." } ] }"#,
    )
    .unwrap();
    let url = Url::from_file_path(&path).unwrap();
    let url = Url::parse(&format!("rules://{}", url.path())).unwrap();
    let table = RuleTable::from_url(&url).unwrap();
    assert_eq!(table.rules()[0].category, Category::Metal);

    let wrong = RuleTable::from_url(&Url::parse("http://example.com/rules.json").unwrap());
    assert!(matches!(wrong, Err(RuleTableError::SchemeMismatch(_))));
  }
}
