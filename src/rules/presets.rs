// 该文件是 Fenjian （分拣） 项目的一部分。
// src/rules/presets.rs - 内置规则表
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

use super::{ClassificationRule, DEFAULT_HAZARDOUS_INSTRUCTION, Fallback, RuleTable};
use crate::classify::Category;

pub const STANDARD_PRESET: &str = "standard";
pub const SORTING_BINS_PRESET: &str = "sorting-bins";
pub const COLOR_BINS_PRESET: &str = "color-bins";

pub const PRESET_NAMES: [&str; 3] = [STANDARD_PRESET, SORTING_BINS_PRESET, COLOR_BINS_PRESET];

// 有害垃圾放在最前，避免 "battery bag" 之类的标签被判为可回收
const HAZARDOUS_KEYWORDS: &[&str] = &[
  "battery",
  "batteries",
  "electronics",
  "electronic",
  "laptop",
  "cell phone",
  "mobile phone",
  "tv",
  "television",
  "keyboard",
  "mouse",
  "remote",
  "charger",
  "light bulb",
  "syringe",
  "medicine",
  "chemical",
];

const ORGANIC_KEYWORDS: &[&str] = &[
  "food",
  "banana",
  "apple",
  "orange",
  "vegetable",
  "fruit",
  "leaf",
  "leaves",
  "peel",
  "broccoli",
  "carrot",
  "sandwich",
  "pizza",
  "hot dog",
  "donut",
  "cake",
  "bread",
];

const RECYCLABLE_KEYWORDS: &[&str] = &[
  "plastic",
  "bottle",
  "cup",
  "bag",
  "container",
  "paper",
  "cardboard",
  "newspaper",
  "magazine",
  "book",
  "glass",
  "can",
  "tin",
  "metal",
  "aluminum",
  "aluminium",
  "spoon",
  "fork",
  "knife",
  "bowl",
  "carton",
  "jar",
];

impl RuleTable {
  pub fn preset(name: &str) -> Option<RuleTable> {
    match name {
      STANDARD_PRESET => Some(RuleTable::standard()),
      SORTING_BINS_PRESET => Some(RuleTable::sorting_bins()),
      COLOR_BINS_PRESET => Some(RuleTable::color_bins()),
      _ => None,
    }
  }

  /// 标准四分类：可回收、厨余、有害、其他
  pub fn standard() -> RuleTable {
    RuleTable::builder()
      .rule(ClassificationRule::new(
        HAZARDOUS_KEYWORDS,
        Category::Hazardous,
        "Hazardous Waste Bin",
        DEFAULT_HAZARDOUS_INSTRUCTION,
      ))
      .rule(ClassificationRule::new(
        ORGANIC_KEYWORDS,
        Category::Organic,
        "Organic Waste Bin",
        "Compost or dispose in organic waste.",
      ))
      .rule(ClassificationRule::new(
        RECYCLABLE_KEYWORDS,
        Category::Recyclable,
        "Recycling Bin",
        "Wash if dirty and send to recycling bin.",
      ))
      .build_unchecked()
  }

  /// 按材质分桶：塑料、金属、厨余、纸类、电子垃圾
  pub fn sorting_bins() -> RuleTable {
    RuleTable::builder()
      .rule(ClassificationRule::new(
        &["bottle", "cup", "bag", "plastic", "container"],
        Category::Plastic,
        "Plastic Bin",
        "Empty and rinse, then place in the plastic bin.",
      ))
      .rule(ClassificationRule::new(
        &["can", "metal", "tin", "spoon"],
        Category::Metal,
        "Metal Bin",
        "Rinse and place in the metal bin.",
      ))
      .rule(ClassificationRule::new(
        &["banana", "apple", "orange", "food", "vegetable", "fruit"],
        Category::Organic,
        "Organic Bin",
        "Compost or dispose in organic waste.",
      ))
      .rule(ClassificationRule::new(
        &["book", "cardboard", "paper", "newspaper"],
        Category::Paper,
        "Paper Bin",
        "Keep dry and flatten before placing in the paper bin.",
      ))
      .rule(ClassificationRule::new(
        &["laptop", "cell phone", "tv", "keyboard", "mouse"],
        Category::EWaste,
        "E-Waste Bin",
        "Take to an electronics collection point.",
      ))
      .fallback(Fallback::new(
        Category::Other,
        "Other Waste Bin",
        "Dispose in general waste bin.",
      ))
      .build_unchecked()
  }

  /// 颜色分桶：绿色（可降解）、蓝色（可回收），其余进入红色（有害）
  pub fn color_bins() -> RuleTable {
    RuleTable::builder()
      .rule(ClassificationRule::new(
        &["food", "paper", "leaf"],
        Category::Organic,
        "Green Bin (Biodegradable)",
        "Compost or dispose in organic waste.",
      ))
      .rule(ClassificationRule::new(
        &["plastic", "glass", "metal"],
        Category::Recyclable,
        "Blue Bin (Recyclable)",
        "Wash if dirty and send to recycling bin.",
      ))
      .fallback(Fallback::new(
        Category::Hazardous,
        "Red Bin (Hazardous)",
        DEFAULT_HAZARDOUS_INSTRUCTION,
      ))
      .build_unchecked()
  }
}
