// 该文件是 Fenjian （分拣） 项目的一部分。
// src/classify/category.rs - 垃圾类别定义
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

use std::fmt;

use serde::{Deserialize, Serialize};

/// 垃圾类别（封闭枚举）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
  Recyclable,
  Organic,
  Hazardous,
  General,
  Metal,
  Paper,
  Plastic,
  EWaste,
  Other,
}

impl Category {
  pub const ALL: [Category; 9] = [
    Category::Recyclable,
    Category::Organic,
    Category::Hazardous,
    Category::General,
    Category::Metal,
    Category::Paper,
    Category::Plastic,
    Category::EWaste,
    Category::Other,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Category::Recyclable => "recyclable",
      Category::Organic => "organic",
      Category::Hazardous => "hazardous",
      Category::General => "general",
      Category::Metal => "metal",
      Category::Paper => "paper",
      Category::Plastic => "plastic",
      Category::EWaste => "e-waste",
      Category::Other => "other",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
