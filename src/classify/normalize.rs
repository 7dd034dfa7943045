// 该文件是 Fenjian （分拣） 项目的一部分。
// src/classify/normalize.rs - 标签归一化
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

/// 归一化检测标签：去除首尾空白、转小写、非字母数字字符替换为空格、合并连续空白。
///
/// 例如 `"  PLASTIC_Bottle!! "` 归一化为 `"plastic bottle"`。
pub fn normalize_label(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  let mut pending_space = false;

  for ch in raw.chars() {
    if ch.is_alphanumeric() {
      if pending_space && !out.is_empty() {
        out.push(' ');
      }
      pending_space = false;
      out.extend(ch.to_lowercase());
    } else {
      pending_space = true;
    }
  }

  out
}
