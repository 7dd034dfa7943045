// 该文件是 Fenjian （分拣） 项目的一部分。
// src/args.rs - 项目参数配置
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

use std::num::NonZeroUsize;

use clap::Parser;
use url::Url;

fn parse_confidence(value: &str) -> Result<f32, String> {
  let confidence: f32 = value
    .parse()
    .map_err(|e| format!("无效的置信度 '{value}': {e}"))?;
  if (0.0..=1.0).contains(&confidence) {
    Ok(confidence)
  } else {
    Err(format!("置信度必须在 0.0 到 1.0 之间: {value}"))
  }
}

/// Fenjian 垃圾分拣参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 分类规则表
  /// 支持格式:
  /// - 预设: preset:standard, preset:sorting-bins, preset:color-bins
  /// - 规则文件: rules:///path/to/rules.json
  #[arg(long, value_name = "RULES", default_value = "preset:standard")]
  pub rules: Url,

  /// 检测结果来源
  /// 支持格式:
  /// - JSON 文件: json:///path/to/frames.json
  /// - JSON Lines: jsonl:///path/to/frames.jsonl 或 jsonl:- （标准输入）
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 输出方式
  /// 支持格式:
  /// - 控制台: console: 或 console:?quiet
  /// - JSON 报告: report:///path/to/report.json
  /// - 目录记录: folder:///path/to/dir 或 folder:///path/to/dir?always
  #[arg(long, value_name = "OUTPUT", default_value = "console:")]
  pub output: Url,

  /// 默认场景（如 kitchen），帧内自带的场景优先
  #[arg(long, value_name = "CONTEXT")]
  pub context: Option<String>,

  /// 最大处理帧数（至少为 1），不设置表示处理全部输入
  #[arg(long, value_name = "FRAME_NUMBER")]
  pub frame_number: Option<NonZeroUsize>,

  /// 最低置信度 (0.0 - 1.0)，低于该值的检测不参与分类；不设置表示不过滤
  #[arg(long, value_name = "CONFIDENCE", value_parser = parse_confidence)]
  pub min_confidence: Option<f32>,

  /// 历史记录保留的帧数
  #[arg(long, default_value = "10", value_name = "COUNT")]
  pub history: usize,

  /// 只处理第一帧
  #[arg(long)]
  pub oneshot: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let args = Args::try_parse_from(["fenjian", "--input", "json:///tmp/frames.json"]).unwrap();
    assert_eq!(args.rules.as_str(), "preset:standard");
    assert_eq!(args.output.as_str(), "console:");
    assert_eq!(args.frame_number, None);
    assert_eq!(args.min_confidence, None);
    assert_eq!(args.history, 10);
  }

  #[test]
  fn test_frame_number_must_be_positive() {
    let args = Args::try_parse_from([
      "fenjian",
      "--input",
      "json:///tmp/frames.json",
      "--frame-number",
      "0",
    ]);
    assert!(args.is_err());

    let args = Args::try_parse_from([
      "fenjian",
      "--input",
      "json:///tmp/frames.json",
      "--frame-number",
      "3",
    ])
    .unwrap();
    assert_eq!(args.frame_number, NonZeroUsize::new(3));
  }

  #[test]
  fn test_min_confidence_range() {
    let parse = |value: &str| {
      Args::try_parse_from([
        "fenjian",
        "--input",
        "json:///tmp/frames.json",
        "--min-confidence",
        value,
      ])
    };
    assert_eq!(parse("0.4").unwrap().min_confidence, Some(0.4));
    assert!(parse("1.5").is_err());
    assert!(parse("-0.1").is_err());
    assert!(parse("NaN").is_err());
  }
}
