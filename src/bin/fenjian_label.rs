// 该文件是 Fenjian （分拣） 项目的一部分。
// src/bin/fenjian_label.rs - 单个标签分类
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use fenjian::{FromUrl, RuleTable, WasteClassifier};
use tracing::info;

/// 对单个检测标签进行分类
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 检测标签，例如 "banana peel"
  #[arg(long, value_name = "LABEL")]
  pub label: String,
  /// 置信度 (0.0 - 1.0)
  #[arg(long, default_value = "1.0", value_name = "CONFIDENCE")]
  pub confidence: f32,
  /// 场景，例如 kitchen
  #[arg(long, value_name = "CONTEXT")]
  pub context: Option<String>,
  /// 分类规则表
  #[arg(long, value_name = "RULES", default_value = "preset:standard")]
  pub rules: Url,
  /// 以 JSON 格式输出
  #[arg(long)]
  pub json: bool,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("规则表: {}", args.rules);
  let classifier = WasteClassifier::new(RuleTable::from_url(&args.rules)?);
  let result = classifier.classify(&args.label, args.confidence, args.context.as_deref())?;

  if args.json {
    println!("{}", serde_json::to_string_pretty(&result)?);
  } else {
    println!("标签: {}", result.label);
    println!("置信度: {:.2}", result.confidence);
    println!("类别: {}", result.category);
    println!("垃圾桶: {}", result.bin);
    println!("处理方式: {}", result.instruction);
  }

  Ok(())
}
