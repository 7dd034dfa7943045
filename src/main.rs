// 该文件是 Fenjian （分拣） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use fenjian::{
  FromUrl, RuleTable, WasteClassifier,
  input::InputWrapper,
  model::FrameClassifier,
  output::OutputWrapper,
  task::{ContinuousTask, OneShotTask, Task},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("规则表: {}", args.rules);
  info!("输入来源: {}", args.input);
  info!("输出方式: {}", args.output);
  if let Some(context) = &args.context {
    info!("默认场景: {}", context);
  }

  let table = RuleTable::from_url(&args.rules)?;
  info!("规则表加载完成，共 {} 条规则", table.rules().len());

  let input = InputWrapper::from_url(&args.input)?;
  if let Some(min_confidence) = args.min_confidence {
    info!("最低置信度: {:.2}", min_confidence);
  }
  let model = FrameClassifier::new(WasteClassifier::new(table))
    .with_default_context(args.context)
    .with_min_confidence(args.min_confidence);
  let output = OutputWrapper::from_url(&args.output)?;

  if args.oneshot {
    let result = OneShotTask.run_task(input, model, output)?;
    info!("单帧分类完成，共 {} 个目标", result.results.len());
  } else {
    let history = ContinuousTask::default()
      .with_frame_number(args.frame_number)
      .with_history_capacity(args.history)
      .run_task(input, model, output)?;
    info!("已处理帧数: {}", history.total_recorded());
  }

  Ok(())
}
