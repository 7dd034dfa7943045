// 该文件是 Fenjian （分拣） 项目的一部分。
// src/task.rs - 分类任务
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

use std::{num::NonZeroUsize, sync::mpsc::Receiver, thread, time::Duration};
use tracing::{info, warn};

use crate::{
  history::{DEFAULT_HISTORY_CAPACITY, DetectionHistory},
  model::{ClassifiedFrame, Model},
  output::Render,
};

const FORCE_EXIT_DELAY: Duration = Duration::from_secs(30);

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

/// 只处理第一帧
pub struct OneShotTask;

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Output = D;
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始分类...");
    let now = std::time::Instant::now();
    let result = model.infer(&frame)?;
    info!("分类完成，耗时: {:.2?}", now.elapsed());
    output.render_result(&frame, &result)?;
    info!("输出完成，耗时: {:.2?}", now.elapsed());

    Ok(result)
  }
}

/// 持续处理输入直到耗尽、达到指定帧数或收到中断信号，
/// 每帧结果写入定长历史记录。
#[derive(Debug)]
pub struct ContinuousTask {
  frame_number: Option<NonZeroUsize>,
  history_capacity: usize,
  handle_interrupt: bool,
}

impl Default for ContinuousTask {
  fn default() -> Self {
    Self {
      frame_number: None,
      history_capacity: DEFAULT_HISTORY_CAPACITY,
      handle_interrupt: true,
    }
  }
}

impl ContinuousTask {
  pub fn with_frame_number(mut self, frame_number: Option<NonZeroUsize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  pub fn with_history_capacity(mut self, capacity: usize) -> Self {
    self.history_capacity = capacity;
    self
  }

  /// 是否注册 Ctrl-C 处理函数（每个进程只能注册一次）
  pub fn with_interrupt_handler(mut self, enabled: bool) -> Self {
    self.handle_interrupt = enabled;
    self
  }

  fn install_interrupt_handler() -> anyhow::Result<Receiver<()>> {
    let (tx, rx) = std::sync::mpsc::channel();

    ctrlc::set_handler(move || {
      info!("收到中断信号，准备退出...");
      let _ = tx.send(());
      thread::spawn(|| {
        thread::sleep(FORCE_EXIT_DELAY);
        warn!("强制退出程序");
        std::process::exit(1);
      });
    })?;

    Ok(rx)
  }
}

impl<
  F,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = ClassifiedFrame, Error = ME>,
  O: Render<F, ClassifiedFrame, Error = RE>,
> Task<I, M, O> for ContinuousTask
{
  type Output = DetectionHistory;
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let interrupt = if self.handle_interrupt {
      Some(Self::install_interrupt_handler()?)
    } else {
      None
    };

    let mut history = DetectionHistory::with_capacity(self.history_capacity);
    let mut frame_index = 0usize;
    let mut total_items = 0usize;
    let mut now = std::time::Instant::now();
    for frame in input {
      frame_index = frame_index.saturating_add(1);
      info!("处理第 {} 帧检测结果", frame_index);
      let result = model.infer(&frame)?;
      let elapsed_a = now.elapsed();
      output.render_result(&frame, &result)?;
      let elapsed_b = now.elapsed();
      now = std::time::Instant::now();
      info!("分类完成，耗时: {:.2?} / {:.2?}", elapsed_a, elapsed_b);

      total_items += result.results.len();
      history.record(result);

      if self.frame_number.is_some_and(|n| frame_index >= n.get()) {
        info!("达到指定帧数 {}, 退出任务循环", frame_index);
        break;
      }
      if interrupt.as_ref().is_some_and(|rx| rx.try_recv().is_ok()) {
        warn!("中断信号接收，退出任务循环");
        break;
      }
    }

    info!("共处理 {} 帧，{} 个目标", frame_index, total_items);
    for (category, count) in history.category_counts() {
      info!("  最近 {} 帧中 {}: {}", history.len(), category, count);
    }
    info!("任务完成，退出");
    Ok(history)
  }
}
