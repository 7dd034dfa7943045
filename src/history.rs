// 该文件是 Fenjian （分拣） 项目的一部分。
// src/history.rs - 检测历史记录
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

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{classify::Category, model::ClassifiedFrame};

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
  pub id: u64,
  pub timestamp: DateTime<Utc>,
  pub frame: ClassifiedFrame,
}

/// 定长历史记录，新记录在前，超出容量时丢弃最旧的记录。
///
/// 由调用方（任务）持有，分类器本身不保存任何状态。
#[derive(Debug, Clone)]
pub struct DetectionHistory {
  capacity: usize,
  next_id: u64,
  records: VecDeque<HistoryRecord>,
}

impl Default for DetectionHistory {
  fn default() -> Self {
    DetectionHistory::with_capacity(DEFAULT_HISTORY_CAPACITY)
  }
}

impl DetectionHistory {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      capacity,
      next_id: 1,
      records: VecDeque::with_capacity(capacity),
    }
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// 已记录的帧总数（包括已被淘汰的）
  pub fn total_recorded(&self) -> u64 {
    self.next_id - 1
  }

  pub fn record(&mut self, frame: ClassifiedFrame) -> u64 {
    self.record_at(frame, Utc::now())
  }

  pub fn record_at(&mut self, frame: ClassifiedFrame, timestamp: DateTime<Utc>) -> u64 {
    let id = self.next_id;
    self.next_id += 1;

    if self.capacity == 0 {
      return id;
    }

    self.records.push_front(HistoryRecord {
      id,
      timestamp,
      frame,
    });
    self.records.truncate(self.capacity);
    id
  }

  pub fn latest(&self) -> Option<&HistoryRecord> {
    self.records.front()
  }

  /// 从新到旧遍历
  pub fn iter(&self) -> impl Iterator<Item = &HistoryRecord> {
    self.records.iter()
  }

  /// 统计保留记录中各类别的数量
  pub fn category_counts(&self) -> BTreeMap<Category, usize> {
    let mut counts = BTreeMap::new();
    for record in &self.records {
      for result in &record.frame.results {
        *counts.entry(result.category).or_insert(0) += 1;
      }
    }
    counts
  }

  pub fn clear(&mut self) {
    self.records.clear();
  }
}
