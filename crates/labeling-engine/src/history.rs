//! 处理历史
//!
//! 固定容量的先进先出队列，容量满时写入会淘汰最旧记录。
//! 淘汰与写入发生在同一次调用内，由引擎门面的写锁保证原子。

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::models::ProcessedEntry;

/// 默认保留的历史记录条数
pub const DEFAULT_CAPACITY: usize = 1000;

/// 历史查询过滤条件，时间区间两端都是闭区间
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub label: Option<String>,
}

impl HistoryFilter {
    pub fn matches(&self, entry: &ProcessedEntry) -> bool {
        if let Some(from) = self.from
            && entry.timestamp < from
        {
            return false;
        }
        if let Some(to) = self.to
            && entry.timestamp > to
        {
            return false;
        }
        if let Some(label) = &self.label
            && !entry.labels.iter().any(|l| l == label)
        {
            return false;
        }
        true
    }
}

/// 有界处理历史
pub struct History {
    entries: VecDeque<ProcessedEntry>,
    capacity: usize,
}

impl History {
    /// 容量至少为 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 追加记录，容量满时先淘汰最旧的一条
    pub fn push(&mut self, entry: ProcessedEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// 从旧到新遍历
    pub fn iter(&self) -> impl Iterator<Item = &ProcessedEntry> {
        self.entries.iter()
    }

    /// 从新到旧遍历
    pub fn iter_recent(&self) -> impl Iterator<Item = &ProcessedEntry> {
        self.entries.iter().rev()
    }

    /// 过滤查询，最近的记录在前
    pub fn query(&self, filter: &HistoryFilter, limit: usize) -> Vec<ProcessedEntry> {
        self.iter_recent()
            .filter(|entry| filter.matches(entry))
            .take(limit)
            .cloned()
            .collect()
    }
}
