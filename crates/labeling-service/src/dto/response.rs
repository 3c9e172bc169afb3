//! 响应 DTO 定义
//!
//! 所有 REST API 的响应体结构。
//! 规则与历史记录直接使用引擎实体的序列化形式，不做二次映射。

use chrono::{DateTime, Utc};
use labeling_engine::{Classification, Rule, StatisticsSnapshot};
use serde::Serialize;

/// 分类结果响应
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub id: String,
    pub labels: Vec<String>,
    pub matched_rules_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl From<Classification> for ClassifyResponse {
    fn from(classification: Classification) -> Self {
        Self {
            id: classification.id,
            labels: classification.labels,
            matched_rules_count: classification.matched_rule_ids.len(),
            timestamp: classification.timestamp,
        }
    }
}

/// 统计快照响应，附带生成时刻
#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    #[serde(flatten)]
    pub snapshot: StatisticsSnapshot,
    pub timestamp: DateTime<Utc>,
}

/// 规则导出响应
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub rules: Vec<Rule>,
    pub count: usize,
    pub exported_at: DateTime<Utc>,
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rules_count: usize,
    pub processed_count: usize,
}

/// 删除等操作的消息响应
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
