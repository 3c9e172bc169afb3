//! 请求 DTO 定义
//!
//! 所有 REST API 的请求参数和请求体结构

use chrono::{DateTime, Utc};
use labeling_engine::RuleImport;
use serde::Deserialize;
use validator::Validate;

/// 创建规则请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRuleRequest {
    #[validate(length(min = 1, message = "condition 不能为空"))]
    pub condition: String,
    #[validate(length(min = 1, message = "label 不能为空"))]
    pub label: String,
    pub enabled: Option<bool>,
    pub priority: Option<i64>,
}

/// 更新规则请求，字段均可缺省
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRuleRequest {
    #[validate(length(min = 1, message = "condition 不能为空"))]
    pub condition: Option<String>,
    #[validate(length(min = 1, message = "label 不能为空"))]
    pub label: Option<String>,
    pub enabled: Option<bool>,
    pub priority: Option<i64>,
}

/// 处理历史查询参数
#[derive(Debug, Deserialize, Validate)]
pub struct HistoryQuery {
    #[validate(range(min = 1, max = 1000, message = "limit 必须在 1-1000 之间"))]
    pub limit: Option<usize>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub label: Option<String>,
}

/// 统计查询参数
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub label: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// 时间线查询参数
#[derive(Debug, Deserialize, Validate)]
pub struct TimelineQuery {
    #[validate(range(min = 1, max = 8760, message = "hours 必须在 1-8760 之间"))]
    pub hours: Option<i64>,
}

/// 批量导入规则请求
#[derive(Debug, Deserialize)]
pub struct ImportRulesRequest {
    pub rules: Vec<RuleImport>,
}
