//! 核心数据模型
//!
//! 解析后的条件表达式、规则实体、分类载荷与处理历史记录。

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::{EngineError, Result};
use crate::operators::Operator;
use crate::value::Value;

/// 单个比较条件：`字段 操作符 操作数`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

/// AND 组：组内所有条件同时成立该组才成立
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionGroup {
    pub conditions: Vec<Condition>,
}

impl ConditionGroup {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }
}

impl fmt::Display for ConditionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.conditions.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(" AND "))
    }
}

/// OR 表达式：任一组成立整个表达式即成立。
/// 文法是扁平的两层结构，没有括号嵌套。
#[derive(Debug, Clone, PartialEq)]
pub struct RuleExpression {
    pub groups: Vec<ConditionGroup>,
}

impl RuleExpression {
    pub fn new(groups: Vec<ConditionGroup>) -> Self {
        Self { groups }
    }
}

impl fmt::Display for RuleExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.groups.iter().map(|g| g.to_string()).collect();
        write!(f, "{}", parts.join(" OR "))
    }
}

/// 标注规则
#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    pub id: String,
    /// 原始条件文本，导出和展示都使用该形式
    pub condition: String,
    /// 缓存的解析结果，条件变更时由存储重建
    #[serde(skip)]
    pub expression: RuleExpression,
    pub label: String,
    pub enabled: bool,
    pub priority: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub usage_count: u64,
    pub last_used: Option<DateTime<Utc>>,
}

/// 分类输入载荷
///
/// 只接受非空 JSON 对象，字段按顶层键查找，不做路径展开。
#[derive(Debug, Clone)]
pub struct Payload {
    raw: JsonValue,
}

impl Payload {
    pub fn from_json(raw: JsonValue) -> Result<Self> {
        match raw.as_object() {
            Some(map) if !map.is_empty() => Ok(Self { raw }),
            Some(_) => Err(EngineError::InvalidPayload("载荷不能为空对象".to_string())),
            None => Err(EngineError::InvalidPayload(
                "载荷必须是 JSON 对象".to_string(),
            )),
        }
    }

    /// 取字段并转换为类型化值，字段不存在返回 Absent
    pub fn field(&self, key: &str) -> Value {
        self.raw
            .get(key)
            .map(Value::from_json)
            .unwrap_or(Value::Absent)
    }

    pub fn as_json(&self) -> &JsonValue {
        &self.raw
    }

    pub fn into_inner(self) -> JsonValue {
        self.raw
    }
}

/// 一次处理写入历史的记录
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedEntry {
    pub id: String,
    pub payload: JsonValue,
    /// 按规则求值顺序追加，两条规则产出同名标签时保留重复
    pub labels: Vec<String>,
    pub matched_rule_ids: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// 分类结果
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub id: String,
    pub labels: Vec<String>,
    pub matched_rule_ids: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
