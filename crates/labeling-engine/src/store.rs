//! 规则存储
//!
//! 维护规则全生命周期：创建、查询、更新、删除、启停。
//! 携带条件文本的变更一律先解析后落库，解析失败不改动任何状态，
//! 因此存量规则永远可求值。

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::models::Rule;
use crate::parser::ConditionParser;

/// 新建规则参数
#[derive(Debug, Clone)]
pub struct NewRule {
    pub condition: String,
    pub label: String,
    pub enabled: bool,
    pub priority: i64,
}

impl NewRule {
    /// 默认参数：启用，优先级 1
    pub fn new(condition: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            label: label.into(),
            enabled: true,
            priority: 1,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// 更新规则参数，None 表示该字段保持原值
#[derive(Debug, Clone, Default)]
pub struct RuleUpdate {
    pub condition: Option<String>,
    pub label: Option<String>,
    pub enabled: Option<bool>,
    pub priority: Option<i64>,
}

/// 规则存储
///
/// 不含内部锁，并发控制由引擎门面统一负责。
pub struct RuleStore {
    rules: HashMap<String, Rule>,
    /// 创建顺序，同优先级同创建时间的最终决胜依据
    creation_order: Vec<String>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            creation_order: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 创建规则，条件不可解析时拒绝且不留任何痕迹
    pub fn create(&mut self, spec: NewRule) -> Result<Rule> {
        let expression = ConditionParser::parse(&spec.condition)?;

        let rule = Rule {
            id: Uuid::new_v4().to_string(),
            condition: spec.condition,
            expression,
            label: spec.label,
            enabled: spec.enabled,
            priority: spec.priority,
            created_at: Utc::now(),
            updated_at: None,
            usage_count: 0,
            last_used: None,
        };

        self.creation_order.push(rule.id.clone());
        self.rules.insert(rule.id.clone(), rule.clone());

        info!(rule_id = %rule.id, label = %rule.label, "规则已创建");
        Ok(rule)
    }

    pub fn get(&self, id: &str) -> Result<&Rule> {
        self.rules
            .get(id)
            .ok_or_else(|| EngineError::RuleNotFound(id.to_string()))
    }

    /// 更新规则。新条件文本先解析，失败时规则保持原样
    pub fn update(&mut self, id: &str, update: RuleUpdate) -> Result<Rule> {
        if !self.rules.contains_key(id) {
            warn!(rule_id = %id, "更新不存在的规则");
            return Err(EngineError::RuleNotFound(id.to_string()));
        }

        let parsed = match update.condition {
            Some(text) => Some((ConditionParser::parse(&text)?, text)),
            None => None,
        };

        let rule = self
            .rules
            .get_mut(id)
            .ok_or_else(|| EngineError::RuleNotFound(id.to_string()))?;

        if let Some((expression, text)) = parsed {
            rule.condition = text;
            rule.expression = expression;
        }
        if let Some(label) = update.label {
            rule.label = label;
        }
        if let Some(enabled) = update.enabled {
            rule.enabled = enabled;
        }
        if let Some(priority) = update.priority {
            rule.priority = priority;
        }
        rule.updated_at = Some(Utc::now());

        info!(rule_id = %id, "规则已更新");
        Ok(rule.clone())
    }

    pub fn delete(&mut self, id: &str) -> Result<Rule> {
        match self.rules.remove(id) {
            Some(rule) => {
                self.creation_order.retain(|existing| existing != id);
                info!(rule_id = %id, "规则已删除");
                Ok(rule)
            }
            None => {
                warn!(rule_id = %id, "删除不存在的规则");
                Err(EngineError::RuleNotFound(id.to_string()))
            }
        }
    }

    /// 翻转启用状态并盖更新时间戳
    pub fn toggle(&mut self, id: &str) -> Result<Rule> {
        let rule = self
            .rules
            .get_mut(id)
            .ok_or_else(|| EngineError::RuleNotFound(id.to_string()))?;

        rule.enabled = !rule.enabled;
        rule.updated_at = Some(Utc::now());

        info!(rule_id = %id, enabled = rule.enabled, "规则启停已切换");
        Ok(rule.clone())
    }

    /// 全部规则：优先级降序，同优先级按创建时间升序（稳定）
    pub fn list(&self) -> Vec<Rule> {
        self.sorted(|_| true)
    }

    /// 启用中的规则，排序与 list 一致，也是分类时的求值顺序
    pub fn enabled_rules(&self) -> Vec<Rule> {
        self.sorted(|rule| rule.enabled)
    }

    fn sorted(&self, keep: impl Fn(&Rule) -> bool) -> Vec<Rule> {
        let mut rules: Vec<Rule> = self
            .creation_order
            .iter()
            .filter_map(|id| self.rules.get(id))
            .filter(|rule| keep(rule))
            .cloned()
            .collect();

        // 稳定排序基于创建顺序的输入序列，完全同键时保持先创建者在前
        rules.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        rules
    }

    /// 记录一次规则命中
    pub fn record_match(&mut self, id: &str, at: DateTime<Utc>) {
        if let Some(rule) = self.rules.get_mut(id) {
            rule.usage_count += 1;
            rule.last_used = Some(at);
        }
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}
