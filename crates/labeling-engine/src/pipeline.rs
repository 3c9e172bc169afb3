//! 分类管线
//!
//! 把一个载荷走完整个分类流程：校验、按优先级求值启用规则、
//! 追加标签并记录规则命中，最后写入处理历史。
//! 单条规则求值失败只跳过该规则，不中断整个载荷。

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::evaluator::RuleEvaluator;
use crate::history::History;
use crate::models::{Classification, Payload, ProcessedEntry};
use crate::store::RuleStore;

/// 对单个载荷执行一次分类
pub fn classify(
    store: &mut RuleStore,
    history: &mut History,
    raw_payload: JsonValue,
    now: DateTime<Utc>,
) -> Result<Classification> {
    let payload = Payload::from_json(raw_payload)?;

    let mut labels = Vec::new();
    let mut matched_rule_ids = Vec::new();

    for rule in store.enabled_rules() {
        match RuleEvaluator::evaluate(&rule.expression, &payload) {
            Ok(true) => {
                labels.push(rule.label.clone());
                matched_rule_ids.push(rule.id.clone());
                store.record_match(&rule.id, now);
            }
            Ok(false) => {}
            Err(e) => {
                warn!(rule_id = %rule.id, error = %e, "规则求值失败，跳过该规则");
            }
        }
    }

    let entry = ProcessedEntry {
        id: Uuid::new_v4().to_string(),
        payload: payload.into_inner(),
        labels: labels.clone(),
        matched_rule_ids: matched_rule_ids.clone(),
        timestamp: now,
    };
    let id = entry.id.clone();
    history.push(entry);

    debug!(entry_id = %id, matched = matched_rule_ids.len(), "载荷分类完成");

    Ok(Classification {
        id,
        labels,
        matched_rule_ids,
        timestamp: now,
    })
}
