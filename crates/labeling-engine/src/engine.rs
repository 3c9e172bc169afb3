//! 引擎门面
//!
//! 规则存储、处理历史和统计缓存由同一把读写锁保护。
//! 分类过程中的命中计数、历史追加和缓存重建在写锁内一次完成，
//! 读者要么看到分类前的状态，要么看到分类后的状态。
//! 锁内没有任何 await 点，全部操作都是同步计算。

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::error::Result;
use crate::history::{DEFAULT_CAPACITY, History, HistoryFilter};
use crate::models::{Classification, ProcessedEntry, Rule};
use crate::pipeline;
use crate::stats::{
    RuleAnalytics, StatisticsAggregator, StatisticsSnapshot, StatsCache, TimelineBucket,
};
use crate::store::{NewRule, RuleStore, RuleUpdate};

/// 批量导入的单条规则，字段全部可缺省
#[derive(Debug, Clone, Deserialize)]
pub struct RuleImport {
    pub condition: Option<String>,
    pub label: Option<String>,
    pub enabled: Option<bool>,
    pub priority: Option<i64>,
}

/// 批量导入结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub imported_count: usize,
    pub skipped_count: usize,
}

struct EngineState {
    store: RuleStore,
    history: History,
    cache: StatsCache,
}

/// 打标引擎
pub struct LabelingEngine {
    state: RwLock<EngineState>,
}

impl LabelingEngine {
    /// 创建引擎，history_capacity 为处理历史的容量上限
    pub fn new(history_capacity: usize) -> Self {
        Self {
            state: RwLock::new(EngineState {
                store: RuleStore::new(),
                history: History::new(history_capacity),
                cache: StatsCache::default(),
            }),
        }
    }

    pub fn create_rule(&self, spec: NewRule) -> Result<Rule> {
        self.state.write().store.create(spec)
    }

    pub fn list_rules(&self) -> Vec<Rule> {
        self.state.read().store.list()
    }

    pub fn get_rule(&self, id: &str) -> Result<Rule> {
        self.state.read().store.get(id).cloned()
    }

    pub fn update_rule(&self, id: &str, update: RuleUpdate) -> Result<Rule> {
        self.state.write().store.update(id, update)
    }

    /// 删除规则并重建统计缓存
    pub fn delete_rule(&self, id: &str) -> Result<Rule> {
        let mut guard = self.state.write();
        let rule = guard.store.delete(id)?;
        guard.cache = StatsCache::recompute(&guard.history, Utc::now());
        Ok(rule)
    }

    /// 启停规则并重建统计缓存
    pub fn toggle_rule(&self, id: &str) -> Result<Rule> {
        let mut guard = self.state.write();
        let rule = guard.store.toggle(id)?;
        guard.cache = StatsCache::recompute(&guard.history, Utc::now());
        Ok(rule)
    }

    /// 对单个载荷执行分类。
    /// 命中计数、历史追加和缓存重建在同一次写锁内完成。
    pub fn classify(&self, raw_payload: JsonValue) -> Result<Classification> {
        let now = Utc::now();
        let mut guard = self.state.write();
        let state = &mut *guard;
        let classification =
            pipeline::classify(&mut state.store, &mut state.history, raw_payload, now)?;
        state.cache = StatsCache::recompute(&state.history, now);
        Ok(classification)
    }

    /// 按过滤条件查询处理历史，最近的在前
    pub fn query_history(&self, filter: &HistoryFilter, limit: usize) -> Vec<ProcessedEntry> {
        self.state.read().history.query(filter, limit)
    }

    pub fn statistics(&self, filter: &HistoryFilter) -> StatisticsSnapshot {
        let guard = self.state.read();
        StatisticsAggregator::snapshot(&guard.store, &guard.history, filter, Utc::now())
    }

    pub fn timeline(&self, hours: i64) -> Vec<TimelineBucket> {
        StatisticsAggregator::timeline(&self.state.read().history, hours, Utc::now())
    }

    pub fn rule_analytics(&self) -> Vec<RuleAnalytics> {
        StatisticsAggregator::rule_analytics(&self.state.read().store)
    }

    /// 导出全部规则，条件以原始文本形式给出
    pub fn export_rules(&self) -> Vec<Rule> {
        self.state.read().store.list()
    }

    /// 批量导入规则。
    /// 每条分配新 id，enabled 缺省为 true，priority 缺省为 1；
    /// 缺少必填字段或条件无法解析的条目跳过，不中断整个导入。
    pub fn import_rules(&self, entries: Vec<RuleImport>) -> ImportOutcome {
        let mut guard = self.state.write();
        let mut outcome = ImportOutcome {
            imported_count: 0,
            skipped_count: 0,
        };
        for entry in entries {
            let (Some(condition), Some(label)) = (entry.condition, entry.label) else {
                warn!("导入条目缺少 condition 或 label，跳过");
                outcome.skipped_count += 1;
                continue;
            };
            let spec = NewRule::new(condition, label)
                .with_enabled(entry.enabled.unwrap_or(true))
                .with_priority(entry.priority.unwrap_or(1));
            match guard.store.create(spec) {
                Ok(_) => outcome.imported_count += 1,
                Err(e) => {
                    warn!(error = %e, "导入条目条件解析失败，跳过");
                    outcome.skipped_count += 1;
                }
            }
        }
        info!(
            imported = outcome.imported_count,
            skipped = outcome.skipped_count,
            "规则导入完成"
        );
        outcome
    }

    /// 规则数与历史记录数，供健康检查使用
    pub fn counts(&self) -> (usize, usize) {
        let guard = self.state.read();
        (guard.store.len(), guard.history.len())
    }

    /// 内部统计缓存的当前值
    pub fn cache_snapshot(&self) -> StatsCache {
        self.state.read().cache.clone()
    }

    /// 写入三条演示规则，供本地联调使用
    pub fn seed_demo_rules(&self) -> Result<()> {
        let mut guard = self.state.write();
        let samples = [
            ("Product = \"Chocolate\" AND Price < 2", "Green", 1),
            (
                "Product = \"Chocolate\" AND Price >= 2 AND Price < 5",
                "Yellow",
                1,
            ),
            ("MOQ < 100", "HighPriority", 2),
        ];
        for (condition, label, priority) in samples {
            guard
                .store
                .create(NewRule::new(condition, label).with_priority(priority))?;
        }
        info!(count = samples.len(), "演示规则已写入");
        Ok(())
    }
}

impl Default for LabelingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_create_and_classify() {
        let engine = LabelingEngine::default();
        engine
            .create_rule(NewRule::new("score >= 90", "Excellent"))
            .unwrap();

        let classification = engine.classify(json!({"score": 95})).unwrap();
        assert_eq!(classification.labels, vec!["Excellent"]);
        assert_eq!(classification.matched_rule_ids.len(), 1);

        let (rules, processed) = engine.counts();
        assert_eq!(rules, 1);
        assert_eq!(processed, 1);
    }

    #[test]
    fn test_classify_rejects_empty_payload() {
        let engine = LabelingEngine::default();
        let err = engine.classify(json!({})).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPayload(_)));
        let (_, processed) = engine.counts();
        assert_eq!(processed, 0);
    }

    #[test]
    fn test_toggle_affects_classification() {
        let engine = LabelingEngine::default();
        let rule = engine.create_rule(NewRule::new("x = 1", "Hit")).unwrap();

        let first = engine.classify(json!({"x": 1})).unwrap();
        assert_eq!(first.labels, vec!["Hit"]);

        engine.toggle_rule(&rule.id).unwrap();
        let second = engine.classify(json!({"x": 1})).unwrap();
        assert!(second.labels.is_empty());
    }

    #[test]
    fn test_cache_matches_full_recompute() {
        let engine = LabelingEngine::default();
        engine.create_rule(NewRule::new("kind = \"a\"", "A")).unwrap();

        engine.classify(json!({"kind": "a"})).unwrap();
        engine.classify(json!({"kind": "b"})).unwrap();
        engine.classify(json!({"kind": "a"})).unwrap();

        let cache = engine.cache_snapshot();
        assert_eq!(cache.total_processed, 3);
        assert_eq!(cache.labeled_count, 2);
        assert_eq!(cache.unlabeled_count, 1);
        assert_eq!(cache.label_counts["A"], 2);
        assert_eq!(cache.rate_24h, 3);
    }

    #[test]
    fn test_cache_rebuilt_on_delete_and_toggle() {
        let engine = LabelingEngine::default();
        let rule = engine.create_rule(NewRule::new("x = 1", "Hit")).unwrap();
        engine.classify(json!({"x": 1})).unwrap();

        let before = engine.cache_snapshot();
        engine.toggle_rule(&rule.id).unwrap();
        // 历史未变，重建后的缓存内容与重建前一致
        assert_eq!(engine.cache_snapshot(), before);

        engine.delete_rule(&rule.id).unwrap();
        assert_eq!(engine.cache_snapshot(), before);
    }

    #[test]
    fn test_import_skips_bad_entries() {
        let engine = LabelingEngine::default();
        let entries = vec![
            RuleImport {
                condition: Some("a = 1".to_string()),
                label: Some("One".to_string()),
                enabled: None,
                priority: None,
            },
            RuleImport {
                condition: None,
                label: Some("NoCondition".to_string()),
                enabled: None,
                priority: None,
            },
            RuleImport {
                condition: Some("no operator here".to_string()),
                label: Some("Broken".to_string()),
                enabled: None,
                priority: None,
            },
            RuleImport {
                condition: Some("b >= 2".to_string()),
                label: Some("Two".to_string()),
                enabled: Some(false),
                priority: Some(9),
            },
        ];

        let outcome = engine.import_rules(entries);
        assert_eq!(outcome.imported_count, 2);
        assert_eq!(outcome.skipped_count, 2);

        let rules = engine.list_rules();
        assert_eq!(rules.len(), 2);
        // 导入缺省值：enabled true、priority 1；显式给定的保留
        let two = rules.iter().find(|r| r.label == "Two").unwrap();
        assert!(!two.enabled);
        assert_eq!(two.priority, 9);
        let one = rules.iter().find(|r| r.label == "One").unwrap();
        assert!(one.enabled);
        assert_eq!(one.priority, 1);
    }

    #[test]
    fn test_export_returns_raw_condition_text() {
        let engine = LabelingEngine::default();
        engine
            .create_rule(NewRule::new("Price >= '10'", "Expensive"))
            .unwrap();

        let exported = engine.export_rules();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].condition, "Price >= '10'");
    }

    #[test]
    fn test_seed_demo_rules() {
        let engine = LabelingEngine::default();
        engine.seed_demo_rules().unwrap();

        let rules = engine.list_rules();
        assert_eq!(rules.len(), 3);
        // MOQ 规则优先级最高，排在最前
        assert_eq!(rules[0].label, "HighPriority");

        let classification = engine
            .classify(json!({"Product": "Chocolate", "Price": 1.5}))
            .unwrap();
        assert_eq!(classification.labels, vec!["Green"]);
    }

    #[test]
    fn test_concurrent_classify() {
        let engine = Arc::new(LabelingEngine::default());
        engine.create_rule(NewRule::new("n >= 0", "Seen")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    for j in 0..25 {
                        engine.classify(json!({"n": i * 25 + j})).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let (_, processed) = engine.counts();
        assert_eq!(processed, 200);
        let cache = engine.cache_snapshot();
        assert_eq!(cache.total_processed, 200);
        assert_eq!(cache.labeled_count, 200);
    }

    #[test]
    fn test_get_rule_not_found() {
        let engine = LabelingEngine::default();
        let err = engine.get_rule("missing").unwrap_err();
        assert!(matches!(err, EngineError::RuleNotFound(_)));
    }
}
