//! 统计聚合
//!
//! 所有统计量都从处理历史与规则存储推导，任何时刻都可以整体重建。
//! 快照在读锁下计算，不会观察到写到一半的状态。

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::Serialize;

use crate::history::{History, HistoryFilter};
use crate::models::ProcessedEntry;
use crate::store::RuleStore;

/// 单标签计数，percentage 为占 total_processed 的百分比
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelStat {
    pub label: String,
    pub count: u64,
    pub percentage: f64,
}

/// 滚动窗口处理速率，窗口以查询时刻为锚点
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProcessingRates {
    pub last_hour: u64,
    pub last_24_hours: u64,
    pub last_7_days: u64,
}

/// 打标成功率，空标签列表视为未打标
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SuccessRate {
    pub labeled_count: u64,
    pub unlabeled_count: u64,
    pub percentage: f64,
}

/// 启用规则的命中效果，按标签聚合
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleEffectiveness {
    pub usage_count: u64,
    pub last_used: Option<DateTime<Utc>>,
    pub condition: String,
}

/// 统计快照
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsSnapshot {
    pub total_processed: u64,
    pub label_breakdown: Vec<LabelStat>,
    pub processing_rates: ProcessingRates,
    pub success_rate: SuccessRate,
    pub rule_effectiveness: BTreeMap<String, RuleEffectiveness>,
}

/// 时间线上的单个小时桶
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineBucket {
    /// 形如 `2024-01-15 10:00` 的 UTC 小时键
    pub hour: String,
    pub processed: u64,
    pub labeled: u64,
    pub labels: BTreeMap<String, u64>,
}

/// 单条规则的命中分析
#[derive(Debug, Clone, Serialize)]
pub struct RuleAnalytics {
    pub rule_id: String,
    pub label: String,
    pub condition: String,
    pub priority: i64,
    pub enabled: bool,
    pub total_matches: u64,
    pub last_used: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// 百分比统一保留两位小数，总量为零时返回 0
fn round_percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = part as f64 * 100.0 / total as f64;
    (raw * 100.0).round() / 100.0
}

pub struct StatisticsAggregator;

impl StatisticsAggregator {
    /// 统计快照。
    /// from/to 只作用于计数、标签分布和成功率；
    /// 滚动速率以 now 为锚点忽略时间过滤，label 过滤仍然生效。
    pub fn snapshot(
        store: &RuleStore,
        history: &History,
        filter: &HistoryFilter,
        now: DateTime<Utc>,
    ) -> StatisticsSnapshot {
        let filtered: Vec<&ProcessedEntry> =
            history.iter().filter(|entry| filter.matches(entry)).collect();

        let total_processed = filtered.len() as u64;
        let label_breakdown = Self::label_breakdown(&filtered, total_processed);
        let success_rate = Self::success_rate(&filtered);

        let rate_filter = HistoryFilter {
            label: filter.label.clone(),
            ..HistoryFilter::default()
        };
        let rate_entries: Vec<&ProcessedEntry> = history
            .iter()
            .filter(|entry| rate_filter.matches(entry))
            .collect();
        let processing_rates = Self::processing_rates(&rate_entries, now);

        StatisticsSnapshot {
            total_processed,
            label_breakdown,
            processing_rates,
            success_rate,
            rule_effectiveness: Self::rule_effectiveness(store),
        }
    }

    /// 标签分布：一条记录中的重复标签按出现次数计。
    /// 次数降序，同次数按标签字典序，保证输出稳定。
    fn label_breakdown(entries: &[&ProcessedEntry], total: u64) -> Vec<LabelStat> {
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for entry in entries {
            for label in &entry.labels {
                *counts.entry(label.as_str()).or_insert(0) += 1;
            }
        }

        let mut breakdown: Vec<LabelStat> = counts
            .into_iter()
            .map(|(label, count)| LabelStat {
                label: label.to_string(),
                count,
                percentage: round_percentage(count, total),
            })
            .collect();
        breakdown.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        breakdown
    }

    fn success_rate(entries: &[&ProcessedEntry]) -> SuccessRate {
        let total = entries.len() as u64;
        let labeled = entries.iter().filter(|e| !e.labels.is_empty()).count() as u64;
        SuccessRate {
            labeled_count: labeled,
            unlabeled_count: total - labeled,
            percentage: round_percentage(labeled, total),
        }
    }

    fn processing_rates(entries: &[&ProcessedEntry], now: DateTime<Utc>) -> ProcessingRates {
        let hour_ago = now - Duration::hours(1);
        let day_ago = now - Duration::hours(24);
        let week_ago = now - Duration::days(7);

        let mut rates = ProcessingRates {
            last_hour: 0,
            last_24_hours: 0,
            last_7_days: 0,
        };
        for entry in entries {
            if entry.timestamp < week_ago {
                continue;
            }
            rates.last_7_days += 1;
            if entry.timestamp >= day_ago {
                rates.last_24_hours += 1;
            }
            if entry.timestamp >= hour_ago {
                rates.last_hour += 1;
            }
        }
        rates
    }

    /// 按标签聚合启用规则的命中情况。
    /// 遍历顺序与 list 一致，两条启用规则共用标签时后遍历到的覆盖前者。
    fn rule_effectiveness(store: &RuleStore) -> BTreeMap<String, RuleEffectiveness> {
        let mut effectiveness = BTreeMap::new();
        for rule in store.enabled_rules() {
            effectiveness.insert(
                rule.label.clone(),
                RuleEffectiveness {
                    usage_count: rule.usage_count,
                    last_used: rule.last_used,
                    condition: rule.condition.clone(),
                },
            );
        }
        effectiveness
    }

    /// 最近 N 小时的小时桶序列，升序排列。
    /// 整个窗口零填充，包含当前未结束的小时。
    pub fn timeline(history: &History, hours: i64, now: DateTime<Utc>) -> Vec<TimelineBucket> {
        let current_hour = now.duration_trunc(Duration::hours(1)).unwrap_or(now);
        let window_hours = hours.max(1);
        let window_start = current_hour - Duration::hours(window_hours - 1);

        let mut buckets: BTreeMap<String, TimelineBucket> = BTreeMap::new();
        for offset in 0..window_hours {
            let key = (window_start + Duration::hours(offset))
                .format("%Y-%m-%d %H:00")
                .to_string();
            buckets.insert(
                key.clone(),
                TimelineBucket {
                    hour: key,
                    processed: 0,
                    labeled: 0,
                    labels: BTreeMap::new(),
                },
            );
        }

        for entry in history.iter() {
            if entry.timestamp < window_start || entry.timestamp > now {
                continue;
            }
            let key = entry.timestamp.format("%Y-%m-%d %H:00").to_string();
            if let Some(bucket) = buckets.get_mut(&key) {
                bucket.processed += 1;
                if !entry.labels.is_empty() {
                    bucket.labeled += 1;
                }
                for label in &entry.labels {
                    *bucket.labels.entry(label.clone()).or_insert(0) += 1;
                }
            }
        }

        // 键是零填充的时间字符串，字典序即时间序
        buckets.into_values().collect()
    }

    /// 所有规则按累计命中次数降序，同次数按创建时间升序
    pub fn rule_analytics(store: &RuleStore) -> Vec<RuleAnalytics> {
        let mut analytics: Vec<RuleAnalytics> = store
            .list()
            .into_iter()
            .map(|rule| RuleAnalytics {
                rule_id: rule.id,
                label: rule.label,
                condition: rule.condition,
                priority: rule.priority,
                enabled: rule.enabled,
                total_matches: rule.usage_count,
                last_used: rule.last_used,
                created_at: rule.created_at,
            })
            .collect();
        analytics.sort_by(|a, b| {
            b.total_matches
                .cmp(&a.total_matches)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        analytics
    }
}

/// 轻量统计缓存
///
/// 每次分类以及删除、启停规则后整体重建。只服务内部快速读取，
/// 不暴露为对外接口，内容必须始终与全量重算一致。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsCache {
    pub total_processed: u64,
    pub label_counts: BTreeMap<String, u64>,
    pub rate_24h: u64,
    pub labeled_count: u64,
    pub unlabeled_count: u64,
}

impl StatsCache {
    pub fn recompute(history: &History, now: DateTime<Utc>) -> Self {
        let day_ago = now - Duration::hours(24);
        let mut cache = StatsCache::default();
        for entry in history.iter() {
            cache.total_processed += 1;
            if entry.timestamp >= day_ago {
                cache.rate_24h += 1;
            }
            if entry.labels.is_empty() {
                cache.unlabeled_count += 1;
            } else {
                cache.labeled_count += 1;
            }
            for label in &entry.labels {
                *cache.label_counts.entry(label.clone()).or_insert(0) += 1;
            }
        }
        cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewRule;
    use serde_json::json;

    fn entry(labels: &[&str], timestamp: DateTime<Utc>) -> ProcessedEntry {
        ProcessedEntry {
            id: uuid::Uuid::new_v4().to_string(),
            payload: json!({"x": 1}),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            matched_rule_ids: Vec::new(),
            timestamp,
        }
    }

    fn history_with(entries: Vec<ProcessedEntry>) -> History {
        let mut history = History::new(1000);
        for e in entries {
            history.push(e);
        }
        history
    }

    #[test]
    fn test_label_breakdown_counts_and_percentages() {
        let now = Utc::now();
        let history = history_with(vec![
            entry(&["A"], now),
            entry(&["A", "B"], now),
            entry(&[], now),
        ]);
        let store = RuleStore::new();

        let snapshot =
            StatisticsAggregator::snapshot(&store, &history, &HistoryFilter::default(), now);

        assert_eq!(snapshot.total_processed, 3);
        assert_eq!(snapshot.label_breakdown.len(), 2);
        assert_eq!(snapshot.label_breakdown[0].label, "A");
        assert_eq!(snapshot.label_breakdown[0].count, 2);
        assert_eq!(snapshot.label_breakdown[0].percentage, 66.67);
        assert_eq!(snapshot.label_breakdown[1].label, "B");
        assert_eq!(snapshot.label_breakdown[1].count, 1);
        assert_eq!(snapshot.label_breakdown[1].percentage, 33.33);

        assert_eq!(snapshot.success_rate.labeled_count, 2);
        assert_eq!(snapshot.success_rate.unlabeled_count, 1);
        assert_eq!(snapshot.success_rate.percentage, 66.67);
    }

    #[test]
    fn test_breakdown_sorted_by_count_then_label() {
        let now = Utc::now();
        let history = history_with(vec![
            entry(&["B"], now),
            entry(&["A"], now),
            entry(&["C", "C"], now),
        ]);
        let store = RuleStore::new();

        let snapshot =
            StatisticsAggregator::snapshot(&store, &history, &HistoryFilter::default(), now);
        let labels: Vec<&str> = snapshot
            .label_breakdown
            .iter()
            .map(|s| s.label.as_str())
            .collect();
        // C 出现两次排最前，A 和 B 同为一次按字典序
        assert_eq!(labels, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_empty_history_snapshot() {
        let now = Utc::now();
        let history = History::new(10);
        let store = RuleStore::new();

        let snapshot =
            StatisticsAggregator::snapshot(&store, &history, &HistoryFilter::default(), now);
        assert_eq!(snapshot.total_processed, 0);
        assert!(snapshot.label_breakdown.is_empty());
        assert_eq!(snapshot.success_rate.percentage, 0.0);
        assert_eq!(snapshot.processing_rates.last_7_days, 0);
    }

    #[test]
    fn test_processing_rates_windows() {
        let now = Utc::now();
        let history = history_with(vec![
            entry(&[], now - Duration::minutes(10)),
            entry(&[], now - Duration::hours(2)),
            entry(&[], now - Duration::hours(30)),
            entry(&[], now - Duration::days(8)),
        ]);
        let store = RuleStore::new();

        let snapshot =
            StatisticsAggregator::snapshot(&store, &history, &HistoryFilter::default(), now);
        assert_eq!(snapshot.processing_rates.last_hour, 1);
        assert_eq!(snapshot.processing_rates.last_24_hours, 2);
        assert_eq!(snapshot.processing_rates.last_7_days, 3);
    }

    #[test]
    fn test_rates_ignore_time_filter_but_honor_label() {
        let now = Utc::now();
        let history = history_with(vec![
            entry(&["A"], now - Duration::minutes(5)),
            entry(&["B"], now - Duration::minutes(5)),
            entry(&["A"], now - Duration::hours(3)),
        ]);
        let store = RuleStore::new();

        let filter = HistoryFilter {
            from: Some(now - Duration::hours(1)),
            to: None,
            label: Some("A".to_string()),
        };
        let snapshot = StatisticsAggregator::snapshot(&store, &history, &filter, now);

        // 时间过滤只影响计数部分
        assert_eq!(snapshot.total_processed, 1);
        // 速率忽略 from/to，但标签过滤生效：两条 A 都计入 24 小时窗口
        assert_eq!(snapshot.processing_rates.last_24_hours, 2);
        assert_eq!(snapshot.processing_rates.last_hour, 1);
    }

    #[test]
    fn test_rule_effectiveness_last_write_wins() {
        let now = Utc::now();
        let mut store = RuleStore::new();
        let first = store
            .create(NewRule::new("X = 1", "Shared").with_priority(10))
            .unwrap();
        let second = store
            .create(NewRule::new("Y = 2", "Shared").with_priority(1))
            .unwrap();
        store.record_match(&first.id, now);
        store.record_match(&first.id, now);
        store.record_match(&second.id, now);

        let history = History::new(10);
        let snapshot =
            StatisticsAggregator::snapshot(&store, &history, &HistoryFilter::default(), now);

        // list 顺序为优先级降序，低优先级规则后遍历，覆盖同名标签
        let shared = &snapshot.rule_effectiveness["Shared"];
        assert_eq!(shared.condition, "Y = 2");
        assert_eq!(shared.usage_count, 1);
    }

    #[test]
    fn test_rule_effectiveness_only_enabled_rules() {
        let mut store = RuleStore::new();
        store.create(NewRule::new("X = 1", "On")).unwrap();
        store
            .create(NewRule::new("Y = 2", "Off").with_enabled(false))
            .unwrap();

        let history = History::new(10);
        let snapshot = StatisticsAggregator::snapshot(
            &store,
            &history,
            &HistoryFilter::default(),
            Utc::now(),
        );

        assert!(snapshot.rule_effectiveness.contains_key("On"));
        assert!(!snapshot.rule_effectiveness.contains_key("Off"));
    }

    #[test]
    fn test_timeline_zero_fills_whole_window() {
        let now = Utc::now();
        let history = History::new(10);

        let buckets = StatisticsAggregator::timeline(&history, 24, now);
        assert_eq!(buckets.len(), 24);
        assert!(buckets.iter().all(|b| b.processed == 0));

        // 升序且最后一个桶是当前小时
        let current_key = now
            .duration_trunc(Duration::hours(1))
            .unwrap()
            .format("%Y-%m-%d %H:00")
            .to_string();
        assert_eq!(buckets.last().unwrap().hour, current_key);
        let mut sorted = buckets.clone();
        sorted.sort_by(|a, b| a.hour.cmp(&b.hour));
        assert_eq!(buckets, sorted);
    }

    #[test]
    fn test_timeline_counts_entries_in_buckets() {
        let now = Utc::now();
        let history = history_with(vec![
            entry(&["A"], now),
            entry(&["A", "B"], now),
            entry(&[], now - Duration::hours(2)),
            // 窗口之外的记录不计入
            entry(&["A"], now - Duration::hours(48)),
        ]);

        let buckets = StatisticsAggregator::timeline(&history, 24, now);
        assert_eq!(buckets.len(), 24);

        let last = buckets.last().unwrap();
        assert_eq!(last.processed, 2);
        assert_eq!(last.labeled, 2);
        assert_eq!(last.labels["A"], 2);
        assert_eq!(last.labels["B"], 1);

        let total: u64 = buckets.iter().map(|b| b.processed).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_rule_analytics_sorted_by_matches() {
        let now = Utc::now();
        let mut store = RuleStore::new();
        let low = store.create(NewRule::new("X = 1", "Low")).unwrap();
        let high = store.create(NewRule::new("Y = 2", "High")).unwrap();
        store.record_match(&high.id, now);
        store.record_match(&high.id, now);
        store.record_match(&low.id, now);

        let analytics = StatisticsAggregator::rule_analytics(&store);
        assert_eq!(analytics.len(), 2);
        assert_eq!(analytics[0].rule_id, high.id);
        assert_eq!(analytics[0].total_matches, 2);
        assert_eq!(analytics[1].rule_id, low.id);
        assert_eq!(analytics[1].total_matches, 1);
    }

    #[test]
    fn test_cache_recompute_matches_history() {
        let now = Utc::now();
        let history = history_with(vec![
            entry(&["A"], now),
            entry(&["A", "B"], now - Duration::hours(30)),
            entry(&[], now),
        ]);

        let cache = StatsCache::recompute(&history, now);
        assert_eq!(cache.total_processed, 3);
        assert_eq!(cache.rate_24h, 2);
        assert_eq!(cache.labeled_count, 2);
        assert_eq!(cache.unlabeled_count, 1);
        assert_eq!(cache.label_counts["A"], 2);
        assert_eq!(cache.label_counts["B"], 1);
    }

    #[test]
    fn test_round_percentage() {
        assert_eq!(round_percentage(2, 3), 66.67);
        assert_eq!(round_percentage(1, 3), 33.33);
        assert_eq!(round_percentage(1, 1), 100.0);
        assert_eq!(round_percentage(0, 0), 0.0);
    }
}
