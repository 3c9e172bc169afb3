//! 规则打标引擎
//!
//! 提供基于条件规则的记录分类能力，支持：
//! - 文本条件解析（扁平 AND/OR，六种比较运算符）
//! - 数值感知的短路求值
//! - 规则的增删改查与启停
//! - 有界处理历史与统计聚合

pub mod engine;
pub mod error;
pub mod evaluator;
pub mod history;
pub mod models;
pub mod operators;
pub mod parser;
pub mod pipeline;
pub mod stats;
pub mod store;
pub mod value;

pub use engine::{ImportOutcome, LabelingEngine, RuleImport};
pub use error::{EngineError, Result};
pub use evaluator::RuleEvaluator;
pub use history::{DEFAULT_CAPACITY, History, HistoryFilter};
pub use models::{
    Classification, Condition, ConditionGroup, Payload, ProcessedEntry, Rule, RuleExpression,
};
pub use operators::Operator;
pub use parser::ConditionParser;
pub use stats::{
    LabelStat, ProcessingRates, RuleAnalytics, RuleEffectiveness, StatisticsAggregator,
    StatisticsSnapshot, StatsCache, SuccessRate, TimelineBucket,
};
pub use store::{NewRule, RuleStore, RuleUpdate};
pub use value::Value;
