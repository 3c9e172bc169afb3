//! 统计与分析处理器
//!
//! 聚合统计在引擎侧基于处理历史计算，这里只负责参数校验和回包格式。

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use tracing::instrument;
use validator::Validate;

use labeling_engine::{HistoryFilter, RuleAnalytics, TimelineBucket};

use crate::dto::{HealthResponse, StatisticsResponse, StatsQuery, TimelineQuery};
use crate::error::Result;
use crate::state::AppState;

/// 时间线未指定 hours 时的默认回溯窗口
const DEFAULT_TIMELINE_HOURS: i64 = 24;

/// 查询聚合统计
///
/// GET /statistics
#[instrument(skip(state))]
pub async fn get_statistics(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Json<StatisticsResponse> {
    let filter = HistoryFilter {
        from: query.from,
        to: query.to,
        label: query.label,
    };

    Json(StatisticsResponse {
        snapshot: state.engine.statistics(&filter),
        timestamp: Utc::now(),
    })
}

/// 查询按小时聚合的处理时间线（升序，含当前未满的小时）
///
/// GET /analytics/timeline
#[instrument(skip(state))]
pub async fn get_timeline(
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<Vec<TimelineBucket>>> {
    query.validate()?;

    let hours = query.hours.unwrap_or(DEFAULT_TIMELINE_HOURS);

    Ok(Json(state.engine.timeline(hours)))
}

/// 查询规则级分析指标（按命中次数降序）
///
/// GET /rules/analytics
#[instrument(skip(state))]
pub async fn rule_analytics(State(state): State<AppState>) -> Json<Vec<RuleAnalytics>> {
    Json(state.engine.rule_analytics())
}

/// 健康检查
///
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (rules_count, processed_count) = state.engine.counts();

    Json(HealthResponse {
        status: "healthy",
        rules_count,
        processed_count,
    })
}
