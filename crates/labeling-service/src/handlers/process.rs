//! 记录处理与历史查询处理器

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value as JsonValue;
use tracing::info;
use validator::Validate;

use labeling_engine::{HistoryFilter, ProcessedEntry};

use crate::dto::{ClassifyResponse, HistoryQuery};
use crate::error::Result;
use crate::state::AppState;

/// 历史查询未指定 limit 时的默认条数
const DEFAULT_HISTORY_LIMIT: usize = 100;

/// 处理一条记录，返回命中的标签集合
///
/// POST /process
pub async fn process_record(
    State(state): State<AppState>,
    Json(payload): Json<JsonValue>,
) -> Result<Json<ClassifyResponse>> {
    let classification = state.engine.classify(payload)?;

    info!(
        entry_id = %classification.id,
        labels = ?classification.labels,
        "Record processed"
    );

    Ok(Json(ClassifyResponse::from(classification)))
}

/// 查询处理历史，最新的记录排在最前
///
/// GET /processed-data
pub async fn list_processed(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ProcessedEntry>>> {
    query.validate()?;

    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let filter = HistoryFilter {
        from: query.from,
        to: query.to,
        label: query.label,
    };

    Ok(Json(state.engine.query_history(&filter, limit)))
}
