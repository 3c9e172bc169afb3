//! 规则导入导出处理器
//!
//! 导出结果可直接作为导入请求的 rules 字段回放。

use axum::{extract::State, Json};
use chrono::Utc;
use tracing::info;

use labeling_engine::ImportOutcome;

use crate::dto::{ExportResponse, ImportRulesRequest};
use crate::state::AppState;

/// 导出全部规则
///
/// GET /export/rules
pub async fn export_rules(State(state): State<AppState>) -> Json<ExportResponse> {
    let rules = state.engine.export_rules();
    let count = rules.len();

    Json(ExportResponse {
        rules,
        count,
        exported_at: Utc::now(),
    })
}

/// 批量导入规则，字段不全或条件非法的条目会被跳过
///
/// POST /import/rules
pub async fn import_rules(
    State(state): State<AppState>,
    Json(req): Json<ImportRulesRequest>,
) -> Json<ImportOutcome> {
    let outcome = state.engine.import_rules(req.rules);

    info!(
        imported = outcome.imported_count,
        skipped = outcome.skipped_count,
        "Rules imported"
    );

    Json(outcome)
}
