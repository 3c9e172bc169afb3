//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::{handlers, state::AppState};

/// 构建规则管理路由
///
/// 包含规则 CRUD 和启停切换操作
fn rule_routes() -> Router<AppState> {
    Router::new()
        .route("/rules", post(handlers::rule::create_rule))
        .route("/rules", get(handlers::rule::list_rules))
        .route("/rules/{id}", put(handlers::rule::update_rule))
        .route("/rules/{id}", delete(handlers::rule::delete_rule))
        .route("/rules/{id}/toggle", post(handlers::rule::toggle_rule))
}

/// 构建记录处理路由
///
/// 包含记录打标和处理历史查询
fn process_routes() -> Router<AppState> {
    Router::new()
        .route("/process", post(handlers::process::process_record))
        .route("/processed-data", get(handlers::process::list_processed))
}

/// 构建统计分析路由
///
/// 包含聚合统计、小时级时间线和规则级分析
fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/statistics", get(handlers::stats::get_statistics))
        .route("/analytics/timeline", get(handlers::stats::get_timeline))
        .route("/rules/analytics", get(handlers::stats::rule_analytics))
}

/// 构建规则导入导出路由
fn transfer_routes() -> Router<AppState> {
    Router::new()
        .route("/export/rules", get(handlers::transfer::export_rules))
        .route("/import/rules", post(handlers::transfer::import_rules))
}

/// 构建健康检查路由
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::stats::health_check))
}

/// 构建完整的 API 路由
///
/// 返回全部服务路由（不含前缀，由调用方在 main.rs 中挂载）
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(rule_routes())
        .merge(process_routes())
        .merge(stats_routes())
        .merge(transfer_routes())
        .merge(health_routes())
}
