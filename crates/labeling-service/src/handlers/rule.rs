//! 规则管理处理器
//!
//! 提供规则的创建、列表、更新、删除与启停切换接口。
//! 条件文本在进入存储前完成语法校验，非法条件直接拒绝。

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use validator::Validate;

use labeling_engine::{NewRule, Rule, RuleUpdate};

use crate::dto::{CreateRuleRequest, MessageResponse, UpdateRuleRequest};
use crate::error::Result;
use crate::state::AppState;

/// 创建规则
///
/// POST /rules
pub async fn create_rule(
    State(state): State<AppState>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<(StatusCode, Json<Rule>)> {
    req.validate()?;

    let mut spec = NewRule::new(req.condition, req.label);
    if let Some(enabled) = req.enabled {
        spec = spec.with_enabled(enabled);
    }
    if let Some(priority) = req.priority {
        spec = spec.with_priority(priority);
    }

    let rule = state.engine.create_rule(spec)?;

    info!(rule_id = %rule.id, label = %rule.label, priority = rule.priority, "Rule created");

    Ok((StatusCode::CREATED, Json(rule)))
}

/// 查询规则列表（优先级降序）
///
/// GET /rules
pub async fn list_rules(State(state): State<AppState>) -> Json<Vec<Rule>> {
    Json(state.engine.list_rules())
}

/// 更新规则
///
/// PUT /rules/{id}
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRuleRequest>,
) -> Result<Json<Rule>> {
    req.validate()?;

    let update = RuleUpdate {
        condition: req.condition,
        label: req.label,
        enabled: req.enabled,
        priority: req.priority,
    };

    let rule = state.engine.update_rule(&id, update)?;

    info!(rule_id = %rule.id, "Rule updated");

    Ok(Json(rule))
}

/// 删除规则
///
/// DELETE /rules/{id}
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let removed = state.engine.delete_rule(&id)?;

    info!(rule_id = %removed.id, label = %removed.label, "Rule deleted");

    Ok(Json(MessageResponse::new("规则已删除")))
}

/// 切换规则启用状态
///
/// POST /rules/{id}/toggle
pub async fn toggle_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Rule>> {
    let rule = state.engine.toggle_rule(&id)?;

    info!(rule_id = %rule.id, enabled = rule.enabled, "Rule toggled");

    Ok(Json(rule))
}
