//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use labeling_engine::LabelingEngine;
use std::sync::Arc;

/// Axum 应用共享状态
///
/// 引擎自身持锁，通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LabelingEngine>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(engine: Arc<LabelingEngine>) -> Self {
        Self { engine }
    }
}
