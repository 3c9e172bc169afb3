//! 记录打标服务
//!
//! 提供规则管理、记录打标、处理历史与统计分析的 REST API。
//!
//! ## 核心功能
//!
//! - **规则管理**：打标规则的 CRUD 操作与启停切换
//! - **记录处理**：按规则优先级匹配记录并打标
//! - **历史查询**：按时间和标签过滤处理历史
//! - **统计分析**：标签分布、处理速率、小时级时间线、规则级指标
//! - **导入导出**：规则集合的批量迁移
//!
//! ## 模块结构
//!
//! - `config`: 分层配置加载
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `state`: 应用状态
//! - `telemetry`: 日志初始化
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator
//! - 规则引擎：labeling-engine

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod telemetry;

// 重新导出核心类型
pub use dto::{
    ClassifyResponse, CreateRuleRequest, ExportResponse, HealthResponse, HistoryQuery,
    ImportRulesRequest, MessageResponse, StatisticsResponse, StatsQuery, TimelineQuery,
    UpdateRuleRequest,
};
pub use error::{ApiError, Result};
pub use state::AppState;
