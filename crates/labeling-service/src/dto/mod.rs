//! DTO 模块
//!
//! 包含所有请求和响应的数据传输对象

pub mod request;
pub mod response;

pub use request::{
    CreateRuleRequest, HistoryQuery, ImportRulesRequest, StatsQuery, TimelineQuery,
    UpdateRuleRequest,
};

pub use response::{
    ClassifyResponse, ExportResponse, HealthResponse, MessageResponse, StatisticsResponse,
};
