//! 服务层错误类型定义
//!
//! 引擎错误在这里映射为 HTTP 状态码和稳定的错误码。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use labeling_engine::EngineError;
use serde_json::json;

/// 打标服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 请求错误
    #[error("参数验证失败: {0}")]
    Validation(String),
    #[error("条件语法无效: {0}")]
    InvalidConditionSyntax(String),
    #[error("载荷无效: {0}")]
    InvalidPayload(String),

    // 资源不存在
    #[error("规则不存在: {0}")]
    RuleNotFound(String),

    // 系统错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidConditionSyntax(_) | Self::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::RuleNotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidConditionSyntax(_) => "INVALID_CONDITION_SYNTAX",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "error": message,
            "code": self.error_code(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从引擎错误转换
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidConditionSyntax(text) => Self::InvalidConditionSyntax(text),
            EngineError::RuleNotFound(id) => Self::RuleNotFound(id),
            EngineError::InvalidPayload(msg) => Self::InvalidPayload(msg),
            EngineError::EvaluationFailure(msg) => Self::Internal(msg),
        }
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;
