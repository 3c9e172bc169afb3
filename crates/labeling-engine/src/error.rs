//! 标注引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("条件语法无效: {0}")]
    InvalidConditionSyntax(String),

    #[error("规则未找到: {0}")]
    RuleNotFound(String),

    #[error("载荷无效: {0}")]
    InvalidPayload(String),

    #[error("规则求值失败: {0}")]
    EvaluationFailure(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
