//! 类型化比较值
//!
//! 条件操作数在解析期、载荷字段在求值期都转换成 [`Value`]，
//! 比较逻辑只面对这一个封闭类型，不依赖运行时动态类型。

use std::fmt;

use serde_json::Value as JsonValue;

/// 条件操作数与载荷字段的统一类型
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    /// 载荷中不存在该字段（JSON null 也归入此类）
    Absent,
}

impl Value {
    /// 文本强制转换：先尝试按数值解析，小数部分为零的数归一为 Integer，
    /// 解析失败则保留为 Text
    pub fn coerce(raw: &str) -> Value {
        if let Ok(num) = raw.trim().parse::<f64>() {
            return Value::from_number(num);
        }
        Value::Text(raw.to_string())
    }

    /// 载荷字段转换：数值与字符串遵循和操作数相同的归一规则，
    /// 数组和对象保留为其 JSON 文本形式
    pub fn from_json(json: &JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::Absent,
            JsonValue::Bool(b) => Value::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else {
                    Value::from_number(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Value::coerce(s),
            other => Value::Text(other.to_string()),
        }
    }

    /// 小数部分为零且在 i64 范围内的数归一为 Integer
    fn from_number(num: f64) -> Value {
        if num.is_finite() && num.fract() == 0.0 && num.abs() <= i64::MAX as f64 {
            Value::Integer(num as i64)
        } else {
            Value::Float(num)
        }
    }

    /// 可参与数值比较时返回对应的 f64
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Absent => Ok(()),
        }
    }
}
