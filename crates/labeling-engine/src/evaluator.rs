//! 规则求值器
//!
//! 对解析后的表达式做短路求值：组间 OR，组内 AND。
//! 求值本身不产生副作用，规则命中后的计数由管线负责。

use std::cmp::Ordering;

use crate::error::Result;
use crate::models::{Condition, ConditionGroup, Payload, RuleExpression};
use crate::operators::Operator;
use crate::value::Value;

pub struct RuleEvaluator;

impl RuleEvaluator {
    /// 求值整个表达式：任一 OR 组成立即为真，短路返回
    pub fn evaluate(expression: &RuleExpression, payload: &Payload) -> Result<bool> {
        for group in &expression.groups {
            if Self::evaluate_group(group, payload)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// 组内所有条件同时成立，遇到不成立的条件短路返回
    fn evaluate_group(group: &ConditionGroup, payload: &Payload) -> Result<bool> {
        for condition in &group.conditions {
            if !Self::evaluate_condition(condition, payload)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// 单条件求值。字段缺失直接判为不成立，对任何操作符都一样，
    /// 不视为错误
    fn evaluate_condition(condition: &Condition, payload: &Payload) -> Result<bool> {
        let actual = payload.field(&condition.field);
        if actual.is_absent() {
            return Ok(false);
        }
        Ok(Self::compare(&actual, condition.operator, &condition.value))
    }

    /// 比较语义：
    /// - 等值比较跨 Integer/Float 按数值判等，其余按结构判等
    /// - 排序比较双方都是数值时按数值，否则退回两侧文本形式的
    ///   字典序比较（刻意保留的行为，永远不报错）
    fn compare(actual: &Value, operator: Operator, expected: &Value) -> bool {
        match operator {
            Operator::Eq => Self::values_equal(actual, expected),
            Operator::Ne => !Self::values_equal(actual, expected),
            ordering_op => {
                let ordering = match (actual.as_number(), expected.as_number()) {
                    // NaN 参与时 partial_cmp 为 None，比较不成立
                    (Some(a), Some(b)) => a.partial_cmp(&b),
                    _ => Some(actual.to_string().cmp(&expected.to_string())),
                };
                matches!(
                    (ordering, ordering_op),
                    (Some(Ordering::Less), Operator::Lt | Operator::Le)
                        | (Some(Ordering::Greater), Operator::Gt | Operator::Ge)
                        | (Some(Ordering::Equal), Operator::Le | Operator::Ge)
                )
            }
        }
    }

    fn values_equal(actual: &Value, expected: &Value) -> bool {
        match (actual.as_number(), expected.as_number()) {
            (Some(a), Some(b)) => a == b,
            _ => actual == expected,
        }
    }
}
