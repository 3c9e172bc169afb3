//! 条件文本解析器
//!
//! 文法（扁平两层，大小写敏感，分隔符两侧各一个空格）：
//!
//! ```text
//! Expression := Group (" OR " Group)*
//! Group      := Condition (" AND " Condition)*
//! Condition  := <字段> <操作符> <操作数>
//! ```
//!
//! 操作数在解析期即完成类型强制转换，存量表达式随时可直接求值。

use crate::error::{EngineError, Result};
use crate::models::{Condition, ConditionGroup, RuleExpression};
use crate::operators::Operator;
use crate::value::Value;

pub struct ConditionParser;

impl ConditionParser {
    /// 解析完整条件文本
    pub fn parse(text: &str) -> Result<RuleExpression> {
        let mut groups = Vec::new();
        for group_text in text.split(" OR ") {
            groups.push(Self::parse_group(group_text)?);
        }
        Ok(RuleExpression::new(groups))
    }

    fn parse_group(text: &str) -> Result<ConditionGroup> {
        let mut conditions = Vec::new();
        for condition_text in text.split(" AND ") {
            conditions.push(Self::parse_condition(condition_text)?);
        }
        Ok(ConditionGroup::new(conditions))
    }

    /// 切分单条件。
    /// 按扫描顺序找到第一个命中的操作符，在其首次出现处切分，
    /// 因此 `a=b != c` 的字段是 `a=b` 而不是 `a`。
    fn parse_condition(text: &str) -> Result<Condition> {
        for op in Operator::SCAN_ORDER {
            if let Some(idx) = text.find(op.symbol()) {
                let field = text[..idx].trim().to_string();
                let operand = strip_quotes(text[idx + op.symbol().len()..].trim());
                return Ok(Condition::new(field, op, Value::coerce(operand)));
            }
        }
        Err(EngineError::InvalidConditionSyntax(text.trim().to_string()))
    }
}

/// 剥掉操作数外层一对匹配的单引号或双引号，只剥一层
fn strip_quotes(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if first == last && (first == b'"' || first == b'\'') {
            return &text[1..text.len() - 1];
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_condition(text: &str) -> Condition {
        let expression = ConditionParser::parse(text).unwrap();
        assert_eq!(expression.groups.len(), 1);
        assert_eq!(expression.groups[0].conditions.len(), 1);
        expression.groups[0].conditions[0].clone()
    }

    #[test]
    fn test_parse_simple_condition() {
        let condition = single_condition("Quantity >= 100");
        assert_eq!(condition.field, "Quantity");
        assert_eq!(condition.operator, Operator::Ge);
        assert_eq!(condition.value, Value::Integer(100));
    }

    #[test]
    fn test_ge_not_split_as_gt() {
        // 扫描顺序保证 ">=" 不会被拆成 ">" 加 "= 5"
        let condition = single_condition("X >= 5");
        assert_eq!(condition.operator, Operator::Ge);
        assert_eq!(condition.value, Value::Integer(5));
    }

    #[test]
    fn test_ne_scanned_before_eq() {
        let condition = single_condition("X != 5");
        assert_eq!(condition.operator, Operator::Ne);
        assert_eq!(condition.field, "X");
        assert_eq!(condition.value, Value::Integer(5));
    }

    #[test]
    fn test_scan_order_wins_over_position() {
        // "!=" 在扫描顺序中先于 "="，即使 "=" 在文本里出现得更早
        let condition = single_condition("a=b != c");
        assert_eq!(condition.field, "a=b");
        assert_eq!(condition.operator, Operator::Ne);
        assert_eq!(condition.value, Value::Text("c".to_string()));
    }

    #[test]
    fn test_split_at_first_occurrence() {
        let condition = single_condition("x = 1 = 2");
        assert_eq!(condition.field, "x");
        assert_eq!(condition.operator, Operator::Eq);
        assert_eq!(condition.value, Value::Text("1 = 2".to_string()));
    }

    #[test]
    fn test_quoted_operand_stripped() {
        let double = single_condition("Status = \"active\"");
        assert_eq!(double.value, Value::Text("active".to_string()));

        let single = single_condition("Status = 'active'");
        assert_eq!(single.value, Value::Text("active".to_string()));
    }

    #[test]
    fn test_only_one_quote_layer_stripped() {
        let condition = single_condition("Status = \"\"active\"\"");
        assert_eq!(condition.value, Value::Text("\"active\"".to_string()));
    }

    #[test]
    fn test_mismatched_quotes_kept() {
        let condition = single_condition("Status = \"active'");
        assert_eq!(condition.value, Value::Text("\"active'".to_string()));
    }

    #[test]
    fn test_quoted_number_coerced_after_stripping() {
        let condition = single_condition("Qty = '5'");
        assert_eq!(condition.value, Value::Integer(5));
    }

    #[test]
    fn test_operand_coercion() {
        assert_eq!(single_condition("X = 5.0").value, Value::Integer(5));
        assert_eq!(single_condition("X = 5.5").value, Value::Float(5.5));
        assert_eq!(
            single_condition("X = free").value,
            Value::Text("free".to_string())
        );
    }

    #[test]
    fn test_and_splitting() {
        let expression = ConditionParser::parse("A = 1 AND B = 2 AND C = 3").unwrap();
        assert_eq!(expression.groups.len(), 1);
        assert_eq!(expression.groups[0].conditions.len(), 3);
    }

    #[test]
    fn test_or_of_ands() {
        let expression =
            ConditionParser::parse("A = 1 AND B = 2 OR C = 3 OR D = 4 AND E = 5").unwrap();
        assert_eq!(expression.groups.len(), 3);
        assert_eq!(expression.groups[0].conditions.len(), 2);
        assert_eq!(expression.groups[1].conditions.len(), 1);
        assert_eq!(expression.groups[2].conditions.len(), 2);
    }

    #[test]
    fn test_separators_are_case_sensitive() {
        // 小写 " or " 不是分隔符，整句作为一个条件解析
        let condition = single_condition("x = 1 or y = 2");
        assert_eq!(condition.field, "x");
        assert_eq!(condition.value, Value::Text("1 or y = 2".to_string()));
    }

    #[test]
    fn test_missing_operator_is_rejected() {
        let result = ConditionParser::parse("Quantity 100");
        match result {
            Err(EngineError::InvalidConditionSyntax(text)) => {
                assert_eq!(text, "Quantity 100");
            }
            other => panic!("期望语法错误，实际: {:?}", other),
        }
    }

    #[test]
    fn test_empty_text_is_rejected() {
        assert!(ConditionParser::parse("").is_err());
        assert!(ConditionParser::parse("   ").is_err());
    }

    #[test]
    fn test_dangling_separator_is_rejected() {
        // 尾随 " AND " 产生空条件，空条件没有操作符
        assert!(ConditionParser::parse("A = 1 AND ").is_err());
        assert!(ConditionParser::parse("A = 1 OR ").is_err());
    }

    #[test]
    fn test_reserialized_form_reparses_identically() {
        let original = ConditionParser::parse("Qty >= 100 AND Type = 'bulk' OR Price < 9.5").unwrap();
        let reparsed = ConditionParser::parse(&original.to_string()).unwrap();
        assert_eq!(original, reparsed);
    }
}
