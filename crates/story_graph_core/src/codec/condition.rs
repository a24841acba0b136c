//! Condition literal codec.
//!
//! # Responsibility
//! - Render one `SceneRuleCondition` as a `<name> <symbol> <value>` literal
//!   tagged with the rule condition datatype.
//! - Parse such a literal back, rejecting anything outside the grammar.
//!
//! # Invariants
//! - `deserialize_condition(&serialize_condition(c)) == Ok(c)` for every
//!   condition with a valid name and finite value.
//! - Unknown operator symbols are rejected, never passed through.

use crate::graph::term::Literal;
use crate::model::rule::{is_valid_condition_name, ConditionOperator, SceneRuleCondition};
use crate::vocabulary::RULE_CONDITION_DATATYPE;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Serializes one condition into a tagged condition literal.
pub fn serialize_condition(condition: &SceneRuleCondition) -> Literal {
    Literal::new(
        format!(
            "{} {} {}",
            condition.name,
            condition.operator.symbol(),
            condition.value
        ),
        RULE_CONDITION_DATATYPE,
    )
}

/// Parses one condition literal.
///
/// # Errors
/// - `FieldCount` when the literal is not exactly three whitespace-separated
///   fields.
/// - `UnknownOperator` when the middle field is not one of `= > >= < <=`.
/// - `InvalidName` / `InvalidValue` when the name fails `[a-z0-9_]+` or the
///   value is not a finite number.
pub fn deserialize_condition(literal: &Literal) -> Result<SceneRuleCondition, ConditionError> {
    let expression = literal.value.as_str();
    let mut fields = expression.split_whitespace();
    let (Some(name), Some(symbol), Some(value), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(ConditionError::FieldCount {
            expression: expression.to_string(),
            found: expression.split_whitespace().count(),
        });
    };

    let operator =
        ConditionOperator::from_symbol(symbol).ok_or_else(|| ConditionError::UnknownOperator {
            expression: expression.to_string(),
            symbol: symbol.to_string(),
        })?;

    if !is_valid_condition_name(name) {
        return Err(ConditionError::InvalidName {
            expression: expression.to_string(),
            name: name.to_string(),
        });
    }

    let value = value
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| ConditionError::InvalidValue {
            expression: expression.to_string(),
            value: value.to_string(),
        })?;

    Ok(SceneRuleCondition::new(name, operator, value))
}

/// Malformed condition literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    FieldCount { expression: String, found: usize },
    UnknownOperator { expression: String, symbol: String },
    InvalidName { expression: String, name: String },
    InvalidValue { expression: String, value: String },
}

impl ConditionError {
    pub fn expression(&self) -> &str {
        match self {
            Self::FieldCount { expression, .. }
            | Self::UnknownOperator { expression, .. }
            | Self::InvalidName { expression, .. }
            | Self::InvalidValue { expression, .. } => expression,
        }
    }
}

impl Display for ConditionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldCount { expression, found } => write!(
                f,
                "invalid scene rule transition condition expression `{expression}`: expected 3 fields, found {found}"
            ),
            Self::UnknownOperator { expression, symbol } => write!(
                f,
                "invalid scene rule transition condition expression `{expression}`: unknown operator `{symbol}`"
            ),
            Self::InvalidName { expression, name } => write!(
                f,
                "invalid scene rule transition condition expression `{expression}`: property name `{name}` is not [a-z0-9_]+"
            ),
            Self::InvalidValue { expression, value } => write!(
                f,
                "invalid scene rule transition condition expression `{expression}`: `{value}` is not a finite number"
            ),
        }
    }
}

impl Error for ConditionError {}

#[cfg(test)]
mod tests {
    use super::{deserialize_condition, serialize_condition, ConditionError};
    use crate::graph::term::Literal;
    use crate::model::rule::{ConditionOperator, SceneRuleCondition};
    use crate::vocabulary::RULE_CONDITION_DATATYPE;

    fn condition_literal(value: &str) -> Literal {
        Literal::new(value, RULE_CONDITION_DATATYPE)
    }

    #[test]
    fn serialize_renders_symbol_and_shortest_number() {
        let literal =
            serialize_condition(&SceneRuleCondition::new("hp", ConditionOperator::Le, 0.0));
        assert_eq!(literal.value, "hp <= 0");
        assert!(literal.is_condition());

        let literal =
            serialize_condition(&SceneRuleCondition::new("luck", ConditionOperator::Gt, 0.25));
        assert_eq!(literal.value, "luck > 0.25");
    }

    #[test]
    fn deserialize_tolerates_repeated_whitespace() {
        let parsed = deserialize_condition(&condition_literal("gold  >=\t10")).unwrap();
        assert_eq!(parsed, SceneRuleCondition::new("gold", ConditionOperator::Ge, 10.0));
    }

    #[test]
    fn deserialize_rejects_wrong_field_count() {
        let err = deserialize_condition(&condition_literal("hp <= 0 extra")).unwrap_err();
        assert!(matches!(err, ConditionError::FieldCount { found: 4, .. }));

        let err = deserialize_condition(&condition_literal("")).unwrap_err();
        assert!(matches!(err, ConditionError::FieldCount { found: 0, .. }));
    }

    #[test]
    fn deserialize_rejects_unknown_operator_symbol() {
        // Unknown symbols used to pass through unchanged; they are now refused.
        let err = deserialize_condition(&condition_literal("hp != 0")).unwrap_err();
        assert_eq!(
            err,
            ConditionError::UnknownOperator {
                expression: "hp != 0".to_string(),
                symbol: "!=".to_string(),
            }
        );
    }

    #[test]
    fn deserialize_rejects_non_finite_value_and_bad_name() {
        let err = deserialize_condition(&condition_literal("hp = inf")).unwrap_err();
        assert!(matches!(err, ConditionError::InvalidValue { .. }));

        let err = deserialize_condition(&condition_literal("HP = 1")).unwrap_err();
        assert!(matches!(err, ConditionError::InvalidName { .. }));
    }

    #[test]
    fn every_operator_round_trips() {
        for operator in ConditionOperator::ALL {
            let condition = SceneRuleCondition::new("stat_1", operator, -12.5);
            let literal = serialize_condition(&condition);
            assert_eq!(deserialize_condition(&literal), Ok(condition));
        }
    }
}
