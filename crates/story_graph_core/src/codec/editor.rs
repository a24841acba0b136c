//! Live condition editing state.
//!
//! # Responsibility
//! - Re-derive a condition from free-form form fields on every keystroke.
//! - Keep the last successfully built literal as the value of record.
//!
//! # Invariants
//! - Invalid intermediate input never raises; it yields an unbuilt state with
//!   a displayable message.
//! - The value of record only changes when a new condition builds.

use crate::codec::condition::{deserialize_condition, serialize_condition};
use crate::graph::term::Term;
use crate::model::rule::{is_valid_condition_name, ConditionOperator, SceneRuleCondition};

pub const INVALID_NAME_MESSAGE: &str =
    "Condition property name should only include characters from [a-z0-9_]+";
pub const INVALID_VALUE_MESSAGE: &str = "Invalid numeric value for the condition";
pub const NOT_A_LITERAL_MESSAGE: &str = "Condition is not a literal";
pub const NOT_A_CONDITION_MESSAGE: &str = "Literal is not tagged as a rule condition";

/// Editing state for one condition form.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCondition {
    /// Literal this state was last built from or into.
    pub expression: Option<Term>,
    /// Built condition, `None` while the fields are invalid.
    pub built: Option<SceneRuleCondition>,
    pub name: String,
    pub operator: String,
    pub value: String,
    pub validation_message: Option<String>,
}

impl ParsedCondition {
    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    fn unbuilt(expression: Option<Term>, message: String) -> Self {
        Self {
            expression,
            built: None,
            name: String::new(),
            operator: ConditionOperator::Eq.as_str().to_string(),
            value: String::new(),
            validation_message: Some(message),
        }
    }
}

/// Validates free-form condition fields.
///
/// Returns a built state (with its serialized literal) or an unbuilt state
/// carrying a validation message.
pub fn validate_condition(name: &str, operator: &str, value: &str) -> ParsedCondition {
    build_condition(ParsedCondition {
        expression: None,
        built: None,
        name: name.to_string(),
        operator: operator.to_string(),
        value: value.to_string(),
        validation_message: None,
    })
}

/// Builds editing state from an existing property value.
pub fn parse_term(term: &Term) -> ParsedCondition {
    let Term::Literal(literal) = term else {
        return ParsedCondition::unbuilt(Some(term.clone()), NOT_A_LITERAL_MESSAGE.to_string());
    };
    if !literal.is_condition() {
        return ParsedCondition::unbuilt(
            Some(term.clone()),
            NOT_A_CONDITION_MESSAGE.to_string(),
        );
    }
    match deserialize_condition(literal) {
        Ok(condition) => ParsedCondition {
            expression: Some(term.clone()),
            name: condition.name.clone(),
            operator: condition.operator.as_str().to_string(),
            value: condition.value.to_string(),
            built: Some(condition),
            validation_message: None,
        },
        Err(err) => {
            ParsedCondition::unbuilt(Some(term.clone()), format!("Invalid condition: {err}"))
        }
    }
}

fn build_condition(condition: ParsedCondition) -> ParsedCondition {
    if !is_valid_condition_name(&condition.name) {
        return ParsedCondition {
            built: None,
            validation_message: Some(INVALID_NAME_MESSAGE.to_string()),
            ..condition
        };
    }

    let operator = match condition.operator.parse::<ConditionOperator>() {
        Ok(operator) => operator,
        Err(message) => {
            return ParsedCondition {
                built: None,
                validation_message: Some(message),
                ..condition
            };
        }
    };

    let value = match condition.value.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            return ParsedCondition {
                built: None,
                validation_message: Some(INVALID_VALUE_MESSAGE.to_string()),
                ..condition
            };
        }
    };

    let built = SceneRuleCondition::new(condition.name.as_str(), operator, value);
    ParsedCondition {
        expression: Some(Term::Literal(serialize_condition(&built))),
        built: Some(built),
        validation_message: None,
        ..condition
    }
}

/// Form-level condition editor.
#[derive(Debug, Clone)]
pub struct ConditionEditor {
    state: ParsedCondition,
    value: Term,
}

impl ConditionEditor {
    pub fn new(value: Term) -> Self {
        Self {
            state: parse_term(&value),
            value,
        }
    }

    /// Re-syncs from an externally supplied value.
    ///
    /// An in-progress edit survives when the value equals its expression.
    pub fn sync(&mut self, value: Term) {
        if self.state.expression.as_ref() != Some(&value) {
            self.state = parse_term(&value);
        }
        self.value = value;
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &ParsedCondition {
        let next = ParsedCondition {
            name: name.into(),
            ..self.state.clone()
        };
        self.update(next)
    }

    pub fn set_operator(&mut self, operator: impl Into<String>) -> &ParsedCondition {
        let next = ParsedCondition {
            operator: operator.into(),
            ..self.state.clone()
        };
        self.update(next)
    }

    pub fn set_value(&mut self, value: impl Into<String>) -> &ParsedCondition {
        let next = ParsedCondition {
            value: value.into(),
            ..self.state.clone()
        };
        self.update(next)
    }

    pub fn state(&self) -> &ParsedCondition {
        &self.state
    }

    /// Last successfully built value.
    pub fn value(&self) -> &Term {
        &self.value
    }

    fn update(&mut self, next: ParsedCondition) -> &ParsedCondition {
        let validated = build_condition(next);
        if validated.is_built() {
            if let Some(expression) = &validated.expression {
                self.value = expression.clone();
            }
        }
        self.state = validated;
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::{
        parse_term, validate_condition, ConditionEditor, INVALID_NAME_MESSAGE,
        INVALID_VALUE_MESSAGE, NOT_A_CONDITION_MESSAGE, NOT_A_LITERAL_MESSAGE,
    };
    use crate::graph::term::{Literal, Term};
    use crate::model::rule::{ConditionOperator, SceneRuleCondition};
    use crate::vocabulary::RULE_CONDITION_DATATYPE;

    fn condition_term(value: &str) -> Term {
        Term::Literal(Literal::new(value, RULE_CONDITION_DATATYPE))
    }

    #[test]
    fn validate_builds_valid_fields() {
        let parsed = validate_condition("spd", "GT", "10");
        assert_eq!(
            parsed.built,
            Some(SceneRuleCondition::new("spd", ConditionOperator::Gt, 10.0))
        );
        assert_eq!(parsed.expression, Some(condition_term("spd > 10")));
        assert_eq!(parsed.validation_message, None);
    }

    #[test]
    fn validate_reports_each_invalid_field() {
        let parsed = validate_condition("Spd!", "GT", "10");
        assert!(!parsed.is_built());
        assert_eq!(parsed.validation_message.as_deref(), Some(INVALID_NAME_MESSAGE));

        let parsed = validate_condition("spd", "GT", "abc");
        assert!(!parsed.is_built());
        assert_eq!(parsed.validation_message.as_deref(), Some(INVALID_VALUE_MESSAGE));

        let parsed = validate_condition("spd", "NE", "1");
        assert!(!parsed.is_built());
        assert_eq!(
            parsed.validation_message.as_deref(),
            Some("Unknown condition operator: NE")
        );
    }

    #[test]
    fn parse_term_rejects_named_nodes() {
        let parsed = parse_term(&Term::NamedNode("urn:x".to_string()));
        assert!(!parsed.is_built());
        assert_eq!(parsed.validation_message.as_deref(), Some(NOT_A_LITERAL_MESSAGE));
    }

    #[test]
    fn parse_term_rejects_untagged_literals() {
        let parsed = parse_term(&Term::Literal(Literal::string("hp <= 0")));
        assert!(!parsed.is_built());
        assert_eq!(
            parsed.validation_message.as_deref(),
            Some(NOT_A_CONDITION_MESSAGE)
        );
    }

    #[test]
    fn parse_term_fills_fields_from_literal() {
        let parsed = parse_term(&condition_term("gold >= 2.5"));
        assert_eq!(parsed.name, "gold");
        assert_eq!(parsed.operator, "GE");
        assert_eq!(parsed.value, "2.5");
        assert!(parsed.is_built());
    }

    #[test]
    fn editor_keeps_last_built_value_while_input_is_invalid() {
        let mut editor = ConditionEditor::new(condition_term("hp <= 0"));

        let state = editor.set_value("");
        assert!(!state.is_built());
        assert_eq!(editor.value(), &condition_term("hp <= 0"));

        editor.set_value("-5");
        assert_eq!(editor.value(), &condition_term("hp <= -5"));
        assert!(editor.state().is_built());
    }

    #[test]
    fn editor_sync_with_own_expression_keeps_progress() {
        let mut editor = ConditionEditor::new(condition_term("hp <= 0"));
        editor.set_operator("GT");
        let current = editor.value().clone();
        editor.set_name("Bad Name");

        editor.sync(current);
        assert_eq!(editor.state().name, "Bad Name");

        editor.sync(condition_term("mana = 3"));
        assert_eq!(editor.state().name, "mana");
        assert!(editor.state().is_built());
    }
}
