//! Scene rule domain model.
//!
//! # Responsibility
//! - Define the persisted rule list shape (`current_scene`, `result_scene`,
//!   `weight`, `params`).
//! - Decode/encode the JSON rule list file format.
//!
//! # Invariants
//! - `weight` is finite and strictly positive.
//! - Condition names match `^[a-z0-9_]+$`; condition values are finite.
//! - A missing `weight` decodes as `1`, missing `params` as `[]`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static CONDITION_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_]+$").expect("valid condition name regex"));

/// Largest integer an IEEE double represents exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Weight used when a rule carries no explicit weight.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Returns whether `name` matches the condition identifier grammar.
pub fn is_valid_condition_name(name: &str) -> bool {
    CONDITION_NAME_RE.is_match(name)
}

/// Comparison operator of one transition condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionOperator {
    #[serde(rename = "EQ")]
    Eq,
    #[serde(rename = "GT")]
    Gt,
    #[serde(rename = "GE")]
    Ge,
    #[serde(rename = "LT")]
    Lt,
    #[serde(rename = "LE")]
    Le,
}

impl ConditionOperator {
    pub const ALL: [ConditionOperator; 5] = [Self::Eq, Self::Gt, Self::Ge, Self::Lt, Self::Le];

    /// Stable name used in the JSON rule file (`EQ|GT|GE|LT|LE`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Gt => "GT",
            Self::Ge => "GE",
            Self::Lt => "LT",
            Self::Le => "LE",
        }
    }

    /// Symbol used inside serialized condition literals.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }

    /// Parses one condition literal symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

impl Display for ConditionOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == normalized)
            .ok_or_else(|| format!("Unknown condition operator: {normalized}"))
    }
}

/// One numeric comparison gating a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRuleCondition {
    pub name: String,
    pub operator: ConditionOperator,
    #[serde(serialize_with = "serialize_number")]
    pub value: f64,
}

impl SceneRuleCondition {
    pub fn new(name: impl Into<String>, operator: ConditionOperator, value: f64) -> Self {
        Self {
            name: name.into(),
            operator,
            value,
        }
    }

    /// Validates name grammar and value finiteness.
    pub fn validate(&self) -> Result<(), RuleValidationError> {
        if !is_valid_condition_name(&self.name) {
            return Err(RuleValidationError::InvalidConditionName(self.name.clone()));
        }
        if !self.value.is_finite() {
            return Err(RuleValidationError::NonFiniteConditionValue(
                self.name.clone(),
            ));
        }
        Ok(())
    }
}

/// One weighted, conditionally gated transition between two scenes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRule {
    pub current_scene: String,
    pub result_scene: String,
    #[serde(default = "default_weight", serialize_with = "serialize_number")]
    pub weight: f64,
    /// Conjunction of conditions that must all hold for the rule to fire.
    #[serde(default)]
    pub params: Vec<SceneRuleCondition>,
}

impl SceneRule {
    /// Creates an unconditional rule with default weight.
    pub fn new(current_scene: impl Into<String>, result_scene: impl Into<String>) -> Self {
        Self {
            current_scene: current_scene.into(),
            result_scene: result_scene.into(),
            weight: DEFAULT_WEIGHT,
            params: Vec::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_condition(mut self, condition: SceneRuleCondition) -> Self {
        self.params.push(condition);
        self
    }

    /// Returns whether the rule uses the implicit default weight.
    pub fn has_default_weight(&self) -> bool {
        self.weight == DEFAULT_WEIGHT
    }

    /// Validates rule-level invariants before the rule enters a session.
    pub fn validate(&self) -> Result<(), RuleValidationError> {
        if self.current_scene.is_empty() || self.result_scene.is_empty() {
            return Err(RuleValidationError::EmptySceneId);
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(RuleValidationError::InvalidWeight(self.weight));
        }
        for condition in &self.params {
            condition.validate()?;
        }
        Ok(())
    }
}

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

/// Writes integral values without a fractional part (`1`, not `1.0`).
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Rule-level invariant violations.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleValidationError {
    EmptySceneId,
    InvalidWeight(f64),
    InvalidConditionName(String),
    NonFiniteConditionValue(String),
}

impl Display for RuleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySceneId => write!(f, "scene id must not be empty"),
            Self::InvalidWeight(weight) => {
                write!(f, "weight must be a finite positive number, got {weight}")
            }
            Self::InvalidConditionName(name) => write!(
                f,
                "condition name `{name}` should only include characters from [a-z0-9_]+"
            ),
            Self::NonFiniteConditionValue(name) => {
                write!(f, "condition `{name}` has a non-finite value")
            }
        }
    }
}

impl Error for RuleValidationError {}

/// Rule file decode/encode errors.
#[derive(Debug)]
pub enum RuleFormatError {
    /// Content is not a JSON array of rule objects.
    MalformedInputJson(serde_json::Error),
    /// Rule at `index` decoded but violates a rule invariant.
    InvalidRule {
        index: usize,
        reason: RuleValidationError,
    },
    /// Rule list could not be rendered back to JSON.
    Encode(serde_json::Error),
}

impl Display for RuleFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedInputJson(err) => write!(f, "error parsing scene rules: {err}"),
            Self::InvalidRule { index, reason } => write!(f, "invalid rule #{index}: {reason}"),
            Self::Encode(err) => write!(f, "error encoding scene rules: {err}"),
        }
    }
}

impl Error for RuleFormatError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedInputJson(err) => Some(err),
            Self::InvalidRule { reason, .. } => Some(reason),
            Self::Encode(err) => Some(err),
        }
    }
}

/// Decodes and validates one JSON rule list.
pub fn decode_rules(json: &str) -> Result<Vec<SceneRule>, RuleFormatError> {
    let rules: Vec<SceneRule> =
        serde_json::from_str(json).map_err(RuleFormatError::MalformedInputJson)?;
    for (index, rule) in rules.iter().enumerate() {
        rule.validate()
            .map_err(|reason| RuleFormatError::InvalidRule { index, reason })?;
    }
    Ok(rules)
}

/// Encodes one rule list as pretty-printed JSON (2-space indent).
pub fn encode_rules(rules: &[SceneRule]) -> Result<String, RuleFormatError> {
    serde_json::to_string_pretty(rules).map_err(RuleFormatError::Encode)
}
