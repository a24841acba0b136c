//! Rule list reconciliation.
//!
//! # Responsibility
//! - Fold an authoring delta into the prior rule list.
//! - Re-serialize the reconciled list as the rule file.
//!
//! # Invariants
//! - Resolution order is fixed: deletions, changes, additions, renames.
//! - A deleted rule never resurfaces through rename substitution.
//! - Only renames of scene entities rewrite rule endpoints.
//! - On any malformed literal the whole reconciliation fails; no partial
//!   list is returned.
//! - The delta is read, never mutated.

use crate::authoring::state::{AuthoringState, RelationEvent};
use crate::codec::condition::{deserialize_condition, ConditionError};
use crate::graph::data::{RelationData, RelationKey};
use crate::graph::term::Term;
use crate::model::rule::{
    encode_rules, RuleFormatError, SceneRule, SceneRuleCondition, DEFAULT_WEIGHT,
};
use crate::projection::quads::rule_relation_key;
use crate::vocabulary::{
    is_scene_iri, scene_id_from_iri, scene_iri, CONDITION_PROPERTY, TRANSITION_TYPE,
    WEIGHT_PROPERTY,
};
use log::{info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Reconciliation failure; the save must be aborted.
#[derive(Debug)]
pub enum ReconcileError {
    MalformedCondition {
        relation: RelationKey,
        source: ConditionError,
    },
    MalformedWeight {
        relation: RelationKey,
        value: String,
    },
    Encode(RuleFormatError),
}

impl Display for ReconcileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedCondition { relation, source } => {
                write!(f, "malformed condition on transition {relation}: {source}")
            }
            Self::MalformedWeight { relation, value } => write!(
                f,
                "malformed weight on transition {relation}: `{value}` is not a finite positive number"
            ),
            Self::Encode(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReconcileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedCondition { source, .. } => Some(source),
            Self::MalformedWeight { .. } => None,
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<RuleFormatError> for ReconcileError {
    fn from(value: RuleFormatError) -> Self {
        Self::Encode(value)
    }
}

/// Reconciled rule list together with its serialized file content.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleExport {
    pub rules: Vec<SceneRule>,
    pub json: String,
}

/// Counts of edits folded by one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub deleted: usize,
    pub changed: usize,
    pub added: usize,
    pub renamed_endpoints: usize,
}

/// Folds `state` into `prior` and returns the updated rule list.
pub fn reconcile_rules(
    prior: &[SceneRule],
    state: &AuthoringState,
) -> ReconcileResult<Vec<SceneRule>> {
    reconcile_rules_with_stats(prior, state).map(|(rules, _)| rules)
}

/// Same as [`reconcile_rules`], also reporting what was folded.
pub fn reconcile_rules_with_stats(
    prior: &[SceneRule],
    state: &AuthoringState,
) -> ReconcileResult<(Vec<SceneRule>, ReconcileStats)> {
    let mut stats = ReconcileStats::default();

    let surviving: Vec<&SceneRule> = prior
        .iter()
        .filter(|rule| !is_rule_deleted(rule, state))
        .collect();
    stats.deleted = prior.len() - surviving.len();

    let mut rules = Vec::with_capacity(surviving.len());
    for rule in surviving {
        match state.relation_event(&rule_relation_key(rule)) {
            Some(RelationEvent::Changed { data, .. }) => {
                let (weight, params) = derive_rule_properties(data)?;
                rules.push(SceneRule {
                    weight,
                    params,
                    ..rule.clone()
                });
                stats.changed += 1;
            }
            _ => rules.push(rule.clone()),
        }
    }

    for event in state.relation_events() {
        let RelationEvent::Added { data } = event else {
            continue;
        };
        if data.link_type != TRANSITION_TYPE {
            continue;
        }
        if state.is_deleted_entity(&data.source) || state.is_deleted_entity(&data.target) {
            warn!(
                "event=added_transition_skipped module=reconcile status=error reason=deleted_endpoint"
            );
            continue;
        }
        rules.push(rule_from_relation(data)?);
        stats.added += 1;
    }

    let renames = scene_renames(state);
    if !renames.is_empty() {
        for rule in &mut rules {
            for endpoint in [&mut rule.current_scene, &mut rule.result_scene] {
                if let Some(renamed) = renames.get(endpoint.as_str()) {
                    *endpoint = renamed.clone();
                    stats.renamed_endpoints += 1;
                }
            }
        }
    }

    info!(
        "event=rules_reconciled module=reconcile status=ok prior={} result={} deleted={} changed={} added={} renamed_endpoints={}",
        prior.len(),
        rules.len(),
        stats.deleted,
        stats.changed,
        stats.added,
        stats.renamed_endpoints
    );
    Ok((rules, stats))
}

/// Reconciles and serializes the rule list as pretty JSON.
pub fn export_rules(prior: &[SceneRule], state: &AuthoringState) -> ReconcileResult<RuleExport> {
    let rules = reconcile_rules(prior, state)?;
    let json = encode_rules(&rules)?;
    Ok(RuleExport { rules, json })
}

/// Builds a full rule from one transition relation.
pub fn rule_from_relation(relation: &RelationData) -> ReconcileResult<SceneRule> {
    let (weight, params) = derive_rule_properties(relation)?;
    Ok(SceneRule {
        current_scene: scene_id_from_iri(&relation.source).to_string(),
        result_scene: scene_id_from_iri(&relation.target).to_string(),
        weight,
        params,
    })
}

/// Derives weight and conditions from relation properties.
///
/// A missing weight means the default weight; literals not tagged as
/// conditions are ignored.
pub fn derive_rule_properties(
    relation: &RelationData,
) -> ReconcileResult<(f64, Vec<SceneRuleCondition>)> {
    let weight = match relation.property_values(WEIGHT_PROPERTY).first() {
        None => DEFAULT_WEIGHT,
        Some(term) => parse_weight(term).ok_or_else(|| ReconcileError::MalformedWeight {
            relation: relation.key(),
            value: term_text(term).to_string(),
        })?,
    };

    let params = relation
        .property_values(CONDITION_PROPERTY)
        .iter()
        .filter_map(Term::as_literal)
        .filter(|literal| literal.is_condition())
        .map(|literal| {
            deserialize_condition(literal).map_err(|source| ReconcileError::MalformedCondition {
                relation: relation.key(),
                source,
            })
        })
        .collect::<ReconcileResult<Vec<_>>>()?;

    Ok((weight, params))
}

fn parse_weight(term: &Term) -> Option<f64> {
    term.as_literal()?
        .value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|weight| weight.is_finite() && *weight > 0.0)
}

fn term_text(term: &Term) -> &str {
    match term {
        Term::NamedNode(iri) => iri,
        Term::Literal(literal) => &literal.value,
    }
}

fn is_rule_deleted(rule: &SceneRule, state: &AuthoringState) -> bool {
    state.is_deleted_relation(&rule_relation_key(rule))
        || state.is_deleted_entity(&scene_iri(&rule.current_scene))
        || state.is_deleted_entity(&scene_iri(&rule.result_scene))
}

fn scene_renames(state: &AuthoringState) -> HashMap<String, String> {
    state
        .entity_renames()
        .filter(|(before, _)| is_scene_iri(before))
        .map(|(before, after)| {
            (
                scene_id_from_iri(before).to_string(),
                scene_id_from_iri(after).to_string(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{derive_rule_properties, ReconcileError};
    use crate::graph::data::RelationData;
    use crate::graph::term::{Literal, Term};
    use crate::model::rule::{ConditionOperator, SceneRuleCondition};
    use crate::vocabulary::{
        CONDITION_PROPERTY, RULE_CONDITION_DATATYPE, TRANSITION_TYPE, WEIGHT_PROPERTY,
    };

    fn transition() -> RelationData {
        RelationData::new(
            "urn:story-adventure:scene:a",
            "urn:story-adventure:scene:b",
            TRANSITION_TYPE,
        )
    }

    #[test]
    fn missing_weight_means_default_weight() {
        let (weight, params) = derive_rule_properties(&transition()).unwrap();
        assert_eq!(weight, 1.0);
        assert!(params.is_empty());
    }

    #[test]
    fn untagged_condition_literals_are_ignored() {
        let mut relation = transition();
        relation.push_property(CONDITION_PROPERTY, Literal::string("not a condition at all"));
        relation.push_property(CONDITION_PROPERTY, Term::NamedNode("urn:x".to_string()));
        relation.push_property(
            CONDITION_PROPERTY,
            Literal::new("hp < 3", RULE_CONDITION_DATATYPE),
        );
        let (_, params) = derive_rule_properties(&relation).unwrap();
        assert_eq!(
            params,
            vec![SceneRuleCondition::new("hp", ConditionOperator::Lt, 3.0)]
        );
    }

    #[test]
    fn non_positive_weight_is_rejected() {
        let mut relation = transition();
        relation.push_property(WEIGHT_PROPERTY, Literal::double(-1.0));
        let err = derive_rule_properties(&relation).unwrap_err();
        assert!(matches!(err, ReconcileError::MalformedWeight { ref value, .. } if value == "-1"));
    }
}
