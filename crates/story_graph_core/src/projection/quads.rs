//! Rule list to graph projection.
//!
//! # Responsibility
//! - Emit the scene schema declaration.
//! - Emit one scene node per referenced scene id and one transition relation
//!   per rule, with weight and condition literals.
//!
//! # Invariants
//! - Scene node ids are a pure function of scene ids.
//! - Nodes are emitted before relations; every relation endpoint exists in
//!   the same batch.
//! - A rule with the default weight carries no weight property.

use crate::codec::condition::serialize_condition;
use crate::graph::data::{EntityData, RelationData, RelationKey};
use crate::graph::model::ProjectionSink;
use crate::graph::term::{Literal, Term};
use crate::model::rule::SceneRule;
use crate::vocabulary::{
    scene_iri, CONDITION_PROPERTY, RDFS_CLASS, RDF_TYPE, SCENE_TYPE, TRANSITION_TYPE,
    WEIGHT_PROPERTY,
};
use log::{debug, warn};
use std::collections::HashSet;

/// Subject of one projected quad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuadSubject {
    Node(String),
    /// Quoted `source type target` triple, used to annotate a relation.
    Relation(RelationKey),
}

/// One `subject predicate object` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quad {
    pub subject: QuadSubject,
    pub predicate: String,
    pub object: Term,
}

/// Entity/relation batch produced from a rule list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub entities: Vec<EntityData>,
    pub relations: Vec<RelationData>,
}

impl Projection {
    /// Appends another batch, keeping entities ahead of relations.
    pub fn extend(&mut self, other: Projection) {
        self.entities.extend(other.entities);
        self.relations.extend(other.relations);
    }

    /// Pushes all entities, then all relations, into `sink`.
    pub fn emit_into(&self, sink: &mut impl ProjectionSink) {
        for entity in &self.entities {
            sink.add_entity(entity.clone());
        }
        for relation in &self.relations {
            sink.add_relation(relation.clone());
        }
    }

    /// Renders the batch as quads.
    pub fn quads(&self) -> Vec<Quad> {
        let mut quads = Vec::new();
        for entity in &self.entities {
            for entity_type in &entity.types {
                quads.push(Quad {
                    subject: QuadSubject::Node(entity.id.clone()),
                    predicate: RDF_TYPE.to_string(),
                    object: Term::NamedNode(entity_type.clone()),
                });
            }
            for (property, values) in &entity.properties {
                for value in values {
                    quads.push(Quad {
                        subject: QuadSubject::Node(entity.id.clone()),
                        predicate: property.clone(),
                        object: value.clone(),
                    });
                }
            }
        }
        for relation in &self.relations {
            quads.push(Quad {
                subject: QuadSubject::Node(relation.source.clone()),
                predicate: relation.link_type.clone(),
                object: Term::NamedNode(relation.target.clone()),
            });
            for (property, values) in &relation.properties {
                for value in values {
                    quads.push(Quad {
                        subject: QuadSubject::Relation(relation.key()),
                        predicate: property.clone(),
                        object: value.clone(),
                    });
                }
            }
        }
        quads
    }
}

/// Emits the scene type declaration.
pub fn project_schema() -> Projection {
    Projection {
        entities: vec![EntityData::new(SCENE_TYPE, vec![RDFS_CLASS.to_string()])],
        relations: Vec::new(),
    }
}

/// Relation key of the transition a rule projects into.
pub fn rule_relation_key(rule: &SceneRule) -> RelationKey {
    RelationKey::new(
        scene_iri(&rule.current_scene),
        scene_iri(&rule.result_scene),
        TRANSITION_TYPE,
    )
}

/// Builds the transition relation for one rule.
pub fn relation_from_rule(rule: &SceneRule) -> RelationData {
    let mut relation = RelationData::new(
        scene_iri(&rule.current_scene),
        scene_iri(&rule.result_scene),
        TRANSITION_TYPE,
    );
    if !rule.has_default_weight() {
        relation.push_property(WEIGHT_PROPERTY, Literal::double(rule.weight));
    }
    for condition in &rule.params {
        relation.push_property(CONDITION_PROPERTY, serialize_condition(condition));
    }
    relation
}

/// Projects a rule list into scene nodes and transition relations.
///
/// Rules sharing one relation key collapse into the first rule's relation.
pub fn project_rules(rules: &[SceneRule]) -> Projection {
    let mut projection = Projection::default();

    let mut seen_scenes = HashSet::new();
    for rule in rules {
        for scene_id in [rule.current_scene.as_str(), rule.result_scene.as_str()] {
            if seen_scenes.insert(scene_id) {
                projection
                    .entities
                    .push(EntityData::new(scene_iri(scene_id), vec![SCENE_TYPE.to_string()]));
            }
        }
    }

    let mut seen_keys = HashSet::new();
    for (index, rule) in rules.iter().enumerate() {
        if !seen_keys.insert(rule_relation_key(rule)) {
            warn!(
                "event=duplicate_transition module=projection status=error index={}",
                index
            );
            continue;
        }
        projection.relations.push(relation_from_rule(rule));
    }

    debug!(
        "event=rules_projected module=projection status=ok rules={} scenes={} relations={}",
        rules.len(),
        projection.entities.len(),
        projection.relations.len()
    );
    projection
}

#[cfg(test)]
mod tests {
    use super::{project_rules, project_schema, relation_from_rule, QuadSubject};
    use crate::model::rule::{ConditionOperator, SceneRule, SceneRuleCondition};
    use crate::vocabulary::{CONDITION_PROPERTY, RDFS_CLASS, SCENE_TYPE, WEIGHT_PROPERTY};

    #[test]
    fn schema_declares_scene_class() {
        let schema = project_schema();
        assert_eq!(schema.entities.len(), 1);
        assert_eq!(schema.entities[0].id, SCENE_TYPE);
        assert!(schema.entities[0].has_type(RDFS_CLASS));
        assert!(schema.relations.is_empty());
    }

    #[test]
    fn default_weight_is_not_projected() {
        let relation = relation_from_rule(&SceneRule::new("a", "b"));
        assert!(relation.property_values(WEIGHT_PROPERTY).is_empty());

        let relation = relation_from_rule(&SceneRule::new("a", "b").with_weight(3.0));
        let weight = relation.property_values(WEIGHT_PROPERTY)[0]
            .as_literal()
            .expect("weight is a literal");
        assert_eq!(weight.value, "3");
    }

    #[test]
    fn scenes_are_emitted_once_in_first_reference_order() {
        let rules = vec![
            SceneRule::new("b", "a"),
            SceneRule::new("a", "c"),
            SceneRule::new("c", "c"),
        ];
        let projection = project_rules(&rules);
        let ids: Vec<&str> = projection.entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "urn:story-adventure:scene:b",
                "urn:story-adventure:scene:a",
                "urn:story-adventure:scene:c",
            ]
        );
        assert_eq!(projection.relations.len(), 3);
    }

    #[test]
    fn duplicate_keys_collapse_into_first_relation() {
        let rules = vec![
            SceneRule::new("a", "b").with_weight(2.0),
            SceneRule::new("a", "b").with_weight(5.0),
        ];
        let projection = project_rules(&rules);
        assert_eq!(projection.relations.len(), 1);
        assert_eq!(
            projection.relations[0].property_values(WEIGHT_PROPERTY)[0]
                .as_literal()
                .map(|l| l.value.as_str()),
            Some("2")
        );
    }

    #[test]
    fn quads_annotate_relations_with_quoted_subject() {
        let rules = vec![SceneRule::new("a", "b")
            .with_condition(SceneRuleCondition::new("hp", ConditionOperator::Gt, 1.0))];
        let quads = project_rules(&rules).quads();
        // two type quads, one transition, one condition annotation
        assert_eq!(quads.len(), 4);
        let annotation = quads.last().expect("condition quad");
        assert_eq!(annotation.predicate, CONDITION_PROPERTY);
        assert!(matches!(annotation.subject, QuadSubject::Relation(_)));
    }
}
