//! Authoring metadata policy for the graph editor.
//!
//! # Responsibility
//! - Tell the editor which entities and relations may be created, edited,
//!   renamed, connected or deleted.
//! - Describe the property shapes of transition relations.
//!
//! # Invariants
//! - Only scenes and transitions are editable.
//! - New scene ids are `scene` followed by 5 decimal digits.

use crate::graph::data::EntityData;
use crate::graph::term::Literal;
use crate::vocabulary::{
    entity_iri, scene_id_from_iri, scene_iri, CONDITION_PROPERTY, RULE_CONDITION_DATATYPE,
    SCENE_TYPE, TRANSITION_TYPE, WEIGHT_PROPERTY, XSD_DOUBLE,
};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

const NEW_SCENE_ID_SPACE: u128 = 100_000;

/// What the editor may do with one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityCapabilities {
    pub can_change_iri: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

/// What the editor may do with one relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationCapabilities {
    pub can_change_type: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

/// One allowed way of connecting a source entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRule {
    pub target_types: BTreeSet<String>,
    pub in_links: Vec<String>,
    pub out_links: Vec<String>,
}

/// Expected value shape of one relation property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyShape {
    pub literal_datatype: String,
}

/// Scene authoring policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneMetadataPolicy;

impl SceneMetadataPolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn can_modify_entity(&self, entity: &EntityData) -> EntityCapabilities {
        let is_scene = entity.has_type(SCENE_TYPE);
        EntityCapabilities {
            can_change_iri: is_scene,
            can_edit: is_scene,
            can_delete: is_scene,
        }
    }

    pub fn can_modify_relation(&self, link_type: &str) -> RelationCapabilities {
        let is_transition = link_type == TRANSITION_TYPE;
        RelationCapabilities {
            can_change_type: is_transition,
            can_edit: is_transition,
            can_delete: is_transition,
        }
    }

    /// Keeps only types the editor may construct.
    pub fn filter_constructible_types<'a>(
        &self,
        types: impl IntoIterator<Item = &'a str>,
    ) -> BTreeSet<String> {
        types
            .into_iter()
            .filter(|entity_type| *entity_type == SCENE_TYPE)
            .map(str::to_string)
            .collect()
    }

    /// Creates data for a new entity of `entity_type` with a random id.
    pub fn create_entity(&self, entity_type: &str) -> EntityData {
        let id = format!(
            "scene{:05}",
            Uuid::new_v4().as_u128() % NEW_SCENE_ID_SPACE
        );
        let iri = if entity_type == SCENE_TYPE {
            scene_iri(&id)
        } else {
            entity_iri(&id)
        };
        EntityData::new(iri, vec![SCENE_TYPE.to_string()])
    }

    /// Returns allowed connections from `source` to an optional target.
    pub fn can_connect(
        &self,
        source: &EntityData,
        target: Option<&EntityData>,
        link_type: Option<&str>,
    ) -> Vec<ConnectionRule> {
        let target_ok = target.map_or(true, |target| target.has_type(SCENE_TYPE));
        let link_ok = link_type.map_or(true, |link_type| link_type == TRANSITION_TYPE);
        if !source.has_type(SCENE_TYPE) || !target_ok || !link_ok {
            return Vec::new();
        }
        vec![ConnectionRule {
            target_types: BTreeSet::from([SCENE_TYPE.to_string()]),
            in_links: vec![TRANSITION_TYPE.to_string()],
            out_links: vec![TRANSITION_TYPE.to_string()],
        }]
    }

    /// Property shapes of one relation type, keyed by property IRI.
    pub fn relation_shape(&self, link_type: &str) -> BTreeMap<String, PropertyShape> {
        let mut properties = BTreeMap::new();
        if link_type == TRANSITION_TYPE {
            properties.insert(
                WEIGHT_PROPERTY.to_string(),
                PropertyShape {
                    literal_datatype: XSD_DOUBLE.to_string(),
                },
            );
            properties.insert(
                CONDITION_PROPERTY.to_string(),
                PropertyShape {
                    literal_datatype: RULE_CONDITION_DATATYPE.to_string(),
                },
            );
        }
        properties
    }
}

/// Display names for the scene id input: one plain literal per id.
pub fn scene_names(iris: &[String]) -> Vec<Literal> {
    iris.iter()
        .map(|iri| Literal::string(scene_id_from_iri(iri)))
        .collect()
}

/// Maps edited scene names back to scene node ids.
pub fn scene_iris_from_names(names: &[Literal]) -> Vec<String> {
    names.iter().map(|name| scene_iri(&name.value)).collect()
}

#[cfg(test)]
mod tests {
    use super::{scene_iris_from_names, scene_names, SceneMetadataPolicy};
    use crate::graph::data::EntityData;
    use crate::vocabulary::{
        CONDITION_PROPERTY, RDFS_CLASS, SCENE_TYPE, TRANSITION_TYPE, WEIGHT_PROPERTY, XSD_DOUBLE,
    };
    use std::collections::BTreeSet;

    fn scene(id: &str) -> EntityData {
        EntityData::new(id, vec![SCENE_TYPE.to_string()])
    }

    #[test]
    fn only_scenes_are_editable() {
        let policy = SceneMetadataPolicy::new();
        assert!(policy.can_modify_entity(&scene("urn:a")).can_change_iri);
        let other = EntityData::new("urn:b", vec![RDFS_CLASS.to_string()]);
        let caps = policy.can_modify_entity(&other);
        assert!(!caps.can_edit && !caps.can_delete && !caps.can_change_iri);
        assert!(policy.can_modify_relation(TRANSITION_TYPE).can_edit);
        assert!(!policy.can_modify_relation("urn:other").can_delete);
    }

    #[test]
    fn created_scene_uses_prefixed_five_digit_id() {
        let policy = SceneMetadataPolicy::new();
        let entity = policy.create_entity(SCENE_TYPE);
        let id = entity
            .id
            .strip_prefix("urn:story-adventure:scene:scene")
            .expect("scene prefix");
        assert_eq!(id.len(), 5);
        assert!(id.chars().all(|c| c.is_ascii_digit()));
        assert!(entity.has_type(SCENE_TYPE));

        let other = policy.create_entity("urn:other");
        assert!(other.id.starts_with("urn:story-adventure:entity:scene"));
    }

    #[test]
    fn connections_require_scene_endpoints_and_transition_type() {
        let policy = SceneMetadataPolicy::new();
        let source = scene("urn:a");
        assert_eq!(policy.can_connect(&source, None, None).len(), 1);
        assert_eq!(
            policy
                .can_connect(&source, Some(&scene("urn:b")), Some(TRANSITION_TYPE))
                .len(),
            1
        );
        assert!(policy
            .can_connect(&source, None, Some("urn:other"))
            .is_empty());
        let class = EntityData::new("urn:c", vec![RDFS_CLASS.to_string()]);
        assert!(policy.can_connect(&class, None, None).is_empty());
    }

    #[test]
    fn transition_shape_declares_weight_and_condition() {
        let shape = SceneMetadataPolicy::new().relation_shape(TRANSITION_TYPE);
        assert_eq!(shape[WEIGHT_PROPERTY].literal_datatype, XSD_DOUBLE);
        assert!(shape.contains_key(CONDITION_PROPERTY));
        assert!(SceneMetadataPolicy::new().relation_shape("urn:x").is_empty());
        assert_eq!(
            SceneMetadataPolicy::new().filter_constructible_types([SCENE_TYPE, RDFS_CLASS]),
            BTreeSet::from([SCENE_TYPE.to_string()])
        );
    }

    #[test]
    fn scene_names_round_trip_to_iris() {
        let iris = vec!["urn:story-adventure:scene:cave".to_string()];
        let names = scene_names(&iris);
        assert_eq!(names[0].value, "cave");
        assert_eq!(scene_iris_from_names(&names), iris);
    }
}
