//! Story adventure vocabulary and scene identifier mapping.
//!
//! # Responsibility
//! - Hold the namespace constants shared by projection, reconciliation and
//!   metadata policy.
//! - Map bare scene ids to graph node identifiers and back.
//!
//! # Invariants
//! - `scene_iri` is a pure function of the scene id.
//! - `scene_id_from_iri(&scene_iri(id)) == id` for every id.

/// Namespace prefix for every story adventure identifier.
pub const APP_NAMESPACE: &str = "urn:story-adventure:";
/// Entity type of scene nodes.
pub const SCENE_TYPE: &str = "urn:story-adventure:Scene";
/// Literal datatype marking serialized transition conditions.
pub const RULE_CONDITION_DATATYPE: &str = "urn:story-adventure:RuleCondition";
/// Relation property holding condition literals.
pub const CONDITION_PROPERTY: &str = "urn:story-adventure:condition";
/// Relation type of scene transitions.
pub const TRANSITION_TYPE: &str = "urn:story-adventure:to";
/// Relation property holding a non-default transition weight.
pub const WEIGHT_PROPERTY: &str = "urn:story-adventure:weight";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_CLASS: &str = "http://www.w3.org/2000/01/rdf-schema#Class";
pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

const SCENE_PREFIX: &str = "urn:story-adventure:scene:";
const ENTITY_PREFIX: &str = "urn:story-adventure:entity:";

/// Returns the stable node identifier for one scene id.
pub fn scene_iri(scene_id: &str) -> String {
    format!("{SCENE_PREFIX}{scene_id}")
}

/// Returns whether `iri` lives under the scene prefix.
pub fn is_scene_iri(iri: &str) -> bool {
    iri.starts_with(SCENE_PREFIX)
}

/// Returns the identifier for a non-scene entity created by the editor.
pub fn entity_iri(entity_id: &str) -> String {
    format!("{ENTITY_PREFIX}{entity_id}")
}

/// Recovers the bare scene id from a node identifier.
///
/// Identifiers outside the scene prefix fall back to their local name, which
/// is the segment after the last `#`, `/` or `:`.
pub fn scene_id_from_iri(iri: &str) -> &str {
    if let Some(scene_id) = iri.strip_prefix(SCENE_PREFIX) {
        return scene_id;
    }
    local_name(iri)
}

/// Returns the segment after the last `#`, `/` or `:` separator.
pub fn local_name(iri: &str) -> &str {
    match iri.rfind(['#', '/', ':']) {
        Some(index) if index + 1 < iri.len() => &iri[index + 1..],
        _ => iri,
    }
}

#[cfg(test)]
mod tests {
    use super::{entity_iri, is_scene_iri, local_name, scene_id_from_iri, scene_iri};

    #[test]
    fn scene_iri_round_trips_through_scene_id() {
        let iri = scene_iri("forest_gate");
        assert_eq!(iri, "urn:story-adventure:scene:forest_gate");
        assert_eq!(scene_id_from_iri(&iri), "forest_gate");
    }

    #[test]
    fn scene_id_keeps_inner_separators_under_scene_prefix() {
        assert_eq!(
            scene_id_from_iri("urn:story-adventure:scene:act1:intro"),
            "act1:intro"
        );
    }

    #[test]
    fn only_scene_prefixed_iris_are_scenes() {
        assert!(is_scene_iri(&scene_iri("cave")));
        assert!(!is_scene_iri(&entity_iri("cave")));
        assert!(!is_scene_iri("http://example.com/scenes#cave"));
    }

    #[test]
    fn foreign_iri_falls_back_to_local_name() {
        assert_eq!(scene_id_from_iri("http://example.com/scenes#cave"), "cave");
        assert_eq!(scene_id_from_iri("urn:story-adventure:entity:12345"), "12345");
        assert_eq!(local_name("plain"), "plain");
        assert_eq!(local_name("trailing:"), "trailing:");
    }
}
