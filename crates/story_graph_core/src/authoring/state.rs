//! Authoring delta: uncommitted editor edits.
//!
//! Entity events are keyed by the entity id the graph knew before the edit;
//! relation events by the relation key before the edit. Recording helpers
//! collapse successive edits of one key into a single final event.

use crate::graph::data::{EntityData, RelationData, RelationKey};
use std::collections::BTreeMap;

/// Pending edit of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityEvent {
    Added {
        data: EntityData,
    },
    Changed {
        before: EntityData,
        data: EntityData,
        /// New identifier when the edit renamed the entity.
        new_iri: Option<String>,
    },
    Deleted {
        data: EntityData,
    },
}

/// Pending edit of one relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationEvent {
    Added {
        data: RelationData,
    },
    Changed {
        before: RelationData,
        data: RelationData,
    },
    Deleted {
        data: RelationData,
    },
}

/// Set of pending authoring edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthoringState {
    elements: BTreeMap<String, EntityEvent>,
    links: BTreeMap<RelationKey, RelationEvent>,
}

impl AuthoringState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.links.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.links.clear();
    }

    pub fn entity_events(&self) -> impl Iterator<Item = &EntityEvent> {
        self.elements.values()
    }

    pub fn relation_events(&self) -> impl Iterator<Item = &RelationEvent> {
        self.links.values()
    }

    pub fn entity_event(&self, iri: &str) -> Option<&EntityEvent> {
        self.elements.get(iri)
    }

    pub fn relation_event(&self, key: &RelationKey) -> Option<&RelationEvent> {
        self.links.get(key)
    }

    pub fn is_deleted_entity(&self, iri: &str) -> bool {
        matches!(self.elements.get(iri), Some(EntityEvent::Deleted { .. }))
    }

    pub fn is_deleted_relation(&self, key: &RelationKey) -> bool {
        matches!(self.links.get(key), Some(RelationEvent::Deleted { .. }))
    }

    pub fn is_new_entity(&self, iri: &str) -> bool {
        matches!(self.elements.get(iri), Some(EntityEvent::Added { .. }))
    }

    pub fn is_new_relation(&self, key: &RelationKey) -> bool {
        matches!(self.links.get(key), Some(RelationEvent::Added { .. }))
    }

    /// Entity renames as `(old id, new id)` pairs.
    pub fn entity_renames(&self) -> impl Iterator<Item = (&str, &str)> {
        self.elements.values().filter_map(|event| match event {
            EntityEvent::Changed {
                before,
                new_iri: Some(new_iri),
                ..
            } => Some((before.id.as_str(), new_iri.as_str())),
            _ => None,
        })
    }

    /// Records a newly created entity.
    pub fn add_entity(&mut self, data: EntityData) {
        let event = match self.elements.remove(&data.id) {
            Some(EntityEvent::Deleted { data: before }) => EntityEvent::Changed {
                before,
                data: data.clone(),
                new_iri: None,
            },
            _ => EntityEvent::Added { data: data.clone() },
        };
        self.elements.insert(data.id, event);
    }

    /// Records an entity edit; `new_iri` renames the entity.
    pub fn change_entity(&mut self, before: EntityData, data: EntityData, new_iri: Option<String>) {
        match self.elements.remove(&before.id) {
            Some(EntityEvent::Added { .. }) => {
                // A new entity keeps being new; only its final id matters.
                let id = new_iri.unwrap_or_else(|| before.id.clone());
                let data = EntityData { id: id.clone(), ..data };
                self.elements.insert(id, EntityEvent::Added { data });
            }
            Some(EntityEvent::Changed {
                before: original, ..
            }) => {
                let new_iri = new_iri.filter(|iri| *iri != original.id);
                self.elements.insert(
                    original.id.clone(),
                    EntityEvent::Changed {
                        before: original,
                        data,
                        new_iri,
                    },
                );
            }
            _ => {
                let new_iri = new_iri.filter(|iri| *iri != before.id);
                self.elements.insert(
                    before.id.clone(),
                    EntityEvent::Changed {
                        before,
                        data,
                        new_iri,
                    },
                );
            }
        }
    }

    /// Records an entity deletion.
    pub fn delete_entity(&mut self, data: EntityData) {
        match self.elements.remove(&data.id) {
            Some(EntityEvent::Added { .. }) => {}
            Some(EntityEvent::Changed { before, .. }) => {
                self.elements
                    .insert(before.id.clone(), EntityEvent::Deleted { data: before });
            }
            _ => {
                self.elements
                    .insert(data.id.clone(), EntityEvent::Deleted { data });
            }
        }
    }

    /// Records a newly created relation.
    pub fn add_relation(&mut self, data: RelationData) {
        let key = data.key();
        let event = match self.links.remove(&key) {
            Some(RelationEvent::Deleted { data: before }) => RelationEvent::Changed {
                before,
                data,
            },
            _ => RelationEvent::Added { data },
        };
        self.links.insert(key, event);
    }

    /// Records a relation property edit.
    pub fn change_relation(&mut self, before: RelationData, data: RelationData) {
        let key = before.key();
        match self.links.remove(&key) {
            Some(RelationEvent::Added { .. }) => {
                self.links.insert(data.key(), RelationEvent::Added { data });
            }
            Some(RelationEvent::Changed {
                before: original, ..
            }) => {
                self.links.insert(
                    key,
                    RelationEvent::Changed {
                        before: original,
                        data,
                    },
                );
            }
            _ => {
                self.links
                    .insert(key, RelationEvent::Changed { before, data });
            }
        }
    }

    /// Records a relation deletion.
    pub fn delete_relation(&mut self, data: RelationData) {
        let key = data.key();
        match self.links.remove(&key) {
            Some(RelationEvent::Added { .. }) => {}
            Some(RelationEvent::Changed { before, .. }) => {
                self.links
                    .insert(key, RelationEvent::Deleted { data: before });
            }
            _ => {
                self.links.insert(key, RelationEvent::Deleted { data });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthoringState, EntityEvent, RelationEvent};
    use crate::graph::data::{EntityData, RelationData};

    fn scene(id: &str) -> EntityData {
        EntityData::new(id, vec!["urn:story-adventure:Scene".to_string()])
    }

    #[test]
    fn change_then_delete_collapses_to_delete_of_original() {
        let mut state = AuthoringState::empty();
        let before = RelationData::new("urn:a", "urn:b", "urn:to");
        let mut edited = before.clone();
        edited.push_property("urn:w", crate::graph::term::Literal::double(2.0));

        state.change_relation(before.clone(), edited.clone());
        state.delete_relation(edited);

        assert!(state.is_deleted_relation(&before.key()));
        assert_eq!(
            state.relation_event(&before.key()),
            Some(&RelationEvent::Deleted { data: before })
        );
    }

    #[test]
    fn added_then_deleted_leaves_no_trace() {
        let mut state = AuthoringState::empty();
        state.add_entity(scene("urn:new"));
        state.delete_entity(scene("urn:new"));
        state.add_relation(RelationData::new("urn:a", "urn:b", "urn:to"));
        state.delete_relation(RelationData::new("urn:a", "urn:b", "urn:to"));
        assert!(state.is_empty());
    }

    #[test]
    fn renaming_a_new_entity_rekeys_the_addition() {
        let mut state = AuthoringState::empty();
        state.add_entity(scene("urn:scene01234"));
        state.change_entity(
            scene("urn:scene01234"),
            scene("urn:scene01234"),
            Some("urn:cellar".to_string()),
        );
        assert!(state.is_new_entity("urn:cellar"));
        assert!(state.entity_event("urn:scene01234").is_none());
        assert_eq!(state.entity_renames().count(), 0);
    }

    #[test]
    fn repeated_renames_keep_original_identity() {
        let mut state = AuthoringState::empty();
        state.change_entity(scene("urn:a"), scene("urn:a"), Some("urn:a2".to_string()));
        state.change_entity(scene("urn:a"), scene("urn:a"), Some("urn:a3".to_string()));
        let renames: Vec<(&str, &str)> = state.entity_renames().collect();
        assert_eq!(renames, vec![("urn:a", "urn:a3")]);

        state.change_entity(scene("urn:a"), scene("urn:a"), Some("urn:a".to_string()));
        assert_eq!(state.entity_renames().count(), 0);
        assert!(matches!(
            state.entity_event("urn:a"),
            Some(EntityEvent::Changed { new_iri: None, .. })
        ));
    }
}
