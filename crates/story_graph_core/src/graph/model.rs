//! Graph editor contracts consumed by the core.
//!
//! # Invariants
//! - Single and grouped elements/links are explicit variants; callers never
//!   dispatch on implementation types.
//! - Mutations issued between `begin_batch` and `store_batch` form one
//!   undoable step.

use crate::graph::data::{EntityData, RelationData, RelationKey};

/// Identifier of one element (node or node group) in the live graph.
pub type ElementId = String;
/// Identifier of one link (relation or relation group) in the live graph.
pub type LinkId = String;

/// Receiver of a projected entity/relation batch.
pub trait ProjectionSink {
    fn add_entity(&mut self, entity: EntityData);
    fn add_relation(&mut self, relation: RelationData);
}

/// Element placed in the live graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphElement {
    Single { id: ElementId, data: EntityData },
    Group { id: ElementId, items: Vec<EntityData> },
}

impl GraphElement {
    pub fn id(&self) -> &str {
        match self {
            Self::Single { id, .. } | Self::Group { id, .. } => id,
        }
    }
}

/// Link placed in the live graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphLink {
    Single { id: LinkId, data: RelationData },
    Group { id: LinkId, items: Vec<RelationData> },
}

impl GraphLink {
    pub fn id(&self) -> &str {
        match self {
            Self::Single { id, .. } | Self::Group { id, .. } => id,
        }
    }
}

/// Live graph model owned by the external editor.
pub trait GraphModel {
    /// Snapshot of all elements.
    fn elements(&self) -> Vec<GraphElement>;
    /// Snapshot of all links.
    fn links(&self) -> Vec<GraphLink>;

    /// Replaces data of the relation currently identified by `before`.
    fn change_relation_data(&mut self, before: &RelationKey, data: RelationData);
    /// Replaces data of the entity currently identified by `before`; a new
    /// `data.id` renames it.
    fn change_entity_data(&mut self, before: &str, data: EntityData);

    fn set_relation_group_items(&mut self, group: &str, items: Vec<RelationData>);
    fn set_entity_group_items(&mut self, group: &str, items: Vec<EntityData>);

    fn remove_link(&mut self, link: &str);
    fn remove_element(&mut self, element: &str);

    /// Opens one undoable transaction.
    fn begin_batch(&mut self, label: &str);
    /// Closes the open transaction and records it in history.
    fn store_batch(&mut self);
}
