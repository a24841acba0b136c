//! In-memory graph model.
//!
//! # Responsibility
//! - Implement `ProjectionSink` and `GraphModel` without an external editor,
//!   for the CLI and for tests.
//! - Record each stored batch as one undoable step.
//!
//! # Invariants
//! - At most one element per entity id and one link per relation key.
//! - Renaming an entity rewrites the endpoints of links that reference it.
//! - Undo restores the graph exactly as it was before the batch opened.

use crate::graph::data::{EntityData, RelationData, RelationKey};
use crate::graph::model::{ElementId, GraphElement, GraphLink, GraphModel, LinkId, ProjectionSink};
use log::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct GraphContent {
    elements: Vec<GraphElement>,
    links: Vec<GraphLink>,
}

#[derive(Debug, Clone)]
struct StoredBatch {
    label: String,
    before: GraphContent,
}

/// Graph model kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    content: GraphContent,
    next_id: u64,
    open_batch: Option<StoredBatch>,
    history: Vec<StoredBatch>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all content and undo history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Adds one entity group and returns its element id.
    pub fn add_entity_group(&mut self, items: Vec<EntityData>) -> ElementId {
        let id = self.allocate_id("group");
        self.content.elements.push(GraphElement::Group {
            id: id.clone(),
            items,
        });
        id
    }

    /// Adds one relation group and returns its link id.
    pub fn add_relation_group(&mut self, items: Vec<RelationData>) -> LinkId {
        let id = self.allocate_id("link-group");
        self.content.links.push(GraphLink::Group {
            id: id.clone(),
            items,
        });
        id
    }

    /// Finds entity data by entity id, including inside groups.
    pub fn entity(&self, iri: &str) -> Option<&EntityData> {
        self.content.elements.iter().find_map(|element| match element {
            GraphElement::Single { data, .. } => (data.id == iri).then_some(data),
            GraphElement::Group { items, .. } => items.iter().find(|item| item.id == iri),
        })
    }

    /// Finds relation data by key, including inside groups.
    pub fn relation(&self, key: &RelationKey) -> Option<&RelationData> {
        self.content.links.iter().find_map(|link| match link {
            GraphLink::Single { data, .. } => (data.key() == *key).then_some(data),
            GraphLink::Group { items, .. } => items.iter().find(|item| item.key() == *key),
        })
    }

    pub fn element_count(&self) -> usize {
        self.content.elements.len()
    }

    pub fn link_count(&self) -> usize {
        self.content.links.len()
    }

    /// Labels of stored batches, oldest first.
    pub fn batch_labels(&self) -> Vec<&str> {
        self.history.iter().map(|batch| batch.label.as_str()).collect()
    }

    /// Reverts the most recent stored batch.
    ///
    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(batch) => {
                self.content = batch.before;
                true
            }
            None => false,
        }
    }

    fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

impl ProjectionSink for InMemoryGraph {
    fn add_entity(&mut self, entity: EntityData) {
        for element in &mut self.content.elements {
            if let GraphElement::Single { data, .. } = element {
                if data.id == entity.id {
                    *data = entity;
                    return;
                }
            }
        }
        let id = self.allocate_id("element");
        self.content
            .elements
            .push(GraphElement::Single { id, data: entity });
    }

    fn add_relation(&mut self, relation: RelationData) {
        let has_source = self.entity(&relation.source).is_some();
        let has_target = self.entity(&relation.target).is_some();
        if !has_source || !has_target {
            warn!(
                "event=relation_dropped module=graph status=error reason=missing_endpoint has_source={} has_target={}",
                has_source, has_target
            );
            return;
        }

        let key = relation.key();
        for link in &mut self.content.links {
            if let GraphLink::Single { data, .. } = link {
                if data.key() == key {
                    *data = relation;
                    return;
                }
            }
        }
        let id = self.allocate_id("link");
        self.content
            .links
            .push(GraphLink::Single { id, data: relation });
    }
}

impl GraphModel for InMemoryGraph {
    fn elements(&self) -> Vec<GraphElement> {
        self.content.elements.clone()
    }

    fn links(&self) -> Vec<GraphLink> {
        self.content.links.clone()
    }

    fn change_relation_data(&mut self, before: &RelationKey, data: RelationData) {
        for link in &mut self.content.links {
            match link {
                GraphLink::Single { data: current, .. } => {
                    if current.key() == *before {
                        *current = data;
                        return;
                    }
                }
                GraphLink::Group { items, .. } => {
                    if let Some(item) = items.iter_mut().find(|item| item.key() == *before) {
                        *item = data;
                        return;
                    }
                }
            }
        }
    }

    fn change_entity_data(&mut self, before: &str, data: EntityData) {
        let new_id = data.id.clone();
        for element in &mut self.content.elements {
            match element {
                GraphElement::Single { data: current, .. } if current.id == before => {
                    *current = data;
                    break;
                }
                GraphElement::Group { items, .. } => {
                    if let Some(item) = items.iter_mut().find(|item| item.id == before) {
                        *item = data;
                        break;
                    }
                }
                GraphElement::Single { .. } => {}
            }
        }

        if new_id == before {
            return;
        }
        let rename = |relation: &mut RelationData| {
            if relation.source == before {
                relation.source = new_id.clone();
            }
            if relation.target == before {
                relation.target = new_id.clone();
            }
        };
        for link in &mut self.content.links {
            match link {
                GraphLink::Single { data, .. } => rename(data),
                GraphLink::Group { items, .. } => items.iter_mut().for_each(&rename),
            }
        }
    }

    fn set_relation_group_items(&mut self, group: &str, next: Vec<RelationData>) {
        for link in &mut self.content.links {
            if let GraphLink::Group { id, items } = link {
                if id == group {
                    *items = next;
                    return;
                }
            }
        }
    }

    fn set_entity_group_items(&mut self, group: &str, next: Vec<EntityData>) {
        for element in &mut self.content.elements {
            if let GraphElement::Group { id, items } = element {
                if id == group {
                    *items = next;
                    return;
                }
            }
        }
    }

    fn remove_link(&mut self, link: &str) {
        self.content.links.retain(|current| current.id() != link);
    }

    fn remove_element(&mut self, element: &str) {
        self.content
            .elements
            .retain(|current| current.id() != element);
    }

    fn begin_batch(&mut self, label: &str) {
        if self.open_batch.is_some() {
            warn!("event=batch_nested module=graph status=error");
            return;
        }
        self.open_batch = Some(StoredBatch {
            label: label.to_string(),
            before: self.content.clone(),
        });
    }

    fn store_batch(&mut self) {
        match self.open_batch.take() {
            Some(batch) => self.history.push(batch),
            None => warn!("event=batch_store_without_begin module=graph status=error"),
        }
    }
}
