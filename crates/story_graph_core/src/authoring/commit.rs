//! Authoring delta commit into the live graph.
//!
//! # Responsibility
//! - Apply relation changes, then relation deletions, then entity changes
//!   (including renames), then entity deletions.
//! - Remove deleted members from groups and drop groups left empty.
//! - Remove links touching a deleted entity along with that entity.
//!
//! # Invariants
//! - Every mutation happens inside one `begin_batch`/`store_batch` pair.
//! - The delta is empty when the commit returns.

use crate::authoring::state::{AuthoringState, EntityEvent, RelationEvent};
use crate::graph::data::{EntityData, RelationData};
use crate::graph::model::{GraphElement, GraphLink, GraphModel};
use log::info;

pub const COMMIT_BATCH_LABEL: &str = "Apply authoring changes";

/// Counts of graph mutations performed by one commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub relations_changed: usize,
    pub relations_removed: usize,
    pub entities_changed: usize,
    pub entities_removed: usize,
}

/// Commits all pending edits into `model` and clears `state`.
pub fn commit_authoring_state(
    model: &mut impl GraphModel,
    state: &mut AuthoringState,
) -> CommitSummary {
    let mut summary = CommitSummary::default();
    model.begin_batch(COMMIT_BATCH_LABEL);

    for event in state.relation_events() {
        if let RelationEvent::Changed { before, data } = event {
            model.change_relation_data(&before.key(), data.clone());
            summary.relations_changed += 1;
        }
    }

    for link in model.links() {
        match link {
            GraphLink::Single { id, data } => {
                if is_relation_removed(state, &data) {
                    model.remove_link(&id);
                    summary.relations_removed += 1;
                }
            }
            GraphLink::Group { id, items } => {
                let before = items.len();
                let kept: Vec<_> = items
                    .into_iter()
                    .filter(|item| !is_relation_removed(state, item))
                    .collect();
                if kept.len() == before {
                    continue;
                }
                summary.relations_removed += before - kept.len();
                if kept.is_empty() {
                    model.remove_link(&id);
                } else {
                    model.set_relation_group_items(&id, kept);
                }
            }
        }
    }

    for event in state.entity_events() {
        if let EntityEvent::Changed {
            before,
            data,
            new_iri,
        } = event
        {
            let data = match new_iri {
                Some(new_iri) => EntityData {
                    id: new_iri.clone(),
                    ..data.clone()
                },
                None => data.clone(),
            };
            model.change_entity_data(&before.id, data);
            summary.entities_changed += 1;
        }
    }

    for element in model.elements() {
        match element {
            GraphElement::Single { id, data } => {
                if state.is_deleted_entity(&data.id) {
                    model.remove_element(&id);
                    summary.entities_removed += 1;
                }
            }
            GraphElement::Group { id, items } => {
                let before = items.len();
                let kept: Vec<_> = items
                    .into_iter()
                    .filter(|item| !state.is_deleted_entity(&item.id))
                    .collect();
                if kept.len() == before {
                    continue;
                }
                summary.entities_removed += before - kept.len();
                if kept.is_empty() {
                    model.remove_element(&id);
                } else {
                    model.set_entity_group_items(&id, kept);
                }
            }
        }
    }

    state.clear();
    model.store_batch();

    info!(
        "event=authoring_committed module=authoring status=ok relations_changed={} relations_removed={} entities_changed={} entities_removed={}",
        summary.relations_changed,
        summary.relations_removed,
        summary.entities_changed,
        summary.entities_removed
    );
    summary
}

fn is_relation_removed(state: &AuthoringState, relation: &RelationData) -> bool {
    state.is_deleted_relation(&relation.key())
        || state.is_deleted_entity(&relation.source)
        || state.is_deleted_entity(&relation.target)
}
