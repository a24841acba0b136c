//! Pending authoring edits and their commit into the live graph.
//!
//! # Responsibility
//! - Model the editor's uncommitted edits as keyed tagged-union events.
//! - Apply those edits to a `GraphModel` inside one undoable batch.
//!
//! # Invariants
//! - One event per entity id and per relation key; the last edit wins.
//! - The delta is cleared exactly once per save cycle, by `commit`.

pub mod commit;
pub mod state;
