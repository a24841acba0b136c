//! Authoring delta to rule list reconciliation.

pub mod engine;
