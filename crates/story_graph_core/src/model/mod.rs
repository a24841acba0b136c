//! Persisted story adventure model.
//!
//! # Responsibility
//! - Define the canonical rule list owned by the hosting application.
//! - Keep the JSON file shape in one place.
//!
//! # Invariants
//! - Scenes have no independent lifecycle; they are implied by rules.

pub mod rule;
