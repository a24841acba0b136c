//! Graph editor data and contracts.
//!
//! # Responsibility
//! - Define the entity/relation shapes exchanged with the external editor.
//! - Define the sink and live-model traits the core calls through.
//! - Provide an in-memory model implementing those traits.

pub mod data;
pub mod memory;
pub mod model;
pub mod term;
