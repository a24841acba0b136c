//! Transition condition codec.
//!
//! Conditions travel through the graph as single tagged literals; this module
//! owns both the strict literal grammar and the lenient form-editing path.

pub mod condition;
pub mod editor;
