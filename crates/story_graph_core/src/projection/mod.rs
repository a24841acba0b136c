//! Quad graph projection of the rule list.

pub mod quads;
