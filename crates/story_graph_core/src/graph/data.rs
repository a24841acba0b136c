//! Entity and relation data exchanged with the graph editor.
//!
//! # Invariants
//! - Relations are identified by value through `RelationKey`, never by
//!   reference identity.
//! - Property bags keep insertion order per property and sorted property keys.

use crate::graph::term::Term;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Property bag keyed by property IRI.
pub type Properties = BTreeMap<String, Vec<Term>>;

/// Typed node with a stable identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityData {
    pub id: String,
    pub types: Vec<String>,
    pub properties: Properties,
}

impl EntityData {
    pub fn new(id: impl Into<String>, types: Vec<String>) -> Self {
        Self {
            id: id.into(),
            types,
            properties: Properties::new(),
        }
    }

    pub fn has_type(&self, type_iri: &str) -> bool {
        self.types.iter().any(|t| t == type_iri)
    }
}

/// Composite, value-comparable relation identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationKey {
    pub source: String,
    pub target: String,
    pub link_type: String,
}

impl RelationKey {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        link_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            link_type: link_type.into(),
        }
    }
}

impl Display for RelationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}> <{}> <{}>", self.source, self.link_type, self.target)
    }
}

/// Typed, directed relation with its property bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationData {
    pub source: String,
    pub target: String,
    pub link_type: String,
    pub properties: Properties,
}

impl RelationData {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        link_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            link_type: link_type.into(),
            properties: Properties::new(),
        }
    }

    pub fn key(&self) -> RelationKey {
        RelationKey::new(
            self.source.as_str(),
            self.target.as_str(),
            self.link_type.as_str(),
        )
    }

    /// Appends one value to `property`.
    pub fn push_property(&mut self, property: impl Into<String>, value: impl Into<Term>) {
        self.properties
            .entry(property.into())
            .or_default()
            .push(value.into());
    }

    /// Values of one property, empty when unset.
    pub fn property_values(&self, property: &str) -> &[Term] {
        self.properties
            .get(property)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
