//! Graph property values.

use crate::vocabulary::{RULE_CONDITION_DATATYPE, XSD_DOUBLE, XSD_STRING};
use std::fmt::{Display, Formatter};

/// Typed literal value attached to an entity or relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub value: String,
    pub datatype: String,
}

impl Literal {
    pub fn new(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: datatype.into(),
        }
    }

    /// Plain `xsd:string` literal.
    pub fn string(value: impl Into<String>) -> Self {
        Self::new(value, XSD_STRING)
    }

    /// `xsd:double` literal rendered in shortest round-trip form.
    pub fn double(value: f64) -> Self {
        Self::new(value.to_string(), XSD_DOUBLE)
    }

    /// Returns whether the literal is tagged as a serialized condition.
    pub fn is_condition(&self) -> bool {
        self.datatype == RULE_CONDITION_DATATYPE
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"^^<{}>", self.value, self.datatype)
    }
}

/// Property value: either a reference to another node or a literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    NamedNode(String),
    Literal(Literal),
}

impl Term {
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(literal) => Some(literal),
            Self::NamedNode(_) => None,
        }
    }
}

impl From<Literal> for Term {
    fn from(value: Literal) -> Self {
        Self::Literal(value)
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NamedNode(iri) => write!(f, "<{iri}>"),
            Self::Literal(literal) => write!(f, "{literal}"),
        }
    }
}
