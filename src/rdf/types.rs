//! RDF value and statement definitions
//!
//! This module provides wrapper types around the oxrdf library for RDF
//! primitives, plus the 4-tuple statement stored by the adapter.

use oxrdf::vocab::xsd;
use oxrdf::{
    BlankNode as OxBlankNode, Literal as OxLiteral, NamedNode as OxNamedNode,
    Subject as OxSubject, Term as OxTerm,
};
use std::fmt;
use thiserror::Error;

/// RDF value errors
#[derive(Error, Debug)]
pub enum RdfError {
    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Invalid blank node
    #[error("Invalid blank node: {0}")]
    InvalidBlankNode(String),

    /// Invalid literal
    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),
}

pub type RdfResult<T> = Result<T, RdfError>;

/// Named node (IRI)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedNode(OxNamedNode);

impl NamedNode {
    /// Create a new named node from an IRI string
    pub fn new(iri: impl Into<String>) -> RdfResult<Self> {
        OxNamedNode::new(iri.into())
            .map(Self)
            .map_err(|e| RdfError::InvalidIri(e.to_string()))
    }

    /// Get the IRI string
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Get the inner oxrdf NamedNode
    pub fn inner(&self) -> &OxNamedNode {
        &self.0
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.as_str())
    }
}

impl From<OxNamedNode> for NamedNode {
    fn from(node: OxNamedNode) -> Self {
        Self(node)
    }
}

impl From<NamedNode> for OxNamedNode {
    fn from(node: NamedNode) -> Self {
        node.0
    }
}

/// Blank node (anonymous node)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlankNode(OxBlankNode);

impl BlankNode {
    /// Create a new blank node with a unique identifier
    pub fn new() -> Self {
        Self(OxBlankNode::default())
    }

    /// Create a blank node from a string identifier
    pub fn from_id(id: impl Into<String>) -> RdfResult<Self> {
        OxBlankNode::new(id.into())
            .map(Self)
            .map_err(|e| RdfError::InvalidBlankNode(e.to_string()))
    }

    /// Get the blank node identifier
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Get the inner oxrdf BlankNode
    pub fn inner(&self) -> &OxBlankNode {
        &self.0
    }
}

impl Default for BlankNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.as_str())
    }
}

impl From<OxBlankNode> for BlankNode {
    fn from(node: OxBlankNode) -> Self {
        Self(node)
    }
}

impl From<BlankNode> for OxBlankNode {
    fn from(node: BlankNode) -> Self {
        node.0
    }
}

/// RDF literal value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(OxLiteral);

impl Literal {
    /// Create a simple literal (plain string)
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Self(OxLiteral::new_simple_literal(value))
    }

    /// Create a literal with language tag
    pub fn new_language_tagged_literal(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> RdfResult<Self> {
        OxLiteral::new_language_tagged_literal(value, language)
            .map(Self)
            .map_err(|e| RdfError::InvalidLiteral(e.to_string()))
    }

    /// Create a typed literal
    pub fn new_typed_literal(value: impl Into<String>, datatype: NamedNode) -> Self {
        Self(OxLiteral::new_typed_literal(value, datatype.0))
    }

    /// Get the lexical value
    pub fn value(&self) -> &str {
        self.0.value()
    }

    /// Get the language tag if present
    pub fn language(&self) -> Option<&str> {
        self.0.language()
    }

    /// Get the datatype
    pub fn datatype(&self) -> NamedNode {
        NamedNode(self.0.datatype().into_owned())
    }

    /// Whether this is a plain literal: no language tag, `xsd:string` type
    pub fn is_plain(&self) -> bool {
        self.0.language().is_none() && self.0.datatype() == xsd::STRING
    }

    /// Get the inner oxrdf Literal
    pub fn inner(&self) -> &OxLiteral {
        &self.0
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(lang) = self.language() {
            write!(f, "\"{}\"@{}", self.value(), lang)
        } else if self.is_plain() {
            write!(f, "\"{}\"", self.value())
        } else {
            write!(f, "\"{}\"^^{}", self.value(), self.datatype())
        }
    }
}

impl From<OxLiteral> for Literal {
    fn from(lit: OxLiteral) -> Self {
        Self(lit)
    }
}

impl From<Literal> for OxLiteral {
    fn from(lit: Literal) -> Self {
        lit.0
    }
}

/// A resource: the value set admitted as statement subject or context
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Named node (IRI)
    NamedNode(NamedNode),
    /// Blank node
    BlankNode(BlankNode),
}

impl Resource {
    /// Check if this is a named node
    pub fn is_named_node(&self) -> bool {
        matches!(self, Resource::NamedNode(_))
    }

    /// Check if this is a blank node
    pub fn is_blank_node(&self) -> bool {
        matches!(self, Resource::BlankNode(_))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::NamedNode(n) => write!(f, "{}", n),
            Resource::BlankNode(b) => write!(f, "{}", b),
        }
    }
}

impl From<NamedNode> for Resource {
    fn from(node: NamedNode) -> Self {
        Resource::NamedNode(node)
    }
}

impl From<BlankNode> for Resource {
    fn from(node: BlankNode) -> Self {
        Resource::BlankNode(node)
    }
}

impl From<OxSubject> for Resource {
    fn from(subject: OxSubject) -> Self {
        match subject {
            OxSubject::NamedNode(n) => Resource::NamedNode(n.into()),
            OxSubject::BlankNode(b) => Resource::BlankNode(b.into()),
            #[allow(unreachable_patterns)]
            _ => panic!("RDF-star subjects are not supported"),
        }
    }
}

impl From<Resource> for OxSubject {
    fn from(resource: Resource) -> Self {
        match resource {
            Resource::NamedNode(n) => OxSubject::NamedNode(n.0),
            Resource::BlankNode(b) => OxSubject::BlankNode(b.0),
        }
    }
}

/// An RDF term: the value set admitted as statement object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// Named node (IRI)
    NamedNode(NamedNode),
    /// Blank node
    BlankNode(BlankNode),
    /// Literal value
    Literal(Literal),
}

impl Term {
    /// Check if this is a named node
    pub fn is_named_node(&self) -> bool {
        matches!(self, Term::NamedNode(_))
    }

    /// Check if this is a blank node
    pub fn is_blank_node(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    /// Check if this is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    /// View as a resource, when this term is one
    pub fn as_resource(&self) -> Option<Resource> {
        match self {
            Term::NamedNode(n) => Some(Resource::NamedNode(n.clone())),
            Term::BlankNode(b) => Some(Resource::BlankNode(b.clone())),
            Term::Literal(_) => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::NamedNode(n) => write!(f, "{}", n),
            Term::BlankNode(b) => write!(f, "{}", b),
            Term::Literal(l) => write!(f, "{}", l),
        }
    }
}

impl From<NamedNode> for Term {
    fn from(node: NamedNode) -> Self {
        Term::NamedNode(node)
    }
}

impl From<BlankNode> for Term {
    fn from(node: BlankNode) -> Self {
        Term::BlankNode(node)
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

impl From<Resource> for Term {
    fn from(resource: Resource) -> Self {
        match resource {
            Resource::NamedNode(n) => Term::NamedNode(n),
            Resource::BlankNode(b) => Term::BlankNode(b),
        }
    }
}

impl From<OxTerm> for Term {
    fn from(term: OxTerm) -> Self {
        match term {
            OxTerm::NamedNode(n) => Term::NamedNode(n.into()),
            OxTerm::BlankNode(b) => Term::BlankNode(b.into()),
            OxTerm::Literal(l) => Term::Literal(l.into()),
            #[allow(unreachable_patterns)]
            _ => panic!("RDF-star terms are not supported"),
        }
    }
}

impl From<Term> for OxTerm {
    fn from(term: Term) -> Self {
        match term {
            Term::NamedNode(n) => OxTerm::NamedNode(n.0),
            Term::BlankNode(b) => OxTerm::BlankNode(b.0),
            Term::Literal(l) => OxTerm::Literal(l.0),
        }
    }
}

/// An RDF statement: subject, predicate, object and an optional context
/// (named graph). `context == None` is the null context, which is encoded
/// and stored like any other context value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    /// Subject
    pub subject: Resource,
    /// Predicate
    pub predicate: NamedNode,
    /// Object
    pub object: Term,
    /// Context (None = null context)
    pub context: Option<Resource>,
}

impl Statement {
    /// Create a new statement
    pub fn new(
        subject: Resource,
        predicate: NamedNode,
        object: Term,
        context: Option<Resource>,
    ) -> Self {
        Self {
            subject,
            predicate,
            object,
            context,
        }
    }

    /// Check whether this statement agrees with every bound position of a
    /// pattern. Unbound (None) positions are unconstrained; for the context
    /// position, `Some(None)` matches only the null context.
    pub fn matches(
        &self,
        subject: Option<&Resource>,
        predicate: Option<&NamedNode>,
        object: Option<&Term>,
        context: Option<&Option<Resource>>,
    ) -> bool {
        if let Some(s) = subject {
            if s != &self.subject {
                return false;
            }
        }
        if let Some(p) = predicate {
            if p != &self.predicate {
                return false;
            }
        }
        if let Some(o) = object {
            if o != &self.object {
                return false;
            }
        }
        if let Some(c) = context {
            if c != &self.context {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(c) => write!(
                f,
                "{} {} {} {} .",
                self.subject, self.predicate, self.object, c
            ),
            None => write!(f, "{} {} {} .", self.subject, self.predicate, self.object),
        }
    }
}
