//! Core type definitions for the property-graph layer

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct VertexId(pub u64);

impl VertexId {
    pub fn new(id: u64) -> Self {
        VertexId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VertexId({})", self.0)
    }
}

impl From<u64> for VertexId {
    fn from(id: u64) -> Self {
        VertexId(id)
    }
}

/// Unique identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EdgeId(pub u64);

impl EdgeId {
    pub fn new(id: u64) -> Self {
        EdgeId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

impl From<u64> for EdgeId {
    fn from(id: u64) -> Self {
        EdgeId(id)
    }
}

/// Edge label (e.g. a predicate IRI when the graph backs an RDF store)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EdgeLabel(String);

impl EdgeLabel {
    pub fn new(label: impl Into<String>) -> Self {
        EdgeLabel(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EdgeLabel {
    fn from(s: String) -> Self {
        EdgeLabel(s)
    }
}

impl From<&str> for EdgeLabel {
    fn from(s: &str) -> Self {
        EdgeLabel(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id() {
        let id = VertexId::new(42);
        assert_eq!(id.as_u64(), 42);
        assert_eq!(format!("{}", id), "VertexId(42)");

        let id2: VertexId = 100.into();
        assert_eq!(id2.as_u64(), 100);
    }

    #[test]
    fn test_edge_id() {
        let id = EdgeId::new(99);
        assert_eq!(id.as_u64(), 99);
        assert_eq!(format!("{}", id), "EdgeId(99)");
    }

    #[test]
    fn test_edge_label() {
        let label = EdgeLabel::new("http://example.org/knows");
        assert_eq!(label.as_str(), "http://example.org/knows");

        let label2: EdgeLabel = "p".into();
        assert_eq!(label2.as_str(), "p");
    }

    #[test]
    fn test_id_ordering() {
        let id1 = VertexId::new(1);
        let id2 = VertexId::new(2);
        assert!(id1 < id2);
    }
}
