//! Edge implementation for the property graph

use super::property::{PropertyMap, PropertyValue};
use super::types::{EdgeId, EdgeLabel, VertexId};
use serde::{Deserialize, Serialize};

/// A directed edge in the property graph
///
/// Edges have:
/// - A unique ID
/// - A source vertex (edge goes FROM this vertex)
/// - A target vertex (edge goes TO this vertex)
/// - A label
/// - Properties (key-value pairs)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,

    /// Source vertex
    pub source: VertexId,

    /// Target vertex
    pub target: VertexId,

    /// Edge label
    pub label: EdgeLabel,

    /// Properties associated with this edge
    pub properties: PropertyMap,
}

impl Edge {
    /// Create a new directed edge
    pub fn new(
        id: EdgeId,
        source: VertexId,
        target: VertexId,
        label: impl Into<EdgeLabel>,
    ) -> Self {
        Edge {
            id,
            source,
            target,
            label: label.into(),
            properties: PropertyMap::new(),
        }
    }

    /// Set a property value
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Remove a property
    pub fn remove_property(&mut self, key: &str) -> Option<PropertyValue> {
        self.properties.shift_remove(key)
    }

    /// Check if property exists
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Check if this edge goes FROM a specific vertex
    pub fn starts_from(&self, vertex: VertexId) -> bool {
        self.source == vertex
    }

    /// Check if this edge goes TO a specific vertex
    pub fn ends_at(&self, vertex: VertexId) -> bool {
        self.target == vertex
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_edge() {
        let edge = Edge::new(
            EdgeId::new(1),
            VertexId::new(1),
            VertexId::new(2),
            "http://example.org/knows",
        );

        assert_eq!(edge.id, EdgeId::new(1));
        assert_eq!(edge.source, VertexId::new(1));
        assert_eq!(edge.target, VertexId::new(2));
        assert_eq!(edge.label.as_str(), "http://example.org/knows");
    }

    #[test]
    fn test_edge_direction() {
        let edge = Edge::new(
            EdgeId::new(2),
            VertexId::new(10),
            VertexId::new(20),
            "follows",
        );

        assert!(edge.starts_from(VertexId::new(10)));
        assert!(edge.ends_at(VertexId::new(20)));
        assert!(!edge.starts_from(VertexId::new(20)));
        assert!(!edge.ends_at(VertexId::new(10)));
    }

    #[test]
    fn test_edge_properties() {
        let mut edge = Edge::new(EdgeId::new(3), VertexId::new(1), VertexId::new(2), "p");

        edge.set_property("c", "N");
        assert_eq!(edge.get_property("c").unwrap().as_string(), Some("N"));
        assert!(edge.has_property("c"));

        let removed = edge.remove_property("c");
        assert!(removed.is_some());
        assert!(!edge.has_property("c"));
    }

    #[test]
    fn test_multiple_edges_between_vertices() {
        let v1 = VertexId::new(100);
        let v2 = VertexId::new(200);

        let edge1 = Edge::new(EdgeId::new(1), v1, v2, "knows");
        let edge2 = Edge::new(EdgeId::new(2), v1, v2, "knows");

        // Same endpoints and label, still distinct edges
        assert_ne!(edge1, edge2);
    }
}
