//! The property-graph backend interface
//!
//! The RDF adapter keeps no state of its own: every statement lives as an
//! edge, every value as a vertex, in a store implementing [`PropertyGraph`].
//! Backends with explicit transactions report `supports_transactions() ==
//! true` and get begin/commit/abort calls from the connection lifecycle;
//! autocommit backends leave the defaults in place.

use super::property::PropertyValue;
use super::types::{EdgeId, VertexId};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Vertex {0} not found")]
    VertexNotFound(VertexId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Invalid edge: source vertex {0} does not exist")]
    InvalidEdgeSource(VertexId),

    #[error("Invalid edge: target vertex {0} does not exist")]
    InvalidEdgeTarget(VertexId),

    #[error("Backend does not support explicit transactions")]
    TransactionsUnsupported,

    #[error("A transaction is already active")]
    TransactionActive,

    #[error("No active transaction")]
    NoTransaction,
}

pub type GraphResult<T> = Result<T, GraphError>;

/// A generic property graph: vertices and directed labeled edges, both with
/// key/value properties, plus property-keyed lookup on each.
///
/// Returned id collections are snapshots; callers that mutate while
/// iterating buffer ids first and tolerate ids that have since vanished.
pub trait PropertyGraph: Send + Sync {
    // vertices ////////////////////////////////////////////////////////////

    /// Create a new vertex and return its id.
    fn add_vertex(&mut self) -> VertexId;

    /// Remove a vertex and all its incident edges.
    fn remove_vertex(&mut self, id: VertexId) -> GraphResult<()>;

    fn set_vertex_property(
        &mut self,
        id: VertexId,
        key: &str,
        value: PropertyValue,
    ) -> GraphResult<()>;

    fn vertex_property(&self, id: VertexId, key: &str) -> Option<PropertyValue>;

    fn remove_vertex_property(
        &mut self,
        id: VertexId,
        key: &str,
    ) -> GraphResult<Option<PropertyValue>>;

    /// All property keys present on a vertex, in insertion order.
    fn vertex_property_keys(&self, id: VertexId) -> Vec<String>;

    /// Vertices whose property `key` equals `value`.
    fn vertices_with_property(&self, key: &str, value: &PropertyValue) -> Vec<VertexId>;

    // edges ///////////////////////////////////////////////////////////////

    /// Create a directed edge from `source` to `target`.
    fn add_edge(&mut self, source: VertexId, target: VertexId, label: &str)
        -> GraphResult<EdgeId>;

    fn remove_edge(&mut self, id: EdgeId) -> GraphResult<()>;

    fn set_edge_property(&mut self, id: EdgeId, key: &str, value: PropertyValue)
        -> GraphResult<()>;

    fn edge_property(&self, id: EdgeId, key: &str) -> Option<PropertyValue>;

    fn edge_label(&self, id: EdgeId) -> Option<String>;

    /// (source, target) of an edge, if it exists.
    fn edge_endpoints(&self, id: EdgeId) -> Option<(VertexId, VertexId)>;

    /// Edges leaving `id`.
    fn out_edges(&self, id: VertexId) -> Vec<EdgeId>;

    /// Edges arriving at `id`.
    fn in_edges(&self, id: VertexId) -> Vec<EdgeId>;

    /// Every edge in the graph.
    fn edges(&self) -> Vec<EdgeId>;

    /// Edges whose property `key` equals `value`.
    fn edges_with_property(&self, key: &str, value: &PropertyValue) -> Vec<EdgeId>;

    // transactions ////////////////////////////////////////////////////////

    /// Whether the backend wants explicit begin/commit/abort calls.
    fn supports_transactions(&self) -> bool {
        false
    }

    fn begin_transaction(&mut self) -> GraphResult<()> {
        Err(GraphError::TransactionsUnsupported)
    }

    fn commit_transaction(&mut self) -> GraphResult<()> {
        Err(GraphError::TransactionsUnsupported)
    }

    fn abort_transaction(&mut self) -> GraphResult<()> {
        Err(GraphError::TransactionsUnsupported)
    }
}

/// Shared handle to a graph backend.
///
/// A connection is single-threaded, but several connections may share one
/// backend; the lock serializes individual backend calls, never a whole
/// transaction.
pub type SharedGraph = Arc<RwLock<dyn PropertyGraph>>;

/// Wrap a backend for sharing between a store and its connections.
pub fn shared(graph: impl PropertyGraph + 'static) -> SharedGraph {
    Arc::new(RwLock::new(graph))
}
