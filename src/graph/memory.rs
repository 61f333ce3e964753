//! In-memory property-graph backend
//!
//! Hash-map storages with adjacency lists, an automatic property index on
//! every key, and optional explicit transactions backed by an undo journal.

use super::backend::{GraphError, GraphResult, PropertyGraph};
use super::edge::Edge;
use super::index::PropertyIndex;
use super::property::PropertyValue;
use super::types::{EdgeId, VertexId};
use super::vertex::Vertex;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Inverse of one mutation, replayed on abort.
#[derive(Debug)]
enum UndoOp {
    VertexAdded(VertexId),
    VertexRemoved(Vertex),
    EdgeAdded(EdgeId),
    EdgeRemoved(Edge),
    VertexPropertyChanged {
        id: VertexId,
        key: String,
        previous: Option<PropertyValue>,
    },
    EdgePropertyChanged {
        id: EdgeId,
        key: String,
        previous: Option<PropertyValue>,
    },
}

/// In-memory graph storage
///
/// Every property key is indexed automatically, so the property-keyed
/// lookups the adapter layer probes with are O(1) hash probes.
///
/// When constructed with [`MemoryGraph::transactional`], the graph records
/// an undo journal between `begin_transaction` and `commit_transaction` /
/// `abort_transaction`. One transaction may be active at a time; isolation
/// is read-uncommitted (mutations are visible to other readers of the same
/// store before commit).
#[derive(Debug, Default)]
pub struct MemoryGraph {
    vertices: FxHashMap<VertexId, Vertex>,
    edges: FxHashMap<EdgeId, Edge>,

    /// Adjacency lists
    outgoing: FxHashMap<VertexId, Vec<EdgeId>>,
    incoming: FxHashMap<VertexId, Vec<EdgeId>>,

    /// Property indexes, one per key
    vertex_indexes: FxHashMap<String, PropertyIndex<VertexId>>,
    edge_indexes: FxHashMap<String, PropertyIndex<EdgeId>>,

    next_vertex_id: u64,
    next_edge_id: u64,

    transactional: bool,
    /// `Some` while a transaction is active
    journal: Option<Vec<UndoOp>>,
}

impl MemoryGraph {
    /// Create an autocommit graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with explicit transaction support.
    pub fn transactional() -> Self {
        MemoryGraph {
            transactional: true,
            ..Self::default()
        }
    }

    fn record(&mut self, op: UndoOp) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(op);
        }
    }

    // raw record manipulation, shared by forward ops and undo replay //////

    fn insert_vertex_record(&mut self, vertex: Vertex) {
        let id = vertex.id;
        for (key, value) in &vertex.properties {
            self.vertex_indexes
                .entry(key.clone())
                .or_default()
                .insert(value.clone(), id);
        }
        self.outgoing.entry(id).or_default();
        self.incoming.entry(id).or_default();
        self.vertices.insert(id, vertex);
    }

    fn delete_vertex_record(&mut self, id: VertexId) -> GraphResult<Vertex> {
        let vertex = self
            .vertices
            .remove(&id)
            .ok_or(GraphError::VertexNotFound(id))?;
        for (key, value) in &vertex.properties {
            if let Some(index) = self.vertex_indexes.get_mut(key) {
                index.remove(value, id);
            }
        }
        self.outgoing.remove(&id);
        self.incoming.remove(&id);
        Ok(vertex)
    }

    fn insert_edge_record(&mut self, edge: Edge) {
        let id = edge.id;
        for (key, value) in &edge.properties {
            self.edge_indexes
                .entry(key.clone())
                .or_default()
                .insert(value.clone(), id);
        }
        self.outgoing.entry(edge.source).or_default().push(id);
        self.incoming.entry(edge.target).or_default().push(id);
        self.edges.insert(id, edge);
    }

    fn delete_edge_record(&mut self, id: EdgeId) -> GraphResult<Edge> {
        let edge = self.edges.remove(&id).ok_or(GraphError::EdgeNotFound(id))?;
        for (key, value) in &edge.properties {
            if let Some(index) = self.edge_indexes.get_mut(key) {
                index.remove(value, id);
            }
        }
        if let Some(out) = self.outgoing.get_mut(&edge.source) {
            out.retain(|e| *e != id);
        }
        if let Some(inc) = self.incoming.get_mut(&edge.target) {
            inc.retain(|e| *e != id);
        }
        Ok(edge)
    }

    fn set_vertex_property_record(
        &mut self,
        id: VertexId,
        key: &str,
        value: Option<PropertyValue>,
    ) -> GraphResult<Option<PropertyValue>> {
        let vertex = self
            .vertices
            .get_mut(&id)
            .ok_or(GraphError::VertexNotFound(id))?;
        let previous = match value {
            Some(value) => {
                let previous = vertex.properties.insert(key.to_string(), value.clone());
                let index = self.vertex_indexes.entry(key.to_string()).or_default();
                if let Some(old) = &previous {
                    index.remove(old, id);
                }
                index.insert(value, id);
                previous
            }
            None => {
                let previous = vertex.remove_property(key);
                if let Some(old) = &previous {
                    if let Some(index) = self.vertex_indexes.get_mut(key) {
                        index.remove(old, id);
                    }
                }
                previous
            }
        };
        Ok(previous)
    }

    fn set_edge_property_record(
        &mut self,
        id: EdgeId,
        key: &str,
        value: Option<PropertyValue>,
    ) -> GraphResult<Option<PropertyValue>> {
        let edge = self.edges.get_mut(&id).ok_or(GraphError::EdgeNotFound(id))?;
        let previous = match value {
            Some(value) => {
                let previous = edge.properties.insert(key.to_string(), value.clone());
                let index = self.edge_indexes.entry(key.to_string()).or_default();
                if let Some(old) = &previous {
                    index.remove(old, id);
                }
                index.insert(value, id);
                previous
            }
            None => {
                let previous = edge.remove_property(key);
                if let Some(old) = &previous {
                    if let Some(index) = self.edge_indexes.get_mut(key) {
                        index.remove(old, id);
                    }
                }
                previous
            }
        };
        Ok(previous)
    }

    fn undo(&mut self, op: UndoOp) {
        match op {
            UndoOp::VertexAdded(id) => {
                let _ = self.delete_vertex_record(id);
            }
            UndoOp::VertexRemoved(vertex) => {
                self.insert_vertex_record(vertex);
            }
            UndoOp::EdgeAdded(id) => {
                let _ = self.delete_edge_record(id);
            }
            UndoOp::EdgeRemoved(edge) => {
                self.insert_edge_record(edge);
            }
            UndoOp::VertexPropertyChanged { id, key, previous } => {
                let _ = self.set_vertex_property_record(id, &key, previous);
            }
            UndoOp::EdgePropertyChanged { id, key, previous } => {
                let _ = self.set_edge_property_record(id, &key, previous);
            }
        }
    }

    /// Number of vertices currently stored.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges currently stored.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl PropertyGraph for MemoryGraph {
    fn add_vertex(&mut self) -> VertexId {
        self.next_vertex_id += 1;
        let id = VertexId::new(self.next_vertex_id);
        self.insert_vertex_record(Vertex::new(id));
        self.record(UndoOp::VertexAdded(id));
        id
    }

    fn remove_vertex(&mut self, id: VertexId) -> GraphResult<()> {
        if !self.vertices.contains_key(&id) {
            return Err(GraphError::VertexNotFound(id));
        }
        // Cascade: drop incident edges first
        let mut incident: Vec<EdgeId> = self.out_edges(id);
        incident.extend(self.in_edges(id));
        incident.sort_unstable();
        incident.dedup();
        for edge_id in incident {
            let edge = self.delete_edge_record(edge_id)?;
            self.record(UndoOp::EdgeRemoved(edge));
        }
        let vertex = self.delete_vertex_record(id)?;
        self.record(UndoOp::VertexRemoved(vertex));
        Ok(())
    }

    fn set_vertex_property(
        &mut self,
        id: VertexId,
        key: &str,
        value: PropertyValue,
    ) -> GraphResult<()> {
        let previous = self.set_vertex_property_record(id, key, Some(value))?;
        self.record(UndoOp::VertexPropertyChanged {
            id,
            key: key.to_string(),
            previous,
        });
        Ok(())
    }

    fn vertex_property(&self, id: VertexId, key: &str) -> Option<PropertyValue> {
        self.vertices.get(&id)?.get_property(key).cloned()
    }

    fn remove_vertex_property(
        &mut self,
        id: VertexId,
        key: &str,
    ) -> GraphResult<Option<PropertyValue>> {
        let previous = self.set_vertex_property_record(id, key, None)?;
        if previous.is_some() {
            self.record(UndoOp::VertexPropertyChanged {
                id,
                key: key.to_string(),
                previous: previous.clone(),
            });
        }
        Ok(previous)
    }

    fn vertex_property_keys(&self, id: VertexId) -> Vec<String> {
        self.vertices
            .get(&id)
            .map(|v| v.properties.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn vertices_with_property(&self, key: &str, value: &PropertyValue) -> Vec<VertexId> {
        self.vertex_indexes
            .get(key)
            .map(|index| index.get(value))
            .unwrap_or_default()
    }

    fn add_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        label: &str,
    ) -> GraphResult<EdgeId> {
        if !self.vertices.contains_key(&source) {
            return Err(GraphError::InvalidEdgeSource(source));
        }
        if !self.vertices.contains_key(&target) {
            return Err(GraphError::InvalidEdgeTarget(target));
        }
        self.next_edge_id += 1;
        let id = EdgeId::new(self.next_edge_id);
        self.insert_edge_record(Edge::new(id, source, target, label));
        self.record(UndoOp::EdgeAdded(id));
        Ok(id)
    }

    fn remove_edge(&mut self, id: EdgeId) -> GraphResult<()> {
        let edge = self.delete_edge_record(id)?;
        self.record(UndoOp::EdgeRemoved(edge));
        Ok(())
    }

    fn set_edge_property(
        &mut self,
        id: EdgeId,
        key: &str,
        value: PropertyValue,
    ) -> GraphResult<()> {
        let previous = self.set_edge_property_record(id, key, Some(value))?;
        self.record(UndoOp::EdgePropertyChanged {
            id,
            key: key.to_string(),
            previous,
        });
        Ok(())
    }

    fn edge_property(&self, id: EdgeId, key: &str) -> Option<PropertyValue> {
        self.edges.get(&id)?.get_property(key).cloned()
    }

    fn edge_label(&self, id: EdgeId) -> Option<String> {
        self.edges.get(&id).map(|e| e.label.as_str().to_string())
    }

    fn edge_endpoints(&self, id: EdgeId) -> Option<(VertexId, VertexId)> {
        self.edges.get(&id).map(|e| (e.source, e.target))
    }

    fn out_edges(&self, id: VertexId) -> Vec<EdgeId> {
        self.outgoing.get(&id).cloned().unwrap_or_default()
    }

    fn in_edges(&self, id: VertexId) -> Vec<EdgeId> {
        self.incoming.get(&id).cloned().unwrap_or_default()
    }

    fn edges(&self) -> Vec<EdgeId> {
        self.edges.keys().copied().collect()
    }

    fn edges_with_property(&self, key: &str, value: &PropertyValue) -> Vec<EdgeId> {
        self.edge_indexes
            .get(key)
            .map(|index| index.get(value))
            .unwrap_or_default()
    }

    fn supports_transactions(&self) -> bool {
        self.transactional
    }

    fn begin_transaction(&mut self) -> GraphResult<()> {
        if !self.transactional {
            return Err(GraphError::TransactionsUnsupported);
        }
        if self.journal.is_some() {
            return Err(GraphError::TransactionActive);
        }
        debug!("beginning transaction");
        self.journal = Some(Vec::new());
        Ok(())
    }

    fn commit_transaction(&mut self) -> GraphResult<()> {
        if !self.transactional {
            return Err(GraphError::TransactionsUnsupported);
        }
        let journal = self.journal.take().ok_or(GraphError::NoTransaction)?;
        debug!("committing transaction of {} operations", journal.len());
        Ok(())
    }

    fn abort_transaction(&mut self) -> GraphResult<()> {
        if !self.transactional {
            return Err(GraphError::TransactionsUnsupported);
        }
        let journal = self.journal.take().ok_or(GraphError::NoTransaction)?;
        debug!("aborting transaction of {} operations", journal.len());
        for op in journal.into_iter().rev() {
            self.undo(op);
        }
        Ok(())
    }
}
