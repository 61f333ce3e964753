//! The RDF-over-property-graph adapter
//!
//! [`TripleStore`] owns the shared graph backend, the 16-entry matcher
//! table, the indexer set and the namespaces vertex. All reads and writes
//! go through a [`StoreConnection`] obtained from
//! [`TripleStore::connection`].

pub mod connection;
pub mod iteration;
pub mod matcher;

pub use connection::StoreConnection;
pub use iteration::StatementIteration;

use crate::graph::{
    self, GraphError, MemoryGraph, PropertyGraph, PropertyValue, SharedGraph, VertexId,
};
use crate::rdf::codec::{self, CodecError};
use crate::rdf::{RdfError, Term};
use matcher::{build_table, IndexKey, Matcher};
use std::sync::{Arc, PoisonError, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::debug;

/// Edge property holding the encoded predicate (redundant with the edge
/// label; the lookup paths probe on it)
pub const EDGE_PREDICATE: &str = "p";
/// Edge property holding the encoded context
pub const EDGE_CONTEXT: &str = "c";

/// `kind` marker of the vertex holding the namespace map
pub(crate) const KIND_NAMESPACES: &str = "namespaces";

/// Adapter errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Operation on a closed connection
    #[error("connection is closed")]
    ConnectionClosed,

    /// Operation the adapter does not provide
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    /// Invalid store configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Corrupt or unknown encoded value
    #[error(transparent)]
    Encoding(#[from] CodecError),

    /// Invalid RDF value
    #[error(transparent)]
    Value(#[from] RdfError),

    /// Failure surfaced from the graph backend
    #[error("graph backend error: {0}")]
    Backend(#[from] GraphError),

    /// Failure surfaced from the query evaluator
    #[error("query evaluation failed: {0}")]
    Evaluation(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A namespace (prefix → IRI mapping)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Prefix
    pub prefix: String,
    /// IRI
    pub iri: String,
}

impl Namespace {
    /// Create a new namespace
    pub fn new(prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            iri: iri.into(),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Enforce set semantics: adding a statement first removes any
    /// identical one in the target contexts.
    pub unique_statements: bool,

    /// Reuse a single statement slot per iteration instead of allocating
    /// one statement per row. See [`StatementIteration`].
    pub volatile_iteration: bool,

    /// Comma-separated edge index keys over the positions `s`, `p`, `o`,
    /// `c`, e.g. `"p,c,pc"`. Each key becomes an indexer writing a
    /// composite edge property on every insertion.
    pub indexes: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            unique_statements: true,
            volatile_iteration: false,
            indexes: "p,c,pc".to_string(),
        }
    }
}

/// Shared state behind every connection of one store.
pub(crate) struct StoreInner {
    pub(crate) graph: SharedGraph,
    pub(crate) config: StoreConfig,
    pub(crate) matchers: [Matcher; 16],
    pub(crate) indexers: Vec<IndexKey>,
    pub(crate) namespaces_vertex: VertexId,
    pub(crate) manual_transactions: bool,
}

/// An RDF triple/quad store persisting everything in a property graph.
pub struct TripleStore {
    inner: Arc<StoreInner>,
}

impl TripleStore {
    /// Create a store over a graph backend with the default configuration.
    pub fn new(graph: impl PropertyGraph + 'static) -> StoreResult<Self> {
        Self::with_config(graph, StoreConfig::default())
    }

    /// Create a store over a fresh in-memory graph.
    pub fn in_memory() -> StoreResult<Self> {
        Self::new(MemoryGraph::new())
    }

    /// Create a store with an explicit configuration.
    pub fn with_config(
        graph: impl PropertyGraph + 'static,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        let indexers = IndexKey::parse_spec(&config.indexes)?;
        let matchers = build_table(&indexers);
        let graph = graph::shared(graph);

        let (namespaces_vertex, manual_transactions) = {
            let mut g = graph_write(&graph);
            let manual = g.supports_transactions();
            let existing = g
                .vertices_with_property(codec::KIND, &PropertyValue::String(KIND_NAMESPACES.into()))
                .into_iter()
                .next();
            let vertex = match existing {
                Some(v) => v,
                None => {
                    let v = g.add_vertex();
                    g.set_vertex_property(
                        v,
                        codec::KIND,
                        PropertyValue::String(KIND_NAMESPACES.into()),
                    )?;
                    v
                }
            };
            (vertex, manual)
        };

        debug!(
            indexes = %config.indexes,
            unique = config.unique_statements,
            "initialized triple store"
        );

        Ok(Self {
            inner: Arc::new(StoreInner {
                graph,
                config,
                matchers,
                indexers,
                namespaces_vertex,
                manual_transactions,
            }),
        })
    }

    /// Open a connection. Begins a backend transaction when the backend
    /// uses explicit transactions.
    pub fn connection(&self) -> StoreResult<StoreConnection> {
        StoreConnection::open(Arc::clone(&self.inner))
    }

    /// The underlying graph. Mutating it directly bypasses the index
    /// maintenance the connections perform.
    pub fn graph(&self) -> SharedGraph {
        Arc::clone(&self.inner.graph)
    }
}

impl StoreInner {
    /// Look up the unique vertex carrying `term`, if any.
    ///
    /// The probe is on the lexical body alone, which is not injective
    /// across kinds (the IRI `x` and the literal `"x"` share it), so every
    /// candidate is decoded and compared for full equality.
    pub(crate) fn find_vertex(&self, g: &dyn PropertyGraph, term: &Term) -> Option<VertexId> {
        let lexical = lexical_body(term);
        g.vertices_with_property(codec::VALUE, &PropertyValue::String(lexical.to_string()))
            .into_iter()
            .find(|id| matches!(decode_vertex_term(g, *id), Ok(decoded) if decoded == *term))
    }

    /// Create the vertex for `term` with its `value`/`kind` (and literal
    /// `type`/`language`) properties.
    pub(crate) fn make_vertex(
        &self,
        g: &mut dyn PropertyGraph,
        term: &Term,
    ) -> StoreResult<VertexId> {
        let id = g.add_vertex();
        let set = |g: &mut dyn PropertyGraph, key: &str, value: &str| {
            g.set_vertex_property(id, key, PropertyValue::String(value.to_string()))
        };
        match term {
            Term::NamedNode(n) => {
                set(g, codec::VALUE, n.as_str())?;
                set(g, codec::KIND, codec::KIND_URI)?;
            }
            Term::BlankNode(b) => {
                set(g, codec::VALUE, b.as_str())?;
                set(g, codec::KIND, codec::KIND_BNODE)?;
            }
            Term::Literal(l) => {
                set(g, codec::VALUE, l.value())?;
                set(g, codec::KIND, codec::KIND_LITERAL)?;
                if let Some(language) = l.language() {
                    set(g, codec::LANGUAGE, language)?;
                } else if !l.is_plain() {
                    set(g, codec::TYPE, l.datatype().as_str())?;
                }
            }
        }
        Ok(id)
    }

    /// Find-or-create composition; idempotent within a connection.
    pub(crate) fn get_or_create_vertex(
        &self,
        g: &mut dyn PropertyGraph,
        term: &Term,
    ) -> StoreResult<VertexId> {
        match self.find_vertex(g, term) {
            Some(id) => Ok(id),
            None => self.make_vertex(g, term),
        }
    }
}

/// Lexical body stored in the `value` vertex property.
pub(crate) fn lexical_body(term: &Term) -> &str {
    match term {
        Term::NamedNode(n) => n.as_str(),
        Term::BlankNode(b) => b.as_str(),
        Term::Literal(l) => l.value(),
    }
}

/// Reconstruct the value a vertex stands for.
pub(crate) fn decode_vertex_term(g: &dyn PropertyGraph, id: VertexId) -> StoreResult<Term> {
    let kind = vertex_string_property(g, id, codec::KIND);
    let value = vertex_string_property(g, id, codec::VALUE);
    let datatype = vertex_string_property(g, id, codec::TYPE);
    let language = vertex_string_property(g, id, codec::LANGUAGE);
    Ok(codec::decode_vertex(
        kind.as_deref(),
        value.as_deref(),
        datatype.as_deref(),
        language.as_deref(),
    )?)
}

pub(crate) fn vertex_string_property(
    g: &dyn PropertyGraph,
    id: VertexId,
    key: &str,
) -> Option<String> {
    match g.vertex_property(id, key) {
        Some(PropertyValue::String(s)) => Some(s),
        _ => None,
    }
}

pub(crate) fn edge_string_property(
    g: &dyn PropertyGraph,
    id: crate::graph::EdgeId,
    key: &str,
) -> Option<String> {
    match g.edge_property(id, key) {
        Some(PropertyValue::String(s)) => Some(s),
        _ => None,
    }
}

/// Poison-tolerant read lock: a panicked writer elsewhere must not wedge
/// every later reader.
pub(crate) fn graph_read(graph: &SharedGraph) -> RwLockReadGuard<'_, dyn PropertyGraph> {
    graph.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn graph_write(graph: &SharedGraph) -> RwLockWriteGuard<'_, dyn PropertyGraph + 'static> {
    graph.write().unwrap_or_else(PoisonError::into_inner)
}
