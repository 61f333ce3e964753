//! Quadgraph
//!
//! An RDF triple/quad store layered over a generic property graph. All
//! persistence lives in the underlying graph; this crate supplies the
//! RDF ↔ graph encoding, a family of compound indexes turning each of the
//! 16 (s, p, o, c) access patterns into an index probe plus a residual
//! filter, and a connection-scoped transactional view with iteration
//! semantics suitable for nested query evaluation.
//!
//! # Architecture
//!
//! - `graph` — the property-graph backend: the [`PropertyGraph`] trait
//!   (vertex/edge CRUD, property-keyed lookup, optional explicit
//!   transactions) and the in-memory [`MemoryGraph`] implementation.
//! - `rdf` — the value model (wrappers over `oxrdf`) and the tagged
//!   string codec mapping values onto graph primitives.
//! - `store` — the adapter core: [`TripleStore`], the 16-entry matcher
//!   table, [`StoreConnection`], and statement iteration.
//! - `sparql` — the query seam: [`TripleSource`](sparql::TripleSource)
//!   plus a basic evaluator for `spargebra` algebra.
//!
//! # Example
//!
//! ```rust
//! use quadgraph::rdf::{Literal, NamedNode, Resource, Term};
//! use quadgraph::store::TripleStore;
//!
//! let store = TripleStore::in_memory().unwrap();
//! let mut conn = store.connection().unwrap();
//!
//! let alice: Resource = NamedNode::new("http://example.org/alice").unwrap().into();
//! let name = NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let value: Term = Literal::new_simple_literal("Alice").into();
//!
//! conn.add_statement(&alice, &name, &value, &[]).unwrap();
//! assert_eq!(conn.size(&[]).unwrap(), 1);
//!
//! let mut found = conn
//!     .get_statements(Some(&alice), None, None, false, &[])
//!     .unwrap();
//! let statements = found.collect_statements().unwrap();
//! assert_eq!(statements.len(), 1);
//! assert_eq!(statements[0].object, value);
//! ```

#![warn(clippy::all)]

pub mod graph;
pub mod rdf;
pub mod sparql;
pub mod store;

// Re-export main types for convenience
pub use graph::{GraphError, GraphResult, MemoryGraph, PropertyGraph, PropertyValue};

pub use rdf::{BlankNode, Literal, NamedNode, RdfError, Resource, Statement, Term};

pub use store::{
    Namespace, StatementIteration, StoreConfig, StoreConnection, StoreError, StoreResult,
    TripleStore,
};

pub use sparql::{QuerySolution, SparqlError, TripleSource};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.1.0");
    }
}
