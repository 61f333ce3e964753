//! Statement iteration
//!
//! Decodes edge cursors back into statements. Two policies, selected by
//! [`StoreConfig::volatile_iteration`](super::StoreConfig):
//!
//! - stable: every row is a freshly allocated [`Statement`]
//!   (`Cow::Owned`), safe for callers that retain references;
//! - volatile: rows decode into a single slot and come back borrowed
//!   (`Cow::Borrowed`); the borrow ends at the next `next_statement` call,
//!   which the `&mut self` receiver enforces at compile time.
//!
//! An iteration drains one cursor per requested context, in argument
//! order. Resources are plain ids plus an `Arc` of the graph, so closing
//! is RAII; `close` exists for callers that want to drop the candidates
//! early.

use super::matcher::EdgeCursor;
use super::{
    decode_vertex_term, edge_string_property, graph_read, StoreResult, EDGE_CONTEXT,
    EDGE_PREDICATE,
};
use crate::graph::{EdgeId, GraphError, SharedGraph};
use crate::rdf::codec::{self, CodecError};
use crate::rdf::{Statement, Term};
use std::borrow::Cow;

/// A lazy sequence of statements decoded from edges.
pub struct StatementIteration {
    graph: SharedGraph,
    cursors: Vec<EdgeCursor>,
    current: usize,
    volatile: bool,
    row: Option<Statement>,
}

impl StatementIteration {
    pub(crate) fn new(graph: SharedGraph, cursors: Vec<EdgeCursor>, volatile: bool) -> Self {
        Self {
            graph,
            cursors,
            current: 0,
            volatile,
            row: None,
        }
    }

    /// Advance to the next statement.
    ///
    /// In volatile mode the returned `Cow::Borrowed` is only valid until
    /// the next call; call `.into_owned()` to retain it.
    pub fn next_statement(&mut self) -> Option<StoreResult<Cow<'_, Statement>>> {
        let edge = loop {
            let cursor = self.cursors.get_mut(self.current)?;
            match cursor.next_edge() {
                Some(edge) => break edge,
                None => self.current += 1,
            }
        };
        match decode_edge(&self.graph, edge) {
            Ok(statement) => {
                if self.volatile {
                    let slot = self.row.insert(statement);
                    Some(Ok(Cow::Borrowed(&*slot)))
                } else {
                    Some(Ok(Cow::Owned(statement)))
                }
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Drain the iteration into owned statements.
    pub fn collect_statements(&mut self) -> StoreResult<Vec<Statement>> {
        let mut out = Vec::new();
        while let Some(statement) = self.next_statement() {
            out.push(statement?.into_owned());
        }
        Ok(out)
    }

    /// Drop the remaining candidates. Further calls yield nothing.
    pub fn close(&mut self) {
        self.cursors.clear();
        self.current = 0;
        self.row = None;
    }
}

/// Decode one edge into the statement it stores (invariant I1: out-vertex,
/// predicate property, in-vertex and context property form a complete
/// statement).
pub(crate) fn decode_edge(graph: &SharedGraph, edge: EdgeId) -> StoreResult<Statement> {
    let g = graph_read(graph);
    let (source, target) = g
        .edge_endpoints(edge)
        .ok_or(GraphError::EdgeNotFound(edge))?;

    let subject = decode_vertex_term(&*g, source)?
        .as_resource()
        .ok_or_else(|| CodecError::UnexpectedKind("literal in subject position".to_string()))?;
    let object = decode_vertex_term(&*g, target)?;

    let p_enc = edge_string_property(&*g, edge, EDGE_PREDICATE)
        .ok_or(CodecError::MissingProperty(EDGE_PREDICATE))?;
    let predicate = match codec::decode(&p_enc)? {
        Some(Term::NamedNode(n)) => n,
        _ => {
            return Err(
                CodecError::UnexpectedKind("non-IRI in predicate position".to_string()).into(),
            )
        }
    };

    let c_enc = edge_string_property(&*g, edge, EDGE_CONTEXT)
        .ok_or(CodecError::MissingProperty(EDGE_CONTEXT))?;
    let context = codec::decode_context(&c_enc)?;

    Ok(Statement::new(subject, predicate, object, context))
}
