//! A stateful connection to the triple store
//!
//! The connection owns the open/closed lifecycle and the public statement
//! operations. Pattern queries compute the 4-bit index code from which
//! positions are bound and dispatch to the matching strategy in the
//! store's table; insertion writes the core and indexer edge properties so
//! every strategy's probe stays an index lookup.
//!
//! One connection is single-threaded. Several connections over the same
//! store see each other's effects according to the backend's isolation.

use super::iteration::StatementIteration;
use super::matcher::{EdgeCursor, EdgeFilter, EncodedQuad, PatternArgs, CONTEXT, OBJECT, PREDICATE, SUBJECT};
use super::{
    graph_read, graph_write, vertex_string_property, Namespace, StoreError, StoreInner,
    StoreResult, EDGE_CONTEXT, EDGE_PREDICATE,
};
use crate::graph::{EdgeId, GraphError, PropertyValue};
use crate::rdf::codec;
use crate::rdf::{NamedNode, RdfError, Resource, Term};
use crate::sparql::{Evaluator, QuerySolution, SparqlError, TripleSource};
use spargebra::algebra::{GraphPattern, QueryDataset};
use std::sync::Arc;
use tracing::{debug, warn};

/// A stateful session against a [`TripleStore`](super::TripleStore).
///
/// Construction begins a backend transaction when the backend uses
/// explicit transactions; `commit`/`rollback` conclude it and immediately
/// begin the next one, so callers always have a usable transaction without
/// an explicit begin. `close` (or drop) aborts uncommitted work.
pub struct StoreConnection {
    store: Arc<StoreInner>,
    open: bool,
}

impl StoreConnection {
    pub(crate) fn open(store: Arc<StoreInner>) -> StoreResult<Self> {
        if store.manual_transactions {
            graph_write(&store.graph).begin_transaction()?;
        }
        Ok(Self { store, open: true })
    }

    /// Whether the connection is still usable.
    pub fn is_open(&self) -> bool {
        self.open
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(StoreError::ConnectionClosed)
        }
    }

    /// Close the connection, aborting uncommitted work.
    pub fn close(&mut self) -> StoreResult<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        if self.store.manual_transactions {
            graph_write(&self.store.graph).abort_transaction()?;
        }
        Ok(())
    }

    /// Commit the running transaction and begin the next one.
    pub fn commit(&mut self) -> StoreResult<()> {
        self.ensure_open()?;
        if self.store.manual_transactions {
            let mut g = graph_write(&self.store.graph);
            g.commit_transaction()?;
            g.begin_transaction()?;
        }
        Ok(())
    }

    /// Abort the running transaction and begin the next one.
    pub fn rollback(&mut self) -> StoreResult<()> {
        self.ensure_open()?;
        if self.store.manual_transactions {
            let mut g = graph_write(&self.store.graph);
            g.abort_transaction()?;
            g.begin_transaction()?;
        }
        Ok(())
    }

    // statements //////////////////////////////////////////////////////////

    /// Add one statement to each target context. An empty context slice
    /// targets the single null context.
    pub fn add_statement(
        &mut self,
        subject: &Resource,
        predicate: &NamedNode,
        object: &Term,
        contexts: &[Option<Resource>],
    ) -> StoreResult<()> {
        self.ensure_open()?;

        // Set semantics: drop any identical statement first.
        if self.store.config.unique_statements {
            let null_context: [Option<Resource>; 1] = [None];
            let targets = if contexts.is_empty() {
                &null_context[..]
            } else {
                contexts
            };
            self.remove_statements(Some(subject), Some(predicate), Some(object), targets)?;
        }

        let s_enc = codec::encode_resource(subject);
        let p_enc = codec::encode_iri(predicate);
        let o_enc = codec::encode(object);
        let subject_term = Term::from(subject.clone());

        let null_context: [Option<Resource>; 1] = [None];
        let targets = if contexts.is_empty() {
            &null_context[..]
        } else {
            contexts
        };

        let mut g = graph_write(&self.store.graph);
        for context in targets {
            let c_enc = codec::encode_context(context.as_ref());

            let source = self.store.get_or_create_vertex(&mut *g, &subject_term)?;
            let target = self.store.get_or_create_vertex(&mut *g, object)?;
            let edge = g.add_edge(source, target, predicate.as_str())?;

            g.set_edge_property(edge, EDGE_PREDICATE, PropertyValue::String(p_enc.clone()))?;
            g.set_edge_property(edge, EDGE_CONTEXT, PropertyValue::String(c_enc.clone()))?;

            let quad = EncodedQuad {
                s: Some(&s_enc),
                p: Some(&p_enc),
                o: Some(&o_enc),
                c: Some(&c_enc),
            };
            for key in &self.store.indexers {
                if key.is_core() {
                    continue;
                }
                if let Some(value) = key.composite_value(&quad) {
                    g.set_edge_property(edge, &key.property_name(), PropertyValue::String(value))?;
                }
            }

            debug!(%edge, context = %c_enc, "added statement");
        }
        Ok(())
    }

    /// Remove every statement agreeing with the bound positions. Any of
    /// subject/predicate/object may be a wildcard; an empty context slice
    /// leaves the context position unconstrained.
    pub fn remove_statements(
        &mut self,
        subject: Option<&Resource>,
        predicate: Option<&NamedNode>,
        object: Option<&Term>,
        contexts: &[Option<Resource>],
    ) -> StoreResult<()> {
        self.ensure_open()?;

        // Buffer first: backends may not support removal mid-iteration.
        let mut doomed: Vec<EdgeId> = Vec::new();
        if contexts.is_empty() {
            let mut cursor = self.pattern_cursor(subject, predicate, object, None)?;
            while let Some(edge) = cursor.next_edge() {
                doomed.push(edge);
            }
        } else {
            for context in contexts {
                let mut cursor =
                    self.pattern_cursor(subject, predicate, object, Some(context.as_ref()))?;
                while let Some(edge) = cursor.next_edge() {
                    doomed.push(edge);
                }
            }
        }

        let removed = doomed.len();
        let mut g = graph_write(&self.store.graph);
        for edge in doomed {
            match g.remove_edge(edge) {
                // A context repeated in the argument list buffers the edge twice
                Err(GraphError::EdgeNotFound(_)) => {}
                result => result?,
            }
        }
        debug!(removed, "removed statements");
        Ok(())
    }

    /// Delete all statements, or all statements in the given contexts, and
    /// drop endpoint vertices left without incident edges.
    pub fn clear(&mut self, contexts: &[Option<Resource>]) -> StoreResult<()> {
        self.ensure_open()?;

        let mut doomed: Vec<EdgeId> = Vec::new();
        if contexts.is_empty() {
            let mut cursor = self.pattern_cursor(None, None, None, None)?;
            while let Some(edge) = cursor.next_edge() {
                doomed.push(edge);
            }
        } else {
            for context in contexts {
                let mut cursor = self.pattern_cursor(None, None, None, Some(context.as_ref()))?;
                while let Some(edge) = cursor.next_edge() {
                    doomed.push(edge);
                }
            }
        }

        let cleared = doomed.len();
        let mut g = graph_write(&self.store.graph);
        for edge in doomed {
            let Some((source, target)) = g.edge_endpoints(edge) else {
                continue;
            };
            match g.remove_edge(edge) {
                Err(GraphError::EdgeNotFound(_)) => continue,
                result => result?,
            }
            for vertex in [target, source] {
                if g.in_edges(vertex).is_empty() && g.out_edges(vertex).is_empty() {
                    match g.remove_vertex(vertex) {
                        // Self-loop: both endpoints are the same vertex
                        Err(GraphError::VertexNotFound(_)) => {}
                        result => result?,
                    }
                }
            }
        }
        debug!(cleared, "cleared statements");
        Ok(())
    }

    /// Enumerate the statements agreeing with the bound positions.
    ///
    /// With no contexts the context position is unconstrained; otherwise
    /// one probe per context, compounded in argument order.
    /// `include_inferred` is accepted for interface conformance and has no
    /// effect (there is no reasoner).
    pub fn get_statements(
        &self,
        subject: Option<&Resource>,
        predicate: Option<&NamedNode>,
        object: Option<&Term>,
        _include_inferred: bool,
        contexts: &[Option<Resource>],
    ) -> StoreResult<StatementIteration> {
        self.ensure_open()?;

        let cursors = if contexts.is_empty() {
            vec![self.pattern_cursor(subject, predicate, object, None)?]
        } else {
            contexts
                .iter()
                .map(|context| {
                    self.pattern_cursor(subject, predicate, object, Some(context.as_ref()))
                })
                .collect::<StoreResult<Vec<_>>>()?
        };

        Ok(StatementIteration::new(
            Arc::clone(&self.store.graph),
            cursors,
            self.store.config.volatile_iteration,
        ))
    }

    /// Number of statements, total or per context. Counts are summed per
    /// context without cross-context de-duplication.
    pub fn size(&self, contexts: &[Option<Resource>]) -> StoreResult<u64> {
        self.ensure_open()?;

        let mut count = 0u64;
        if contexts.is_empty() {
            let mut cursor = self.pattern_cursor(None, None, None, None)?;
            while cursor.next_edge().is_some() {
                count += 1;
            }
        } else {
            for context in contexts {
                let mut cursor = self.pattern_cursor(None, None, None, Some(context.as_ref()))?;
                while cursor.next_edge().is_some() {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    /// Named-graph enumeration is not provided.
    pub fn context_ids(&self) -> StoreResult<Vec<Resource>> {
        Err(StoreError::Unsupported("context_ids"))
    }

    // query evaluation ////////////////////////////////////////////////////

    /// Evaluate a query algebra expression against this connection.
    ///
    /// The connection acts as the triple source; evaluation is delegated
    /// to the basic algebra evaluator.
    pub fn evaluate(
        &self,
        pattern: &GraphPattern,
        dataset: Option<&QueryDataset>,
        bindings: &QuerySolution,
        _include_inferred: bool,
    ) -> StoreResult<Vec<QuerySolution>> {
        self.ensure_open()?;
        Evaluator::new(self)
            .evaluate(pattern, dataset, bindings)
            .map_err(|e| StoreError::Evaluation(e.to_string()))
    }

    // namespaces //////////////////////////////////////////////////////////

    /// All prefix → IRI mappings.
    pub fn namespaces(&self) -> StoreResult<Vec<Namespace>> {
        self.ensure_open()?;
        let g = graph_read(&self.store.graph);
        let holder = self.store.namespaces_vertex;
        let mut out = Vec::new();
        for key in g.vertex_property_keys(holder) {
            if key == codec::KIND {
                continue;
            }
            if let Some(iri) = vertex_string_property(&*g, holder, &key) {
                out.push(Namespace::new(key, iri));
            }
        }
        Ok(out)
    }

    /// The IRI bound to a prefix, if any.
    pub fn namespace(&self, prefix: &str) -> StoreResult<Option<String>> {
        self.ensure_open()?;
        if prefix == codec::KIND {
            return Ok(None);
        }
        let g = graph_read(&self.store.graph);
        Ok(vertex_string_property(
            &*g,
            self.store.namespaces_vertex,
            prefix,
        ))
    }

    /// Bind a prefix to a namespace IRI.
    pub fn set_namespace(&mut self, prefix: &str, iri: &str) -> StoreResult<()> {
        self.ensure_open()?;
        if prefix == codec::KIND {
            return Err(StoreError::Config(format!(
                "reserved namespace prefix {:?}",
                prefix
            )));
        }
        oxiri::Iri::parse(iri).map_err(|e| RdfError::InvalidIri(e.to_string()))?;
        graph_write(&self.store.graph).set_vertex_property(
            self.store.namespaces_vertex,
            prefix,
            PropertyValue::String(iri.to_string()),
        )?;
        Ok(())
    }

    /// Unbind a prefix.
    pub fn remove_namespace(&mut self, prefix: &str) -> StoreResult<()> {
        self.ensure_open()?;
        if prefix == codec::KIND {
            return Ok(());
        }
        graph_write(&self.store.graph)
            .remove_vertex_property(self.store.namespaces_vertex, prefix)?;
        Ok(())
    }

    /// Bulk namespace clearing is not provided.
    pub fn clear_namespaces(&mut self) -> StoreResult<()> {
        Err(StoreError::Unsupported("clear_namespaces"))
    }

    // pattern dispatch ////////////////////////////////////////////////////

    /// Resolve one pattern into a probe plus residual filter.
    ///
    /// `context`: `None` leaves the context position unconstrained;
    /// `Some(None)` binds it to the null context.
    fn pattern_cursor(
        &self,
        subject: Option<&Resource>,
        predicate: Option<&NamedNode>,
        object: Option<&Term>,
        context: Option<Option<&Resource>>,
    ) -> StoreResult<EdgeCursor> {
        let inner = &self.store;
        let g = graph_read(&inner.graph);

        // A bound value without a vertex can match nothing.
        let subject_vertex = match subject {
            Some(s) => match inner.find_vertex(&*g, &Term::from(s.clone())) {
                Some(v) => Some(v),
                None => return Ok(EdgeCursor::empty(Arc::clone(&inner.graph))),
            },
            None => None,
        };
        let object_vertex = match object {
            Some(o) => match inner.find_vertex(&*g, o) {
                Some(v) => Some(v),
                None => return Ok(EdgeCursor::empty(Arc::clone(&inner.graph))),
            },
            None => None,
        };

        let s_enc = subject.map(codec::encode_resource);
        let p_enc = predicate.map(codec::encode_iri);
        let o_enc = object.map(codec::encode);
        let c_enc = context.map(codec::encode_context);

        let mut code = 0u8;
        if subject.is_some() {
            code |= SUBJECT;
        }
        if predicate.is_some() {
            code |= PREDICATE;
        }
        if object.is_some() {
            code |= OBJECT;
        }
        if context.is_some() {
            code |= CONTEXT;
        }

        let args = PatternArgs {
            subject_vertex,
            object_vertex,
            quad: EncodedQuad {
                s: s_enc.as_deref(),
                p: p_enc.as_deref(),
                o: o_enc.as_deref(),
                c: c_enc.as_deref(),
            },
        };
        let candidates = inner.matchers[code as usize].probe(&*g, &args);
        drop(g);

        Ok(EdgeCursor::new(
            Arc::clone(&inner.graph),
            candidates,
            EdgeFilter {
                source: subject_vertex,
                target: object_vertex,
                predicate: p_enc,
                context: c_enc,
            },
        ))
    }
}

impl Drop for StoreConnection {
    fn drop(&mut self) {
        if self.open {
            self.open = false;
            if self.store.manual_transactions {
                if let Err(e) = graph_write(&self.store.graph).abort_transaction() {
                    warn!("failed to abort transaction on connection drop: {e}");
                }
            }
        }
    }
}

impl TripleSource for StoreConnection {
    fn statements(
        &self,
        subject: Option<&Resource>,
        predicate: Option<&NamedNode>,
        object: Option<&Term>,
        contexts: &[Option<Resource>],
    ) -> Result<Vec<crate::rdf::Statement>, SparqlError> {
        self.get_statements(subject, predicate, object, false, contexts)
            .and_then(|mut iteration| iteration.collect_statements())
            .map_err(|e| SparqlError::Source(e.to_string()))
    }
}
