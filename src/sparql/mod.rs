//! SPARQL query seam
//!
//! The adapter does not own a query engine; it exposes a [`TripleSource`]
//! over one connection and a basic evaluator for `spargebra` algebra
//! expressions. Anything the evaluator does not cover fails with
//! [`SparqlError::Unsupported`].

mod evaluator;

pub use evaluator::Evaluator;

use crate::rdf::{NamedNode, Resource, Statement, Term};
use std::collections::BTreeMap;
use thiserror::Error;

/// Query evaluation errors
#[derive(Error, Debug)]
pub enum SparqlError {
    /// Algebra construct the basic evaluator does not implement
    #[error("unsupported query algebra construct: {0}")]
    Unsupported(&'static str),

    /// Failure surfaced from the underlying triple source
    #[error("triple source error: {0}")]
    Source(String),
}

pub type SparqlResult<T> = Result<T, SparqlError>;

/// Access to statements for query evaluation, bound to one connection.
///
/// An empty context slice leaves the context position unconstrained.
pub trait TripleSource {
    fn statements(
        &self,
        subject: Option<&Resource>,
        predicate: Option<&NamedNode>,
        object: Option<&Term>,
        contexts: &[Option<Resource>],
    ) -> Result<Vec<Statement>, SparqlError>;
}

/// One row of query results: variable name → bound term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QuerySolution {
    bindings: BTreeMap<String, Term>,
}

impl QuerySolution {
    pub fn new() -> Self {
        Self::default()
    }

    /// The term bound to a variable, if any.
    pub fn get(&self, variable: &str) -> Option<&Term> {
        self.bindings.get(variable)
    }

    /// Bind a variable. Overwrites an existing binding.
    pub fn bind(&mut self, variable: impl Into<String>, term: Term) {
        self.bindings.insert(variable.into(), term);
    }

    /// Bound variable names, sorted.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_solution() {
        let mut solution = QuerySolution::new();
        assert!(solution.is_empty());

        let term: Term = NamedNode::new("http://example.org/a").unwrap().into();
        solution.bind("s", term.clone());
        assert_eq!(solution.get("s"), Some(&term));
        assert_eq!(solution.len(), 1);
        assert_eq!(solution.variables().collect::<Vec<_>>(), vec!["s"]);
    }
}
