//! Basic algebra evaluator
//!
//! Nested-loop evaluation of BGPs with binding propagation, plus the
//! solution-level operators (Join, Union, Graph with a constant name,
//! Project, Distinct, Reduced, Slice). Blank nodes in patterns act as
//! variables scoped to the query, per SPARQL BGP semantics.

use super::{QuerySolution, SparqlError, SparqlResult, TripleSource};
use crate::rdf::{NamedNode, Resource, Statement, Term};
use rustc_hash::FxHashSet;
use spargebra::algebra::{GraphPattern, QueryDataset};
use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};

/// Evaluates algebra expressions against a [`TripleSource`].
pub struct Evaluator<'a, S: TripleSource + ?Sized> {
    source: &'a S,
}

/// One pattern position after substituting the current solution.
enum Resolved {
    Bound(Term),
    Var(String),
}

impl<'a, S: TripleSource + ?Sized> Evaluator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Evaluate `pattern` under the dataset's default-graph scope,
    /// starting from the given initial bindings.
    pub fn evaluate(
        &self,
        pattern: &GraphPattern,
        dataset: Option<&QueryDataset>,
        bindings: &QuerySolution,
    ) -> SparqlResult<Vec<QuerySolution>> {
        let scope: Vec<Option<Resource>> = match dataset {
            Some(ds) if !ds.default.is_empty() => ds
                .default
                .iter()
                .map(|n| Some(Resource::NamedNode(NamedNode::from(n.clone()))))
                .collect(),
            _ => Vec::new(),
        };
        self.eval(pattern, &scope, vec![bindings.clone()])
    }

    fn eval(
        &self,
        pattern: &GraphPattern,
        contexts: &[Option<Resource>],
        input: Vec<QuerySolution>,
    ) -> SparqlResult<Vec<QuerySolution>> {
        match pattern {
            GraphPattern::Bgp { patterns } => patterns.iter().try_fold(input, |acc, triple| {
                self.eval_triple_pattern(triple, contexts, acc)
            }),
            GraphPattern::Join { left, right } => {
                let left = self.eval(left, contexts, input)?;
                self.eval(right, contexts, left)
            }
            GraphPattern::Union { left, right } => {
                let mut out = self.eval(left, contexts, input.clone())?;
                out.extend(self.eval(right, contexts, input)?);
                Ok(out)
            }
            GraphPattern::Graph { name, inner } => match name {
                NamedNodePattern::NamedNode(n) => {
                    let scope = vec![Some(Resource::NamedNode(NamedNode::from(n.clone())))];
                    self.eval(inner, &scope, input)
                }
                NamedNodePattern::Variable(_) => {
                    // Would require named-graph enumeration, which the
                    // store does not provide.
                    Err(SparqlError::Unsupported("GRAPH with a variable name"))
                }
            },
            GraphPattern::Project { inner, variables } => {
                let solutions = self.eval(inner, contexts, input)?;
                Ok(solutions
                    .into_iter()
                    .map(|solution| {
                        let mut projected = QuerySolution::new();
                        for variable in variables {
                            if let Some(term) = solution.get(variable.as_str()) {
                                projected.bind(variable.as_str(), term.clone());
                            }
                        }
                        projected
                    })
                    .collect())
            }
            GraphPattern::Distinct { inner } | GraphPattern::Reduced { inner } => {
                let solutions = self.eval(inner, contexts, input)?;
                let mut seen = FxHashSet::default();
                Ok(solutions
                    .into_iter()
                    .filter(|solution| seen.insert(solution.clone()))
                    .collect())
            }
            GraphPattern::Slice {
                inner,
                start,
                length,
            } => {
                let solutions = self.eval(inner, contexts, input)?;
                let iter = solutions.into_iter().skip(*start);
                Ok(match length {
                    Some(length) => iter.take(*length).collect(),
                    None => iter.collect(),
                })
            }
            GraphPattern::Path { .. } => Err(SparqlError::Unsupported("property path")),
            GraphPattern::LeftJoin { .. } => Err(SparqlError::Unsupported("OPTIONAL")),
            GraphPattern::Filter { .. } => Err(SparqlError::Unsupported("FILTER")),
            GraphPattern::Extend { .. } => Err(SparqlError::Unsupported("BIND")),
            GraphPattern::Minus { .. } => Err(SparqlError::Unsupported("MINUS")),
            GraphPattern::Values { .. } => Err(SparqlError::Unsupported("VALUES")),
            GraphPattern::OrderBy { .. } => Err(SparqlError::Unsupported("ORDER BY")),
            GraphPattern::Group { .. } => Err(SparqlError::Unsupported("aggregation")),
            GraphPattern::Service { .. } => Err(SparqlError::Unsupported("SERVICE")),
        }
    }

    fn eval_triple_pattern(
        &self,
        pattern: &TriplePattern,
        contexts: &[Option<Resource>],
        input: Vec<QuerySolution>,
    ) -> SparqlResult<Vec<QuerySolution>> {
        let mut out = Vec::new();
        for solution in input {
            let subject = resolve_term(&pattern.subject, &solution)?;
            let predicate = resolve_named(&pattern.predicate, &solution)?;
            let object = resolve_term(&pattern.object, &solution)?;

            // A subject or predicate binding outside its value space
            // cannot match anything.
            let subject_value = match &subject {
                Resolved::Bound(term) => match term.as_resource() {
                    Some(resource) => Some(resource),
                    None => continue,
                },
                Resolved::Var(_) => None,
            };
            let predicate_value = match &predicate {
                Resolved::Bound(Term::NamedNode(n)) => Some(n.clone()),
                Resolved::Bound(_) => continue,
                Resolved::Var(_) => None,
            };
            let object_value = match &object {
                Resolved::Bound(term) => Some(term.clone()),
                Resolved::Var(_) => None,
            };

            let matches = self.source.statements(
                subject_value.as_ref(),
                predicate_value.as_ref(),
                object_value.as_ref(),
                contexts,
            )?;

            for statement in matches {
                if let Some(extended) =
                    extend_solution(&solution, &subject, &predicate, &object, &statement)
                {
                    out.push(extended);
                }
            }
        }
        Ok(out)
    }
}

fn resolve_term(pattern: &TermPattern, solution: &QuerySolution) -> SparqlResult<Resolved> {
    match pattern {
        TermPattern::NamedNode(n) => Ok(Resolved::Bound(NamedNode::from(n.clone()).into())),
        TermPattern::Literal(l) => Ok(Resolved::Bound(crate::rdf::Literal::from(l.clone()).into())),
        TermPattern::BlankNode(b) => {
            // Blank nodes in a BGP are existential variables
            let key = format!("_:{}", b.as_str());
            Ok(match solution.get(&key) {
                Some(term) => Resolved::Bound(term.clone()),
                None => Resolved::Var(key),
            })
        }
        TermPattern::Variable(v) => Ok(match solution.get(v.as_str()) {
            Some(term) => Resolved::Bound(term.clone()),
            None => Resolved::Var(v.as_str().to_string()),
        }),
        #[allow(unreachable_patterns)]
        _ => Err(SparqlError::Unsupported("RDF-star pattern")),
    }
}

fn resolve_named(pattern: &NamedNodePattern, solution: &QuerySolution) -> SparqlResult<Resolved> {
    match pattern {
        NamedNodePattern::NamedNode(n) => Ok(Resolved::Bound(NamedNode::from(n.clone()).into())),
        NamedNodePattern::Variable(v) => Ok(match solution.get(v.as_str()) {
            Some(term) => Resolved::Bound(term.clone()),
            None => Resolved::Var(v.as_str().to_string()),
        }),
    }
}

/// Bind the positions that were variables to the statement's values,
/// rejecting the row when one variable would need two different values
/// (e.g. `?x :p ?x`).
fn extend_solution(
    solution: &QuerySolution,
    subject: &Resolved,
    predicate: &Resolved,
    object: &Resolved,
    statement: &Statement,
) -> Option<QuerySolution> {
    let mut extended = solution.clone();
    if let Resolved::Var(key) = subject {
        if !bind_checked(&mut extended, key, Term::from(statement.subject.clone())) {
            return None;
        }
    }
    if let Resolved::Var(key) = predicate {
        if !bind_checked(&mut extended, key, Term::NamedNode(statement.predicate.clone())) {
            return None;
        }
    }
    if let Resolved::Var(key) = object {
        if !bind_checked(&mut extended, key, statement.object.clone()) {
            return None;
        }
    }
    Some(extended)
}

fn bind_checked(solution: &mut QuerySolution, key: &str, term: Term) -> bool {
    match solution.get(key) {
        Some(existing) => existing == &term,
        None => {
            solution.bind(key, term);
            true
        }
    }
}
