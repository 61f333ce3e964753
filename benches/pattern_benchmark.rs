//! Pattern dispatch micro-benchmarks

use criterion::{criterion_group, criterion_main, Criterion};
use quadgraph::rdf::{Literal, NamedNode, Resource, Term};
use quadgraph::store::TripleStore;
use std::hint::black_box;

fn loaded_store(subjects: usize, predicates: usize) -> TripleStore {
    let store = TripleStore::in_memory().unwrap();
    let mut conn = store.connection().unwrap();
    for s in 0..subjects {
        let subject: Resource = NamedNode::new(format!("http://example.org/s{s}"))
            .unwrap()
            .into();
        for p in 0..predicates {
            let predicate = NamedNode::new(format!("http://example.org/p{p}")).unwrap();
            let object: Term = Literal::new_simple_literal(format!("v{s}-{p}")).into();
            conn.add_statement(&subject, &predicate, &object, &[])
                .unwrap();
        }
    }
    store
}

fn pattern_dispatch(c: &mut Criterion) {
    let store = loaded_store(100, 10);
    let conn = store.connection().unwrap();
    let subject: Resource = NamedNode::new("http://example.org/s42").unwrap().into();
    let predicate = NamedNode::new("http://example.org/p7").unwrap();

    c.bench_function("scan_count", |b| {
        b.iter(|| black_box(conn.size(&[]).unwrap()))
    });

    c.bench_function("subject_anchor", |b| {
        b.iter(|| {
            let statements = conn
                .get_statements(Some(&subject), None, None, false, &[])
                .unwrap()
                .collect_statements()
                .unwrap();
            black_box(statements.len())
        })
    });

    c.bench_function("predicate_index", |b| {
        b.iter(|| {
            let statements = conn
                .get_statements(None, Some(&predicate), None, false, &[])
                .unwrap()
                .collect_statements()
                .unwrap();
            black_box(statements.len())
        })
    });

    c.bench_function("subject_predicate", |b| {
        b.iter(|| {
            let statements = conn
                .get_statements(Some(&subject), Some(&predicate), None, false, &[])
                .unwrap()
                .collect_statements()
                .unwrap();
            black_box(statements.len())
        })
    });
}

criterion_group!(benches, pattern_dispatch);
criterion_main!(benches);
