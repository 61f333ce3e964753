//! Connection lifecycle, transactions, and iteration policies

use quadgraph::rdf::{Literal, NamedNode, Resource, Term};
use quadgraph::store::{StoreConfig, StoreError, TripleStore};
use quadgraph::MemoryGraph;

fn iri(s: &str) -> NamedNode {
    NamedNode::new(s).unwrap()
}

fn sample() -> (Resource, NamedNode, Term) {
    (
        iri("http://example.org/s").into(),
        iri("http://example.org/p"),
        Literal::new_simple_literal("v").into(),
    )
}

fn transactional_store() -> TripleStore {
    TripleStore::new(MemoryGraph::transactional()).unwrap()
}

#[test]
fn rollback_undoes_uncommitted_work() {
    let store = transactional_store();
    let mut conn = store.connection().unwrap();
    let (s, p, o) = sample();

    conn.add_statement(&s, &p, &o, &[]).unwrap();
    // Same-connection read-your-writes before commit
    assert_eq!(conn.size(&[]).unwrap(), 1);

    conn.rollback().unwrap();
    assert_eq!(conn.size(&[]).unwrap(), 0);

    // The connection stays open and usable after rollback
    conn.add_statement(&s, &p, &o, &[]).unwrap();
    conn.commit().unwrap();
    assert_eq!(conn.size(&[]).unwrap(), 1);
}

#[test]
fn committed_work_survives_rollback_and_reconnect() {
    let store = transactional_store();
    let (s, p, o) = sample();

    let mut conn = store.connection().unwrap();
    conn.add_statement(&s, &p, &o, &[]).unwrap();
    conn.commit().unwrap();
    conn.rollback().unwrap();
    assert_eq!(conn.size(&[]).unwrap(), 1);
    conn.close().unwrap();

    // P7: a later connection sees committed work
    let next = store.connection().unwrap();
    assert_eq!(next.size(&[]).unwrap(), 1);
}

#[test]
fn close_aborts_uncommitted_work() {
    let store = transactional_store();
    let (s, p, o) = sample();

    let mut conn = store.connection().unwrap();
    conn.add_statement(&s, &p, &o, &[]).unwrap();
    conn.close().unwrap();

    // P7: uncommitted work is not visible afterwards
    let next = store.connection().unwrap();
    assert_eq!(next.size(&[]).unwrap(), 0);
}

#[test]
fn drop_aborts_like_close() {
    let store = transactional_store();
    let (s, p, o) = sample();

    {
        let mut conn = store.connection().unwrap();
        conn.add_statement(&s, &p, &o, &[]).unwrap();
    }

    let next = store.connection().unwrap();
    assert_eq!(next.size(&[]).unwrap(), 0);
}

#[test]
fn operations_on_closed_connection_fail() {
    let store = TripleStore::in_memory().unwrap();
    let mut conn = store.connection().unwrap();
    let (s, p, o) = sample();

    assert!(conn.is_open());
    conn.close().unwrap();
    assert!(!conn.is_open());

    assert!(matches!(
        conn.add_statement(&s, &p, &o, &[]),
        Err(StoreError::ConnectionClosed)
    ));
    assert!(matches!(
        conn.remove_statements(None, None, None, &[]),
        Err(StoreError::ConnectionClosed)
    ));
    assert!(matches!(conn.size(&[]), Err(StoreError::ConnectionClosed)));
    assert!(matches!(
        conn.get_statements(None, None, None, false, &[]).err(),
        Some(StoreError::ConnectionClosed)
    ));
    assert!(matches!(conn.commit(), Err(StoreError::ConnectionClosed)));
    assert!(matches!(conn.rollback(), Err(StoreError::ConnectionClosed)));
    assert!(matches!(
        conn.namespaces(),
        Err(StoreError::ConnectionClosed)
    ));

    // Closing twice is fine; is_open keeps answering
    conn.close().unwrap();
    assert!(!conn.is_open());
}

#[test]
fn commit_and_rollback_are_noops_on_autocommit_backends() {
    let store = TripleStore::in_memory().unwrap();
    let mut conn = store.connection().unwrap();
    let (s, p, o) = sample();

    conn.add_statement(&s, &p, &o, &[]).unwrap();
    conn.rollback().unwrap();
    // Autocommit backend: nothing to undo
    assert_eq!(conn.size(&[]).unwrap(), 1);
    conn.commit().unwrap();
    assert_eq!(conn.size(&[]).unwrap(), 1);
}

#[test]
fn unsupported_operations_fail_fast() {
    let store = TripleStore::in_memory().unwrap();
    let mut conn = store.connection().unwrap();

    assert!(matches!(
        conn.context_ids(),
        Err(StoreError::Unsupported("context_ids"))
    ));
    assert!(matches!(
        conn.clear_namespaces(),
        Err(StoreError::Unsupported("clear_namespaces"))
    ));
}

#[test]
fn stable_iteration_yields_retainable_statements() {
    // P8
    let store = TripleStore::in_memory().unwrap();
    let mut conn = store.connection().unwrap();
    let s: Resource = iri("http://example.org/s").into();
    let p = iri("http://example.org/p");
    for n in 0..5 {
        let o: Term = Literal::new_simple_literal(format!("v{n}")).into();
        conn.add_statement(&s, &p, &o, &[]).unwrap();
    }

    let mut iteration = conn.get_statements(None, None, None, false, &[]).unwrap();
    let mut retained = Vec::new();
    while let Some(row) = iteration.next_statement() {
        retained.push(row.unwrap().into_owned());
    }
    assert_eq!(retained.len(), 5);

    // Retained statements stay equal to a fresh query
    let mut again = conn
        .get_statements(None, None, None, false, &[])
        .unwrap()
        .collect_statements()
        .unwrap();
    let mut retained_display: Vec<String> = retained.iter().map(|st| st.to_string()).collect();
    let mut again_display: Vec<String> = again.drain(..).map(|st| st.to_string()).collect();
    retained_display.sort();
    again_display.sort();
    assert_eq!(retained_display, again_display);
}

#[test]
fn volatile_iteration_rows_are_valid_until_advanced() {
    // P9
    let store = TripleStore::with_config(
        MemoryGraph::new(),
        StoreConfig {
            volatile_iteration: true,
            ..StoreConfig::default()
        },
    )
    .unwrap();
    let mut conn = store.connection().unwrap();
    let s: Resource = iri("http://example.org/s").into();
    let p = iri("http://example.org/p");
    let mut expected = Vec::new();
    for n in 0..5 {
        let o: Term = Literal::new_simple_literal(format!("v{n}")).into();
        conn.add_statement(&s, &p, &o, &[]).unwrap();
        expected.push(format!("\"v{n}\""));
    }

    let mut iteration = conn.get_statements(None, None, None, false, &[]).unwrap();
    let mut seen = Vec::new();
    while let Some(row) = iteration.next_statement() {
        // Fields must be consumed before the next advance; the borrow
        // rules enforce exactly that.
        let row = row.unwrap();
        seen.push(row.object.to_string());
    }
    seen.sort();
    expected.sort();
    assert_eq!(seen, expected);
}

#[test]
fn iteration_close_stops_enumeration() {
    let store = TripleStore::in_memory().unwrap();
    let mut conn = store.connection().unwrap();
    let (s, p, o) = sample();
    conn.add_statement(&s, &p, &o, &[]).unwrap();

    let mut iteration = conn.get_statements(None, None, None, false, &[]).unwrap();
    iteration.close();
    assert!(iteration.next_statement().is_none());
}
