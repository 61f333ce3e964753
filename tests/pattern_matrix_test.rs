//! All 16 access patterns against a scan-and-filter reference
//!
//! Loads a statement set, then checks for every (statement, bound-position
//! subset) pair that the dispatched matcher returns exactly the statements
//! the reference filter admits.

use quadgraph::rdf::{BlankNode, Literal, NamedNode, Resource, Statement, Term};
use quadgraph::store::{StoreConfig, TripleStore};
use quadgraph::MemoryGraph;

const SUBJECT: u8 = 0x1;
const PREDICATE: u8 = 0x2;
const OBJECT: u8 = 0x4;
const CONTEXT: u8 = 0x8;

fn iri(s: &str) -> NamedNode {
    NamedNode::new(s).unwrap()
}

fn dataset() -> Vec<Statement> {
    let a: Resource = iri("http://example.org/a").into();
    let b: Resource = iri("http://example.org/b").into();
    let c: Resource = iri("http://example.org/c").into();
    let x: Resource = BlankNode::from_id("x").unwrap().into();
    let p1 = iri("http://example.org/p1");
    let p2 = iri("http://example.org/p2");
    let g1: Resource = iri("http://example.org/g1").into();
    let g2: Resource = iri("http://example.org/g2").into();

    vec![
        Statement::new(a.clone(), p1.clone(), Term::from(b.clone()), None),
        Statement::new(
            a.clone(),
            p1.clone(),
            Literal::new_simple_literal("v").into(),
            None,
        ),
        Statement::new(a.clone(), p2.clone(), Term::from(b.clone()), Some(g1.clone())),
        Statement::new(c.clone(), p1.clone(), Term::from(b.clone()), Some(g1.clone())),
        Statement::new(
            c.clone(),
            p2.clone(),
            Literal::new_language_tagged_literal("v", "en").unwrap().into(),
            Some(g2.clone()),
        ),
        Statement::new(x.clone(), p2.clone(), Term::from(a.clone()), None),
        Statement::new(a.clone(), p1.clone(), Term::from(b.clone()), Some(g1)),
        Statement::new(b, p1, Term::from(a), None),
    ]
}

fn sorted_display(statements: &[Statement]) -> Vec<String> {
    let mut out: Vec<String> = statements.iter().map(|st| st.to_string()).collect();
    out.sort();
    out
}

fn run_matrix(store: &TripleStore) {
    let statements = dataset();
    let mut conn = store.connection().unwrap();
    for st in &statements {
        conn.add_statement(&st.subject, &st.predicate, &st.object, &[st.context.clone()])
            .unwrap();
    }
    assert_eq!(conn.size(&[]).unwrap(), statements.len() as u64);

    for target in &statements {
        for code in 0u8..16 {
            let s = (code & SUBJECT != 0).then_some(&target.subject);
            let p = (code & PREDICATE != 0).then_some(&target.predicate);
            let o = (code & OBJECT != 0).then_some(&target.object);
            let contexts: Vec<Option<Resource>> = if code & CONTEXT != 0 {
                vec![target.context.clone()]
            } else {
                Vec::new()
            };

            let found = conn
                .get_statements(s, p, o, false, &contexts)
                .unwrap()
                .collect_statements()
                .unwrap();

            let expected: Vec<Statement> = statements
                .iter()
                .filter(|st| {
                    st.matches(s, p, o, (code & CONTEXT != 0).then(|| &target.context))
                })
                .cloned()
                .collect();

            assert!(
                !expected.is_empty(),
                "every pattern derived from a stored statement matches at least itself"
            );
            assert_eq!(
                sorted_display(&found),
                sorted_display(&expected),
                "pattern code {:#x} for target {}",
                code,
                target
            );
        }
    }
}

#[test]
fn matrix_with_default_indexes() {
    run_matrix(&TripleStore::in_memory().unwrap());
}

#[test]
fn matrix_without_edge_indexes_falls_back_to_scan() {
    let store = TripleStore::with_config(
        MemoryGraph::new(),
        StoreConfig {
            indexes: String::new(),
            ..StoreConfig::default()
        },
    )
    .unwrap();
    run_matrix(&store);
}

#[test]
fn matrix_with_wide_composite_key() {
    let store = TripleStore::with_config(
        MemoryGraph::new(),
        StoreConfig {
            indexes: "p,c,pc,spoc".to_string(),
            ..StoreConfig::default()
        },
    )
    .unwrap();
    run_matrix(&store);
}

#[test]
fn volatile_iteration_matches_stable_results() {
    let stable_store = TripleStore::in_memory().unwrap();
    let volatile_store = TripleStore::with_config(
        MemoryGraph::new(),
        StoreConfig {
            volatile_iteration: true,
            ..StoreConfig::default()
        },
    )
    .unwrap();

    for store in [&stable_store, &volatile_store] {
        let mut conn = store.connection().unwrap();
        for st in dataset() {
            conn.add_statement(&st.subject, &st.predicate, &st.object, &[st.context.clone()])
                .unwrap();
        }
    }

    let stable_conn = stable_store.connection().unwrap();
    let volatile_conn = volatile_store.connection().unwrap();
    let stable = stable_conn
        .get_statements(None, None, None, false, &[])
        .unwrap()
        .collect_statements()
        .unwrap();
    let volatile = volatile_conn
        .get_statements(None, None, None, false, &[])
        .unwrap()
        .collect_statements()
        .unwrap();
    assert_eq!(sorted_display(&stable), sorted_display(&volatile));
}
