//! RDF value model and codec
//!
//! Wrapper types over `oxrdf` for the five RDF value variants, the 4-tuple
//! [`Statement`], and the tagged string codec that maps values onto graph
//! primitives.

pub mod codec;
mod types;

pub use types::{
    BlankNode, Literal, NamedNode, RdfError, RdfResult, Resource, Statement, Term,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        let iri = NamedNode::new("http://example.org/a").unwrap();
        let term: Term = iri.clone().into();
        assert_eq!(codec::decode(&codec::encode(&term)).unwrap(), Some(term));
        let _ = Resource::from(iri);
    }
}
