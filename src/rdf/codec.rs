//! Encoded value strings
//!
//! Every RDF value has a compact string form used as a vertex property and
//! as a context tag on edges: a one-character kind prefix, a reserved byte,
//! then the payload. The reserved byte at position 1 currently holds the
//! separator character; payload extraction always starts at
//! [`PAYLOAD_OFFSET`], leaving the byte free for a future version or type
//! discriminator.
//!
//! The form is injective over RDF values: the prefix discriminates the five
//! variants and the null-context marker, and composite forms place the
//! datatype or language tag (neither of which can contain the separator)
//! before the lexical payload.

use super::types::{BlankNode, Literal, NamedNode, RdfError, Resource, Term};
use thiserror::Error;

/// Prefix for IRI values
pub const URI_PREFIX: char = 'U';
/// Prefix for blank nodes
pub const BLANK_NODE_PREFIX: char = 'B';
/// Prefix for plain literals
pub const PLAIN_LITERAL_PREFIX: char = 'P';
/// Prefix for datatyped literals
pub const TYPED_LITERAL_PREFIX: char = 'T';
/// Prefix for language-tagged literals
pub const LANGUAGE_TAG_LITERAL_PREFIX: char = 'L';
/// Prefix (and entire form) of the null-context marker
pub const NULL_CONTEXT_PREFIX: char = 'N';

/// Reserved byte separating prefix from payload and, in composite forms,
/// the datatype/language from the lexical value. May not appear in IRIs or
/// language tags.
pub const SEPARATOR: char = ' ';

/// Payloads start here; positions 0 and 1 are the prefix and the reserved
/// byte.
pub const PAYLOAD_OFFSET: usize = 2;

/// The encoded null context
pub const NULL_CONTEXT_NATIVE: &str = "N";

/// Vertex property holding the lexical body of the value
pub const VALUE: &str = "value";
/// Vertex property holding the value kind
pub const KIND: &str = "kind";
/// Vertex property holding a literal's datatype IRI
pub const TYPE: &str = "type";
/// Vertex property holding a literal's language tag
pub const LANGUAGE: &str = "language";

/// `kind` value for IRIs
pub const KIND_URI: &str = "uri";
/// `kind` value for literals
pub const KIND_LITERAL: &str = "literal";
/// `kind` value for blank nodes
pub const KIND_BNODE: &str = "bnode";

/// Decoder failures
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("empty encoded value")]
    Empty,

    #[error("unknown encoding prefix: {0:?}")]
    UnknownPrefix(char),

    #[error("missing separator in encoded value: {0:?}")]
    MissingSeparator(String),

    #[error("vertex is missing the {0:?} property")]
    MissingProperty(&'static str),

    #[error("unexpected value kind: {0:?}")]
    UnexpectedKind(String),

    #[error("a literal cannot be a context: {0:?}")]
    LiteralContext(String),

    #[error(transparent)]
    Value(#[from] RdfError),
}

pub type CodecResult<T> = Result<T, CodecError>;

fn tagged(prefix: char, payload: &str) -> String {
    let mut out = String::with_capacity(PAYLOAD_OFFSET + payload.len());
    out.push(prefix);
    out.push(SEPARATOR);
    out.push_str(payload);
    out
}

fn tagged2(prefix: char, head: &str, payload: &str) -> String {
    let mut out = String::with_capacity(PAYLOAD_OFFSET + head.len() + 1 + payload.len());
    out.push(prefix);
    out.push(SEPARATOR);
    out.push_str(head);
    out.push(SEPARATOR);
    out.push_str(payload);
    out
}

/// Encode a term into its tagged string form.
pub fn encode(term: &Term) -> String {
    match term {
        Term::NamedNode(n) => tagged(URI_PREFIX, n.as_str()),
        Term::BlankNode(b) => tagged(BLANK_NODE_PREFIX, b.as_str()),
        Term::Literal(l) => {
            if let Some(lang) = l.language() {
                tagged2(LANGUAGE_TAG_LITERAL_PREFIX, lang, l.value())
            } else if l.is_plain() {
                tagged(PLAIN_LITERAL_PREFIX, l.value())
            } else {
                tagged2(TYPED_LITERAL_PREFIX, l.datatype().as_str(), l.value())
            }
        }
    }
}

/// Encode an IRI (the only value admitted as predicate).
pub fn encode_iri(node: &NamedNode) -> String {
    tagged(URI_PREFIX, node.as_str())
}

/// Encode a resource (subject or named context).
pub fn encode_resource(resource: &Resource) -> String {
    match resource {
        Resource::NamedNode(n) => tagged(URI_PREFIX, n.as_str()),
        Resource::BlankNode(b) => tagged(BLANK_NODE_PREFIX, b.as_str()),
    }
}

/// Encode a context position; the null context has its own marker.
pub fn encode_context(context: Option<&Resource>) -> String {
    match context {
        Some(resource) => encode_resource(resource),
        None => NULL_CONTEXT_NATIVE.to_string(),
    }
}

/// Decode a tagged string. `Ok(None)` is the null context.
pub fn decode(encoded: &str) -> CodecResult<Option<Term>> {
    let prefix = encoded.chars().next().ok_or(CodecError::Empty)?;
    match prefix {
        URI_PREFIX => Ok(Some(NamedNode::new(payload(encoded)?)?.into())),
        BLANK_NODE_PREFIX => Ok(Some(BlankNode::from_id(payload(encoded)?)?.into())),
        PLAIN_LITERAL_PREFIX => Ok(Some(
            Literal::new_simple_literal(payload(encoded)?).into(),
        )),
        TYPED_LITERAL_PREFIX => {
            let (datatype, value) = split_payload(encoded)?;
            Ok(Some(
                Literal::new_typed_literal(value, NamedNode::new(datatype)?).into(),
            ))
        }
        LANGUAGE_TAG_LITERAL_PREFIX => {
            let (language, value) = split_payload(encoded)?;
            Ok(Some(
                Literal::new_language_tagged_literal(value, language)?.into(),
            ))
        }
        NULL_CONTEXT_PREFIX => Ok(None),
        other => Err(CodecError::UnknownPrefix(other)),
    }
}

/// Decode a context tag. `Ok(None)` is the null context.
pub fn decode_context(encoded: &str) -> CodecResult<Option<Resource>> {
    match decode(encoded)? {
        None => Ok(None),
        Some(term) => term
            .as_resource()
            .map(Some)
            .ok_or_else(|| CodecError::LiteralContext(encoded.to_string())),
    }
}

/// Reconstruct a value from the properties of its vertex.
pub fn decode_vertex(
    kind: Option<&str>,
    value: Option<&str>,
    datatype: Option<&str>,
    language: Option<&str>,
) -> CodecResult<Term> {
    let kind = kind.ok_or(CodecError::MissingProperty(KIND))?;
    let value = value.ok_or(CodecError::MissingProperty(VALUE))?;
    match kind {
        KIND_URI => Ok(NamedNode::new(value)?.into()),
        KIND_BNODE => Ok(BlankNode::from_id(value)?.into()),
        KIND_LITERAL => {
            if let Some(datatype) = datatype {
                Ok(Literal::new_typed_literal(value, NamedNode::new(datatype)?).into())
            } else if let Some(language) = language {
                Ok(Literal::new_language_tagged_literal(value, language)?.into())
            } else {
                Ok(Literal::new_simple_literal(value).into())
            }
        }
        other => Err(CodecError::UnexpectedKind(other.to_string())),
    }
}

fn payload(encoded: &str) -> CodecResult<&str> {
    encoded
        .get(PAYLOAD_OFFSET..)
        .ok_or_else(|| CodecError::MissingSeparator(encoded.to_string()))
}

fn split_payload(encoded: &str) -> CodecResult<(&str, &str)> {
    let body = payload(encoded)?;
    let at = body
        .find(SEPARATOR)
        .ok_or_else(|| CodecError::MissingSeparator(encoded.to_string()))?;
    Ok((&body[..at], &body[at + 1..]))
}
