//! The sixteen access-pattern matchers
//!
//! A pattern over (subject, predicate, object, context) is summarized by a
//! 4-bit code (s=1, p=2, o=4, c=8) with a bit set per bound position. The
//! store holds a fixed table of 16 [`Matcher`] strategies, one per code.
//! Each strategy picks an initial probe (vertex lookup, edge property
//! index, or full scan) and pairs it with a residual [`EdgeFilter`] that
//! re-verifies every bound position, so a probe may safely over-approximate.

use super::{graph_read, StoreError, StoreResult, EDGE_CONTEXT, EDGE_PREDICATE};
use crate::graph::{EdgeId, PropertyGraph, PropertyValue, SharedGraph, VertexId};
use crate::rdf::codec::SEPARATOR;

/// Bit marking a bound subject
pub const SUBJECT: u8 = 0x1;
/// Bit marking a bound predicate
pub const PREDICATE: u8 = 0x2;
/// Bit marking a bound object
pub const OBJECT: u8 = 0x4;
/// Bit marking a bound context
pub const CONTEXT: u8 = 0x8;

const POSITIONS: [(u8, char); 4] = [
    (SUBJECT, 's'),
    (PREDICATE, 'p'),
    (OBJECT, 'o'),
    (CONTEXT, 'c'),
];

/// A subset of the four statement positions, used as a composite edge
/// index key. The key `pc` names an edge property whose value is the
/// encoded predicate and context joined by the codec separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexKey(u8);

impl IndexKey {
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Parse one key, e.g. `"pc"`.
    pub fn parse(spec: &str) -> StoreResult<Self> {
        let mut bits = 0u8;
        for ch in spec.chars() {
            let bit = match ch {
                's' => SUBJECT,
                'p' => PREDICATE,
                'o' => OBJECT,
                'c' => CONTEXT,
                other => {
                    return Err(StoreError::Config(format!(
                        "unknown index position {:?} in key {:?}",
                        other, spec
                    )))
                }
            };
            if bits & bit != 0 {
                return Err(StoreError::Config(format!(
                    "duplicate index position {:?} in key {:?}",
                    ch, spec
                )));
            }
            bits |= bit;
        }
        if bits == 0 {
            return Err(StoreError::Config("empty index key".to_string()));
        }
        Ok(IndexKey(bits))
    }

    /// Parse a comma-separated key list, e.g. `"p,c,pc"`.
    pub fn parse_spec(spec: &str) -> StoreResult<Vec<IndexKey>> {
        let mut keys = Vec::new();
        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let key = Self::parse(part)?;
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    /// The edge property this key reads and writes, e.g. `"pc"`.
    pub fn property_name(&self) -> String {
        POSITIONS
            .iter()
            .filter(|(bit, _)| self.0 & bit != 0)
            .map(|(_, ch)| ch)
            .collect()
    }

    /// The composite property value for a statement whose bound positions
    /// are given in encoded form. `None` when a position this key covers
    /// is unbound.
    pub fn composite_value(&self, quad: &EncodedQuad<'_>) -> Option<String> {
        let mut out = String::new();
        for (bit, _) in POSITIONS.iter().filter(|(bit, _)| self.0 & bit != 0) {
            let part = match *bit {
                SUBJECT => quad.s?,
                PREDICATE => quad.p?,
                OBJECT => quad.o?,
                _ => quad.c?,
            };
            if !out.is_empty() {
                out.push(SEPARATOR);
            }
            out.push_str(part);
        }
        Some(out)
    }

    /// Whether this key duplicates a core edge property (`p` or `c`),
    /// which insertion writes unconditionally.
    pub fn is_core(&self) -> bool {
        self.0 == PREDICATE || self.0 == CONTEXT
    }
}

/// Encoded forms of the bound positions of one pattern or statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodedQuad<'a> {
    pub s: Option<&'a str>,
    pub p: Option<&'a str>,
    pub o: Option<&'a str>,
    pub c: Option<&'a str>,
}

/// Resolved probe inputs for one match call.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PatternArgs<'a> {
    /// Subject vertex, when the subject is bound (and exists)
    pub subject_vertex: Option<VertexId>,
    /// Object vertex, when the object is bound (and exists)
    pub object_vertex: Option<VertexId>,
    /// Encoded bound positions
    pub quad: EncodedQuad<'a>,
}

/// One access-pattern strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Enumerate every edge
    Scan,
    /// Enumerate the out-edges of the subject vertex
    SubjectVertex,
    /// Enumerate the in-edges of the object vertex
    ObjectVertex,
    /// Probe the edge property index on a composite key
    EdgeIndex(IndexKey),
}

impl Matcher {
    /// Candidate edges for the probe. The residual filter narrows these to
    /// exact matches.
    pub(crate) fn probe(&self, g: &dyn PropertyGraph, args: &PatternArgs<'_>) -> Vec<EdgeId> {
        match self {
            Matcher::Scan => g.edges(),
            Matcher::SubjectVertex => match args.subject_vertex {
                Some(v) => g.out_edges(v),
                None => Vec::new(),
            },
            Matcher::ObjectVertex => match args.object_vertex {
                Some(v) => g.in_edges(v),
                None => Vec::new(),
            },
            Matcher::EdgeIndex(key) => match key.composite_value(&args.quad) {
                Some(value) => {
                    g.edges_with_property(&key.property_name(), &PropertyValue::String(value))
                }
                None => Vec::new(),
            },
        }
    }
}

/// Build the 16-entry dispatch table. Vertex-anchored probes are preferred
/// whenever the subject or object is bound; otherwise the widest configured
/// index key covered by the bound positions is probed, falling back to a
/// filtered scan.
pub fn build_table(keys: &[IndexKey]) -> [Matcher; 16] {
    std::array::from_fn(|code| {
        let code = code as u8;
        if code & SUBJECT != 0 {
            Matcher::SubjectVertex
        } else if code & OBJECT != 0 {
            Matcher::ObjectVertex
        } else {
            keys.iter()
                .filter(|key| key.bits() & !code == 0)
                .max_by_key(|key| key.bits().count_ones())
                .map(|key| Matcher::EdgeIndex(*key))
                .unwrap_or(Matcher::Scan)
        }
    })
}

/// Residual per-candidate check covering every bound position.
#[derive(Debug, Clone, Default)]
pub(crate) struct EdgeFilter {
    pub source: Option<VertexId>,
    pub target: Option<VertexId>,
    /// Encoded predicate
    pub predicate: Option<String>,
    /// Encoded context
    pub context: Option<String>,
}

impl EdgeFilter {
    pub(crate) fn accepts(&self, g: &dyn PropertyGraph, edge: EdgeId) -> bool {
        // An edge deleted between probe and consumption simply drops out.
        let Some((source, target)) = g.edge_endpoints(edge) else {
            return false;
        };
        if let Some(s) = self.source {
            if s != source {
                return false;
            }
        }
        if let Some(t) = self.target {
            if t != target {
                return false;
            }
        }
        if let Some(p) = &self.predicate {
            if super::edge_string_property(g, edge, EDGE_PREDICATE).as_deref() != Some(p) {
                return false;
            }
        }
        if let Some(c) = &self.context {
            if super::edge_string_property(g, edge, EDGE_CONTEXT).as_deref() != Some(c) {
                return false;
            }
        }
        true
    }
}

/// Lazily drains probe candidates through the residual filter.
pub(crate) struct EdgeCursor {
    graph: SharedGraph,
    candidates: std::vec::IntoIter<EdgeId>,
    filter: EdgeFilter,
}

impl EdgeCursor {
    pub(crate) fn new(graph: SharedGraph, candidates: Vec<EdgeId>, filter: EdgeFilter) -> Self {
        Self {
            graph,
            candidates: candidates.into_iter(),
            filter,
        }
    }

    /// A cursor over nothing (e.g. a bound value with no vertex).
    pub(crate) fn empty(graph: SharedGraph) -> Self {
        Self::new(graph, Vec::new(), EdgeFilter::default())
    }

    pub(crate) fn next_edge(&mut self) -> Option<EdgeId> {
        let g = graph_read(&self.graph);
        self.candidates.by_ref().find(|id| self.filter.accepts(&*g, *id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        assert_eq!(IndexKey::parse("p").unwrap().bits(), PREDICATE);
        assert_eq!(IndexKey::parse("pc").unwrap().bits(), PREDICATE | CONTEXT);
        assert_eq!(IndexKey::parse("cp").unwrap().bits(), PREDICATE | CONTEXT);
        assert_eq!(
            IndexKey::parse("spoc").unwrap().bits(),
            SUBJECT | PREDICATE | OBJECT | CONTEXT
        );

        assert!(IndexKey::parse("").is_err());
        assert!(IndexKey::parse("pp").is_err());
        assert!(IndexKey::parse("px").is_err());
    }

    #[test]
    fn test_parse_spec_dedups() {
        let keys = IndexKey::parse_spec("p, c, pc, cp").unwrap();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_property_name_is_canonical() {
        assert_eq!(IndexKey::parse("cp").unwrap().property_name(), "pc");
        assert_eq!(IndexKey::parse("ospc").unwrap().property_name(), "spoc");
    }

    #[test]
    fn test_composite_value() {
        let key = IndexKey::parse("pc").unwrap();
        let quad = EncodedQuad {
            p: Some("U http://example.org/p"),
            c: Some("N"),
            ..EncodedQuad::default()
        };
        assert_eq!(
            key.composite_value(&quad).unwrap(),
            "U http://example.org/p N"
        );

        // Unbound covered position: no probe value
        let partial = EncodedQuad {
            p: Some("U http://example.org/p"),
            ..EncodedQuad::default()
        };
        assert_eq!(key.composite_value(&partial), None);
    }

    #[test]
    fn test_table_shape_with_default_keys() {
        let keys = IndexKey::parse_spec("p,c,pc").unwrap();
        let table = build_table(&keys);

        assert_eq!(table[0], Matcher::Scan);
        // Subject-bound patterns anchor on the subject vertex
        for code in (0..16usize).filter(|code| code & SUBJECT as usize != 0) {
            assert_eq!(table[code], Matcher::SubjectVertex, "code {:#x}", code);
        }
        // Object-bound (subject-free) patterns anchor on the object vertex
        for code in (0..16usize)
            .filter(|code| code & SUBJECT as usize == 0 && code & OBJECT as usize != 0)
        {
            assert_eq!(table[code], Matcher::ObjectVertex, "code {:#x}", code);
        }
        // The rest probe edge indexes, widest covered key first
        assert_eq!(
            table[PREDICATE as usize],
            Matcher::EdgeIndex(IndexKey::parse("p").unwrap())
        );
        assert_eq!(
            table[CONTEXT as usize],
            Matcher::EdgeIndex(IndexKey::parse("c").unwrap())
        );
        assert_eq!(
            table[(PREDICATE | CONTEXT) as usize],
            Matcher::EdgeIndex(IndexKey::parse("pc").unwrap())
        );
    }

    #[test]
    fn test_table_falls_back_to_scan_without_keys() {
        let table = build_table(&[]);
        assert_eq!(table[PREDICATE as usize], Matcher::Scan);
        assert_eq!(table[(PREDICATE | CONTEXT) as usize], Matcher::Scan);
    }
}
