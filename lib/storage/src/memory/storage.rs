use crate::memory::index::{
    EncodedQuad, EncodedQuadPattern, IndexComponents, MemTripleIndex,
};
use crate::memory::object_id::{EncodedObjectId, DEFAULT_CONTEXT_ID};
use crate::memory::object_id_mapping::MemObjectIdMapping;
use rdf_federation_model::{NamedNode, StatementPattern, Term, Triple};

/// The content of an embedded triple store: the term dictionary and the index permutations.
///
/// All permutations hold the same statements. A statement is a triple plus its context, so the
/// same triple may be stored once per context.
#[derive(Debug)]
pub struct MemStorage {
    /// Holds the mapping between terms and object ids.
    object_ids: MemObjectIdMapping,
    /// The index permutations. The first one is the primary index.
    indices: [MemTripleIndex; 3],
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            object_ids: MemObjectIdMapping::new(),
            indices: [
                MemTripleIndex::new(IndexComponents::SPOC),
                MemTripleIndex::new(IndexComponents::POSC),
                MemTripleIndex::new(IndexComponents::OSPC),
            ],
        }
    }

    pub fn object_ids(&self) -> &MemObjectIdMapping {
        &self.object_ids
    }

    /// Returns the number of stored statements.
    pub fn len(&self) -> usize {
        self.indices[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices[0].is_empty()
    }

    /// Inserts a statement. Returns false if it was already present.
    pub fn insert(&mut self, triple: &Triple, context: Option<&NamedNode>) -> bool {
        let Some(quad) = self.obtain_quad(triple, context) else {
            tracing::warn!(%triple, "Object id space exhausted, statement not inserted");
            return false;
        };
        if !self.indices[0].insert(&quad) {
            return false;
        }
        for index in &mut self.indices[1..] {
            index.insert(&quad);
        }
        true
    }

    /// Removes every statement matching `pattern` and returns how many were removed.
    pub fn remove_matching(&mut self, pattern: &StatementPattern) -> usize {
        if pattern.is_wildcard() {
            let count = self.len();
            self.clear();
            return count;
        }
        match self.encode_pattern(pattern) {
            Some(pattern) => self.remove_encoded(pattern),
            None => 0,
        }
    }

    /// Removes every statement of a context. `None` denotes the default context.
    pub fn clear_context(&mut self, context: Option<&NamedNode>) -> usize {
        let context = match context {
            Some(context) => self.object_ids.try_encode(&Term::NamedNode(context.clone())),
            None => Some(DEFAULT_CONTEXT_ID),
        };
        match context {
            Some(context) => self.remove_encoded(EncodedQuadPattern {
                context: Some(context),
                ..EncodedQuadPattern::default()
            }),
            None => 0,
        }
    }

    /// Removes all statements. The term dictionary is kept.
    pub fn clear(&mut self) {
        for index in &mut self.indices {
            index.clear();
        }
    }

    /// Encodes a statement pattern with the ids of its terms.
    ///
    /// Returns `None` if a term of the pattern was never stored, in which case nothing can match.
    pub fn encode_pattern(&self, pattern: &StatementPattern) -> Option<EncodedQuadPattern> {
        Some(EncodedQuadPattern {
            subject: self.try_encode_named(pattern.subject.as_ref())?,
            predicate: self.try_encode_named(pattern.predicate.as_ref())?,
            object: match &pattern.object {
                Some(object) => Some(self.object_ids.try_encode(object)?),
                None => None,
            },
            context: self.try_encode_named(pattern.context.as_ref())?,
        })
    }

    /// Scans the index permutation with the highest scan score for `pattern`.
    pub fn scan(&self, pattern: EncodedQuadPattern) -> impl Iterator<Item = EncodedQuad> + '_ {
        let mut best = &self.indices[0];
        let mut best_score = best.compute_scan_score(&pattern);
        for index in &self.indices[1..] {
            let score = index.compute_scan_score(&pattern);
            if score > best_score {
                best = index;
                best_score = score;
            }
        }
        best.scan(pattern)
    }

    /// Iterates over all statements in subject order.
    pub fn statements(&self) -> impl Iterator<Item = (Triple, Option<NamedNode>)> + '_ {
        self.indices[0]
            .iter()
            .filter_map(|quad| self.decode_quad(&quad))
    }

    pub fn decode_quad(&self, quad: &EncodedQuad) -> Option<(Triple, Option<NamedNode>)> {
        let subject = self.decode_named(quad.subject)?;
        let predicate = self.decode_named(quad.predicate)?;
        let object = self.object_ids.decode(quad.object)?.clone();
        let context = if quad.context == DEFAULT_CONTEXT_ID {
            None
        } else {
            Some(self.decode_named(quad.context)?)
        };
        Some((Triple::new(subject, predicate, object), context))
    }

    fn remove_encoded(&mut self, pattern: EncodedQuadPattern) -> usize {
        let quads = self.scan(pattern).collect::<Vec<_>>();
        for quad in &quads {
            for index in &mut self.indices {
                index.remove(quad);
            }
        }
        quads.len()
    }

    fn obtain_quad(&mut self, triple: &Triple, context: Option<&NamedNode>) -> Option<EncodedQuad> {
        Some(EncodedQuad {
            subject: self
                .object_ids
                .obtain(&Term::NamedNode(triple.subject.clone()))?,
            predicate: self
                .object_ids
                .obtain(&Term::NamedNode(triple.predicate.clone()))?,
            object: self.object_ids.obtain(&triple.object)?,
            context: match context {
                Some(context) => self.object_ids.obtain(&Term::NamedNode(context.clone()))?,
                None => DEFAULT_CONTEXT_ID,
            },
        })
    }

    /// Encodes an optional resource. The outer `None` means that the resource is unknown.
    #[allow(
        clippy::option_option,
        reason = "Distinguishes unknown terms from unbound positions"
    )]
    fn try_encode_named(&self, node: Option<&NamedNode>) -> Option<Option<EncodedObjectId>> {
        match node {
            Some(node) => Some(Some(
                self.object_ids.try_encode(&Term::NamedNode(node.clone()))?,
            )),
            None => Some(None),
        }
    }

    fn decode_named(&self, id: EncodedObjectId) -> Option<NamedNode> {
        self.object_ids.decode(id)?.as_named_node().cloned()
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}
