use crate::memory::object_id::{EncodedObjectId, DEFAULT_CONTEXT_ID};
use rdf_federation_model::Term;
use rustc_hash::FxHashMap;

/// Maintains a mapping between terms and object ids in memory.
///
/// Ids are allocated with a counter that starts right after the [DEFAULT_CONTEXT_ID]. Ids are
/// never reused, even if the last statement referring to a term is deleted.
#[derive(Debug, Default)]
pub struct MemObjectIdMapping {
    /// Maps object ids to terms. The term of id `n` is stored at `n - 1`.
    id2term: Vec<Term>,
    /// Maps terms to their object id.
    term2id: FxHashMap<Term, EncodedObjectId>,
}

impl MemObjectIdMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of interned terms.
    pub fn len(&self) -> usize {
        self.id2term.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id2term.is_empty()
    }

    /// Returns the id of `term`, allocating a new one if the term is unknown.
    ///
    /// Returns `None` once the id space is exhausted.
    pub fn obtain(&mut self, term: &Term) -> Option<EncodedObjectId> {
        if let Some(id) = self.term2id.get(term) {
            return Some(*id);
        }

        let id = u32::try_from(self.id2term.len())
            .ok()
            .map(EncodedObjectId::from)
            .and_then(EncodedObjectId::next)?;
        debug_assert!(id != DEFAULT_CONTEXT_ID);
        self.id2term.push(term.clone());
        self.term2id.insert(term.clone(), id);
        Some(id)
    }

    /// Returns the id of `term` without allocating one.
    pub fn try_encode(&self, term: &Term) -> Option<EncodedObjectId> {
        self.term2id.get(term).copied()
    }

    pub fn decode(&self, id: EncodedObjectId) -> Option<&Term> {
        let index = usize::try_from(id.as_u32()).ok()?.checked_sub(1)?;
        self.id2term.get(index)
    }
}
