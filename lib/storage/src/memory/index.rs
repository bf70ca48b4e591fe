use crate::memory::object_id::EncodedObjectId;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// A component of an encoded statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexComponent {
    Subject,
    Predicate,
    Object,
    Context,
}

impl IndexComponent {
    fn letter(self) -> char {
        match self {
            IndexComponent::Subject => 'S',
            IndexComponent::Predicate => 'P',
            IndexComponent::Object => 'O',
            IndexComponent::Context => 'C',
        }
    }
}

/// The sort order of an index permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexComponents([IndexComponent; 4]);

impl IndexComponents {
    pub const SPOC: IndexComponents = IndexComponents([
        IndexComponent::Subject,
        IndexComponent::Predicate,
        IndexComponent::Object,
        IndexComponent::Context,
    ]);
    pub const POSC: IndexComponents = IndexComponents([
        IndexComponent::Predicate,
        IndexComponent::Object,
        IndexComponent::Subject,
        IndexComponent::Context,
    ]);
    pub const OSPC: IndexComponents = IndexComponents([
        IndexComponent::Object,
        IndexComponent::Subject,
        IndexComponent::Predicate,
        IndexComponent::Context,
    ]);

    pub fn inner(&self) -> &[IndexComponent; 4] {
        &self.0
    }
}

impl Display for IndexComponents {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for component in self.0 {
            write!(f, "{}", component.letter())?;
        }
        Ok(())
    }
}

/// A statement with all terms encoded as object ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EncodedQuad {
    pub subject: EncodedObjectId,
    pub predicate: EncodedObjectId,
    pub object: EncodedObjectId,
    pub context: EncodedObjectId,
}

impl EncodedQuad {
    pub fn get(&self, component: IndexComponent) -> EncodedObjectId {
        match component {
            IndexComponent::Subject => self.subject,
            IndexComponent::Predicate => self.predicate,
            IndexComponent::Object => self.object,
            IndexComponent::Context => self.context,
        }
    }
}

/// A pattern over encoded statements. `None` matches any id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EncodedQuadPattern {
    pub subject: Option<EncodedObjectId>,
    pub predicate: Option<EncodedObjectId>,
    pub object: Option<EncodedObjectId>,
    pub context: Option<EncodedObjectId>,
}

impl EncodedQuadPattern {
    pub fn get(&self, component: IndexComponent) -> Option<EncodedObjectId> {
        match component {
            IndexComponent::Subject => self.subject,
            IndexComponent::Predicate => self.predicate,
            IndexComponent::Object => self.object,
            IndexComponent::Context => self.context,
        }
    }

    pub fn matches(&self, quad: &EncodedQuad) -> bool {
        [
            IndexComponent::Subject,
            IndexComponent::Predicate,
            IndexComponent::Object,
            IndexComponent::Context,
        ]
        .into_iter()
        .all(|c| self.get(c).map_or(true, |id| id == quad.get(c)))
    }
}

/// Represents a single permutation of the statement index held in-memory. The index is sorted
/// from left to right.
///
/// Given the [IndexComponents::POSC] permutation, the index could look like this:
/// ```text
/// ?predicate  ?object  ?subject  ?context
///  ┌─────┐    ┌─────┐   ┌─────┐   ┌─────┐
///  │   1 │    │   4 │   │   4 │   │   0 │
///  ├─────┤    ├─────┤   ├─────┤   ├─────┤
///  │   1 │    │   7 │   │   7 │   │   0 │
///  ├─────┤    ├─────┤   ├─────┤   ├─────┤
///  │   2 │    │   1 │   │   1 │   │   9 │
///  ├─────┤    ├─────┤   ├─────┤   ├─────┤
///  │ ... │    │ ... │   │ ... │   │ ... │
///  └─────┘    └─────┘   └─────┘   └─────┘
/// ```
#[derive(Debug)]
pub struct MemTripleIndex {
    /// The configuration of the index.
    components: IndexComponents,
    /// The index content in the order of `components`.
    data: BTreeSet<[EncodedObjectId; 4]>,
}

impl MemTripleIndex {
    /// Creates a new, empty [MemTripleIndex].
    pub fn new(components: IndexComponents) -> Self {
        Self {
            components,
            data: BTreeSet::new(),
        }
    }

    pub fn components(&self) -> IndexComponents {
        self.components
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Inserts the quad. Returns false if it was already present.
    pub fn insert(&mut self, quad: &EncodedQuad) -> bool {
        self.data.insert(self.permute(quad))
    }

    /// Removes the quad. Returns false if it was not present.
    pub fn remove(&mut self, quad: &EncodedQuad) -> bool {
        self.data.remove(&self.permute(quad))
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Computes the "scan score" for the given `pattern`.
    ///
    /// The higher the scan score, the better is the index suited for scanning the pattern. Only
    /// the leading bound components can be used to prune the scan, and earlier components prune
    /// more.
    pub fn compute_scan_score(&self, pattern: &EncodedQuadPattern) -> usize {
        let mut score = 0;
        for (i, component) in self.components.0.iter().enumerate() {
            if pattern.get(*component).is_none() {
                break;
            }
            let potent = (self.components.0.len() - i) * 2;
            score += 2 << potent;
        }
        score
    }

    /// Returns all quads matching `pattern`.
    ///
    /// The leading bound components of the pattern restrict the scanned range. All other
    /// components are checked for each quad of the range.
    pub fn scan(&self, pattern: EncodedQuadPattern) -> impl Iterator<Item = EncodedQuad> + '_ {
        let mut lower = [EncodedObjectId::MIN; 4];
        let mut upper = [EncodedObjectId::MAX; 4];
        for (i, component) in self.components.0.iter().enumerate() {
            let Some(id) = pattern.get(*component) else {
                break;
            };
            lower[i] = id;
            upper[i] = id;
        }

        self.data
            .range(lower..=upper)
            .map(|key| self.unpermute(key))
            .filter(move |quad| pattern.matches(quad))
    }

    pub fn iter(&self) -> impl Iterator<Item = EncodedQuad> + '_ {
        self.data.iter().map(|key| self.unpermute(key))
    }

    fn permute(&self, quad: &EncodedQuad) -> [EncodedObjectId; 4] {
        self.components.0.map(|c| quad.get(c))
    }

    fn unpermute(&self, key: &[EncodedObjectId; 4]) -> EncodedQuad {
        let mut quad = EncodedQuad {
            subject: EncodedObjectId::MIN,
            predicate: EncodedObjectId::MIN,
            object: EncodedObjectId::MIN,
            context: EncodedObjectId::MIN,
        };
        for (component, id) in self.components.0.iter().zip(key) {
            match component {
                IndexComponent::Subject => quad.subject = *id,
                IndexComponent::Predicate => quad.predicate = *id,
                IndexComponent::Object => quad.object = *id,
                IndexComponent::Context => quad.context = *id,
            }
        }
        quad
    }
}
