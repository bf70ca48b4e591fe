use std::fmt::{Display, Formatter};

/// The encoded object id represents a [Term](rdf_federation_model::Term) in the storage layer.
///
/// # Default Context
///
/// Statements without a context are stored with the [DEFAULT_CONTEXT_ID] in the context position.
/// No term is ever mapped to this id.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub struct EncodedObjectId(u32);

/// The id of the default context.
pub const DEFAULT_CONTEXT_ID: EncodedObjectId = EncodedObjectId(0);

impl EncodedObjectId {
    pub const MIN: EncodedObjectId = EncodedObjectId(0);
    pub const MAX: EncodedObjectId = EncodedObjectId(u32::MAX);

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Option<EncodedObjectId> {
        self.0.checked_add(1).map(EncodedObjectId)
    }
}

impl From<u32> for EncodedObjectId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Display for EncodedObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
