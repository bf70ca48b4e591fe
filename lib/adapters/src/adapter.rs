use crate::AdapterError;
use async_trait::async_trait;
use rdf_federation_model::{NamedNode, StatementPattern, Triple};
use rdf_federation_query::{Query, Solutions};
use std::fmt::Debug;

/// The capability contract of a backend.
///
/// Reading adapters answer queries. Writing adapters additionally accept statements and removals.
/// The default implementations of the write operations fail with [AdapterError::ReadOnly].
///
/// A query that matches nothing is answered with an empty result, never with an error. Errors are
/// reserved for backends that cannot be reached or that reject the request.
#[async_trait]
pub trait Adapter: Debug + Send + Sync {
    /// The registry name of the adapter type.
    fn adapter_type(&self) -> &'static str;

    fn reads(&self) -> bool;

    fn writes(&self) -> bool;

    /// Returns the backend-native form of `query`.
    fn translate(&self, query: &Query) -> Result<String, AdapterError>;

    /// Answers `query`. Rows hold one value per variable of [Query::projection].
    async fn query(&self, query: &Query) -> Result<Solutions, AdapterError>;

    /// Adds a statement. Returns whether the backend reports it as new.
    async fn add(&self, triple: &Triple, context: Option<&NamedNode>) -> Result<bool, AdapterError> {
        let _ = (triple, context);
        Err(AdapterError::ReadOnly(self.adapter_type()))
    }

    /// Removes every statement matching `pattern`.
    ///
    /// Returns the number of removed statements if the backend reports it.
    async fn remove(&self, pattern: &StatementPattern) -> Result<Option<usize>, AdapterError> {
        let _ = pattern;
        Err(AdapterError::ReadOnly(self.adapter_type()))
    }

    /// Persists pending changes.
    async fn flush(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    /// Releases the resources of the adapter.
    async fn close(&self) -> Result<(), AdapterError> {
        Ok(())
    }
}
