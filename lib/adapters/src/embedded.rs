//! The adapter over the embedded [MemTripleStore].

use crate::{Adapter, AdapterError, ConnectionParams};
use async_trait::async_trait;
use rdf_federation_logical::JoinPlanner;
use rdf_federation_model::{NamedNode, StatementPattern, Triple};
use rdf_federation_query::{Query, Solutions};
use rdf_federation_storage::MemTripleStore;
use std::path::PathBuf;

pub const EMBEDDED_ADAPTER_TYPE: &str = "embedded";

const KNOWN_OPTIONS: &[&str] = &["location", "auto_flush"];

/// Reads and writes an in-process triple store.
///
/// With a `location` option, the store is loaded from that N-Quads file on construction if the
/// file exists, and written back on [Adapter::flush] and [Adapter::close]. With `auto_flush`
/// enabled, every write is persisted immediately. A write whose persistence fails still
/// succeeds in memory and is saved again by the next flush.
#[derive(Debug, Clone)]
pub struct EmbeddedAdapter {
    store: MemTripleStore,
    location: Option<PathBuf>,
    auto_flush: bool,
}

impl EmbeddedAdapter {
    /// Creates an adapter over a new, empty store without persistence.
    pub fn new() -> Self {
        Self::with_store(MemTripleStore::new())
    }

    /// Creates an adapter over an existing store handle.
    pub fn with_store(store: MemTripleStore) -> Self {
        Self {
            store,
            location: None,
            auto_flush: false,
        }
    }

    pub fn from_params(params: &ConnectionParams) -> Result<Self, AdapterError> {
        params.ensure_known_options(EMBEDDED_ADAPTER_TYPE, KNOWN_OPTIONS)?;
        let location = params
            .option("location")
            .filter(|location| !location.trim().is_empty())
            .map(PathBuf::from);
        let auto_flush = params.parse_optional::<bool>("auto_flush")?.unwrap_or(false);

        let store = MemTripleStore::new();
        if let Some(location) = &location {
            if location.exists() {
                store.load(location)?;
            }
        }
        Ok(Self {
            store,
            location,
            auto_flush,
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &MemTripleStore {
        &self.store
    }

    pub fn location(&self) -> Option<&PathBuf> {
        self.location.as_ref()
    }

    fn persist(&self) -> Result<(), AdapterError> {
        if let Some(location) = &self.location {
            self.store.save(location)?;
        }
        Ok(())
    }

    /// Persists a write when `auto_flush` is on. The write stays applied in memory if
    /// persisting fails, so the failure is logged instead of returned.
    fn after_write(&self) {
        if !self.auto_flush {
            return;
        }
        if let Err(error) = self.persist() {
            tracing::warn!(
                location = ?self.location,
                error = %error,
                "Failed to persist write, it is kept in memory until the next flush"
            );
        }
    }
}

impl Default for EmbeddedAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for EmbeddedAdapter {
    fn adapter_type(&self) -> &'static str {
        EMBEDDED_ADAPTER_TYPE
    }

    fn reads(&self) -> bool {
        true
    }

    fn writes(&self) -> bool {
        true
    }

    fn translate(&self, query: &Query) -> Result<String, AdapterError> {
        Ok(JoinPlanner.plan(query).to_string())
    }

    async fn query(&self, query: &Query) -> Result<Solutions, AdapterError> {
        Ok(self.store.query(query))
    }

    async fn add(&self, triple: &Triple, context: Option<&NamedNode>) -> Result<bool, AdapterError> {
        let inserted = self.store.insert_in_context(triple, context);
        if inserted {
            self.after_write();
        }
        Ok(inserted)
    }

    async fn remove(&self, pattern: &StatementPattern) -> Result<Option<usize>, AdapterError> {
        let removed = self.store.delete(pattern);
        if removed > 0 {
            self.after_write();
        }
        Ok(Some(removed))
    }

    async fn flush(&self) -> Result<(), AdapterError> {
        self.persist()
    }

    async fn close(&self) -> Result<(), AdapterError> {
        self.persist()
    }
}
