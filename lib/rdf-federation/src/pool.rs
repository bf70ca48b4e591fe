use crate::{AdapterRegistry, FederationError};
use rdf_federation_adapters::{Adapter, ConnectionParams};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct PoolEntry {
    params: ConnectionParams,
    adapter: Arc<dyn Adapter>,
    enabled: bool,
}

#[derive(Debug, Default)]
struct PoolState {
    entries: Vec<PoolEntry>,
    write_adapter: Option<Arc<dyn Adapter>>,
}

impl PoolState {
    fn position(&self, adapter: &Arc<dyn Adapter>) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| Arc::ptr_eq(&entry.adapter, adapter))
    }

    fn first_writer(&self) -> Option<Arc<dyn Adapter>> {
        self.entries
            .iter()
            .find(|entry| entry.adapter.writes())
            .map(|entry| Arc::clone(&entry.adapter))
    }

    fn insert(&mut self, params: ConnectionParams, adapter: Arc<dyn Adapter>) {
        tracing::info!(
            adapter_type = adapter.adapter_type(),
            reads = adapter.reads(),
            writes = adapter.writes(),
            "Added data source"
        );
        if adapter.writes() {
            self.write_adapter = Some(Arc::clone(&adapter));
        }
        self.entries.push(PoolEntry {
            params,
            adapter,
            enabled: true,
        });
    }
}

/// The set of data sources known to a [FederationManager](crate::FederationManager).
///
/// Data sources are keyed by their [ConnectionParams]: adding equal parameters twice returns the
/// same adapter instance. Parameters marked as [fresh](ConnectionParams::fresh) always create a
/// new adapter.
///
/// The pool tracks one write adapter. It is the most recently added or re-added adapter that can
/// write. When it is removed, the first remaining writer takes its place.
///
/// All membership changes are serialized by one lock, so concurrent additions of equal
/// parameters create a single adapter.
#[derive(Debug)]
pub struct ConnectionPool {
    registry: AdapterRegistry,
    state: Mutex<PoolState>,
}

impl ConnectionPool {
    pub fn new(registry: AdapterRegistry) -> Self {
        Self {
            registry,
            state: Mutex::new(PoolState::default()),
        }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Returns the adapter for `params`, creating it if the pool does not hold one yet.
    ///
    /// A returned adapter that can write becomes the write adapter, whether it is new or cached.
    pub fn add_data_source(
        &self,
        params: &ConnectionParams,
    ) -> Result<Arc<dyn Adapter>, FederationError> {
        let mut state = self.lock();
        if !params.is_fresh() {
            let cached = state
                .entries
                .iter()
                .find(|entry| &entry.params == params)
                .map(|entry| Arc::clone(&entry.adapter));
            if let Some(adapter) = cached {
                if adapter.writes() {
                    state.write_adapter = Some(Arc::clone(&adapter));
                }
                return Ok(adapter);
            }
        }

        let adapter = self.registry.create(params)?;
        state.insert(params.clone(), Arc::clone(&adapter));
        Ok(adapter)
    }

    /// Adds an adapter that was created outside of the registry.
    pub fn add_adapter(&self, params: ConnectionParams, adapter: Arc<dyn Adapter>) {
        self.lock().insert(params, adapter);
    }

    /// Removes `adapter` from the pool. Returns whether it was a member.
    pub fn remove_data_source(&self, adapter: &Arc<dyn Adapter>) -> bool {
        let mut state = self.lock();
        let Some(position) = state.position(adapter) else {
            return false;
        };
        let entry = state.entries.remove(position);
        let was_writer = state
            .write_adapter
            .as_ref()
            .is_some_and(|writer| Arc::ptr_eq(writer, &entry.adapter));
        if was_writer {
            state.write_adapter = state.first_writer();
        }
        tracing::info!(
            adapter_type = entry.adapter.adapter_type(),
            "Removed data source"
        );
        true
    }

    /// Removes `adapter` from the pool and releases its resources.
    pub async fn close_data_source(
        &self,
        adapter: &Arc<dyn Adapter>,
    ) -> Result<(), FederationError> {
        if !self.remove_data_source(adapter) {
            return Err(FederationError::UnknownDataSource);
        }
        adapter.close().await?;
        Ok(())
    }

    /// Removes every data source and resets the write adapter.
    pub fn clear(&self) {
        let mut state = self.lock();
        if !state.entries.is_empty() {
            tracing::info!(count = state.entries.len(), "Cleared connection pool");
        }
        state.entries.clear();
        state.write_adapter = None;
    }

    /// Every pooled adapter in insertion order.
    pub fn adapters(&self) -> Vec<Arc<dyn Adapter>> {
        self.lock()
            .entries
            .iter()
            .map(|entry| Arc::clone(&entry.adapter))
            .collect()
    }

    /// The enabled adapters that can read, in insertion order.
    pub fn read_adapters(&self) -> Vec<Arc<dyn Adapter>> {
        self.lock()
            .entries
            .iter()
            .filter(|entry| entry.enabled && entry.adapter.reads())
            .map(|entry| Arc::clone(&entry.adapter))
            .collect()
    }

    pub fn write_adapter(&self) -> Option<Arc<dyn Adapter>> {
        self.lock().write_adapter.clone()
    }

    /// Makes `adapter` the target of writes. It must be a pooled adapter that can write.
    pub fn set_write_adapter(&self, adapter: &Arc<dyn Adapter>) -> Result<(), FederationError> {
        let mut state = self.lock();
        if state.position(adapter).is_none() {
            return Err(FederationError::UnknownDataSource);
        }
        if !adapter.writes() {
            return Err(FederationError::NotWritable(adapter.adapter_type()));
        }
        state.write_adapter = Some(Arc::clone(adapter));
        Ok(())
    }

    /// Includes or excludes `adapter` from reads. Returns whether it is a member.
    pub fn set_enabled(&self, adapter: &Arc<dyn Adapter>, enabled: bool) -> bool {
        let mut state = self.lock();
        match state.position(adapter) {
            Some(position) => {
                state.entries[position].enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self, adapter: &Arc<dyn Adapter>) -> bool {
        let state = self.lock();
        state
            .position(adapter)
            .is_some_and(|position| state.entries[position].enabled)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ConnectionPool {
    fn default() -> Self {
        Self::new(AdapterRegistry::with_default_adapters())
    }
}
