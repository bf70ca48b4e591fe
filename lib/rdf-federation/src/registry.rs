use crate::FederationError;
use rdf_federation_adapters::embedded::{EmbeddedAdapter, EMBEDDED_ADAPTER_TYPE};
use rdf_federation_adapters::n3ql::{N3qlAdapter, N3QL_ADAPTER_TYPE};
use rdf_federation_adapters::sparql::{SparqlAdapter, SPARQL_ADAPTER_TYPE};
use rdf_federation_adapters::{Adapter, AdapterError, ConnectionParams};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Creates an adapter from its connection parameters.
pub type AdapterFactory =
    Arc<dyn Fn(&ConnectionParams) -> Result<Arc<dyn Adapter>, AdapterError> + Send + Sync>;

/// Maps adapter type names to factories.
///
/// A registry starts empty. [AdapterRegistry::with_default_adapters] registers the adapters of
/// this crate family under `embedded`, `sparql` and `n3ql`.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    factories: BTreeMap<String, AdapterFactory>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_adapters() -> Self {
        let mut registry = Self::new();
        registry.register(EMBEDDED_ADAPTER_TYPE, |params| {
            Ok(Arc::new(EmbeddedAdapter::from_params(params)?))
        });
        registry.register(SPARQL_ADAPTER_TYPE, |params| {
            Ok(Arc::new(SparqlAdapter::from_params(params)?))
        });
        registry.register(N3QL_ADAPTER_TYPE, |params| {
            Ok(Arc::new(N3qlAdapter::from_params(params)?))
        });
        registry
    }

    /// Registers `factory` for `adapter_type`, replacing any previous factory.
    pub fn register<F>(&mut self, adapter_type: &str, factory: F) -> &mut Self
    where
        F: Fn(&ConnectionParams) -> Result<Arc<dyn Adapter>, AdapterError> + Send + Sync + 'static,
    {
        self.factories
            .insert(adapter_type.trim().to_ascii_lowercase(), Arc::new(factory));
        self
    }

    /// Removes the factory of `adapter_type`. Returns whether one was registered.
    pub fn unregister(&mut self, adapter_type: &str) -> bool {
        self.factories
            .remove(&adapter_type.trim().to_ascii_lowercase())
            .is_some()
    }

    pub fn contains(&self, adapter_type: &str) -> bool {
        self.factories
            .contains_key(&adapter_type.trim().to_ascii_lowercase())
    }

    pub fn adapter_types(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Creates a new adapter for `params`.
    pub fn create(&self, params: &ConnectionParams) -> Result<Arc<dyn Adapter>, FederationError> {
        let factory = self
            .factories
            .get(params.adapter_type())
            .ok_or_else(|| FederationError::UnknownAdapterType(params.adapter_type().to_owned()))?;
        Ok(factory(params)?)
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapter_types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
