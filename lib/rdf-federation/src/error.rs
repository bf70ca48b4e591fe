use rdf_federation_adapters::AdapterError;

/// An error raised by the [FederationManager](crate::FederationManager) or the connection pool.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FederationError {
    /// No enabled, read-capable data source is registered.
    #[error("No data source is registered for reading")]
    NoDataSource,
    /// No write-capable data source is registered.
    #[error("No data source is registered for writing")]
    NoWriteAdapter,
    /// The registry has no factory for the requested adapter type.
    #[error("Unknown adapter type '{0}'")]
    UnknownAdapterType(String),
    /// The adapter is not a member of the pool.
    #[error("The adapter is not registered in the pool")]
    UnknownDataSource,
    /// A write operation was routed to an adapter that cannot write.
    #[error("The '{0}' adapter cannot write")]
    NotWritable(&'static str),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    /// Every dispatched data source failed.
    #[error("All {} data sources failed, first error: {}", .0.len(), first_error(.0))]
    AllSourcesFailed(Vec<AdapterError>),
}

impl FederationError {
    /// Returns true if the error means that data could not be retrieved, as opposed to a
    /// configuration or validation problem.
    pub fn is_unreachable(&self) -> bool {
        match self {
            FederationError::Adapter(error) => error.is_unreachable(),
            FederationError::AllSourcesFailed(errors) => {
                errors.iter().any(AdapterError::is_unreachable)
            }
            _ => false,
        }
    }
}

fn first_error(errors: &[AdapterError]) -> String {
    errors
        .first()
        .map_or_else(|| "none".to_owned(), ToString::to_string)
}
