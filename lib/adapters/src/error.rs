use rdf_federation_query::QueryError;
use rdf_federation_storage::LoaderError;
use std::time::Duration;

/// An error raised by an adapter.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AdapterError {
    /// A required connection option is missing.
    #[error("Missing required option '{option}' for adapter '{adapter_type}'")]
    MissingOption {
        adapter_type: &'static str,
        option: &'static str,
    },
    /// A connection option has a value the adapter cannot use.
    #[error("Invalid value '{value}' for option '{option}': {reason}")]
    InvalidOption {
        option: String,
        value: String,
        reason: String,
    },
    /// A connection option is not known to the adapter.
    #[error("Unknown option '{option}' for adapter '{adapter_type}'")]
    UnknownOption {
        adapter_type: &'static str,
        option: String,
    },
    #[error("Failed to create the HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// A write operation was sent to an adapter that cannot write.
    #[error("The '{0}' adapter is read-only")]
    ReadOnly(&'static str),
    #[error("The '{adapter_type}' adapter does not support {feature}")]
    Unsupported {
        adapter_type: &'static str,
        feature: &'static str,
    },
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The backend could not be reached.
    #[error("Data source {endpoint} is unreachable: {source}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The backend did not answer in time.
    #[error("Data source {endpoint} did not answer within {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },
    /// The backend answered with an error status.
    #[error("Data source {endpoint} answered with status {status}: {message}")]
    Backend {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// The backend answered with a body that could not be read.
    #[error("Failed to parse the response of {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

impl AdapterError {
    /// Returns true if the error means that the backend could not deliver data, as opposed to a
    /// problem with the configuration or the request.
    pub fn is_unreachable(&self) -> bool {
        match self {
            AdapterError::Unreachable { .. } | AdapterError::Timeout { .. } => true,
            AdapterError::Backend { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
