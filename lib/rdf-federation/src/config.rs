use std::time::Duration;

/// Configures how the [FederationManager](crate::FederationManager) dispatches to its sources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FederationConfig {
    /// Whether read adapters are queried concurrently or one after another.
    pub concurrent_dispatch: bool,
    /// An upper bound on the time a single source may take to answer.
    ///
    /// A source that exceeds it contributes nothing, as if it was unreachable. Remote adapters
    /// have their own request timeout in addition to this one.
    pub source_timeout: Option<Duration>,
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            concurrent_dispatch: true,
            source_timeout: None,
        }
    }
}

impl FederationConfig {
    #[must_use]
    pub fn with_concurrent_dispatch(mut self, concurrent_dispatch: bool) -> Self {
        self.concurrent_dispatch = concurrent_dispatch;
        self
    }

    #[must_use]
    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = Some(timeout);
        self
    }
}
