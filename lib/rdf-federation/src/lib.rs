#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod config;
mod error;
mod manager;
mod pool;
mod registry;

pub use config::FederationConfig;
pub use error::FederationError;
pub use manager::{FederationManager, QueryOptions, QueryResult};
pub use pool::ConnectionPool;
pub use registry::{AdapterFactory, AdapterRegistry};

pub mod model {
    pub use rdf_federation_model::*;
}

pub mod query {
    pub use rdf_federation_query::*;
}

pub mod logical {
    pub use rdf_federation_logical::*;
}

pub mod storage {
    pub use rdf_federation_storage::*;
}

pub mod adapters {
    pub use rdf_federation_adapters::*;
}
