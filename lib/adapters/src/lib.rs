//! Backend adapters for the federation layer.
//!
//! Every backend implements the [Adapter] capability contract. Adapters are created from
//! [ConnectionParams], and parse and validate their options eagerly so that configuration errors
//! surface on construction.

mod adapter;
pub mod embedded;
mod error;
mod http;
pub mod n3ql;
mod params;
pub mod sparql;

pub use adapter::*;
pub use error::*;
pub use http::DEFAULT_HTTP_TIMEOUT;
pub use params::*;
