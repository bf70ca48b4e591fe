//! An embedded, indexed triple store.
//!
//! The store interns every term into an [EncodedObjectId](memory::EncodedObjectId) and keeps the
//! encoded statements in several sorted index permutations. Queries are planned by the join
//! planner of the logical crate and evaluated by scanning the best-suited index per pattern and
//! hash-joining the results.

mod error;
mod loader;
pub mod memory;
mod store;

pub use error::*;
pub use loader::*;
pub use store::*;
