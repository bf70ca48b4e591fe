//! The backend-neutral query model and the text compilers for remote backends.
//!
//! A [Query] is built with fluent mutators and then handed to a backend. Remote backends compile
//! it into text with the [sparql] or [n3] compilers. The embedded store plans it with the join
//! planner of the logical crate. All backends share the post-processing in [SolutionSet].

mod error;
mod filter;
pub mod n3;
mod query;
mod results;
pub mod sparql;

pub use error::*;
pub use filter::*;
pub use query::*;
pub use results::*;
