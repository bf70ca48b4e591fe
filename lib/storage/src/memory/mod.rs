mod executor;
mod index;
mod object_id;
mod object_id_mapping;
mod storage;

pub(crate) use executor::PlanExecutor;
pub use index::*;
pub use object_id::*;
pub use object_id_mapping::*;
pub use storage::*;
