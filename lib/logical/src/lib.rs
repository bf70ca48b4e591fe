//! Join plans over the triple table of the embedded store.
//!
//! Every where clause of a query becomes one [PatternScan] of the triple table. The
//! [JoinPlanner] combines the scans into a left-deep [JoinPlan] in declaration order.

mod plan;
mod planner;

pub use plan::*;
pub use planner::*;
