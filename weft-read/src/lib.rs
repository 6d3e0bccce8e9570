//! The read path: reconciling a stored schema with a requested shape, and streaming records
//! through the resulting plan.
//!
//! A [`ReadPlan`] is built once per read from the stored schema, a [`RequestedShape`] and the
//! [`ReadPolicy`]. Differences between the two schemas are resolved while the plan is built;
//! only narrowing conversions and null checks that the policy defers are checked per value, by
//! the [`ReadSession`].

pub use plan::{Conversion, PlanEntry, ReadPlan, RecordPlan, ValuePlan};
pub use policy::{FieldMatchingStrategy, ReadOptions, ReadPolicy};
pub use session::ReadSession;
pub use shape::RequestedShape;

mod convert;
mod plan;
mod policy;
mod reconcile;
mod session;
mod shape;
