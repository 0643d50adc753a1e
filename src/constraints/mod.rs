//! Constraint checking
//!
//! - Per-value checks (pattern, minimum, maximum, enum, length) are pure
//! - `required` fails on a missing (null) cell
//! - `unique` needs table context and lives in a per-session tracker

mod checker;
mod errors;
mod types;
mod unique;

pub use checker::ConstraintSet;
pub use errors::ConstraintError;
pub use types::{ConstraintKind, Constraints};
pub use unique::UniqueTracker;
