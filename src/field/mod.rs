//! Typed field family
//!
//! One closed enum of logical types. Each variant owns its parse and format
//! rule, reached through the same two operations so schema validation and
//! type inference never special-case a type.
//!
//! - No silent truncation: integers reject fractions and overflow
//! - Boolean tokens are matched exactly, case-sensitively
//! - `parse(format(v)) == v` for every variant (NaN excepted)

mod cast;
mod errors;
mod types;
mod value;

pub use errors::{CastError, CastResult};
pub use types::{CastOptions, Field, FieldType};
pub use value::Value;
