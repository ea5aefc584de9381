//! Dynamic values, their structural types, and typed JSON.
//!
//! - **`types`**: structural types (`Type`)
//! - **`dynamic`**: the value tree (`Value`, `ValueKind`)
//! - **`marks`**: annotation side channel (`Mark`, `Marks`)
//! - **`path`**: locations inside a value, for error reporting (`Path`)
//! - **`json`**: canonical encoding and decoding of values and types

mod dynamic;
pub mod json;
mod marks;
mod path;
mod types;

pub use dynamic::{Value, ValueKind, REDACTED_PLACEHOLDER};
pub use marks::{Mark, Marks};
pub use path::{Path, PathStep};
pub use types::Type;
