//! Redacted, type-preserving JSON views of configuration outputs.
//!
//! Outputs reach the outside world from two places:
//!
//! - **Resolved state**: every output has a value. [`Outputs::from_resolved`]
//!   strips the value's marks, encodes its payload and its type signature
//!   separately, and drops the payload of sensitive outputs.
//! - **Plans**: only the intended action is known. [`Outputs::from_changes`]
//!   records the action and the sensitivity flag, nothing else.
//!
//! Both produce the same [`ExternalOutput`] record shape:
//!
//! ```json
//! {"sensitive": false, "deprecated": "…", "type": "number", "value": 3, "action": "create"}
//! ```
//!
//! Key rules:
//! - A sensitive record never carries `value`, but it always carries `type`.
//! - A record carries `type`/`value` or `action`, never both.
//! - [`Outputs::from_resolved`] is all-or-nothing: the first output that cannot
//!   be encoded aborts the call with [`Diagnostics`] naming it.
//!
//! What this crate does not do:
//! - load or store state and plans
//! - render diagnostics or decide when to serialize
//!
//! The `slog` feature adds `slog::Value` impls that log these types without
//! exposing sensitive payloads.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

// Module declarations
mod diagnostics;
mod error;
mod outputs;
pub mod plan;
pub mod state;
pub mod value;
#[cfg(feature = "slog")]
pub mod slog;

// Re-exports
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{DecodeError, EncodeError, ValueError};
pub use outputs::{ChangeAction, ExternalOutput, Outputs, ParseChangeActionError};
pub use plan::{Action, OutputAddr, PlannedOutputChange};
pub use state::ResolvedOutput;
pub use value::{Mark, Marks, Path, Type, Value, REDACTED_PLACEHOLDER};
