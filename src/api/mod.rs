//! Purpose: Define the public Rust API boundary for batchsort.
//! Exports: Sorting operations, wire types, and the error model.
//! Role: Stable surface used by the binary and integration tests.
//! Invariants: Callers never reach into `core` directly for wire concerns.

mod wire;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::sort::{SortMode, SortOutcome, sort_batch, sort_concurrent, sort_single};
pub use wire::{SortRequest, SortResponse, decode_request};
