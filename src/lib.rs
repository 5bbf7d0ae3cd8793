//! Purpose: Library crate backing the `batchsort` server and CLI.
//! Exports: `api` (public surface), `core` (sorting and errors).
//! Role: Keeps compute and wire types testable without an HTTP server.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
