//! Behavioral specifications for the `cc-cli` binaries.
//!
//! Black-box: each spec invokes a built binary and verifies stdout,
//! stderr, and exit code.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/resize_queue.rs"]
mod resize_queue;

#[path = "specs/cancel_pipeline.rs"]
mod cancel_pipeline;
