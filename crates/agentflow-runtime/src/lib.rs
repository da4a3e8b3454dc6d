//! Flow execution runtime
//!
//! This crate provides the `Runner` that walks a canvas from its root,
//! executes each node's capability, and emits the ordered result stream
//! under one of the three invocation contracts (SYNC, ASYNC, BIDI).

mod runner;

pub use runner::{InvokeMode, Request, Runner};
