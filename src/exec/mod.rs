// src/exec/mod.rs

//! Action execution layer.
//!
//! Runs scheduled actions against their nodes and reports back to the
//! orchestration runtime via `RuntimeEvent`s.
//!
//! - [`executor_loop`] owns the background loop receiving scheduled actions
//!   and spawning one runner per action.
//! - [`action_runner`] runs a single action: initial delay, halt check, concurrency
//!   permit, node lookup, tracing span, failure recording.
//! - [`backend`] provides the `ExecutorBackend` trait and the concrete
//!   `RealExecutorBackend` the runtime uses in production, and which tests
//!   can replace with a fake implementation.

pub mod action_runner;
pub mod backend;
pub mod executor_loop;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use executor_loop::spawn_executor;
