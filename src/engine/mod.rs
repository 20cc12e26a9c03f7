// src/engine/mod.rs

//! Orchestration engine for castle.
//!
//! This module ties together:
//! - the action scheduler
//! - the main runtime event loop that reacts to:
//!   - action completion events
//!   - interrupt (Ctrl-C) requests
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`]. [`report`] summarizes a finished run.

use crate::action::ActionId;

/// Outcome of an action for the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Success,
    /// Failed, contributing this status code.
    Failed(i32),
    /// Never ran: dispatch was halted while it waited for its delay or a
    /// concurrency permit.
    Skipped,
}

/// Events flowing into the runtime from executors and signal handlers.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// An action finished with a concrete outcome.
    ActionCompleted { id: ActionId, outcome: ActionOutcome },
    /// Operator interrupt: stop dispatching, let in-flight actions finish.
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod report;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use report::RunReport;
pub use runtime::Runtime;
