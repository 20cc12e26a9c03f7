// src/cluster/status.rs

use std::sync::{Mutex, PoisonError};

use tracing::debug;

/// Process-wide aggregate status, shared by every action in a run.
///
/// Merge rules:
/// - [`record_failure`](Self::record_failure): the first non-zero code wins.
/// - [`change_return_code`](Self::change_return_code): an explicit non-zero
///   status replaces whatever is there.
/// - A zero never overwrites a non-zero.
#[derive(Debug, Default)]
pub struct StatusRegister {
    code: Mutex<i32>,
}

impl StatusRegister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn return_code(&self) -> i32 {
        *self.code.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record that something failed with `code`, unless an earlier failure
    /// is already recorded.
    pub fn record_failure(&self, code: i32) {
        if code == 0 {
            return;
        }
        let mut current = self.code.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == 0 {
            debug!(code, "recording first failure status");
            *current = code;
        }
    }

    /// Explicitly set the status, as status-reporting actions do.
    pub fn change_return_code(&self, code: i32) {
        if code == 0 {
            return;
        }
        let mut current = self.code.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(previous = *current, code, "overriding status");
        *current = code;
    }
}
