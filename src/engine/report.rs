// src/engine/report.rs

use std::fmt;

use crate::action::ActionId;
use crate::dag::{RunState, Scheduler};

/// Exit status contributed by an operator interrupt.
pub const INTERRUPT_EXIT_CODE: i32 = 130;

/// What happened to every action of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub succeeded: Vec<ActionId>,
    pub failed: Vec<ActionId>,
    pub skipped: Vec<ActionId>,
    /// Actions still running when the runtime stopped. Empty unless the
    /// event channel closed early.
    pub unfinished: Vec<ActionId>,
    pub interrupted: bool,
}

impl RunReport {
    pub fn from_scheduler(scheduler: &Scheduler, interrupted: bool) -> Self {
        let mut report = RunReport {
            interrupted,
            ..RunReport::default()
        };
        for (id, state) in scheduler.states() {
            let bucket = match state {
                RunState::DoneSuccess => &mut report.succeeded,
                RunState::DoneFailed => &mut report.failed,
                RunState::Skipped => &mut report.skipped,
                RunState::Pending | RunState::Running => &mut report.unfinished,
            };
            bucket.push(id.clone());
        }
        report
    }

    /// Every action ran and succeeded.
    pub fn is_success(&self) -> bool {
        !self.interrupted
            && self.failed.is_empty()
            && self.skipped.is_empty()
            && self.unfinished.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {} skipped",
            self.succeeded.len(),
            self.failed.len(),
            self.skipped.len()
        )?;
        if !self.unfinished.is_empty() {
            write!(f, ", {} unfinished", self.unfinished.len())?;
        }
        if self.interrupted {
            f.write_str(" (interrupted)")?;
        }
        Ok(())
    }
}
