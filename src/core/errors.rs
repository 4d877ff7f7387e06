/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::types::Pid;
use crate::process::types::ProcessState;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Common result type for scheduling operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("process {0} not found")]
    #[diagnostic(
        code(sched::no_such_process),
        help("The process may have been reaped or never existed. Check PID validity.")
    )]
    NoSuchProcess(Pid),

    #[error("priority {requested} outside the valid range")]
    #[diagnostic(
        code(sched::invalid_priority),
        help("Priority must be between 0 (most urgent) and 31 (least urgent).")
    )]
    InvalidPriority { requested: i64 },

    #[error("invalid state transition: {from:?} -> {to:?}")]
    #[diagnostic(
        code(sched::invalid_state),
        help("Operation cannot be performed in the process's current state.")
    )]
    InvalidState { from: ProcessState, to: ProcessState },

    #[error("core {0} has no running process")]
    #[diagnostic(
        code(sched::core_idle),
        help("Yield, block, and exit act on the process currently occupying the core.")
    )]
    CoreIdle(usize),

    #[error("invalid scheduler configuration: {0}")]
    #[diagnostic(
        code(sched::invalid_config),
        help("Check quantum bounds, aging threshold, and core count.")
    )]
    InvalidConfig(String),
}
