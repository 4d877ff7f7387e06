/*!
 * Core Types and Errors
 * Shared building blocks for the scheduling core
 */

pub mod errors;
pub mod types;

pub use errors::{SchedulerError, SchedulerResult};
pub use types::{
    validate_priority, CoreId, Pid, Priority, DEFAULT_PRIORITY, HIGHEST_PRIORITY, LOWEST_PRIORITY,
    PRIORITY_LEVELS,
};
