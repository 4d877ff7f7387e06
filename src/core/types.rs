/*!
 * Core Types
 * Common types used across the scheduling core
 */

use crate::core::errors::SchedulerError;

/// Process ID type
pub type Pid = u32;

/// Priority level (0-31, lower numeral = more urgent)
pub type Priority = u8;

/// Logical CPU core index
pub type CoreId = usize;

/// Number of distinct priority levels
pub const PRIORITY_LEVELS: usize = 32;

/// Most urgent priority level
pub const HIGHEST_PRIORITY: Priority = 0;

/// Least urgent priority level
pub const LOWEST_PRIORITY: Priority = (PRIORITY_LEVELS - 1) as Priority;

/// Priority assigned to processes spawned without an explicit level
pub const DEFAULT_PRIORITY: Priority = 16;

/// Validate a caller-supplied priority value
///
/// Out-of-range values are rejected, never clamped. Takes the raw integer
/// from the syscall boundary so negative inputs fail here rather than
/// wrapping at a narrowing conversion.
///
/// # Performance
/// Hot path - called on every priority change operation
#[inline(always)]
pub fn validate_priority(requested: i64) -> Result<Priority, SchedulerError> {
    if requested < HIGHEST_PRIORITY as i64 || requested > LOWEST_PRIORITY as i64 {
        // Cold path - validation failure
        #[cold]
        #[inline(never)]
        fn make_error(requested: i64) -> SchedulerError {
            SchedulerError::InvalidPriority { requested }
        }
        Err(make_error(requested))
    } else {
        Ok(requested as Priority)
    }
}
