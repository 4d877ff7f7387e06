/*!
 * Syscall Traits
 * Interface definitions for the externally reachable scheduling operations
 */

use crate::core::errors::SchedulerResult;
use crate::core::types::{CoreId, Pid, Priority};
use crate::process::types::ProcessSnapshot;
use crate::scheduler::dispatcher::Decision;
use crate::scheduler::stats::SchedStats;

/// Priority management operations
pub trait PriorityControl: Send + Sync {
    /// Change a process's base priority, returning the previous value
    fn change_priority(&self, pid: Pid, new_priority: i64) -> SchedulerResult<Priority>;

    /// Read a process's current base priority
    fn priority_of(&self, pid: Pid) -> SchedulerResult<Priority>;
}

/// Core dispatch control operations
pub trait SchedControl: Send + Sync {
    /// Select the next process for a core
    fn schedule_next(&self, core: CoreId) -> Decision;

    /// Yield a core's running process voluntarily
    fn yield_current(&self, core: CoreId) -> Decision;

    /// Wake a blocked process
    fn wake(&self, pid: Pid) -> SchedulerResult<()>;
}

/// Scheduler statistics and monitoring
pub trait StatsQuery: Send + Sync {
    /// Get global scheduler statistics
    fn scheduler_stats(&self) -> SchedStats;

    /// Get a snapshot of a specific process
    fn process_snapshot(&self, pid: Pid) -> SchedulerResult<ProcessSnapshot>;
}

/// Combined syscall interface
pub trait KernelSyscalls: PriorityControl + SchedControl + StatsQuery + Send + Sync {}

// Blanket implementation for any type that implements all component traits
impl<T> KernelSyscalls for T where T: PriorityControl + SchedControl + StatsQuery + Send + Sync {}
