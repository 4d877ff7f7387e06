/*!
 * Priority Kernel Library
 * Priority-aware preemptive scheduling core exposed as a library
 */

pub mod core;
pub mod kernel;
pub mod process;
pub mod scheduler;
pub mod syscalls;

// Re-exports
pub use crate::core::{
    validate_priority, CoreId, Pid, Priority, SchedulerError, SchedulerResult, DEFAULT_PRIORITY,
    HIGHEST_PRIORITY, LOWEST_PRIORITY, PRIORITY_LEVELS,
};
pub use kernel::{Kernel, KernelBuilder};
pub use process::{PriorityStore, ProcessSnapshot, ProcessState};
pub use scheduler::{
    AgingClock, AgingTask, AtomicSchedStats, Decision, Dispatcher, ReadyRegistry, SchedStats,
    SchedulerConfig,
};
pub use syscalls::{KernelSyscalls, PriorityControl, PrioritySyscallHandler, SchedControl, StatsQuery};
