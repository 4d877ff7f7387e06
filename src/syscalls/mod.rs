/*!
 * Syscalls
 * Externally reachable entry points into the scheduling core
 */

pub mod handler;
pub mod traits;

pub use handler::PrioritySyscallHandler;
pub use traits::{KernelSyscalls, PriorityControl, SchedControl, StatsQuery};
