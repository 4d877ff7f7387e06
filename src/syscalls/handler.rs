/*!
 * Priority Syscall Handler
 * Kernel-side entry point reached by the external priority command
 */

use crate::core::errors::SchedulerResult;
use crate::core::types::{CoreId, Pid, Priority};
use crate::process::store::PriorityStore;
use crate::process::types::ProcessSnapshot;
use crate::scheduler::dispatcher::{Decision, Dispatcher};
use crate::scheduler::stats::{AtomicSchedStats, SchedStats};
use crate::syscalls::traits::{PriorityControl, SchedControl, StatsQuery};
use log::info;
use std::sync::Arc;

/// Syscall surface over the scheduling core
///
/// Validates caller input and delegates; performs no scheduling decision of
/// its own. Every failure path returns a distinguishable error to the
/// caller, nothing is swallowed.
pub struct PrioritySyscallHandler {
    store: Arc<PriorityStore>,
    dispatcher: Arc<Dispatcher>,
    stats: Arc<AtomicSchedStats>,
}

impl PrioritySyscallHandler {
    pub fn new(
        store: Arc<PriorityStore>,
        dispatcher: Arc<Dispatcher>,
        stats: Arc<AtomicSchedStats>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            stats,
        }
    }
}

impl PriorityControl for PrioritySyscallHandler {
    fn change_priority(&self, pid: Pid, new_priority: i64) -> SchedulerResult<Priority> {
        match self.store.set_base_priority(pid, new_priority) {
            Ok(previous) => {
                info!(
                    "change_priority: PID {} moved from {} to {}",
                    pid, previous, new_priority
                );
                Ok(previous)
            }
            Err(e) => {
                info!("change_priority: PID {} rejected: {}", pid, e);
                Err(e)
            }
        }
    }

    fn priority_of(&self, pid: Pid) -> SchedulerResult<Priority> {
        Ok(self.store.get(pid)?.base_priority)
    }
}

impl SchedControl for PrioritySyscallHandler {
    fn schedule_next(&self, core: CoreId) -> Decision {
        self.dispatcher.schedule(core)
    }

    fn yield_current(&self, core: CoreId) -> Decision {
        self.dispatcher.yield_current(core)
    }

    fn wake(&self, pid: Pid) -> SchedulerResult<()> {
        self.dispatcher.wake(pid)
    }
}

impl StatsQuery for PrioritySyscallHandler {
    fn scheduler_stats(&self) -> SchedStats {
        self.stats.snapshot()
    }

    fn process_snapshot(&self, pid: Pid) -> SchedulerResult<ProcessSnapshot> {
        self.store.get(pid)
    }
}
