/*!
 * Aging Clock
 * Bounds ready-queue wait time by promoting long-waiting processes
 */

use crate::core::types::HIGHEST_PRIORITY;
use crate::process::store::PriorityStore;
use crate::scheduler::registry::ReadyRegistry;
use crate::scheduler::stats::AtomicSchedStats;
use log::{trace, warn};
use std::sync::Arc;

/// Aging clock
///
/// Without aging, a flood of urgent work after an explicit priority-lowering
/// call could starve the demoted process indefinitely. One promotion step per
/// crossed threshold gives a bounded wait: a never-dispatched Ready process
/// reaches level 0 within `threshold * 31` quanta.
pub struct AgingClock {
    store: Arc<PriorityStore>,
    registry: Arc<ReadyRegistry>,
    stats: Arc<AtomicSchedStats>,
    threshold: u32,
}

impl AgingClock {
    pub fn new(
        store: Arc<PriorityStore>,
        registry: Arc<ReadyRegistry>,
        stats: Arc<AtomicSchedStats>,
        threshold: u32,
    ) -> Self {
        Self {
            store,
            registry,
            stats,
            threshold,
        }
    }

    /// Advance the clock by one scheduling quantum
    ///
    /// Charges one wait tick to every Ready process (never the running ones)
    /// and promotes one step toward level 0 once the wait crosses the
    /// threshold. Non-blocking and bounded: each record is locked briefly,
    /// with the same record-then-bucket lock order as the syscall path.
    pub fn tick(&self) {
        for record in self.store.record_handles() {
            let mut rec = record.lock();
            if !rec.is_ready() {
                continue;
            }

            rec.wait_ticks += 1;
            if rec.wait_ticks < self.threshold || rec.effective_priority == HIGHEST_PRIORITY {
                continue;
            }

            let from = rec.effective_priority;
            let to = from - 1;
            if self.registry.move_bucket(rec.pid, from, to) {
                rec.effective_priority = to;
                rec.wait_ticks = 0;
                self.stats.inc_promotions();
                trace!("Process {} aged: level {} -> {}", rec.pid, from, to);
            } else {
                warn!(
                    "Aging promotion skipped for process {}: not in level {} bucket",
                    rec.pid, from
                );
            }
        }
    }

    /// Configured promotion threshold in quanta
    #[inline(always)]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }
}
