/*!
 * Dispatcher
 * Per-core process selection and the process state machine
 */

use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::{CoreId, Pid};
use crate::process::store::PriorityStore;
use crate::process::types::{PriorityRecord, ProcessState};
use crate::scheduler::registry::ReadyRegistry;
use crate::scheduler::stats::AtomicSchedStats;
use log::{info, trace};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of a dispatch attempt
///
/// `Idle` is a valid result meaning no runnable work exists, not a failure;
/// the dispatch loop reacts by halting the core or re-polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Run(Pid),
    Idle,
}

/// Per-core dispatch state
///
/// The slot mutex serializes `schedule` for one core; cores coordinate with
/// each other only through the shared store and registry locks.
struct CoreSlot {
    current: Mutex<Option<Pid>>,
    need_resched: AtomicBool,
}

impl CoreSlot {
    fn new() -> Self {
        Self {
            current: Mutex::new(None),
            need_resched: AtomicBool::new(false),
        }
    }
}

/// Dispatcher
///
/// The only component that may transition a process into or out of the
/// Running state. Lock order everywhere: core slot, then record, then
/// bucket(s).
pub struct Dispatcher {
    store: Arc<PriorityStore>,
    registry: Arc<ReadyRegistry>,
    stats: Arc<AtomicSchedStats>,
    cores: Box<[CoreSlot]>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<PriorityStore>,
        registry: Arc<ReadyRegistry>,
        stats: Arc<AtomicSchedStats>,
        cores: usize,
    ) -> Self {
        let cores = (0..cores)
            .map(|_| CoreSlot::new())
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            store,
            registry,
            stats,
            cores,
        }
    }

    /// Number of dispatch cores
    #[inline(always)]
    pub fn core_count(&self) -> usize {
        self.cores.len()
    }

    /// Process currently occupying a core
    pub fn current(&self, core: CoreId) -> Option<Pid> {
        *self.cores[core].current.lock()
    }

    /// Select the next process for a core
    ///
    /// A core that already owns a running process keeps it unless a strictly
    /// more urgent level became ready, in which case the owner is preempted
    /// and re-queued. Selection picks the front of the most urgent non-empty
    /// bucket; losing the removal race to another core retries with the next
    /// candidate.
    pub fn schedule(&self, core: CoreId) -> Decision {
        let slot = &self.cores[core];
        let mut current = slot.current.lock();

        if let Some(pid) = *current {
            if !slot.need_resched.swap(false, Ordering::AcqRel) {
                return Decision::Run(pid);
            }
            match self.try_preempt(pid) {
                Some(()) => {
                    *current = None;
                    info!("Process {} preempted on core {}", pid, core);
                }
                None => return Decision::Run(pid),
            }
        }

        loop {
            let candidate = match self.registry.pick_highest() {
                Some(pid) => pid,
                None => {
                    self.stats.inc_idle_polls();
                    trace!("Core {} idle: no runnable process", core);
                    return Decision::Idle;
                }
            };

            let record = match self.store.record(candidate) {
                Ok(record) => record,
                Err(_) => {
                    // Stale registry entry for a reaped process; clear it
                    self.registry.remove(candidate);
                    continue;
                }
            };

            let mut rec = record.lock();
            if !rec.is_ready() {
                continue;
            }
            if !self.registry.remove(candidate) {
                // Another core won the removal race
                continue;
            }

            rec.state = ProcessState::Running;
            // Aging credit is spent by being dispatched; the process re-enters
            // future buckets at its base level
            rec.effective_priority = rec.base_priority;
            rec.wait_ticks = 0;
            drop(rec);

            *current = Some(candidate);
            self.stats.inc_dispatches();
            self.stats.inc_context_switches();
            trace!("Core {} dispatched process {}", core, candidate);
            return Decision::Run(candidate);
        }
    }

    /// Demote a running process back to Ready if more urgent work waits
    fn try_preempt(&self, pid: Pid) -> Option<()> {
        let record = self.store.record(pid).ok()?;
        let mut rec = record.lock();
        if !rec.is_running() {
            return None;
        }
        let best = self.registry.min_ready_level()?;
        if best >= rec.effective_priority {
            return None;
        }
        self.requeue_locked(&mut rec);
        self.stats.inc_preemptions();
        self.stats.inc_context_switches();
        Some(())
    }

    /// Running -> Ready under an already-held record lock
    fn requeue_locked(&self, rec: &mut PriorityRecord) {
        rec.state = ProcessState::Ready;
        rec.wait_ticks = 0;
        self.registry.enqueue(rec.pid, rec.effective_priority);
    }

    /// Voluntarily give up a core, then dispatch its next process
    pub fn yield_current(&self, core: CoreId) -> Decision {
        let slot = &self.cores[core];
        let mut current = slot.current.lock();

        if let Some(pid) = current.take() {
            if let Ok(record) = self.store.record(pid) {
                let mut rec = record.lock();
                if rec.is_running() {
                    self.requeue_locked(&mut rec);
                }
            }
            self.stats.inc_context_switches();
            info!("Process {} yielded core {}", pid, core);
        }
        drop(current);

        self.schedule(core)
    }

    /// Transition a core's running process to Blocked
    ///
    /// The process is not re-enqueued; its pending schedule slot is
    /// invalidated simply by staying out of the registry until woken.
    pub fn block_current(&self, core: CoreId) -> SchedulerResult<Pid> {
        let slot = &self.cores[core];
        let mut current = slot.current.lock();
        let pid = current.ok_or(SchedulerError::CoreIdle(core))?;

        let record = self.store.record(pid)?;
        let mut rec = record.lock();
        if !rec.is_running() {
            return Err(SchedulerError::InvalidState {
                from: rec.state,
                to: ProcessState::Blocked,
            });
        }
        rec.state = ProcessState::Blocked;
        drop(rec);

        *current = None;
        self.stats.inc_context_switches();
        info!("Process {} blocked on core {}", pid, core);
        Ok(pid)
    }

    /// Transition a Blocked process back to Ready
    ///
    /// Wait ticks are reset so time spent blocked is not double-counted as
    /// ready-queue wait. Cores running less urgent work are flagged for
    /// rescheduling.
    pub fn wake(&self, pid: Pid) -> SchedulerResult<()> {
        let record = self.store.record(pid)?;
        let mut rec = record.lock();
        if rec.state != ProcessState::Blocked {
            return Err(SchedulerError::InvalidState {
                from: rec.state,
                to: ProcessState::Ready,
            });
        }
        self.requeue_locked(&mut rec);
        let level = rec.effective_priority;
        drop(rec);

        info!("Process {} woken at level {}", pid, level);
        self.note_ready_pressure();
        Ok(())
    }

    /// Transition a core's running process to Zombie
    ///
    /// The record stays in the store until reaped; it is never re-enqueued.
    pub fn exit_current(&self, core: CoreId) -> SchedulerResult<Pid> {
        let slot = &self.cores[core];
        let mut current = slot.current.lock();
        let pid = current.ok_or(SchedulerError::CoreIdle(core))?;

        let record = self.store.record(pid)?;
        let mut rec = record.lock();
        if !rec.is_running() {
            return Err(SchedulerError::InvalidState {
                from: rec.state,
                to: ProcessState::Zombie,
            });
        }
        rec.state = ProcessState::Zombie;
        drop(rec);

        *current = None;
        self.stats.inc_context_switches();
        info!("Process {} exited on core {}", pid, core);
        Ok(pid)
    }

    /// Flag cores whose running process is less urgent than the best ready level
    ///
    /// Called by the timer path after aging and by `wake`. The flag is a
    /// hint; `schedule` re-verifies urgency before actually preempting.
    pub fn note_ready_pressure(&self) {
        let best = match self.registry.min_ready_level() {
            Some(level) => level,
            None => return,
        };
        for slot in self.cores.iter() {
            let current = slot.current.lock();
            if let Some(pid) = *current {
                if let Ok(record) = self.store.record(pid) {
                    if best < record.lock().effective_priority {
                        slot.need_resched.store(true, Ordering::Release);
                    }
                }
            }
        }
    }
}
