/*!
 * Priority Store
 * Owns every live priority record and the base-priority mutation path
 */

use crate::core::types::{validate_priority, Pid, Priority, DEFAULT_PRIORITY};
use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::process::types::{PriorityRecord, ProcessSnapshot, ProcessState};
use crate::scheduler::registry::ReadyRegistry;
use crate::scheduler::stats::AtomicSchedStats;
use dashmap::DashMap;
use log::info;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Process-wide priority store
///
/// Lifecycle is tied to kernel uptime: created once at initialization and
/// referenced by every scheduling call. Records are only reachable through
/// the store, so all mutation funnels through the locking discipline here:
/// record lock first, then bucket locks.
pub struct PriorityStore {
    records: DashMap<Pid, Arc<Mutex<PriorityRecord>>>,
    registry: Arc<ReadyRegistry>,
    stats: Arc<AtomicSchedStats>,
    next_pid: AtomicU32,
}

impl PriorityStore {
    pub fn new(registry: Arc<ReadyRegistry>, stats: Arc<AtomicSchedStats>) -> Self {
        Self {
            records: DashMap::new(),
            registry,
            stats,
            next_pid: AtomicU32::new(1),
        }
    }

    /// Create a process at the default priority and mark it Ready
    pub fn spawn(&self, name: impl Into<String>) -> Pid {
        self.insert_record(name.into(), DEFAULT_PRIORITY)
    }

    /// Create a process at a caller-chosen priority
    pub fn spawn_with_priority(
        &self,
        name: impl Into<String>,
        priority: i64,
    ) -> SchedulerResult<Pid> {
        let priority = validate_priority(priority)?;
        Ok(self.insert_record(name.into(), priority))
    }

    fn insert_record(&self, name: String, priority: Priority) -> Pid {
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        let record = Arc::new(Mutex::new(PriorityRecord::new(pid, name, priority)));

        // Insert into the table before the first enqueue so the registry
        // never holds a pid the store cannot resolve.
        self.records.insert(pid, Arc::clone(&record));
        let rec = record.lock();
        self.registry.enqueue(pid, rec.effective_priority);
        drop(rec);

        self.stats.inc_active();
        info!("Process {} spawned at priority {}", pid, priority);
        pid
    }

    /// Snapshot a process's record
    pub fn get(&self, pid: Pid) -> SchedulerResult<ProcessSnapshot> {
        let record = self.record(pid)?;
        let rec = record.lock();
        Ok(rec.snapshot())
    }

    /// Fetch the shared handle to a record
    ///
    /// # Performance
    /// Hot path - every dispatch and aging pass resolves records through here
    #[inline]
    pub(crate) fn record(&self, pid: Pid) -> SchedulerResult<Arc<Mutex<PriorityRecord>>> {
        self.records
            .get(&pid)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(SchedulerError::NoSuchProcess(pid))
    }

    /// Change a process's base priority, returning the previous base value
    ///
    /// Validation happens before any lookup so an out-of-range request never
    /// mutates state. Wait history is cleared and the effective priority
    /// recomputed immediately; when the process is Ready its bucket moves in
    /// the same step, under the record lock, so the registry and the record
    /// never disagree.
    pub fn set_base_priority(&self, pid: Pid, requested: i64) -> SchedulerResult<Priority> {
        let new_priority = validate_priority(requested)?;
        let record = self.record(pid)?;
        let mut rec = record.lock();

        if rec.is_zombie() {
            return Err(SchedulerError::NoSuchProcess(pid));
        }

        let old_effective = rec.effective_priority;
        let previous = rec.rebase(new_priority);

        if rec.is_ready() && old_effective != new_priority {
            self.registry.move_bucket(pid, old_effective, new_priority);
        }
        drop(rec);

        info!(
            "Process {} base priority changed: {} -> {}",
            pid, previous, new_priority
        );
        Ok(previous)
    }

    /// Remove a terminated process's record
    pub fn reap(&self, pid: Pid) -> SchedulerResult<()> {
        let record = self.record(pid)?;
        let rec = record.lock();
        if !rec.is_zombie() {
            return Err(SchedulerError::InvalidState {
                from: rec.state,
                to: ProcessState::Zombie,
            });
        }
        drop(rec);

        // A concurrent reaper may have won; losing that race reads as the
        // process already being gone.
        self.records
            .remove(&pid)
            .ok_or(SchedulerError::NoSuchProcess(pid))?;
        self.stats.dec_active();
        info!("Process {} reaped", pid);
        Ok(())
    }

    /// Clone out every record handle
    ///
    /// Shard locks are held only while cloning Arcs, never while a record
    /// lock is taken, which keeps the aging pass deadlock-free.
    pub(crate) fn record_handles(&self) -> Vec<Arc<Mutex<PriorityRecord>>> {
        self.records
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Snapshot every live process
    pub fn snapshots(&self) -> Vec<ProcessSnapshot> {
        self.record_handles()
            .into_iter()
            .map(|record| record.lock().snapshot())
            .collect()
    }

    /// Count processes currently in the Ready state
    pub fn ready_count(&self) -> usize {
        self.record_handles()
            .into_iter()
            .filter(|record| record.lock().is_ready())
            .count()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.records.contains_key(&pid)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
