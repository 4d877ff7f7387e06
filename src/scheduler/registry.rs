/*!
 * Ready Registry
 * Per-priority-level FIFO buckets of runnable processes
 */

use crate::core::types::{Pid, Priority, PRIORITY_LEVELS};
use dashmap::DashMap;
use log::warn;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Ready queue partitioned by priority level
///
/// Bucket index equals the effective priority of every pid stored in it;
/// level 0 is the most urgent. Each bucket carries its own lock so selection
/// and mutation on different levels never contend. Moving a pid between two
/// buckets takes both locks in ascending level order, which keeps concurrent
/// movers deadlock-free.
///
/// Callers serialize membership changes for a given pid by holding that
/// process's record lock; the registry itself only guards bucket structure.
pub struct ReadyRegistry {
    buckets: Box<[Mutex<VecDeque<Pid>>]>,
    // Location index for O(1) removal
    locations: DashMap<Pid, Priority>,
    ready_count: AtomicUsize,
}

impl ReadyRegistry {
    pub fn new() -> Self {
        let buckets = (0..PRIORITY_LEVELS)
            .map(|_| Mutex::new(VecDeque::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            buckets,
            locations: DashMap::new(),
            ready_count: AtomicUsize::new(0),
        }
    }

    /// Append a pid to the tail of its level bucket
    pub fn enqueue(&self, pid: Pid, level: Priority) {
        let mut bucket = self.buckets[level as usize].lock();
        bucket.push_back(pid);
        drop(bucket);
        self.locations.insert(pid, level);
        self.ready_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Remove a pid from whichever bucket holds it - O(1) lookup + in-bucket scan
    pub fn remove(&self, pid: Pid) -> bool {
        let level = match self.locations.remove(&pid) {
            Some((_, level)) => level,
            None => return false,
        };

        let mut bucket = self.buckets[level as usize].lock();
        if let Some(pos) = bucket.iter().position(|&p| p == pid) {
            bucket.remove(pos);
            drop(bucket);
            self.ready_count.fetch_sub(1, Ordering::Relaxed);
            true
        } else {
            drop(bucket);
            // Index said the pid was here but the bucket disagrees; restore
            // the index entry rather than losing the process.
            self.locations.insert(pid, level);
            warn!("Ready index out of sync for process {}", pid);
            false
        }
    }

    /// Move a pid between two level buckets as one logical step
    pub fn move_bucket(&self, pid: Pid, from: Priority, to: Priority) -> bool {
        if from == to {
            return true;
        }

        // Ascending lock order across the two levels
        let (lo, hi) = if from < to { (from, to) } else { (to, from) };
        let mut lo_guard = self.buckets[lo as usize].lock();
        let mut hi_guard = self.buckets[hi as usize].lock();
        let (src, dst) = if from < to {
            (&mut *lo_guard, &mut *hi_guard)
        } else {
            (&mut *hi_guard, &mut *lo_guard)
        };

        match src.iter().position(|&p| p == pid) {
            Some(pos) => {
                src.remove(pos);
                dst.push_back(pid);
                drop(hi_guard);
                drop(lo_guard);
                self.locations.insert(pid, to);
                true
            }
            None => {
                warn!(
                    "Process {} not found in level {} bucket during move to {}",
                    pid, from, to
                );
                false
            }
        }
    }

    /// Peek the next pid to run without mutating any bucket
    ///
    /// Scans from level 0 upward and returns the front of the first non-empty
    /// bucket (strict FIFO within a level). The caller removes the chosen pid
    /// separately; losing that removal race to another core is handled by the
    /// caller retrying, not by failing here.
    pub fn pick_highest(&self) -> Option<Pid> {
        for bucket in self.buckets.iter() {
            let bucket = bucket.lock();
            if let Some(&pid) = bucket.front() {
                return Some(pid);
            }
        }
        None
    }

    /// Most urgent level that has a waiting process
    pub fn min_ready_level(&self) -> Option<Priority> {
        for (level, bucket) in self.buckets.iter().enumerate() {
            if !bucket.lock().is_empty() {
                return Some(level as Priority);
            }
        }
        None
    }

    /// Level the registry currently files a pid under
    pub fn level_of(&self, pid: Pid) -> Option<Priority> {
        self.locations.get(&pid).map(|entry| *entry.value())
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.locations.contains_key(&pid)
    }

    /// Number of ready processes across all buckets
    ///
    /// # Performance
    /// Hot path - lock-free gauge read
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.ready_count.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of bucket lengths counted bucket by bucket (diagnostics)
    pub fn counted_len(&self) -> usize {
        self.buckets.iter().map(|b| b.lock().len()).sum()
    }
}

impl Default for ReadyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
