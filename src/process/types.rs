/*!
 * Process Types
 * Priority records and the process state machine
 */

use crate::core::types::{Pid, Priority};
use serde::{Deserialize, Serialize};

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Process is runnable and waiting in a ready bucket
    Ready,
    /// Process is executing on a core
    Running,
    /// Process is waiting on a resource
    Blocked,
    /// Process has terminated and awaits reaping
    Zombie,
}

/// Per-process scheduling record
///
/// Exclusively owned by its process table entry. Every field mutation happens
/// under the record lock so a scheduling decision never observes a
/// half-updated record.
#[derive(Debug, Clone)]
pub struct PriorityRecord {
    pub pid: Pid,
    pub name: String,
    pub base_priority: Priority,
    /// Priority actually used for selection; `<= base_priority` (aging only
    /// moves it toward 0)
    pub effective_priority: Priority,
    /// Scheduling quanta spent waiting in a ready bucket since last run
    pub wait_ticks: u32,
    pub state: ProcessState,
}

impl PriorityRecord {
    #[inline]
    #[must_use]
    pub fn new(pid: Pid, name: String, priority: Priority) -> Self {
        Self {
            pid,
            name,
            base_priority: priority,
            effective_priority: priority,
            wait_ticks: 0,
            state: ProcessState::Ready,
        }
    }

    /// Check if process is ready
    ///
    /// # Performance
    /// Hot path - checked on every selection and aging pass
    #[inline(always)]
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.state, ProcessState::Ready)
    }

    /// Check if process is running
    #[inline(always)]
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, ProcessState::Running)
    }

    /// Check if process has terminated
    #[inline(always)]
    #[must_use]
    pub const fn is_zombie(&self) -> bool {
        matches!(self.state, ProcessState::Zombie)
    }

    /// Install a new base priority, discarding accrued aging credit
    ///
    /// Returns the previous base priority. Wait history is cleared so aging
    /// never applies stale credit to a freshly re-prioritized process.
    #[inline]
    pub fn rebase(&mut self, new_base: Priority) -> Priority {
        let previous = self.base_priority;
        self.base_priority = new_base;
        self.effective_priority = new_base;
        self.wait_ticks = 0;
        previous
    }

    /// Snapshot the record for callers outside the lock
    #[must_use]
    pub fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot {
            pid: self.pid,
            name: self.name.clone(),
            base_priority: self.base_priority,
            effective_priority: self.effective_priority,
            wait_ticks: self.wait_ticks,
            state: self.state,
        }
    }
}

/// Point-in-time view of a priority record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessSnapshot {
    pub pid: Pid,
    pub name: String,
    pub base_priority: Priority,
    pub effective_priority: Priority,
    pub wait_ticks: u32,
    pub state: ProcessState,
}

impl ProcessSnapshot {
    /// Check if the snapshot was taken while the process was runnable
    #[inline(always)]
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.state, ProcessState::Ready)
    }
}
