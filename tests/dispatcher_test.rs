/*!
 * Dispatcher Tests
 * Selection order, the process state machine, and multi-core behavior
 */

use pretty_assertions::assert_eq;
use prio_kernel::{
    Decision, Kernel, ProcessState, SchedulerConfig, SchedulerError,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;

fn kernel_with_cores(cores: usize) -> Kernel {
    let config = SchedulerConfig::new(10_000, 8, cores).unwrap();
    Kernel::new(config)
}

#[test]
fn test_idle_on_empty_registry() {
    let kernel = kernel_with_cores(1);
    assert_eq!(kernel.dispatcher().schedule(0), Decision::Idle);
    assert!(kernel.stats().idle_polls > 0);
}

#[test]
fn test_most_urgent_process_dispatched() {
    let kernel = kernel_with_cores(1);
    let store = kernel.store();

    let low = store.spawn_with_priority("low", 20).unwrap();
    let urgent = store.spawn_with_priority("urgent", 2).unwrap();

    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(urgent));
    assert_eq!(kernel.dispatcher().current(0), Some(urgent));
    assert_eq!(store.get(urgent).unwrap().state, ProcessState::Running);
    assert_eq!(store.get(low).unwrap().state, ProcessState::Ready);
}

#[test]
fn test_priority_change_reorders_dispatch() {
    let kernel = kernel_with_cores(1);
    let store = kernel.store();

    // A at a less urgent level, B at the urgent one
    let a = store.spawn_with_priority("a", 5).unwrap();
    let b = store.spawn_with_priority("b", 1).unwrap();

    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(b));
    kernel.dispatcher().exit_current(0).unwrap();

    // Raising A to B's old level: previous value comes back, next dispatch
    // picks A
    assert_eq!(store.set_base_priority(a, 1).unwrap(), 5);
    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(a));
}

#[test]
fn test_fifo_tie_break_within_level() {
    let kernel = kernel_with_cores(1);
    let store = kernel.store();

    let first = store.spawn_with_priority("first", 7).unwrap();
    let second = store.spawn_with_priority("second", 7).unwrap();

    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(first));
    kernel.dispatcher().exit_current(0).unwrap();
    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(second));
}

#[test]
fn test_yield_rotates_same_level() {
    let kernel = kernel_with_cores(1);
    let store = kernel.store();

    let x = store.spawn_with_priority("x", 10).unwrap();
    let y = store.spawn_with_priority("y", 10).unwrap();

    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(x));
    assert_eq!(kernel.dispatcher().yield_current(0), Decision::Run(y));
    assert_eq!(kernel.dispatcher().current(0), Some(y));

    // x went back to the tail of its bucket
    assert_eq!(store.get(x).unwrap().state, ProcessState::Ready);
    assert!(kernel.registry().contains(x));
}

#[test]
fn test_block_and_wake_cycle() {
    let kernel = kernel_with_cores(1);
    let store = kernel.store();

    let pid = store.spawn_with_priority("sleeper", 10).unwrap();
    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(pid));

    assert_eq!(kernel.dispatcher().block_current(0).unwrap(), pid);
    assert_eq!(store.get(pid).unwrap().state, ProcessState::Blocked);
    assert!(!kernel.registry().contains(pid));
    assert_eq!(kernel.dispatcher().current(0), None);

    kernel.dispatcher().wake(pid).unwrap();
    let snapshot = store.get(pid).unwrap();
    assert_eq!(snapshot.state, ProcessState::Ready);
    // Wait accrued while blocked is not carried over
    assert_eq!(snapshot.wait_ticks, 0);

    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(pid));
}

#[test]
fn test_wake_requires_blocked_state() {
    let kernel = kernel_with_cores(1);
    let pid = kernel.store().spawn("ready");

    assert!(matches!(
        kernel.dispatcher().wake(pid),
        Err(SchedulerError::InvalidState { .. })
    ));
}

#[test]
fn test_block_on_idle_core_fails() {
    let kernel = kernel_with_cores(1);
    assert!(matches!(
        kernel.dispatcher().block_current(0),
        Err(SchedulerError::CoreIdle(0))
    ));
}

#[test]
fn test_exit_and_reap_lifecycle() {
    let kernel = kernel_with_cores(1);
    let store = kernel.store();

    let pid = store.spawn("short-lived");
    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(pid));
    assert_eq!(kernel.dispatcher().exit_current(0).unwrap(), pid);

    // Zombie stays visible until reaped, but can no longer be re-prioritized
    assert_eq!(store.get(pid).unwrap().state, ProcessState::Zombie);
    assert!(matches!(
        store.set_base_priority(pid, 3),
        Err(SchedulerError::NoSuchProcess(_))
    ));

    store.reap(pid).unwrap();
    assert!(matches!(
        store.get(pid),
        Err(SchedulerError::NoSuchProcess(_))
    ));
}

#[test]
fn test_preemption_when_more_urgent_work_arrives() {
    let kernel = kernel_with_cores(1);
    let store = kernel.store();

    let low = store.spawn_with_priority("low", 20).unwrap();
    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(low));

    let urgent = store.spawn_with_priority("urgent", 2).unwrap();
    kernel.dispatcher().note_ready_pressure();

    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(urgent));
    assert_eq!(store.get(low).unwrap().state, ProcessState::Ready);
    assert!(kernel.stats().preemptions >= 1);
}

#[test]
fn test_no_preemption_by_equal_level() {
    let kernel = kernel_with_cores(1);
    let store = kernel.store();

    let running = store.spawn_with_priority("running", 10).unwrap();
    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(running));

    store.spawn_with_priority("peer", 10).unwrap();
    kernel.dispatcher().note_ready_pressure();

    // Equal urgency does not evict the owner
    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(running));
    assert_eq!(kernel.stats().preemptions, 0);
}

#[test]
fn test_cores_never_share_a_process() {
    let kernel = kernel_with_cores(2);
    let store = kernel.store();

    let a = store.spawn_with_priority("a", 4).unwrap();
    let b = store.spawn_with_priority("b", 4).unwrap();

    let first = kernel.dispatcher().schedule(0);
    let second = kernel.dispatcher().schedule(1);

    assert_eq!(first, Decision::Run(a));
    assert_eq!(second, Decision::Run(b));
    assert!(kernel.registry().is_empty());
}

#[test]
fn test_concurrent_dispatch_is_exactly_once() {
    let kernel = kernel_with_cores(4);
    let store = kernel.store();

    let mut spawned = HashSet::new();
    for i in 0..32u32 {
        spawned.insert(store.spawn_with_priority(format!("p{}", i), (i % 32) as i64).unwrap());
    }

    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let mut handles = vec![];
    for core in 0..4 {
        let kernel = kernel.clone();
        let dispatched = Arc::clone(&dispatched);
        handles.push(thread::spawn(move || loop {
            match kernel.dispatcher().schedule(core) {
                Decision::Run(pid) => {
                    dispatched.lock().unwrap().push(pid);
                    kernel.dispatcher().exit_current(core).unwrap();
                }
                Decision::Idle => break,
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let dispatched = dispatched.lock().unwrap();
    let unique: HashSet<_> = dispatched.iter().copied().collect();
    assert_eq!(dispatched.len(), 32, "every process dispatched exactly once");
    assert_eq!(unique, spawned);
}

#[test]
fn test_ready_count_matches_bucket_totals() {
    let kernel = kernel_with_cores(2);
    let store = kernel.store();

    for i in 0..16u32 {
        store.spawn_with_priority(format!("w{}", i), (i % 32) as i64).unwrap();
    }
    kernel.dispatcher().schedule(0);
    kernel.dispatcher().schedule(1);
    kernel.dispatcher().yield_current(0);

    let registry = kernel.registry();
    assert_eq!(registry.len(), registry.counted_len());
    assert_eq!(store.ready_count(), registry.len());
}
