/*!
 * Priority Syscall Tests
 * The externally visible change_priority contract
 */

use pretty_assertions::assert_eq;
use prio_kernel::{
    Decision, Kernel, KernelSyscalls, PriorityControl, SchedulerConfig, SchedulerError,
    StatsQuery, DEFAULT_PRIORITY,
};
use proptest::prelude::*;

fn kernel() -> Kernel {
    Kernel::new(SchedulerConfig::default())
}

#[test]
fn test_change_priority_returns_previous_value() {
    let kernel = kernel();
    let handler = kernel.syscall_handler();
    let pid = kernel.store().spawn("target");

    assert_eq!(
        handler.change_priority(pid, 3).unwrap(),
        DEFAULT_PRIORITY
    );
    assert_eq!(handler.change_priority(pid, 25).unwrap(), 3);
    assert_eq!(handler.priority_of(pid).unwrap(), 25);
}

#[test]
fn test_unknown_pid_fails_without_mutation() {
    let kernel = kernel();
    let handler = kernel.syscall_handler();
    let bystander = kernel.store().spawn("bystander");

    assert!(matches!(
        handler.change_priority(999, 3),
        Err(SchedulerError::NoSuchProcess(999))
    ));
    assert_eq!(handler.priority_of(bystander).unwrap(), DEFAULT_PRIORITY);
    assert_eq!(kernel.registry().len(), 1);
}

#[test]
fn test_out_of_range_priority_fails_without_mutation() {
    let kernel = kernel();
    let handler = kernel.syscall_handler();
    let pid = kernel.store().spawn("target");

    for bad in [-1i64, 32, 255, i64::MIN] {
        assert!(matches!(
            handler.change_priority(pid, bad),
            Err(SchedulerError::InvalidPriority { .. })
        ));
    }

    let snapshot = handler.process_snapshot(pid).unwrap();
    assert_eq!(snapshot.base_priority, DEFAULT_PRIORITY);
    assert_eq!(snapshot.effective_priority, DEFAULT_PRIORITY);
    assert_eq!(kernel.registry().level_of(pid), Some(DEFAULT_PRIORITY));
}

#[test]
fn test_ready_process_moves_bucket_with_priority() {
    let kernel = kernel();
    let handler = kernel.syscall_handler();

    let slow = kernel.store().spawn_with_priority("slow", 20).unwrap();
    let mid = kernel.store().spawn_with_priority("mid", 10).unwrap();

    handler.change_priority(slow, 2).unwrap();

    assert_eq!(kernel.registry().level_of(slow), Some(2));
    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(slow));
    assert_eq!(kernel.store().get(mid).unwrap().effective_priority, 10);
}

#[test]
fn test_running_process_keeps_core_after_change() {
    let kernel = kernel();
    let handler = kernel.syscall_handler();
    let pid = kernel.store().spawn_with_priority("runner", 10).unwrap();

    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(pid));
    assert_eq!(handler.change_priority(pid, 30).unwrap(), 10);

    // Not Ready, so no bucket involvement; the record alone is updated
    assert!(!kernel.registry().contains(pid));
    assert_eq!(handler.priority_of(pid).unwrap(), 30);
}

#[test]
fn test_zombie_reads_as_no_such_process() {
    let kernel = kernel();
    let handler = kernel.syscall_handler();
    let pid = kernel.store().spawn("doomed");

    assert_eq!(kernel.dispatcher().schedule(0), Decision::Run(pid));
    kernel.dispatcher().exit_current(0).unwrap();

    assert!(matches!(
        handler.change_priority(pid, 3),
        Err(SchedulerError::NoSuchProcess(_))
    ));
}

#[test]
fn test_handler_usable_as_trait_object() {
    let kernel = kernel();
    let pid = kernel.store().spawn("target");

    let syscalls: Box<dyn KernelSyscalls> = Box::new(kernel.syscall_handler());
    assert_eq!(syscalls.change_priority(pid, 1).unwrap(), DEFAULT_PRIORITY);
    assert_eq!(syscalls.scheduler_stats().active_processes, 1);
}

#[test]
fn test_error_serialization_is_tagged() {
    let serialized = serde_json::to_string(&SchedulerError::NoSuchProcess(7)).unwrap();
    assert!(serialized.contains("no_such_process"));

    let serialized =
        serde_json::to_string(&SchedulerError::InvalidPriority { requested: -1 }).unwrap();
    assert!(serialized.contains("invalid_priority"));
}

proptest! {
    #[test]
    fn prop_valid_priorities_round_trip(priority in 0i64..=31) {
        let kernel = kernel();
        let handler = kernel.syscall_handler();
        let pid = kernel.store().spawn("target");

        let previous = handler.change_priority(pid, priority).unwrap();
        prop_assert_eq!(previous, DEFAULT_PRIORITY);
        prop_assert_eq!(handler.priority_of(pid).unwrap() as i64, priority);
        prop_assert_eq!(kernel.registry().level_of(pid), Some(priority as u8));
    }

    #[test]
    fn prop_invalid_priorities_always_rejected(priority in prop_oneof![
        i64::MIN..0i64,
        32i64..=i64::MAX,
    ]) {
        let kernel = kernel();
        let handler = kernel.syscall_handler();
        let pid = kernel.store().spawn("target");

        prop_assert!(
            matches!(
                handler.change_priority(pid, priority),
                Err(SchedulerError::InvalidPriority { .. })
            ),
            "expected InvalidPriority error"
        );
        prop_assert_eq!(handler.priority_of(pid).unwrap(), DEFAULT_PRIORITY);
    }

    #[test]
    fn prop_each_change_reports_the_prior_value(levels in proptest::collection::vec(0i64..=31, 1..12)) {
        let kernel = kernel();
        let handler = kernel.syscall_handler();
        let pid = kernel.store().spawn("target");

        let mut expected = DEFAULT_PRIORITY;
        for level in levels {
            let previous = handler.change_priority(pid, level).unwrap();
            prop_assert_eq!(previous, expected);
            expected = level as u8;
        }
        prop_assert_eq!(handler.priority_of(pid).unwrap(), expected);
    }
}
