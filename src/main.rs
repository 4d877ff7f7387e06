/*!
 * setprio - change a process's scheduling priority
 *
 * Boots the scheduling core with a demo workload, applies the requested
 * change through the priority syscall, and reports the value that was in
 * effect immediately before the call.
 */

use log::{info, warn};
use prio_kernel::{Decision, Kernel, PriorityControl, SchedulerConfig};
use std::env;
use std::process::ExitCode;

/// Demo workload: name and initial priority level (0 = most urgent)
const WORKLOAD: &[(&str, i64)] = &[
    ("init", 0),
    ("shell", 8),
    ("logd", 16),
    ("indexer", 24),
    ("batch", 31),
];

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <pid> <priority>", args[0]);
        return ExitCode::FAILURE;
    }

    let pid = match args[1].parse::<u32>() {
        Ok(pid) => pid,
        Err(_) => {
            eprintln!("setprio: invalid pid '{}'", args[1]);
            return ExitCode::FAILURE;
        }
    };
    let priority = match args[2].parse::<i64>() {
        Ok(priority) => priority,
        Err(_) => {
            eprintln!("setprio: invalid priority '{}'", args[2]);
            return ExitCode::FAILURE;
        }
    };

    let config = match SchedulerConfig::new(10_000, 8, 2) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("setprio: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let kernel = Kernel::builder()
        .with_config(config)
        .with_aging_task()
        .build();

    for (name, level) in WORKLOAD {
        match kernel.store().spawn_with_priority(*name, *level) {
            Ok(spawned) => info!("Spawned {} as pid {}", name, spawned),
            Err(e) => warn!("Could not spawn {}: {}", name, e),
        }
    }

    // Occupy the cores so the change lands on a live, scheduling system
    for core in 0..kernel.dispatcher().core_count() {
        if let Decision::Run(running) = kernel.dispatcher().schedule(core) {
            info!("Core {} running pid {}", core, running);
        }
    }

    let handler = kernel.syscall_handler();
    let result = handler.change_priority(pid, priority);

    match serde_json::to_string(&kernel.stats()) {
        Ok(stats) => info!("Scheduler stats: {}", stats),
        Err(e) => warn!("Could not serialize scheduler stats: {}", e),
    }

    match result {
        Ok(previous) => {
            println!(
                "priority of pid {} changed from {} to {}",
                pid, previous, priority
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("setprio: {}", e);
            ExitCode::FAILURE
        }
    }
}
