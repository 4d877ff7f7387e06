/*!
 * Kernel Context
 * Explicit handle to the process-wide scheduling state
 */

use crate::process::store::PriorityStore;
use crate::scheduler::aging::AgingClock;
use crate::scheduler::config::SchedulerConfig;
use crate::scheduler::dispatcher::Dispatcher;
use crate::scheduler::registry::ReadyRegistry;
use crate::scheduler::stats::{AtomicSchedStats, SchedStats};
use crate::scheduler::task::AgingTask;
use crate::syscalls::handler::PrioritySyscallHandler;
use log::info;
use std::sync::Arc;

/// Kernel scheduling context
///
/// The one instance of the store, registry, aging clock, and dispatcher,
/// created at initialization and passed explicitly to every caller; there
/// are no ambient globals. Cloning shares the same underlying state.
pub struct Kernel {
    config: SchedulerConfig,
    store: Arc<PriorityStore>,
    registry: Arc<ReadyRegistry>,
    aging: Arc<AgingClock>,
    dispatcher: Arc<Dispatcher>,
    stats: Arc<AtomicSchedStats>,
    aging_task: Option<Arc<AgingTask>>,
}

/// Builder for Kernel
pub struct KernelBuilder {
    config: SchedulerConfig,
    spawn_aging_task: bool,
}

impl KernelBuilder {
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
            spawn_aging_task: false,
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Spawn the timer-driven aging task (requires a tokio runtime)
    pub fn with_aging_task(mut self) -> Self {
        self.spawn_aging_task = true;
        self
    }

    /// Build the kernel context
    pub fn build(self) -> Kernel {
        let config = self.config;
        let stats = Arc::new(AtomicSchedStats::new(config.quantum()));
        let registry = Arc::new(ReadyRegistry::new());
        let store = Arc::new(PriorityStore::new(
            Arc::clone(&registry),
            Arc::clone(&stats),
        ));
        let aging = Arc::new(AgingClock::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            Arc::clone(&stats),
            config.aging_threshold(),
        ));
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            Arc::clone(&stats),
            config.cores(),
        ));

        let aging_task = if self.spawn_aging_task {
            Some(Arc::new(AgingTask::spawn(
                Arc::clone(&aging),
                Arc::clone(&dispatcher),
                config.quantum(),
            )))
        } else {
            None
        };

        info!(
            "Kernel initialized: {} core(s), {}us quantum, aging threshold {} (timer {})",
            config.cores(),
            config.quantum_micros(),
            config.aging_threshold(),
            if aging_task.is_some() { "on" } else { "off" },
        );

        Kernel {
            config,
            store,
            registry,
            aging,
            dispatcher,
            stats,
            aging_task,
        }
    }
}

impl Default for KernelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    /// Build with a configuration and no timer task
    pub fn new(config: SchedulerConfig) -> Self {
        KernelBuilder::new().with_config(config).build()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<PriorityStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<ReadyRegistry> {
        &self.registry
    }

    pub fn aging(&self) -> &Arc<AgingClock> {
        &self.aging
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn aging_task(&self) -> Option<&Arc<AgingTask>> {
        self.aging_task.as_ref()
    }

    /// Scheduler statistics snapshot
    pub fn stats(&self) -> SchedStats {
        self.stats.snapshot()
    }

    /// Update the scheduling quantum at runtime
    ///
    /// Revalidates against the configured bounds and retunes the aging timer
    /// when one is running.
    pub fn set_quantum(&self, quantum_micros: u64) -> crate::core::SchedulerResult<()> {
        let validated = SchedulerConfig::new(
            quantum_micros,
            self.config.aging_threshold(),
            self.config.cores(),
        )?;
        self.stats.set_quantum(validated.quantum());
        if let Some(task) = &self.aging_task {
            task.update_quantum(quantum_micros);
        }
        info!("Scheduling quantum updated to {}us", quantum_micros);
        Ok(())
    }

    /// Construct the externally reachable syscall surface
    pub fn syscall_handler(&self) -> PrioritySyscallHandler {
        PrioritySyscallHandler::new(
            Arc::clone(&self.store),
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.stats),
        )
    }
}

impl Clone for Kernel {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            store: Arc::clone(&self.store),
            registry: Arc::clone(&self.registry),
            aging: Arc::clone(&self.aging),
            dispatcher: Arc::clone(&self.dispatcher),
            stats: Arc::clone(&self.stats),
            aging_task: self.aging_task.as_ref().map(Arc::clone),
        }
    }
}
