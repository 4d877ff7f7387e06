/*!
 * Aging Task - Timer-Driven Promotion and Preemption
 *
 * Background task standing in for the timer interrupt: fires once per
 * scheduling quantum, advances the aging clock, and flags cores whose
 * running process has been outranked by newly promoted work.
 */

use crate::scheduler::aging::AgingClock;
use crate::scheduler::dispatcher::Dispatcher;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Control messages for the aging task
#[derive(Debug, Clone)]
pub enum AgingCommand {
    /// Update the tick interval (new quantum in microseconds)
    UpdateQuantum(u64),
    /// Pause aging ticks
    Pause,
    /// Resume aging ticks
    Resume,
    /// Fire one tick immediately
    Trigger,
    /// Shutdown the aging task
    Shutdown,
}

/// Handle to the aging background task
pub struct AgingTask {
    command_tx: mpsc::UnboundedSender<AgingCommand>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl AgingTask {
    /// Spawn an aging task ticking at the quantum rate
    pub fn spawn(aging: Arc<AgingClock>, dispatcher: Arc<Dispatcher>, quantum: Duration) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            run_aging_loop(aging, dispatcher, quantum, command_rx).await;
        });

        info!("Aging task spawned at {:?} quantum", quantum);

        Self {
            command_tx,
            handle: Some(handle),
        }
    }

    /// Update the tick interval (triggers immediate reconfiguration)
    pub fn update_quantum(&self, quantum_micros: u64) {
        let _ = self
            .command_tx
            .send(AgingCommand::UpdateQuantum(quantum_micros));
    }

    /// Pause aging (explicit priority changes still apply)
    pub fn pause(&self) {
        let _ = self.command_tx.send(AgingCommand::Pause);
    }

    /// Resume aging
    pub fn resume(&self) {
        let _ = self.command_tx.send(AgingCommand::Resume);
    }

    /// Fire one tick immediately
    pub fn trigger(&self) {
        let _ = self.command_tx.send(AgingCommand::Trigger);
    }

    /// Shutdown the aging task gracefully
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(AgingCommand::Shutdown);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Aging task shutdown error: {}", e);
            } else {
                info!("Aging task shutdown complete");
            }
        }
    }
}

/// Core aging loop
async fn run_aging_loop(
    aging: Arc<AgingClock>,
    dispatcher: Arc<Dispatcher>,
    quantum: Duration,
    mut command_rx: mpsc::UnboundedReceiver<AgingCommand>,
) {
    let mut active = true;
    let mut interval = tokio::time::interval(quantum);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!("Aging loop started with {:?} quantum", quantum);

    loop {
        tokio::select! {
            // Periodic tick (fires at quantum rate)
            _ = interval.tick() => {
                if active {
                    aging.tick();
                    dispatcher.note_ready_pressure();
                }
            }

            // Handle control commands
            Some(cmd) = command_rx.recv() => {
                match cmd {
                    AgingCommand::UpdateQuantum(new_quantum_micros) => {
                        info!("Aging quantum updated: {}us", new_quantum_micros);
                        interval = tokio::time::interval(Duration::from_micros(new_quantum_micros));
                        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                    }

                    AgingCommand::Pause => {
                        info!("Aging task paused");
                        active = false;
                    }

                    AgingCommand::Resume => {
                        info!("Aging task resumed");
                        active = true;
                    }

                    AgingCommand::Trigger => {
                        aging.tick();
                        dispatcher.note_ready_pressure();
                        log::trace!("Manual aging trigger");
                    }

                    AgingCommand::Shutdown => {
                        info!("Aging task shutting down");
                        break;
                    }
                }
            }
        }
    }
}

impl Drop for AgingTask {
    fn drop(&mut self) {
        // Attempt graceful shutdown if the handle still exists
        if self.handle.is_some() {
            let _ = self.command_tx.send(AgingCommand::Shutdown);
        }
    }
}
