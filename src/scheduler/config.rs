/*!
 * Scheduler Configuration
 * Validated construction-time settings for the scheduling core
 */

use crate::core::errors::{SchedulerError, SchedulerResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Default scheduling quantum
pub const DEFAULT_QUANTUM_MICROS: u64 = 10_000;

/// Default ready quanta before a one-step aging promotion
pub const DEFAULT_AGING_THRESHOLD: u32 = 8;

/// Scheduler configuration
///
/// Constructed through [`SchedulerConfig::new`] so every instance is valid;
/// deserialization funnels through the same checks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerConfig {
    quantum_micros: u64,
    aging_threshold: u32,
    cores: usize,
}

impl SchedulerConfig {
    /// Create a validated configuration
    pub fn new(quantum_micros: u64, aging_threshold: u32, cores: usize) -> SchedulerResult<Self> {
        if !(1_000..=1_000_000).contains(&quantum_micros) {
            return Err(SchedulerError::InvalidConfig(format!(
                "quantum {} must be between 1ms (1000us) and 1s (1000000us)",
                quantum_micros
            )));
        }
        if aging_threshold == 0 {
            return Err(SchedulerError::InvalidConfig(
                "aging threshold must be at least 1 quantum".into(),
            ));
        }
        if cores == 0 {
            return Err(SchedulerError::InvalidConfig(
                "at least one dispatch core is required".into(),
            ));
        }
        Ok(Self {
            quantum_micros,
            aging_threshold,
            cores,
        })
    }

    /// Scheduling quantum
    ///
    /// # Performance
    /// Hot path - read on every timer interval reconfiguration
    #[inline(always)]
    pub const fn quantum(&self) -> Duration {
        Duration::from_micros(self.quantum_micros)
    }

    #[inline(always)]
    pub const fn quantum_micros(&self) -> u64 {
        self.quantum_micros
    }

    /// Ready quanta a process waits before a one-step promotion
    #[inline(always)]
    pub const fn aging_threshold(&self) -> u32 {
        self.aging_threshold
    }

    /// Number of dispatch cores
    #[inline(always)]
    pub const fn cores(&self) -> usize {
        self.cores
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        // Literal construction: the defaults are within the validated ranges
        Self {
            quantum_micros: DEFAULT_QUANTUM_MICROS,
            aging_threshold: DEFAULT_AGING_THRESHOLD,
            cores: 1,
        }
    }
}

impl<'de> Deserialize<'de> for SchedulerConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "snake_case")]
        struct Inner {
            quantum_micros: u64,
            aging_threshold: u32,
            cores: usize,
        }

        let inner = Inner::deserialize(deserializer)?;
        Self::new(inner.quantum_micros, inner.aging_threshold, inner.cores)
            .map_err(serde::de::Error::custom)
    }
}
