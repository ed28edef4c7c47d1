//! # Copos Configuration
//!
//! Compile-time constants governing the scheduler, plus the small runtime
//! [`SchedulerConfig`] applied by [`Scheduler::init`](crate::scheduler::Scheduler::init).
//! All limits are fixed at compile time — no dynamic allocation.

/// Maximum number of tasks the table can hold simultaneously.
/// This bounds the static slot array. Each slot costs a fat pointer plus
/// three `u32` counters of RAM.
pub const MAX_TASKS: usize = 8;

/// Default tick period in milliseconds handed to the timer collaborator.
pub const DEFAULT_TICK_MS: u32 = 1;

/// Number of ticks an error code stays latched before the status reporter
/// clears it (one minute at a 1 ms tick).
pub const STATUS_TIMEOUT_TICKS: u32 = 60_000;

/// System clock frequency in Hz (default for STM32F4 at 16 MHz HSI).
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

/// Runtime scheduler settings.
///
/// ```ignore
/// let config = SchedulerConfig::default()
///     .with_tick_period_ms(10)
///     .with_status_reporting(true);
/// scheduler.init(config);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Tick period passed to `TickTimer::set_tick_period_ms` on start.
    pub tick_period_ms: u32,
    /// Whether the status reporter runs at the end of every dispatch pass.
    pub report_status: bool,
    /// Auto-clear countdown for a latched error, in ticks.
    pub status_timeout: u32,
}

impl SchedulerConfig {
    pub const fn new() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_MS,
            report_status: false,
            status_timeout: STATUS_TIMEOUT_TICKS,
        }
    }

    pub const fn with_tick_period_ms(self, tick_period_ms: u32) -> Self {
        Self { tick_period_ms, ..self }
    }

    pub const fn with_status_reporting(self, report_status: bool) -> Self {
        Self { report_status, ..self }
    }

    pub const fn with_status_timeout(self, status_timeout: u32) -> Self {
        Self { status_timeout, ..self }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.tick_period_ms, DEFAULT_TICK_MS);
        assert!(!config.report_status);
        assert_eq!(config.status_timeout, 60_000);
    }

    #[test]
    fn test_builder_overrides() {
        let config = SchedulerConfig::new()
            .with_tick_period_ms(5)
            .with_status_reporting(true)
            .with_status_timeout(10);
        assert_eq!(config.tick_period_ms, 5);
        assert!(config.report_status);
        assert_eq!(config.status_timeout, 10);
    }
}
