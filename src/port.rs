//! # Hardware Collaborators
//!
//! The scheduler does not own any peripheral. These traits are the seams
//! to the board: a periodic timer that calls back once per tick, an idle
//! primitive parked at the end of each dispatch pass, and an optional
//! one-byte indicator for error codes.
//!
//! The Cortex-M implementations live in [`crate::arch`].

/// Periodic tick source.
pub trait TickTimer {
    /// Set the interval between tick hook invocations.
    fn set_tick_period_ms(&mut self, ms: u32);

    /// Install the function to call from the timer interrupt, once per period.
    fn set_tick_hook(&mut self, hook: fn());
}

/// Low-power wait used between dispatch passes.
pub trait Idle {
    /// Park the core until the next interrupt. Must not busy-wait.
    fn wait_for_interrupt(&mut self);
}

/// Single-byte status sink (e.g. a port of LEDs).
pub trait IndicatorPort {
    fn write(&mut self, value: u8);
}

