//! # Synchronization Primitives
//!
//! Interrupt-safe critical sections for state shared between the tick
//! interrupt and the main loop. On Cortex-M the implementation comes from
//! `cortex-m`'s `critical-section-single-core` feature (PRIMASK mask and
//! restore); host tests link `critical-section`'s `std` implementation.

use core::cell::RefCell;

pub use critical_section::{CriticalSection, Mutex};

/// Execute a closure within a critical section (interrupts disabled).
///
/// # Usage
/// ```ignore
/// sync::critical_section(|_cs| {
///     // Access shared state safely
/// });
/// ```
///
/// Keep the closure short: the tick interrupt is held off for its whole
/// duration.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(CriticalSection<'_>) -> R,
{
    critical_section::with(f)
}

/// Run `f` with exclusive access to the value behind `cell`.
#[inline]
pub fn with_locked<T, R>(cell: &Mutex<RefCell<T>>, f: impl FnOnce(&mut T) -> R) -> R {
    critical_section(|cs| f(&mut cell.borrow_ref_mut(cs)))
}
