//! # Cortex-M4 Port Layer
//!
//! SysTick as the tick source, `WFI` as the idle primitive and a GPIO
//! output data register as the error indicator.
//!
//! ## Interrupt Priorities
//!
//! SysTick runs at the lowest priority (0xFF). The tick hook only touches
//! scheduler state inside a critical section, so higher-priority
//! application interrupts are never delayed by more than one table sweep.

use core::cell::Cell;

use cortex_m::peripheral::scb::SystemHandler;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::{SCB, SYST};
use cortex_m_rt::exception;
use critical_section::Mutex;

use crate::arch::moder_with_outputs;
use crate::config::SYSTEM_CLOCK_HZ;
use crate::port::{Idle, IndicatorPort, TickTimer};

/// Hook installed by [`SysTickTimer::set_tick_hook`], called from the
/// SysTick exception.
static TICK_HOOK: Mutex<Cell<Option<fn()>>> = Mutex::new(Cell::new(None));

// ---------------------------------------------------------------------------
// SysTick tick source
// ---------------------------------------------------------------------------

/// [`TickTimer`] backed by the core SysTick counter.
pub struct SysTickTimer {
    syst: SYST,
    clock_hz: u32,
}

impl SysTickTimer {
    /// Take the SysTick peripheral, clocked from the core clock at
    /// `SYSTEM_CLOCK_HZ`.
    pub fn new(syst: SYST) -> Self {
        Self::with_clock(syst, SYSTEM_CLOCK_HZ)
    }

    pub fn with_clock(mut syst: SYST, clock_hz: u32) -> Self {
        syst.disable_counter();
        syst.set_clock_source(SystClkSource::Core);
        Self { syst, clock_hz }
    }

    /// Put SysTick at the lowest exception priority.
    pub fn set_lowest_priority(scb: &mut SCB) {
        // On armv6m `set_priority` is not atomic
        critical_section::with(|_| unsafe {
            scb.set_priority(SystemHandler::SysTick, 0xFF);
        });
    }
}

impl TickTimer for SysTickTimer {
    /// SysTick has a 24-bit reload register; periods that do not fit are
    /// clamped to the longest one available.
    fn set_tick_period_ms(&mut self, ms: u32) {
        let cycles = (self.clock_hz / 1000).saturating_mul(ms.max(1));
        let reload = cycles.saturating_sub(1).min(0x00FF_FFFF);
        self.syst.disable_counter();
        self.syst.set_reload(reload);
        self.syst.clear_current();
        self.syst.enable_interrupt();
        self.syst.enable_counter();
    }

    fn set_tick_hook(&mut self, hook: fn()) {
        critical_section::with(|cs| TICK_HOOK.borrow(cs).set(Some(hook)));
    }
}

/// SysTick exception handler — scheduler tick entry point.
#[exception]
fn SysTick() {
    let hook = critical_section::with(|cs| TICK_HOOK.borrow(cs).get());
    if let Some(hook) = hook {
        hook();
    }
}

// ---------------------------------------------------------------------------
// Idle
// ---------------------------------------------------------------------------

/// Sleeps with `WFI` between dispatch passes.
pub struct Wfi;

impl Idle for Wfi {
    #[inline]
    fn wait_for_interrupt(&mut self) {
        cortex_m::asm::wfi();
    }
}

// ---------------------------------------------------------------------------
// GPIO indicator
// ---------------------------------------------------------------------------

/// Drives eight consecutive pins of a GPIO output data register.
pub struct GpioIndicator {
    odr: *mut u32,
    shift: u32,
}

// Safety: the register address is fixed for the life of the program and
// only written through `&mut self`.
unsafe impl Send for GpioIndicator {}

impl GpioIndicator {
    /// STM32F4 GPIOD output data register.
    pub const GPIOD_ODR: usize = 0x4002_0C14;
    /// STM32F4 GPIOD mode register.
    pub const GPIOD_MODER: usize = 0x4002_0C00;
    /// STM32F4 RCC AHB1 peripheral clock enable register.
    pub const RCC_AHB1ENR: usize = 0x4002_3830;
    /// GPIODEN bit in `RCC_AHB1ENR`.
    pub const GPIODEN: u32 = 1 << 3;

    /// Clock GPIOD and make pins `first..first + count` push-pull outputs.
    ///
    /// # Safety
    /// Performs read-modify-write on RCC and GPIOD registers; nothing else
    /// may be configuring them concurrently.
    pub unsafe fn configure_gpiod_outputs(first: u32, count: u32) {
        let ahb1enr = Self::RCC_AHB1ENR as *mut u32;
        let moder = Self::GPIOD_MODER as *mut u32;
        critical_section::with(|_| {
            core::ptr::write_volatile(ahb1enr, core::ptr::read_volatile(ahb1enr) | Self::GPIODEN);
            // Dummy read: the clock must settle before the port is touched.
            let _ = core::ptr::read_volatile(ahb1enr);
            let current = core::ptr::read_volatile(moder);
            core::ptr::write_volatile(moder, moder_with_outputs(current, first, count));
        });
    }

    /// # Safety
    /// `odr` must be the address of a GPIO output data register whose pins
    /// `shift..shift + 8` are configured as outputs and not driven by
    /// anything else.
    pub unsafe fn new(odr: usize, shift: u32) -> Self {
        Self {
            odr: odr as *mut u32,
            shift,
        }
    }
}

impl IndicatorPort for GpioIndicator {
    fn write(&mut self, value: u8) {
        let mask = 0xFFu32 << self.shift;
        unsafe {
            let current = core::ptr::read_volatile(self.odr);
            let next = (current & !mask) | ((value as u32) << self.shift);
            core::ptr::write_volatile(self.odr, next);
        }
    }
}
