//! # Copos Example Firmware
//!
//! Demonstrates the cooperative scheduler on an STM32F4 Discovery board
//! with three tasks:
//!
//! | Task | Kind | Delay | Period | Behavior |
//! |------|------|-------|--------|----------|
//! | `heartbeat` | Periodic | 0 | 500 | Toggles the green LED (PD12) |
//! | `SAMPLER` | Periodic | 300 | 1000 | Counts samples in its context |
//! | `settle` | One-shot | 2000 | 0 | Slows the sampler down once, then exits |
//!
//! Any refused registry call shows its error code for one minute on eight
//! active-low LEDs wired to PD0–PD7.

#![no_std]
#![no_main]

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use cortex_m_rt::entry;
use log::warn;
use panic_halt as _;

use copos::arch::cortex_m4::{GpioIndicator, SysTickTimer, Wfi};
use copos::task::ContextTask;
use copos::{kernel, SchedulerConfig, TaskId};

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

const GPIOD_BSRR: *mut u32 = 0x4002_0C18 as *mut u32;
const LED_GREEN: u32 = 12;

static LED_ON: AtomicBool = AtomicBool::new(false);

/// Toggles the green LED through the bit set/reset register.
fn heartbeat(_ticks: u32) {
    let on = !LED_ON.fetch_xor(true, Ordering::Relaxed);
    let bit = if on { 1 << LED_GREEN } else { 1 << (LED_GREEN + 16) };
    unsafe { core::ptr::write_volatile(GPIOD_BSRR, bit) };
}

struct SampleState {
    samples: AtomicU32,
    last_tick: AtomicU32,
}

fn sample(state: &SampleState, ticks: u32) {
    state.samples.fetch_add(1, Ordering::Relaxed);
    state.last_tick.store(ticks, Ordering::Relaxed);
}

static SAMPLER: ContextTask<SampleState> = ContextTask::new(
    sample,
    SampleState {
        samples: AtomicU32::new(0),
        last_tick: AtomicU32::new(0),
    },
);

static SAMPLER_ID: AtomicU32 = AtomicU32::new(u32::MAX);

/// After start-up, sample every 250 ms instead of every second.
fn settle(_ticks: u32) {
    let id = SAMPLER_ID.load(Ordering::Relaxed) as TaskId;
    if let Err(err) = kernel::modify_task_period(id, 250) {
        warn!("sampler retune refused: {}", err);
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

#[entry]
fn main() -> ! {
    let mut cp = cortex_m::Peripherals::take().unwrap();

    kernel::init(
        SchedulerConfig::default()
            .with_tick_period_ms(1)
            .with_status_reporting(true),
    );

    // SAFETY: runs once, before the timer starts and before any task, so
    // nothing else touches RCC or GPIOD. Afterwards PD0–PD7 are clocked
    // push-pull outputs owned only by the indicator; `heartbeat` drives PD12
    // through BSRR, outside the indicator's byte.
    unsafe {
        GpioIndicator::configure_gpiod_outputs(0, 8);
        GpioIndicator::configure_gpiod_outputs(LED_GREEN, 1);
    }
    let indicator = cortex_m::singleton!(
        : GpioIndicator = unsafe { GpioIndicator::new(GpioIndicator::GPIOD_ODR, 0) }
    )
    .unwrap();
    kernel::attach_indicator(indicator);

    kernel::add_task(&heartbeat, 0, 500).expect("Failed to add heartbeat");
    let sampler = kernel::add_task(&SAMPLER, 300, 1000).expect("Failed to add sampler");
    SAMPLER_ID.store(sampler as u32, Ordering::Relaxed);
    kernel::add_task(&settle, 2000, 0).expect("Failed to add settle");

    SysTickTimer::set_lowest_priority(&mut cp.SCB);
    let mut timer = SysTickTimer::new(cp.SYST);
    kernel::start(&mut timer);

    kernel::run(&mut Wfi)
}
