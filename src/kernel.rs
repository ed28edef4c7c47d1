//! # Kernel
//!
//! Process-wide scheduler instance and the free-function API firmware
//! calls from `main` and from the timer interrupt.
//!
//! ## Startup Sequence
//!
//! ```text
//! reset_handler (cortex-m-rt)
//!   └─► main()
//!         ├─► kernel::init()        ← Clear the table, apply config
//!         ├─► kernel::add_task()    ← Register tasks (×N)
//!         ├─► kernel::start()       ← Program the timer, install kernel::tick
//!         └─► kernel::run()         ← Dispatch loop (no return)
//! ```

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::port::{Idle, IndicatorPort, TickTimer};
use crate::scheduler::Scheduler;
use crate::table::TaskId;
use crate::task::{Runnable, SlotInfo};

/// Global scheduler instance. Interior state is guarded by a critical
/// section, so it is shared by plain reference from both contexts.
static SCHEDULER: Scheduler<'static> = Scheduler::new();

/// The global scheduler, for code that prefers the method API.
pub fn scheduler() -> &'static Scheduler<'static> {
    &SCHEDULER
}

/// Initialize the kernel. Call from `main` before anything else.
pub fn init(config: SchedulerConfig) {
    SCHEDULER.init(config);
}

/// Wire the error indicator used when status reporting is enabled.
pub fn attach_indicator(port: &'static mut (dyn IndicatorPort + Send)) {
    SCHEDULER.attach_indicator(port);
}

/// Program `timer` with the configured period and install [`tick`] as its hook.
pub fn start<T: TickTimer + ?Sized>(timer: &mut T) {
    SCHEDULER.start(timer, tick);
}

/// Tick hook. Runs in interrupt context.
pub fn tick() {
    SCHEDULER.tick();
}

/// One dispatch pass followed by a wait for interrupt.
pub fn dispatch_once<I: Idle + ?Sized>(idle: &mut I) -> usize {
    SCHEDULER.dispatch_once(idle)
}

/// Dispatch forever.
pub fn run<I: Idle + ?Sized>(idle: &mut I) -> ! {
    SCHEDULER.run(idle)
}

/// Register a task. See [`Scheduler::add_task`].
pub fn add_task(
    task: &'static dyn Runnable,
    delay: u32,
    period: u32,
) -> Result<TaskId, SchedulerError> {
    SCHEDULER.add_task(task, delay, period)
}

pub fn delete_task(id: TaskId) -> Result<(), SchedulerError> {
    SCHEDULER.delete_task(id)
}

pub fn modify_task_period(id: TaskId, period: u32) -> Result<(), SchedulerError> {
    SCHEDULER.modify_task_period(id, period)
}

pub fn report_status() {
    SCHEDULER.report_status();
}

/// Error code latched by the most recent failed registry call.
pub fn last_error_code() -> u8 {
    SCHEDULER.last_error_code()
}

pub fn slot_info(id: TaskId) -> Option<SlotInfo> {
    SCHEDULER.slot_info(id)
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    static RUNS: AtomicU32 = AtomicU32::new(0);
    static LAST_TICK: AtomicU32 = AtomicU32::new(0);

    fn heartbeat(ticks: u32) {
        RUNS.fetch_add(1, Ordering::Relaxed);
        LAST_TICK.store(ticks, Ordering::Relaxed);
    }

    struct ManualTimer {
        period_ms: u32,
        hook: Option<fn()>,
    }

    impl ManualTimer {
        fn fire(&self, times: u32) {
            if let Some(hook) = self.hook {
                for _ in 0..times {
                    hook();
                }
            }
        }
    }

    impl TickTimer for ManualTimer {
        fn set_tick_period_ms(&mut self, ms: u32) {
            self.period_ms = ms;
        }

        fn set_tick_hook(&mut self, hook: fn()) {
            self.hook = Some(hook);
        }
    }

    struct NoIdle;

    impl Idle for NoIdle {
        fn wait_for_interrupt(&mut self) {}
    }

    // The kernel instance is process-wide, so everything runs in one test.
    #[test]
    fn test_global_api_end_to_end() {
        init(SchedulerConfig::default().with_tick_period_ms(2));
        let id = add_task(&heartbeat, 5, 10).unwrap();

        let mut timer = ManualTimer { period_ms: 0, hook: None };
        start(&mut timer);
        assert_eq!(timer.period_ms, 2);

        timer.fire(5);
        assert_eq!(dispatch_once(&mut NoIdle), 1);
        assert_eq!(LAST_TICK.load(Ordering::Relaxed), 5);

        modify_task_period(id, 3).unwrap();
        assert_eq!(slot_info(id).map(|i| i.delay), Some(10));

        timer.fire(10);
        dispatch_once(&mut NoIdle);
        assert_eq!(RUNS.load(Ordering::Relaxed), 2);
        assert_eq!(LAST_TICK.load(Ordering::Relaxed), 15);

        delete_task(id).unwrap();
        assert_eq!(delete_task(id), Err(SchedulerError::SlotEmpty));
        assert_eq!(last_error_code(), SchedulerError::SlotEmpty.code());
        report_status();
        assert_eq!(scheduler().task_count(), 0);
    }
}
