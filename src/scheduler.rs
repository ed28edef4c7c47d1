//! # Scheduler
//!
//! Core of Copos: a cooperative, tick-driven scheduler over a fixed
//! [`TaskTable`]. There is no preemption and no priority; a task runs to
//! completion when the main loop gets to it.
//!
//! ## Execution Contexts
//!
//! ```text
//!  timer IRQ ──► tick()             decrement delays, count due firings
//!  main loop ──► dispatch_once()    run due tasks in slot order,
//!                                   reclaim one-shots, report status, WFI
//!  main loop ──► add_task() / delete_task() / modify_task_period()
//! ```
//!
//! Every access to the shared state happens inside a critical section, so
//! the tick interrupt can never land between two writes of a registry
//! call. Tasks are invoked *outside* the critical section; a task may add
//! or delete tasks (including itself) while it runs.

use core::cell::RefCell;

use log::{debug, info, trace, warn};

use crate::config::{SchedulerConfig, MAX_TASKS, STATUS_TIMEOUT_TICKS};
use crate::error::{SchedulerError, NO_ERROR};
use crate::port::{Idle, IndicatorPort, TickTimer};
use crate::status::StatusReporter;
use crate::sync::{self, Mutex};
use crate::table::{TaskId, TaskTable};
use crate::task::{Runnable, SlotInfo};

/// Everything the tick interrupt and the main loop share.
struct State<'a> {
    table: TaskTable<'a>,
    /// Ticks since `init`, wrapping.
    ticks: u32,
    /// Last error code latched by a registry call; `NO_ERROR` when clear.
    error: u8,
    config: SchedulerConfig,
    reporter: StatusReporter<'a>,
}

impl<'a> State<'a> {
    const fn new() -> Self {
        Self {
            table: TaskTable::new(),
            ticks: 0,
            error: NO_ERROR,
            config: SchedulerConfig::new(),
            reporter: StatusReporter::new(STATUS_TIMEOUT_TICKS),
        }
    }

    /// Record a failed registry call in the error latch.
    fn latch<T>(&mut self, result: Result<T, SchedulerError>) -> Result<T, SchedulerError> {
        if let Err(err) = &result {
            self.error = err.code();
        }
        result
    }
}

/// The scheduler instance: task table, tick counter, error latch and the
/// optional status reporter, all behind one critical-section mutex.
///
/// `'a` is how long registered tasks (and the indicator port) are
/// borrowed for. Firmware normally keeps a `Scheduler<'static>` in a
/// `static`; see [`crate::kernel`].
pub struct Scheduler<'a> {
    state: Mutex<RefCell<State<'a>>>,
}

impl<'a> Scheduler<'a> {
    /// An empty scheduler with default configuration.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(State::new())),
        }
    }

    /// Prepare the scheduler for use.
    ///
    /// Vacates every slot, zeroes the tick counter, clears the error latch
    /// and applies `config`. An attached indicator port is kept.
    pub fn init(&self, config: SchedulerConfig) {
        sync::with_locked(&self.state, |s| {
            s.table.clear();
            s.ticks = 0;
            s.error = NO_ERROR;
            s.config = config;
            s.reporter.set_timeout(config.status_timeout);
            s.reporter.reset();
        });
        info!(
            "scheduler init: {} slots, tick {} ms, status reporting {}",
            MAX_TASKS,
            config.tick_period_ms,
            if config.report_status { "on" } else { "off" }
        );
    }

    /// Wire an indicator port to the status reporter.
    pub fn attach_indicator(&self, port: &'a mut (dyn IndicatorPort + Send)) {
        sync::with_locked(&self.state, |s| s.reporter.attach(port));
    }

    /// Program the timer collaborator and install `hook` as the tick
    /// callback. `hook` must end up calling [`tick`](Self::tick) on this
    /// scheduler.
    ///
    /// Usually called after the regular tasks are added so they start in
    /// step.
    pub fn start<T: TickTimer + ?Sized>(&self, timer: &mut T, hook: fn()) {
        let period_ms = sync::with_locked(&self.state, |s| s.config.tick_period_ms);
        timer.set_tick_period_ms(period_ms);
        timer.set_tick_hook(hook);
        info!("scheduler started, tick every {} ms", period_ms);
    }

    // -----------------------------------------------------------------------
    // Interrupt context
    // -----------------------------------------------------------------------

    /// Tick update. Call once per timer period from the timer interrupt.
    ///
    /// O(`MAX_TASKS`), allocation-free, never invokes a task and never fails.
    pub fn tick(&self) {
        sync::with_locked(&self.state, |s| {
            s.ticks = s.ticks.wrapping_add(1);
            s.table.advance();
        });
    }

    // -----------------------------------------------------------------------
    // Main-loop context
    // -----------------------------------------------------------------------

    /// Sweep the table once in slot order and run every due task once.
    ///
    /// A slot with several pending firings gets one per sweep. One-shot
    /// slots are vacated as their task is claimed. Returns the number of
    /// tasks run.
    pub fn dispatch_pending(&self) -> usize {
        let mut dispatched = 0;
        for id in 0..MAX_TASKS {
            let claimed =
                sync::with_locked(&self.state, |s| s.table.claim(id).map(|task| (task, s.ticks)));
            if let Some((task, ticks)) = claimed {
                trace!("dispatch task {} at tick {}", id, ticks);
                task.run(ticks);
                dispatched += 1;
            }
        }
        dispatched
    }

    /// One main-loop pass: dispatch due tasks, report status (if enabled),
    /// then park until the next interrupt.
    pub fn dispatch_once<I: Idle + ?Sized>(&self, idle: &mut I) -> usize {
        let dispatched = self.dispatch_pending();
        self.report_status();
        idle.wait_for_interrupt();
        dispatched
    }

    /// Dispatch forever.
    pub fn run<I: Idle + ?Sized>(&self, idle: &mut I) -> ! {
        loop {
            self.dispatch_once(idle);
        }
    }

    /// Run one status reporter step. Does nothing unless status reporting
    /// was enabled in the config.
    pub fn report_status(&self) {
        sync::with_locked(&self.state, |s| {
            if s.config.report_status {
                let State { reporter, error, .. } = s;
                reporter.report(error);
            }
        });
    }

    // -----------------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------------

    /// Register `task` to run after `delay` ticks, then every `period`
    /// ticks (`period == 0` runs it once).
    ///
    /// # Returns
    /// - `Ok(task_id)` — the lowest free slot index
    /// - `Err(SchedulerError::TableFull)` — no free slot; nothing changed
    ///
    /// A one-shot task's slot is freed when the dispatcher picks it up,
    /// just before the task is called. While it runs, the task already sees
    /// its own id as free: `delete_task` on it reports `SlotEmpty`, and an
    /// `add_task` from inside the task may be handed the same id.
    ///
    /// # Example
    /// ```ignore
    /// // First run at tick 300, then 1300, 2300, ...
    /// let id = scheduler.add_task(&blink, 300, 1000)?;
    /// ```
    pub fn add_task(
        &self,
        task: &'a dyn Runnable,
        delay: u32,
        period: u32,
    ) -> Result<TaskId, SchedulerError> {
        let result = sync::with_locked(&self.state, |s| {
            let result = s.table.insert(task, delay, period);
            s.latch(result)
        });
        match result {
            Ok(id) => debug!("task {} added: delay {}, period {}", id, delay, period),
            Err(err) => warn!("add_task refused: {}", err),
        }
        result
    }

    /// Remove a task. Its function is simply never called again.
    ///
    /// Deleting an already empty slot reports `SlotEmpty`; ids past the end
    /// of the table report `InvalidIndex`. Other slots are never touched.
    pub fn delete_task(&self, id: TaskId) -> Result<(), SchedulerError> {
        let result = sync::with_locked(&self.state, |s| {
            let result = s.table.remove(id);
            s.latch(result)
        });
        match result {
            Ok(()) => debug!("task {} deleted", id),
            Err(err) => warn!("delete_task({}) refused: {}", id, err),
        }
        result
    }

    /// Change how often a task repeats.
    ///
    /// Only the period is updated: the countdown already in progress runs
    /// out unchanged and the new period applies from the next reload.
    /// Setting the period to zero turns the task into a one-shot.
    pub fn modify_task_period(&self, id: TaskId, period: u32) -> Result<(), SchedulerError> {
        let result = sync::with_locked(&self.state, |s| {
            let result = s.table.set_period(id, period);
            s.latch(result)
        });
        match result {
            Ok(()) => debug!("task {} period set to {}", id, period),
            Err(err) => warn!("modify_task_period({}) refused: {}", id, err),
        }
        result
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// Raw error latch; `NO_ERROR` (0) when nothing is latched.
    pub fn last_error_code(&self) -> u8 {
        sync::with_locked(&self.state, |s| s.error)
    }

    pub fn last_error(&self) -> Option<SchedulerError> {
        SchedulerError::from_code(self.last_error_code())
    }

    pub fn clear_error(&self) {
        sync::with_locked(&self.state, |s| s.error = NO_ERROR);
    }

    /// Ticks counted since `init`.
    pub fn ticks(&self) -> u32 {
        sync::with_locked(&self.state, |s| s.ticks)
    }

    pub fn is_occupied(&self, id: TaskId) -> bool {
        sync::with_locked(&self.state, |s| s.table.is_occupied(id))
    }

    /// Number of occupied slots.
    pub fn task_count(&self) -> usize {
        sync::with_locked(&self.state, |s| s.table.len())
    }

    pub fn slot_info(&self, id: TaskId) -> Option<SlotInfo> {
        sync::with_locked(&self.state, |s| s.table.info(id))
    }
}

impl Default for Scheduler<'_> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
