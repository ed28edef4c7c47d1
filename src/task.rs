//! # Task Slot
//!
//! Defines the task model for Copos. A task is a callable capability
//! ([`Runnable`]) plus the countdown state the tick updater and dispatcher
//! share. Slots live in a fixed array; a slot is occupied iff it holds a
//! callable.
//!
//! ## Slot State Machine
//!
//! ```text
//!   ┌──────┐   add_task()   ┌──────────────────┐   delay hits 0   ┌───────────────┐
//!   │ Free │ ─────────────► │ Occupied/waiting │ ───────────────► │ Occupied/due  │
//!   └──────┘                └──────────────────┘                  └───────────────┘
//!      ▲                            ▲                                 │       │
//!      │                            └──── dispatched (period > 0) ────┘       │
//!      └──────────────────── dispatched (period == 0) ────────────────────────┘
//!      └──────────────────── delete_task() from any occupied state
//! ```

/// Something the dispatcher can invoke.
///
/// The callable must not block and should finish well within one tick
/// period. `ticks` is the scheduler's tick count at dispatch time.
///
/// Any `Fn(u32) + Sync` closure is a `Runnable`; for the classic
/// function-plus-context pairing use [`ContextTask`].
pub trait Runnable: Sync {
    fn run(&self, ticks: u32);
}

impl<F> Runnable for F
where
    F: Fn(u32) + Sync,
{
    #[inline]
    fn run(&self, ticks: u32) {
        self(ticks)
    }
}

/// A plain function paired with the context it is always called with.
pub struct ContextTask<C: Sync> {
    func: fn(&C, u32),
    context: C,
}

impl<C: Sync> ContextTask<C> {
    pub const fn new(func: fn(&C, u32), context: C) -> Self {
        Self { func, context }
    }

    pub fn context(&self) -> &C {
        &self.context
    }
}

impl<C: Sync> Runnable for ContextTask<C> {
    #[inline]
    fn run(&self, ticks: u32) {
        (self.func)(&self.context, ticks)
    }
}

/// Read-only snapshot of an occupied slot's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotInfo {
    /// Ticks remaining until the next firing.
    pub delay: u32,
    /// Ticks between firings; `0` for a one-shot task.
    pub period: u32,
    /// Firings seen by the tick updater but not yet dispatched.
    pub due: u32,
}

/// One position of the task table.
#[derive(Clone, Copy)]
pub struct TaskSlot<'a> {
    task: Option<&'a dyn Runnable>,
    delay: u32,
    period: u32,
    due: u32,
}

impl<'a> TaskSlot<'a> {
    /// A free slot. Used to initialize the static array.
    pub const EMPTY: Self = Self {
        task: None,
        delay: 0,
        period: 0,
        due: 0,
    };

    /// Fill the slot with a new task. The due count always starts at zero.
    pub fn occupy(&mut self, task: &'a dyn Runnable, delay: u32, period: u32) {
        self.task = Some(task);
        self.delay = delay;
        self.period = period;
        self.due = 0;
    }

    /// Zero every field, freeing the slot.
    #[inline]
    pub fn clear(&mut self) {
        *self = Self::EMPTY;
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.task.is_some()
    }

    #[inline]
    pub fn is_one_shot(&self) -> bool {
        self.period == 0
    }

    pub fn set_period(&mut self, period: u32) {
        self.period = period;
    }

    /// Advance the countdown by one tick.
    ///
    /// When the delay is (or becomes) zero the slot is due once more;
    /// periodic slots reload their delay, one-shot slots stay at zero and
    /// keep accumulating until dispatched.
    pub fn advance(&mut self) {
        if self.task.is_none() {
            return;
        }
        self.delay = self.delay.saturating_sub(1);
        if self.delay == 0 {
            self.due = self.due.saturating_add(1);
            if self.period > 0 {
                self.delay = self.period;
            }
        }
    }

    /// Consume one pending firing.
    ///
    /// Returns the callable to invoke, or `None` when nothing is due.
    /// A one-shot slot is vacated on the spot.
    pub fn claim(&mut self) -> Option<&'a dyn Runnable> {
        let task = self.task?;
        if self.due == 0 {
            return None;
        }
        self.due -= 1;
        if self.is_one_shot() {
            self.clear();
        }
        Some(task)
    }

    pub fn info(&self) -> Option<SlotInfo> {
        self.task.map(|_| SlotInfo {
            delay: self.delay,
            period: self.period,
            due: self.due,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    fn noop(_ticks: u32) {}

    #[test]
    fn test_empty_slot_is_free() {
        let mut slot = TaskSlot::EMPTY;
        assert!(!slot.is_occupied());
        slot.advance();
        assert_eq!(slot.info(), None);
        assert!(slot.claim().is_none());
    }

    #[test]
    fn test_periodic_reload() {
        let mut slot = TaskSlot::EMPTY;
        slot.occupy(&noop, 2, 3);

        slot.advance();
        assert_eq!(slot.info(), Some(SlotInfo { delay: 1, period: 3, due: 0 }));
        slot.advance();
        assert_eq!(slot.info(), Some(SlotInfo { delay: 3, period: 3, due: 1 }));

        assert!(slot.claim().is_some());
        assert_eq!(slot.info().map(|i| i.due), Some(0));
        assert!(slot.is_occupied());
    }

    #[test]
    fn test_zero_delay_fires_on_first_tick() {
        let mut slot = TaskSlot::EMPTY;
        slot.occupy(&noop, 0, 5);
        slot.advance();
        assert_eq!(slot.info(), Some(SlotInfo { delay: 5, period: 5, due: 1 }));
    }

    #[test]
    fn test_one_shot_accumulates_then_clears() {
        let mut slot = TaskSlot::EMPTY;
        slot.occupy(&noop, 1, 0);
        slot.advance();
        slot.advance();
        slot.advance();
        assert_eq!(slot.info(), Some(SlotInfo { delay: 0, period: 0, due: 3 }));

        assert!(slot.claim().is_some());
        assert!(!slot.is_occupied());
        assert!(slot.claim().is_none());
    }

    #[test]
    fn test_context_task_passes_context() {
        static SEEN: AtomicU32 = AtomicU32::new(0);
        fn record(ctx: &u32, ticks: u32) {
            SEEN.store(*ctx + ticks, Ordering::Relaxed);
        }
        let task = ContextTask::new(record, 40);
        task.run(2);
        assert_eq!(SEEN.load(Ordering::Relaxed), 42);
        assert_eq!(*task.context(), 40);
    }
}
