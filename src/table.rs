//! # Task Table
//!
//! Fixed-capacity array of [`TaskSlot`]s. A task's id is its index in the
//! table; ids are handed out lowest-free-first and stay valid until the
//! slot is vacated. Slots are never compacted or reordered.
//!
//! The table itself does no synchronisation. [`Scheduler`](crate::scheduler::Scheduler)
//! wraps it in a critical-section mutex so the tick updater (interrupt
//! context) never observes a slot half written by the registry.

use crate::config::MAX_TASKS;
use crate::error::SchedulerError;
use crate::task::{Runnable, SlotInfo, TaskSlot};

/// Position of a task in the table.
pub type TaskId = usize;

pub struct TaskTable<'a> {
    slots: [TaskSlot<'a>; MAX_TASKS],
}

impl<'a> TaskTable<'a> {
    pub const fn new() -> Self {
        Self {
            slots: [TaskSlot::EMPTY; MAX_TASKS],
        }
    }

    /// Vacate every slot.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.clear();
        }
    }

    /// Place a task in the first free slot (linear scan from index 0).
    pub fn insert(
        &mut self,
        task: &'a dyn Runnable,
        delay: u32,
        period: u32,
    ) -> Result<TaskId, SchedulerError> {
        let id = self
            .slots
            .iter()
            .position(|slot| !slot.is_occupied())
            .ok_or(SchedulerError::TableFull)?;
        self.slots[id].occupy(task, delay, period);
        Ok(id)
    }

    /// Vacate an occupied slot.
    pub fn remove(&mut self, id: TaskId) -> Result<(), SchedulerError> {
        let slot = self.occupied_mut(id)?;
        slot.clear();
        Ok(())
    }

    /// Change the reload period. The countdown in flight is untouched.
    pub fn set_period(&mut self, id: TaskId, period: u32) -> Result<(), SchedulerError> {
        self.occupied_mut(id)?.set_period(period);
        Ok(())
    }

    /// One tick of the interrupt-side update: O(MAX_TASKS), never calls a task.
    pub fn advance(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.advance();
        }
    }

    /// Take one pending firing from slot `id`, if any.
    pub fn claim(&mut self, id: TaskId) -> Option<&'a dyn Runnable> {
        self.slots.get_mut(id)?.claim()
    }

    pub fn is_occupied(&self, id: TaskId) -> bool {
        self.slots.get(id).is_some_and(TaskSlot::is_occupied)
    }

    pub fn info(&self, id: TaskId) -> Option<SlotInfo> {
        self.slots.get(id)?.info()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_occupied()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        MAX_TASKS
    }

    fn occupied_mut(&mut self, id: TaskId) -> Result<&mut TaskSlot<'a>, SchedulerError> {
        let slot = self.slots.get_mut(id).ok_or(SchedulerError::InvalidIndex)?;
        if slot.is_occupied() {
            Ok(slot)
        } else {
            Err(SchedulerError::SlotEmpty)
        }
    }
}

impl Default for TaskTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_ticks: u32) {}

    fn fill(table: &mut TaskTable<'_>) {
        for expected in 0..MAX_TASKS {
            assert_eq!(table.insert(&noop, 10, 10), Ok(expected));
        }
    }

    #[test]
    fn test_insert_lowest_free_index() {
        let mut table = TaskTable::new();
        assert_eq!(table.insert(&noop, 1, 0), Ok(0));
        assert_eq!(table.insert(&noop, 1, 0), Ok(1));
        assert_eq!(table.insert(&noop, 1, 0), Ok(2));

        table.remove(1).unwrap();
        assert_eq!(table.insert(&noop, 5, 5), Ok(1));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_full_table_rejects_and_keeps_contents() {
        let mut table = TaskTable::new();
        fill(&mut table);
        let before: [_; MAX_TASKS] = core::array::from_fn(|i| table.info(i));

        assert_eq!(table.insert(&noop, 1, 1), Err(SchedulerError::TableFull));

        let after: [_; MAX_TASKS] = core::array::from_fn(|i| table.info(i));
        assert_eq!(before, after);
        assert_eq!(table.len(), MAX_TASKS);
    }

    #[test]
    fn test_remove_errors() {
        let mut table = TaskTable::new();
        assert_eq!(table.remove(MAX_TASKS), Err(SchedulerError::InvalidIndex));
        assert_eq!(table.remove(0), Err(SchedulerError::SlotEmpty));

        table.insert(&noop, 3, 0).unwrap();
        table.insert(&noop, 4, 0).unwrap();
        assert_eq!(table.remove(0), Ok(()));
        assert_eq!(table.remove(0), Err(SchedulerError::SlotEmpty));
        assert!(table.is_occupied(1));
    }

    #[test]
    fn test_set_period_keeps_pending_delay() {
        let mut table = TaskTable::new();
        let id = table.insert(&noop, 5, 10).unwrap();
        table.advance();
        table.set_period(id, 20).unwrap();
        assert_eq!(table.info(id), Some(SlotInfo { delay: 4, period: 20, due: 0 }));

        assert_eq!(table.set_period(3, 1), Err(SchedulerError::SlotEmpty));
        assert_eq!(table.set_period(MAX_TASKS + 2, 1), Err(SchedulerError::InvalidIndex));
    }

    #[test]
    fn test_advance_only_touches_occupied() {
        let mut table = TaskTable::new();
        let id = table.insert(&noop, 2, 0).unwrap();
        table.advance();
        table.advance();
        assert_eq!(table.info(id).map(|i| i.due), Some(1));
        assert_eq!(table.info(id + 1), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_claim_out_of_range() {
        let mut table = TaskTable::new();
        assert!(table.claim(MAX_TASKS).is_none());
        assert!(table.is_empty());
        assert_eq!(table.capacity(), MAX_TASKS);
    }
}
