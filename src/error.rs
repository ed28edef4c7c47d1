//! # Scheduler Errors
//!
//! Every Registry failure is returned to the caller and also latched into
//! the scheduler's last-error code for the status reporter. None of them
//! is fatal: the offending operation is refused and dispatch carries on.

use thiserror::Error;

/// Indicator code meaning "no error latched".
pub const NO_ERROR: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// `add_task` found no free slot.
    #[error("task table is full")]
    TableFull,
    /// Delete/modify targeted an unoccupied slot.
    #[error("task slot is empty")]
    SlotEmpty,
    /// Task id is outside the table.
    #[error("task id out of range")]
    InvalidIndex,
}

impl SchedulerError {
    /// Code written to the indicator port (before active-low inversion).
    pub const fn code(self) -> u8 {
        match self {
            SchedulerError::TableFull => 2,
            SchedulerError::SlotEmpty => 3,
            SchedulerError::InvalidIndex => 4,
        }
    }

    /// Inverse of [`code`](Self::code). `None` for `NO_ERROR` or unknown codes.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            2 => Some(SchedulerError::TableFull),
            3 => Some(SchedulerError::SlotEmpty),
            4 => Some(SchedulerError::InvalidIndex),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn test_codes_are_distinct_and_nonzero() {
        let all = [
            SchedulerError::TableFull,
            SchedulerError::SlotEmpty,
            SchedulerError::InvalidIndex,
        ];
        for (i, a) in all.iter().enumerate() {
            assert_ne!(a.code(), NO_ERROR);
            assert_eq!(SchedulerError::from_code(a.code()), Some(*a));
            for b in &all[i + 1..] {
                assert_ne!(a.code(), b.code());
            }
        }
        assert_eq!(SchedulerError::from_code(NO_ERROR), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(SchedulerError::TableFull.to_string(), "task table is full");
        assert_eq!(SchedulerError::SlotEmpty.to_string(), "task slot is empty");
        assert_eq!(SchedulerError::InvalidIndex.to_string(), "task id out of range");
    }

    #[test]
    fn test_is_core_error() {
        fn as_error(err: &SchedulerError) -> &dyn core::error::Error {
            err
        }
        assert!(as_error(&SchedulerError::TableFull).source().is_none());
    }
}
