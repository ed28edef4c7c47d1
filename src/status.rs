//! # Status Reporter
//!
//! Shows the last latched error code on an [`IndicatorPort`] and clears it
//! again after a timeout. The indicator is wired active-low, so code `c` is
//! written as `255 - c` and "no error" lights nothing.
//!
//! The reporter only ever touches the error latch; it never sees task state.

use crate::error::NO_ERROR;
use crate::port::IndicatorPort;

pub struct StatusReporter<'a> {
    port: Option<&'a mut (dyn IndicatorPort + Send)>,
    /// Code most recently written to the port.
    shown: u8,
    /// Ticks left before the latched code is reset.
    countdown: u32,
    timeout: u32,
}

impl<'a> StatusReporter<'a> {
    pub const fn new(timeout: u32) -> Self {
        Self {
            port: None,
            shown: NO_ERROR,
            countdown: 0,
            timeout,
        }
    }

    pub fn attach(&mut self, port: &'a mut (dyn IndicatorPort + Send)) {
        self.port = Some(port);
    }

    pub fn set_timeout(&mut self, timeout: u32) {
        self.timeout = timeout;
    }

    /// Forget what was shown; the next `report` rewrites the port.
    pub fn reset(&mut self) {
        self.shown = NO_ERROR;
        self.countdown = 0;
    }

    /// One reporting step, run once per dispatch pass.
    ///
    /// A changed code is written out and (if non-zero) arms the countdown.
    /// An unchanged code runs the countdown down and clears `latch` when it
    /// expires.
    pub fn report(&mut self, latch: &mut u8) {
        if *latch != self.shown {
            if let Some(port) = self.port.as_mut() {
                port.write(u8::MAX - *latch);
            }
            self.shown = *latch;
            self.countdown = if *latch != NO_ERROR { self.timeout } else { 0 };
        } else if self.countdown != 0 {
            self.countdown -= 1;
            if self.countdown == 0 {
                *latch = NO_ERROR;
            }
        }
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }
}
