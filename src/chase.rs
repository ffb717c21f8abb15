//! Blocking chase pattern: toggle pins one after another with a software delay.
//!
//! The timer-free way to blink. The calling context is busy for the whole
//! pattern, so nothing else runs between steps.

use crate::pin::{GpioPort, PinBank, PinError};
use crate::types::PinId;
use embedded_hal::delay::DelayNs;

/// Walks an ordered list of pins, toggling one per step.
#[derive(Debug, Clone)]
pub struct Chase<'a> {
    order: &'a [PinId],
    step_ms: u32,
    next: usize,
}

impl<'a> Chase<'a> {
    /// Creates a chase over `order`, waiting `step_ms` after each toggle.
    pub fn new(order: &'a [PinId], step_ms: u32) -> Self {
        Self {
            order,
            step_ms,
            next: 0,
        }
    }

    /// Toggles the next pin, then blocks for the step delay.
    ///
    /// Returns the pin toggled, or `None` for an empty order (the delay still
    /// runs).
    pub fn step<G: GpioPort, D: DelayNs, const N: usize>(
        &mut self,
        pins: &mut PinBank<G, N>,
        delay: &mut D,
    ) -> Result<Option<PinId>, PinError> {
        let toggled = match self.order.get(self.next) {
            Some(&id) => {
                pins.toggle(id)?;
                self.next = (self.next + 1) % self.order.len();
                Some(id)
            }
            None => None,
        };

        delay.delay_ms(self.step_ms);
        Ok(toggled)
    }

    /// Runs `cycles` full passes over the order.
    pub fn run_cycles<G: GpioPort, D: DelayNs, const N: usize>(
        &mut self,
        cycles: usize,
        pins: &mut PinBank<G, N>,
        delay: &mut D,
    ) -> Result<(), PinError> {
        for _ in 0..cycles {
            for _ in 0..self.order.len() {
                self.step(pins, delay)?;
            }
        }
        Ok(())
    }

    /// Runs the pattern until a toggle fails.
    pub fn run_forever<G: GpioPort, D: DelayNs, const N: usize>(
        &mut self,
        pins: &mut PinBank<G, N>,
        delay: &mut D,
    ) -> Result<core::convert::Infallible, PinError> {
        loop {
            self.step(pins, delay)?;
        }
    }

    /// Index of the pin the next step toggles.
    pub fn position(&self) -> usize {
        self.next
    }

    pub fn step_ms(&self) -> u32 {
        self.step_ms
    }
}
