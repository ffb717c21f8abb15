//! Software model of timer counter hardware.
//!
//! [`SimTimer`] implements [`TimerHardware`] by tracking the counter in
//! software. Advancing it latches pending flags exactly as the status
//! register would, so the driver and dispatch path can run on the host.

use crate::timer::{RegisterImage, TimerHardware};
use crate::types::{Channel, EventFlags, EventSource};
use heapless::Vec;

/// Host-side counter with compare channels.
///
/// # Type Parameters
/// * `N` - Maximum number of compare channels
#[derive(Debug, Clone)]
pub struct SimTimer<const N: usize> {
    prescale: u32,
    period: u32,
    compare: Vec<(Channel, u32), N>,
    counter: u32,
    prescale_acc: u64,
    enabled: EventFlags,
    pending: EventFlags,
    armed: bool,
}

impl<const N: usize> SimTimer<N> {
    /// Creates a stopped counter with nothing loaded.
    pub fn new() -> Self {
        Self {
            prescale: 1,
            period: 0,
            compare: Vec::new(),
            counter: 0,
            prescale_acc: 0,
            enabled: EventFlags::NONE,
            pending: EventFlags::NONE,
            armed: false,
        }
    }

    /// Returns true while the counter is running.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Interrupt sources currently enabled.
    pub fn enabled(&self) -> EventFlags {
        self.enabled
    }

    /// Flags latched since the last `take_pending`.
    pub fn pending(&self) -> EventFlags {
        self.pending
    }

    /// Advances by input clock ticks, through the prescaler.
    pub fn advance_clock(&mut self, ticks: u64) {
        if !self.armed {
            return;
        }

        let total = self.prescale_acc + ticks;
        self.prescale_acc = total % self.prescale as u64;
        self.advance(total / self.prescale as u64);
    }

    /// Advances by counter ticks, latching every enabled source passed.
    pub fn advance(&mut self, counts: u64) {
        if !self.armed || self.period == 0 {
            return;
        }

        let mut remaining = counts;
        while remaining > 0 {
            let step = self.counts_to_next_match();
            if remaining < step {
                self.counter += remaining as u32;
                return;
            }
            remaining -= step;
            self.step(step);
        }
    }

    /// Advances to the next compare match or wrap and returns the counts moved.
    pub fn advance_to_next_event(&mut self) -> u64 {
        if !self.armed || self.period == 0 {
            return 0;
        }

        let step = self.counts_to_next_match();
        self.step(step);
        step
    }

    fn counts_to_next_match(&self) -> u64 {
        let to_wrap = (self.period - self.counter) as u64;
        self.compare
            .iter()
            .filter(|&&(_, threshold)| threshold > self.counter)
            .map(|&(_, threshold)| (threshold - self.counter) as u64)
            .fold(to_wrap, u64::min)
    }

    // Moves exactly to the next match; `counts` comes from `counts_to_next_match`.
    fn step(&mut self, counts: u64) {
        let next = self.counter as u64 + counts;
        if next >= self.period as u64 {
            self.counter = 0;
            self.latch(EventSource::Overflow);
        } else {
            self.counter = next as u32;
        }

        for i in 0..self.compare.len() {
            let (channel, threshold) = self.compare[i];
            if threshold == self.counter {
                self.latch(EventSource::Compare(channel));
            }
        }
    }

    fn latch(&mut self, source: EventSource) {
        if self.enabled.contains(source) {
            self.pending.insert(source);
        }
    }
}

impl<const N: usize> Default for SimTimer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TimerHardware for SimTimer<N> {
    fn load(&mut self, image: &RegisterImage<'_>) {
        self.prescale = image.psc + 1;
        self.period = image.arr + 1;
        self.compare.clear();
        for &entry in image.compare.iter().take(N) {
            let _ = self.compare.push(entry);
        }
        self.counter = 0;
        self.prescale_acc = 0;
    }

    fn arm(&mut self, enable: EventFlags) {
        self.counter = 0;
        self.prescale_acc = 0;
        self.pending = EventFlags::NONE;
        self.enabled = enable;
        self.armed = true;
    }

    fn disarm(&mut self) {
        self.armed = false;
        self.enabled = EventFlags::NONE;
        self.pending = EventFlags::NONE;
    }

    fn take_pending(&mut self) -> EventFlags {
        core::mem::take(&mut self.pending)
    }

    fn counter(&self) -> u32 {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerConfig;

    fn armed_sim() -> SimTimer<3> {
        let config = TimerConfig::<3>::builder()
            .prescale(4)
            .period(100)
            .channel(Channel(1), 10)
            .unwrap()
            .channel(Channel(2), 60)
            .unwrap()
            .build()
            .unwrap();

        let mut sim = SimTimer::new();
        sim.load(&config.register_image());
        sim.arm(config.enabled_events());
        sim
    }

    #[test]
    fn prescaler_divides_input_clock() {
        let mut sim = armed_sim();

        sim.advance_clock(7);
        assert_eq!(sim.counter(), 1);

        sim.advance_clock(1);
        assert_eq!(sim.counter(), 2);
    }

    #[test]
    fn counter_wraps_at_period() {
        let mut sim = armed_sim();

        sim.advance(99);
        assert_eq!(sim.counter(), 99);
        assert!(!sim.pending().contains(EventSource::Overflow));

        sim.advance(1);
        assert_eq!(sim.counter(), 0);
        assert!(sim.pending().contains(EventSource::Overflow));
    }

    #[test]
    fn next_event_steps_between_matches() {
        let mut sim = armed_sim();

        assert_eq!(sim.advance_to_next_event(), 10);
        assert_eq!(sim.advance_to_next_event(), 50);
        assert_eq!(sim.advance_to_next_event(), 40);
        assert_eq!(sim.counter(), 0);
    }

    #[test]
    fn disarmed_counter_does_not_move() {
        let mut sim = armed_sim();
        sim.disarm();

        sim.advance(50);

        assert_eq!(sim.counter(), 0);
        assert!(sim.pending().is_empty());
    }
}
