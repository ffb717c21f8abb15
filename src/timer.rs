//! Periodic timer driver with compare channels.
//!
//! Provides [`TimerConfig`] (validated prescale, period and channel
//! thresholds), the [`TimerHardware`] trait for the counter peripheral, and
//! [`PeriodicTimer`], which owns the hardware and reports compare and
//! overflow events in cycle order.

use crate::types::{Channel, DeviceId, EventFlags, EventSource};
use heapless::Vec;

/// Timer configuration and state errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// Prescale factor of zero.
    InvalidPrescale,

    /// Period of zero.
    InvalidPeriod,

    /// Channel index above [`Channel::MAX`].
    InvalidChannel(Channel),

    /// Threshold outside `[0, period)`.
    InvalidThreshold {
        channel: Channel,
        threshold: u32,
        period: u32,
    },

    /// The same channel index was configured twice.
    DuplicateChannel(Channel),

    /// Two channels share a threshold.
    CoincidentThreshold {
        first: Channel,
        second: Channel,
        threshold: u32,
    },

    /// More channels than the configuration can hold.
    CapacityExceeded,

    /// Operation requires the timer to be stopped.
    AlreadyRunning,

    /// `start` called before `configure`.
    NotConfigured,

    /// Prescaler or auto-reload value wider than the hardware registers.
    ExceedsHardware {
        psc: u32,
        arr: u32,
    },
}

impl core::fmt::Display for TimerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TimerError::InvalidPrescale => write!(f, "prescale factor must be at least 1"),
            TimerError::InvalidPeriod => write!(f, "period must be at least 1"),
            TimerError::InvalidChannel(channel) => {
                write!(f, "channel {} exceeds {}", channel.0, Channel::MAX)
            }
            TimerError::InvalidThreshold {
                channel,
                threshold,
                period,
            } => {
                write!(
                    f,
                    "channel {} threshold {} outside [0, {})",
                    channel.0, threshold, period
                )
            }
            TimerError::DuplicateChannel(channel) => {
                write!(f, "channel {} configured twice", channel.0)
            }
            TimerError::CoincidentThreshold {
                first,
                second,
                threshold,
            } => {
                write!(
                    f,
                    "channels {} and {} share threshold {}",
                    first.0, second.0, threshold
                )
            }
            TimerError::CapacityExceeded => write!(f, "channel capacity exceeded"),
            TimerError::AlreadyRunning => write!(f, "timer is running, stop it first"),
            TimerError::NotConfigured => write!(f, "timer is not configured"),
            TimerError::ExceedsHardware { psc, arr } => {
                write!(f, "psc {} / arr {} do not fit the timer registers", psc, arr)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TimerError {}

/// Register values a hardware backend writes for a configuration.
///
/// Prescaler and auto-reload registers hold their value minus one: the
/// counter divides by `psc + 1` and counts `0..=arr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterImage<'a> {
    /// Prescaler register.
    pub psc: u32,
    /// Auto-reload register.
    pub arr: u32,
    /// Compare register value per channel, in configuration order.
    pub compare: &'a [(Channel, u32)],
    /// Interrupt-enable mask.
    pub dier: EventFlags,
}

/// A validated timer configuration.
///
/// The counter increments once every `prescale` input clock ticks and wraps
/// to zero on reaching `period`. Each channel raises an event when the
/// counter reaches its threshold.
///
/// # Type Parameters
/// * `N` - Maximum number of compare channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerConfig<const N: usize> {
    prescale: u32,
    period: u32,
    channels: Vec<(Channel, u32), N>,
    // Channels sorted by ascending threshold.
    schedule: Vec<(Channel, u32), N>,
}

impl<const N: usize> TimerConfig<N> {
    /// Creates a new configuration builder.
    pub fn builder() -> TimerConfigBuilder<N> {
        TimerConfigBuilder::new()
    }

    pub fn prescale(&self) -> u32 {
        self.prescale
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// Channels and thresholds in configuration order.
    pub fn channels(&self) -> &[(Channel, u32)] {
        &self.channels
    }

    /// Returns the threshold of a configured channel.
    pub fn threshold(&self, channel: Channel) -> Option<u32> {
        self.channels
            .iter()
            .find(|(ch, _)| *ch == channel)
            .map(|&(_, threshold)| threshold)
    }

    /// Input clock ticks between two overflows.
    pub fn wrap_ticks(&self) -> u64 {
        self.prescale as u64 * self.period as u64
    }

    /// Microseconds between two overflows for the given input clock.
    ///
    /// Saturates at `u64::MAX`.
    pub fn wrap_period_us(&self, clock_hz: u32) -> u64 {
        let us = self.wrap_ticks() as u128 * 1_000_000 / clock_hz.max(1) as u128;
        u64::try_from(us).unwrap_or(u64::MAX)
    }

    /// Overflow plus every configured channel.
    pub fn enabled_events(&self) -> EventFlags {
        let mut flags = EventFlags::NONE;
        flags.insert(EventSource::Overflow);
        for &(channel, _) in &self.channels {
            flags.insert(EventSource::Compare(channel));
        }
        flags
    }

    /// Register values for this configuration.
    pub fn register_image(&self) -> RegisterImage<'_> {
        RegisterImage {
            psc: self.prescale - 1,
            arr: self.period - 1,
            compare: &self.channels,
            dier: self.enabled_events(),
        }
    }

    /// Reports each pending source in cycle order.
    ///
    /// Non-zero thresholds come first in ascending order, then the overflow,
    /// then a zero threshold, which matches as the counter wraps.
    ///
    /// Order is rebuilt from the flags alone. When servicing is late enough
    /// for a source to match on both sides of a wrap, it is reported once at
    /// its place in the cycle, not at the time of its latest match.
    pub fn report<F: FnMut(EventSource)>(&self, pending: EventFlags, mut f: F) -> usize {
        let mut reported = 0;
        let mut emit = |source: EventSource| {
            if pending.contains(source) {
                f(source);
                reported += 1;
            }
        };

        for &(channel, _) in self.schedule.iter().filter(|(_, t)| *t != 0) {
            emit(EventSource::Compare(channel));
        }
        emit(EventSource::Overflow);
        for &(channel, _) in self.schedule.iter().filter(|(_, t)| *t == 0) {
            emit(EventSource::Compare(channel));
        }

        reported
    }
}

/// Builder for constructing validated timer configurations.
#[derive(Debug)]
pub struct TimerConfigBuilder<const N: usize> {
    prescale: u32,
    period: u32,
    channels: Vec<(Channel, u32), N>,
}

impl<const N: usize> TimerConfigBuilder<N> {
    /// Creates a builder with a prescale of 1 and no period.
    pub fn new() -> Self {
        Self {
            prescale: 1,
            period: 0,
            channels: Vec::new(),
        }
    }

    /// Input clock ticks per counter increment.
    pub fn prescale(mut self, prescale: u32) -> Self {
        self.prescale = prescale;
        self
    }

    /// Counter value at which the counter wraps to zero.
    pub fn period(mut self, period: u32) -> Self {
        self.period = period;
        self
    }

    /// Adds a compare channel.
    ///
    /// # Errors
    /// * `CapacityExceeded` - More than `N` channels
    pub fn channel(mut self, channel: Channel, threshold: u32) -> Result<Self, TimerError> {
        self.channels
            .push((channel, threshold))
            .map_err(|_| TimerError::CapacityExceeded)?;
        Ok(self)
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    /// * `InvalidPrescale` / `InvalidPeriod` - Zero prescale or period
    /// * `InvalidChannel` - Channel index above [`Channel::MAX`]
    /// * `InvalidThreshold` - Threshold not in `[0, period)`
    /// * `DuplicateChannel` - Channel index used twice
    /// * `CoincidentThreshold` - Two channels share a threshold
    pub fn build(self) -> Result<TimerConfig<N>, TimerError> {
        if self.prescale == 0 {
            return Err(TimerError::InvalidPrescale);
        }
        if self.period == 0 {
            return Err(TimerError::InvalidPeriod);
        }

        for (idx, &(channel, threshold)) in self.channels.iter().enumerate() {
            if channel.0 > Channel::MAX {
                return Err(TimerError::InvalidChannel(channel));
            }
            if threshold >= self.period {
                return Err(TimerError::InvalidThreshold {
                    channel,
                    threshold,
                    period: self.period,
                });
            }

            for &(earlier, earlier_threshold) in &self.channels[..idx] {
                if earlier == channel {
                    return Err(TimerError::DuplicateChannel(channel));
                }
                if earlier_threshold == threshold {
                    return Err(TimerError::CoincidentThreshold {
                        first: earlier,
                        second: channel,
                        threshold,
                    });
                }
            }
        }

        let mut schedule = self.channels.clone();
        schedule.sort_unstable_by_key(|&(_, threshold)| threshold);

        Ok(TimerConfig {
            prescale: self.prescale,
            period: self.period,
            channels: self.channels,
            schedule,
        })
    }
}

impl<const N: usize> Default for TimerConfigBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for abstracting timer counter hardware.
///
/// Implement this for your MCU's timer registers. `take_pending` is called
/// from the timer interrupt.
pub trait TimerHardware {
    /// Writes prescaler, auto-reload and compare registers.
    fn load(&mut self, image: &RegisterImage<'_>);

    /// Starts the counter from zero with the given interrupts enabled.
    fn arm(&mut self, enable: EventFlags);

    /// Stops the counter and disables its interrupts before returning.
    fn disarm(&mut self);

    /// Reads and clears the pending event flags.
    fn take_pending(&mut self) -> EventFlags;

    /// Live counter value.
    fn counter(&self) -> u32;

    /// Largest value the prescaler register holds.
    const MAX_PRESCALER: u32 = u32::MAX;

    /// Largest value the auto-reload and compare registers hold.
    const MAX_RELOAD: u32 = u32::MAX;
}

/// Lifecycle of a [`PeriodicTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerState {
    /// No configuration loaded.
    Unconfigured,
    /// Configuration loaded, counter stopped.
    Configured,
    /// Counter running with interrupts enabled.
    Running,
}

/// Free-running up-counter with compare channels.
///
/// # Type Parameters
/// * `H` - Timer hardware implementation
/// * `N` - Maximum number of compare channels
pub struct PeriodicTimer<H: TimerHardware, const N: usize> {
    device: DeviceId,
    hardware: H,
    config: Option<TimerConfig<N>>,
    state: TimerState,
}

impl<H: TimerHardware, const N: usize> PeriodicTimer<H, N> {
    /// Creates an unconfigured timer for the given device.
    pub fn new(device: DeviceId, hardware: H) -> Self {
        Self {
            device,
            hardware,
            config: None,
            state: TimerState::Unconfigured,
        }
    }

    /// Loads a configuration into the hardware.
    ///
    /// A stopped timer may be reconfigured.
    ///
    /// # Errors
    /// * `AlreadyRunning` - The timer must be stopped first
    /// * `ExceedsHardware` - The register image does not fit the hardware
    pub fn configure(&mut self, config: TimerConfig<N>) -> Result<(), TimerError> {
        if self.state == TimerState::Running {
            return Err(TimerError::AlreadyRunning);
        }

        let image = config.register_image();
        if image.psc > H::MAX_PRESCALER || image.arr > H::MAX_RELOAD {
            return Err(TimerError::ExceedsHardware {
                psc: image.psc,
                arr: image.arr,
            });
        }
        self.hardware.load(&image);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "timer {}: prescale {} period {} channels {}",
            self.device.0,
            config.prescale,
            config.period,
            config.channels.len()
        );

        self.config = Some(config);
        self.state = TimerState::Configured;
        Ok(())
    }

    /// Arms the counter with every channel and overflow interrupt enabled.
    ///
    /// # Errors
    /// * `NotConfigured` - No configuration loaded
    /// * `AlreadyRunning` - Already started
    pub fn start(&mut self) -> Result<(), TimerError> {
        if self.state == TimerState::Running {
            return Err(TimerError::AlreadyRunning);
        }

        let config = self.config.as_ref().ok_or(TimerError::NotConfigured)?;
        self.hardware.arm(config.enabled_events());
        self.state = TimerState::Running;
        Ok(())
    }

    /// Disarms the counter. Does nothing if not running.
    pub fn stop(&mut self) {
        if self.state == TimerState::Running {
            self.hardware.disarm();
            self.state = TimerState::Configured;
        }
    }

    /// Takes the pending flags and reports each source in cycle order.
    ///
    /// Call from the timer interrupt. Returns the number of events reported;
    /// nothing is reported unless the timer is running. Pending flags hold
    /// one bit per source, so a late interrupt reports each source once in
    /// cycle order (see [`TimerConfig::report`]).
    pub fn on_interrupt<F: FnMut(EventSource)>(&mut self, f: F) -> usize {
        if self.state != TimerState::Running {
            return 0;
        }

        match self.config.as_ref() {
            Some(config) => {
                let pending = self.hardware.take_pending();
                config.report(pending, f)
            }
            None => 0,
        }
    }

    /// Live counter value.
    pub fn counter(&self) -> u32 {
        self.hardware.counter()
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Returns the loaded configuration, if any.
    pub fn config(&self) -> Option<&TimerConfig<N>> {
        self.config.as_ref()
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }
}
