//! Pin abstraction: logical outputs mapped onto physical port lines.
//!
//! A line is either a plain output, toggled by software, or handed to a
//! peripheral through an alternate function (e.g. a timer channel output).
//!
//! Provides [`PinBank`], which owns a [`GpioPort`] driver and the table of
//! configured [`LogicalPin`]s, and resolves a [`PinId`] to the line it toggles.

use crate::types::{Level, PinId};
use heapless::Vec;

/// GPIO port letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
}

impl Port {
    /// Zero-based port index (A = 0).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Physical port/line descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortLine {
    pub port: Port,
    pub line: u8,
}

impl PortLine {
    /// Highest line number on a port.
    pub const MAX_LINE: u8 = 15;

    pub const fn new(port: Port, line: u8) -> Self {
        Self { port, line }
    }

    /// Single-bit mask of this line within its port's registers.
    #[inline]
    pub const fn mask(self) -> u16 {
        1 << self.line
    }
}

/// Output driver stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Drive {
    /// Actively drives both high and low.
    #[default]
    PushPull,
    /// Drives low only; high is left floating.
    OpenDrain,
}

/// Internal pull resistor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    #[default]
    None,
    Up,
    Down,
}

/// Output slew rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slew {
    #[default]
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Who drives the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Software output latch.
    #[default]
    Output,
    /// Peripheral signal selected by alternate function number.
    Alternate(u8),
}

impl Mode {
    /// Highest alternate function number.
    pub const MAX_FUNCTION: u8 = 15;
}

/// Electrical settings for an output line.
///
/// The default is what an LED needs: push-pull, no pull resistor, low slew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputConfig {
    pub mode: Mode,
    pub drive: Drive,
    pub pull: Pull,
    pub slew: Slew,
}

impl OutputConfig {
    /// Software-driven output with the given electrical settings.
    pub const fn new(drive: Drive, pull: Pull, slew: Slew) -> Self {
        Self {
            mode: Mode::Output,
            drive,
            pull,
            slew,
        }
    }

    /// Push-pull, no pull resistor, low slew.
    pub const fn led() -> Self {
        Self::new(Drive::PushPull, Pull::None, Slew::Low)
    }

    /// Same electrical settings, line handed to alternate function `function`.
    pub const fn alternate(self, function: u8) -> Self {
        Self {
            mode: Mode::Alternate(function),
            ..self
        }
    }

    /// Returns true when software owns the output latch.
    pub const fn is_output(&self) -> bool {
        matches!(self.mode, Mode::Output)
    }
}

/// Trait for abstracting GPIO port hardware.
///
/// Implement this for your MCU's GPIO registers. `toggle` is called from
/// interrupt context: it must not block, allocate or take locks.
pub trait GpioPort {
    /// Sets the line up as a software output or an alternate function,
    /// following `config.mode`, with the given electrical settings.
    fn configure_line(&mut self, line: PortLine, config: OutputConfig);

    /// Flips the line's output latch.
    fn toggle(&mut self, line: PortLine);

    /// Reads back the line's output latch.
    fn level(&self, line: PortLine) -> Level;
}

/// A configured logical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogicalPin {
    id: PinId,
    line: PortLine,
    config: OutputConfig,
}

impl LogicalPin {
    pub fn id(&self) -> PinId {
        self.id
    }

    pub fn line(&self) -> PortLine {
        self.line
    }

    pub fn config(&self) -> OutputConfig {
        self.config
    }
}

/// Pin configuration and access errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// The line (or the id) is already claimed with different settings.
    Conflict {
        /// The pin being configured.
        id: PinId,
        /// The pin already holding the resource.
        holder: PinId,
        /// The contested line.
        line: PortLine,
    },

    /// The pin has not been configured.
    NotConfigured(PinId),

    /// Line number exceeds [`PortLine::MAX_LINE`].
    InvalidLine(PortLine),

    /// Alternate function number above [`Mode::MAX_FUNCTION`].
    InvalidFunction(PortLine, u8),

    /// The pin is driven by a peripheral, not by software.
    NotOutput(PinId),

    /// The bank already holds its maximum number of pins.
    CapacityExceeded,
}

impl core::fmt::Display for PinError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PinError::Conflict { id, holder, line } => {
                write!(
                    f,
                    "pin {} conflicts with pin {} on P{:?}{}",
                    id.0, holder.0, line.port, line.line
                )
            }
            PinError::NotConfigured(id) => {
                write!(f, "pin {} is not configured", id.0)
            }
            PinError::InvalidLine(line) => {
                write!(
                    f,
                    "line {} on port {:?} exceeds {}",
                    line.line,
                    line.port,
                    PortLine::MAX_LINE
                )
            }
            PinError::InvalidFunction(line, function) => {
                write!(
                    f,
                    "alternate function {} on P{:?}{} exceeds {}",
                    function,
                    line.port,
                    line.line,
                    Mode::MAX_FUNCTION
                )
            }
            PinError::NotOutput(id) => {
                write!(f, "pin {} is routed to a peripheral", id.0)
            }
            PinError::CapacityExceeded => {
                write!(f, "pin bank capacity exceeded")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PinError {}

/// Owns a GPIO port driver and up to `N` logical output pins.
///
/// # Type Parameters
/// * `G` - GPIO port implementation
/// * `N` - Maximum number of logical pins
pub struct PinBank<G: GpioPort, const N: usize> {
    port: G,
    pins: Vec<LogicalPin, N>,
}

impl<G: GpioPort, const N: usize> PinBank<G, N> {
    /// Creates an empty bank. No hardware is touched until a pin is configured.
    pub fn new(port: G) -> Self {
        Self {
            port,
            pins: Vec::new(),
        }
    }

    /// Prepares a logical pin for output use.
    ///
    /// Configuring the same id again with identical settings succeeds without
    /// touching the hardware. Two ids may share a line when their settings
    /// match.
    ///
    /// # Errors
    /// * `Conflict` - The line or id is already claimed with other settings
    /// * `InvalidLine` - The line number is out of range
    /// * `InvalidFunction` - The alternate function number is out of range
    /// * `CapacityExceeded` - The bank is full
    pub fn configure(
        &mut self,
        id: PinId,
        line: PortLine,
        config: OutputConfig,
    ) -> Result<(), PinError> {
        let claim = LogicalPin { id, line, config };

        if self.check_claim(&claim)? {
            return Ok(());
        }

        let line_in_use = self.pins.iter().any(|pin| pin.line == line);
        self.pins
            .push(claim)
            .map_err(|_| PinError::CapacityExceeded)?;

        if !line_in_use {
            self.port.configure_line(line, config);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("pin {} -> P{}{}", id.0, line.port, line.line);

        Ok(())
    }

    /// Configures several pins with one shared setting.
    ///
    /// Every entry is validated before any hardware is touched, so either
    /// all pins are configured or none are.
    pub fn configure_group(
        &mut self,
        pins: &[(PinId, PortLine)],
        config: OutputConfig,
    ) -> Result<(), PinError> {
        let mut new_pins = 0;

        for (idx, &(id, line)) in pins.iter().enumerate() {
            let claim = LogicalPin { id, line, config };
            let existing = self.check_claim(&claim)?;

            let mut repeated = false;
            for &(earlier_id, earlier_line) in &pins[..idx] {
                if earlier_id == id {
                    if earlier_line != line {
                        return Err(PinError::Conflict {
                            id,
                            holder: earlier_id,
                            line: earlier_line,
                        });
                    }
                    repeated = true;
                }
            }

            if !existing && !repeated {
                new_pins += 1;
            }
        }

        if self.pins.len() + new_pins > N {
            return Err(PinError::CapacityExceeded);
        }

        for &(id, line) in pins {
            self.configure(id, line, config)?;
        }

        Ok(())
    }

    /// Flips the pin's output level.
    ///
    /// Safe to call from interrupt context. Lines handed to a peripheral
    /// fail with `NotOutput`.
    pub fn toggle(&mut self, id: PinId) -> Result<(), PinError> {
        let line = self.output_line_of(id)?;
        self.port.toggle(line);
        Ok(())
    }

    /// Reads back the pin's output level.
    pub fn level(&self, id: PinId) -> Result<Level, PinError> {
        let line = self.output_line_of(id)?;
        Ok(self.port.level(line))
    }

    /// Returns true if the pin has been configured.
    pub fn is_configured(&self, id: PinId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the configured pin, if any.
    pub fn get(&self, id: PinId) -> Option<&LogicalPin> {
        self.pins.iter().find(|pin| pin.id == id)
    }

    /// Returns the number of configured pins.
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Returns a reference to the underlying port driver.
    pub fn port(&self) -> &G {
        &self.port
    }

    fn output_line_of(&self, id: PinId) -> Result<PortLine, PinError> {
        let pin = self.get(id).ok_or(PinError::NotConfigured(id))?;
        if !pin.config.is_output() {
            return Err(PinError::NotOutput(id));
        }
        Ok(pin.line)
    }

    /// Validates a claim against the configured pins.
    ///
    /// Returns `Ok(true)` when the identical pin is already configured.
    fn check_claim(&self, claim: &LogicalPin) -> Result<bool, PinError> {
        if claim.line.line > PortLine::MAX_LINE {
            return Err(PinError::InvalidLine(claim.line));
        }
        if let Mode::Alternate(function) = claim.config.mode {
            if function > Mode::MAX_FUNCTION {
                return Err(PinError::InvalidFunction(claim.line, function));
            }
        }

        let mut existing = false;
        for pin in &self.pins {
            if pin.id == claim.id {
                if pin != claim {
                    return Err(PinError::Conflict {
                        id: claim.id,
                        holder: pin.id,
                        line: pin.line,
                    });
                }
                existing = true;
            } else if pin.line == claim.line && pin.config != claim.config {
                return Err(PinError::Conflict {
                    id: claim.id,
                    holder: pin.id,
                    line: pin.line,
                });
            }
        }

        Ok(existing)
    }
}
