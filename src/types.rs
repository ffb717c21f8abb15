//! Identifiers and event sources shared across modules.

/// Logical output identifier.
///
/// Wraps a `usize` so pins are addressed by what they are (an LED, a debug
/// line) rather than by the physical line they happen to sit on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId(pub usize);

impl From<usize> for PinId {
    fn from(id: usize) -> Self {
        PinId(id)
    }
}

impl From<PinId> for usize {
    fn from(id: PinId) -> Self {
        id.0
    }
}

/// Identity of a timer instance (e.g. TIM3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId(pub u8);

/// Compare channel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel(pub u8);

impl Channel {
    /// Highest usable channel index; one flag bit is reserved for overflow.
    pub const MAX: u8 = 30;
}

/// Something a timer can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventSource {
    /// The counter reached its period and restarted from zero.
    Overflow,

    /// The counter reached a channel's threshold.
    Compare(Channel),
}

impl EventSource {
    /// Flag bit for this source: bit 0 for overflow, bit `n + 1` for channel `n`.
    #[inline]
    pub const fn bit(self) -> u32 {
        match self {
            EventSource::Overflow => 1,
            EventSource::Compare(Channel(n)) => 1 << (n as u32 + 1),
        }
    }
}

/// A set of event sources packed into a word, one bit per source.
///
/// Used both for interrupt-enable masks and for pending status. A source is
/// either pending or not; repeated occurrences before it is taken collapse
/// into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventFlags(pub u32);

impl EventFlags {
    pub const NONE: Self = EventFlags(0);

    #[inline]
    pub fn insert(&mut self, source: EventSource) {
        self.0 |= source.bit();
    }

    #[inline]
    pub fn contains(self, source: EventSource) -> bool {
        self.0 & source.bit() != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn intersection(self, other: Self) -> Self {
        EventFlags(self.0 & other.0)
    }
}

/// Output level of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}
