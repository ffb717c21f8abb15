//! Event dispatch table.
//!
//! Routes `(device, event source)` pairs to at most one action each, so an
//! interrupt handler looks up what to do instead of comparing timer
//! instances and channels by hand.

use crate::pin::{GpioPort, PinBank};
use crate::types::{DeviceId, EventSource, PinId};
use heapless::Vec;

/// Something to run when an event is dispatched.
///
/// Actions run in interrupt context. Keep them short and non-blocking.
pub trait Action<Ctx> {
    fn run(&self, ctx: &mut Ctx);
}

impl<Ctx> Action<Ctx> for fn(&mut Ctx) {
    fn run(&self, ctx: &mut Ctx) {
        self(ctx)
    }
}

/// Pin operations bindable to timer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinAction {
    /// Flip the pin's output level.
    Toggle(PinId),
}

impl PinAction {
    /// The pin this action drives.
    pub fn pin(&self) -> PinId {
        match self {
            PinAction::Toggle(id) => *id,
        }
    }
}

impl<G: GpioPort, const P: usize> Action<PinBank<G, P>> for PinAction {
    fn run(&self, pins: &mut PinBank<G, P>) {
        match self {
            PinAction::Toggle(id) => {
                // Bindings are checked against the bank at setup.
                if let Err(_err) = pins.toggle(*id) {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("dispatch toggle failed: {}", _err);
                }
            }
        }
    }
}

/// Dispatch table errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// No room for another binding.
    Full,
}

impl core::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DispatchError::Full => write!(f, "dispatch table is full"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DispatchError {}

/// One entry of a [`DispatchTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventBinding<A> {
    pub device: DeviceId,
    pub source: EventSource,
    pub action: A,
}

/// Maps `(device, event source)` to an action.
///
/// # Type Parameters
/// * `A` - Action type
/// * `N` - Maximum number of bindings
#[derive(Debug, Clone)]
pub struct DispatchTable<A, const N: usize> {
    bindings: Vec<EventBinding<A>, N>,
}

impl<A, const N: usize> DispatchTable<A, N> {
    /// Creates an empty table.
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Binds an action to an event source, replacing any existing binding.
    ///
    /// # Errors
    /// * `Full` - The key is new and the table is at capacity
    pub fn bind(
        &mut self,
        device: DeviceId,
        source: EventSource,
        action: A,
    ) -> Result<(), DispatchError> {
        if let Some(binding) = self.find_mut(device, source) {
            binding.action = action;
            return Ok(());
        }

        self.bindings
            .push(EventBinding {
                device,
                source,
                action,
            })
            .map_err(|_| DispatchError::Full)
    }

    /// Removes a binding, returning its action.
    pub fn unbind(&mut self, device: DeviceId, source: EventSource) -> Option<A> {
        let idx = self
            .bindings
            .iter()
            .position(|b| b.device == device && b.source == source)?;
        Some(self.bindings.swap_remove(idx).action)
    }

    /// Returns the action bound to an event source, if any.
    pub fn binding(&self, device: DeviceId, source: EventSource) -> Option<&A> {
        self.bindings
            .iter()
            .find(|b| b.device == device && b.source == source)
            .map(|b| &b.action)
    }

    /// Runs the bound action, if any. Returns whether an action ran.
    ///
    /// An unbound source is a no-op, not an error.
    pub fn dispatch<Ctx>(&self, device: DeviceId, source: EventSource, ctx: &mut Ctx) -> bool
    where
        A: Action<Ctx>,
    {
        match self.binding(device, source) {
            Some(action) => {
                action.run(ctx);
                true
            }
            None => false,
        }
    }

    /// All bindings, in insertion order until one is removed.
    pub fn iter(&self) -> impl Iterator<Item = &EventBinding<A>> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn find_mut(&mut self, device: DeviceId, source: EventSource) -> Option<&mut EventBinding<A>> {
        self.bindings
            .iter_mut()
            .find(|b| b.device == device && b.source == source)
    }
}

impl<A, const N: usize> Default for DispatchTable<A, N> {
    fn default() -> Self {
        Self::new()
    }
}
