//! Application loop: one-time setup, then everything happens in the timer interrupt.

use crate::dispatch::{DispatchError, DispatchTable, PinAction};
use crate::pin::{GpioPort, OutputConfig, PinBank, PinError, PortLine};
use crate::timer::{PeriodicTimer, TimerConfig, TimerError, TimerHardware};
use crate::types::{DeviceId, EventSource, PinId};

/// Setup errors. All are fatal: configuration is deterministic and is not retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppError {
    Pin(PinError),
    Timer(TimerError),
    Dispatch(DispatchError),
}

impl core::fmt::Display for AppError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AppError::Pin(err) => write!(f, "pin setup failed: {}", err),
            AppError::Timer(err) => write!(f, "timer setup failed: {}", err),
            AppError::Dispatch(err) => write!(f, "event binding failed: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AppError {}

impl From<PinError> for AppError {
    fn from(err: PinError) -> Self {
        AppError::Pin(err)
    }
}

impl From<TimerError> for AppError {
    fn from(err: TimerError) -> Self {
        AppError::Timer(err)
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        AppError::Dispatch(err)
    }
}

/// Everything [`Blinker::init`] sets up.
#[derive(Debug, Clone)]
pub struct BlinkPlan<'a, const C: usize> {
    /// Output pins and their lines.
    pub pins: &'a [(PinId, PortLine)],
    /// Settings shared by every output pin.
    pub output: OutputConfig,
    /// Counter and compare channel setup.
    pub timer: TimerConfig<C>,
    /// Action per timer event.
    pub bindings: &'a [(EventSource, PinAction)],
}

/// Owns the pins, the timer and the dispatch table.
///
/// Setup runs once through [`init`](Self::init); afterwards the only entry
/// point is [`on_timer_interrupt`](Self::on_timer_interrupt), called from the
/// timer's interrupt handler.
///
/// # Type Parameters
/// * `G` - GPIO port implementation
/// * `H` - Timer hardware implementation
/// * `P` - Maximum number of pins
/// * `C` - Maximum number of compare channels
/// * `B` - Maximum number of event bindings
pub struct Blinker<G: GpioPort, H: TimerHardware, const P: usize, const C: usize, const B: usize> {
    pins: PinBank<G, P>,
    timer: PeriodicTimer<H, C>,
    table: DispatchTable<PinAction, B>,
}

impl<G, H, const P: usize, const C: usize, const B: usize> Blinker<G, H, P, C, B>
where
    G: GpioPort,
    H: TimerHardware,
{
    /// Wraps the hardware. Nothing is configured until [`init`](Self::init).
    pub fn new(port: G, device: DeviceId, hardware: H) -> Self {
        Self {
            pins: PinBank::new(port),
            timer: PeriodicTimer::new(device, hardware),
            table: DispatchTable::new(),
        }
    }

    /// Configures pins, configures the timer, binds events, then starts the timer.
    ///
    /// # Errors
    /// * `Pin` - Pin conflict, or a binding names a pin that was not configured
    /// * `Timer` - Timer already running
    /// * `Dispatch` - More bindings than the table holds
    pub fn init(&mut self, plan: BlinkPlan<'_, C>) -> Result<(), AppError> {
        self.pins.configure_group(plan.pins, plan.output)?;
        self.timer.configure(plan.timer)?;

        let device = self.timer.device();
        for &(source, action) in plan.bindings {
            if !self.pins.is_configured(action.pin()) {
                return Err(PinError::NotConfigured(action.pin()).into());
            }
            self.table.bind(device, source, action)?;
        }

        self.timer.start()?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "blinker up: {} pins, {} bindings",
            self.pins.len(),
            self.table.len()
        );

        Ok(())
    }

    /// Routes pending events of `device` to their actions.
    ///
    /// Interrupts of other devices are ignored. Returns the number of events
    /// the timer reported.
    pub fn on_timer_interrupt(&mut self, device: DeviceId) -> usize {
        if device != self.timer.device() {
            return 0;
        }

        let Self { pins, timer, table } = self;
        timer.on_interrupt(|source| {
            table.dispatch(device, source, &mut *pins);
        })
    }

    /// Stops event delivery.
    pub fn stop(&mut self) {
        self.timer.stop();
    }

    /// Live counter value.
    pub fn counter(&self) -> u32 {
        self.timer.counter()
    }

    pub fn pins(&self) -> &PinBank<G, P> {
        &self.pins
    }

    pub fn timer(&self) -> &PeriodicTimer<H, C> {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut PeriodicTimer<H, C> {
        &mut self.timer
    }

    pub fn table(&self) -> &DispatchTable<PinAction, B> {
        &self.table
    }
}

/// Parks the calling context for good, calling `wait` on every pass.
///
/// Pass a low-power wait such as `cortex_m::asm::wfi`; events keep firing
/// and dispatching in interrupt context.
pub fn idle_forever<W: FnMut()>(mut wait: W) -> ! {
    loop {
        wait();
    }
}
