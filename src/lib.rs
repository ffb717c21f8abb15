#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`PinBank`**: Owns a GPIO port driver and the logical output pins configured on it
//! - **`GpioPort`**: Trait to implement for your GPIO hardware
//! - **`TimerConfig`**: Validated prescale, period and compare channel thresholds
//! - **`PeriodicTimer`**: Free-running counter that reports compare and overflow events in cycle order
//! - **`TimerHardware`**: Trait to implement for your timer peripheral
//! - **`SimTimer`**: Software counter implementing `TimerHardware`, for running on the host
//! - **`DispatchTable`**: Routes `(device, event source)` pairs to actions
//! - **`Blinker`**: Sets everything up once, then dispatches from the timer interrupt
//! - **`IrqShared`**: Hands the set-up `Blinker` over to the interrupt handler
//! - **`Chase`**: Blocking toggle pattern driven by a software delay
//!
//! All storage is fixed-capacity; capacities are const generics.

pub mod types;
pub mod pin;
pub mod timer;
pub mod sim;
pub mod dispatch;
pub mod app;
pub mod shared;
pub mod chase;
pub mod board;

pub use types::{Channel, DeviceId, EventFlags, EventSource, Level, PinId};
pub use pin::{
    Drive, GpioPort, LogicalPin, Mode, OutputConfig, PinBank, PinError, Port, PortLine, Pull, Slew,
};
pub use timer::{
    PeriodicTimer, RegisterImage, TimerConfig, TimerConfigBuilder, TimerError, TimerHardware,
    TimerState,
};
pub use sim::SimTimer;
pub use dispatch::{Action, DispatchError, DispatchTable, EventBinding, PinAction};
pub use app::{idle_forever, AppError, BlinkPlan, Blinker};
pub use shared::IrqShared;
pub use chase::Chase;
