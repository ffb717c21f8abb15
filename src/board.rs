//! STM32F4-Discovery pin and timer tables.
//!
//! The four user LEDs sit on port D. TIM3 runs from the 16 MHz internal
//! oscillator with three compare channels and the overflow each driving an LED.
//! The same three channels can also drive PA6, PA7 and PB0 directly through
//! alternate function 2.

use crate::app::BlinkPlan;
use crate::dispatch::PinAction;
use crate::pin::{OutputConfig, Port, PortLine};
use crate::timer::{TimerConfig, TimerError};
use crate::types::{Channel, DeviceId, EventSource, PinId};

/// Orange LED.
pub const LED3: PinId = PinId(3);
/// Green LED.
pub const LED4: PinId = PinId(4);
/// Red LED.
pub const LED5: PinId = PinId(5);
/// Blue LED.
pub const LED6: PinId = PinId(6);

/// LED to line table.
pub const LEDS: [(PinId, PortLine); 4] = [
    (LED3, PortLine::new(Port::D, 13)),
    (LED4, PortLine::new(Port::D, 12)),
    (LED5, PortLine::new(Port::D, 14)),
    (LED6, PortLine::new(Port::D, 15)),
];

pub const TIM3: DeviceId = DeviceId(3);

/// TIM3 has four compare channels.
pub const TIM3_CHANNELS: usize = 4;

/// Internal RC oscillator, the reset-default system clock.
pub const HSI_HZ: u32 = 16_000_000;

/// Counter divides the clock by `PSC + 1` and counts `0..=ARR`, so these
/// load PSC = 100 and ARR = 64000.
pub const PRESCALE: u32 = 101;
pub const PERIOD: u32 = 64_001;

/// Compare thresholds for CH1..CH3; CH4 is unused.
pub const THRESHOLDS: [(Channel, u32); 3] = [
    (Channel(1), 10_000),
    (Channel(2), 35_000),
    (Channel(3), 50_000),
];

pub const BINDINGS: [(EventSource, PinAction); 4] = [
    (EventSource::Compare(Channel(1)), PinAction::Toggle(LED3)),
    (EventSource::Compare(Channel(2)), PinAction::Toggle(LED4)),
    (EventSource::Compare(Channel(3)), PinAction::Toggle(LED5)),
    (EventSource::Overflow, PinAction::Toggle(LED6)),
];

/// TIM3 channel outputs.
pub const TIM3_CH1_OUT: PinId = PinId(10);
pub const TIM3_CH2_OUT: PinId = PinId(11);
pub const TIM3_CH3_OUT: PinId = PinId(12);

/// Channel output to line table.
pub const TIM3_CHANNEL_PINS: [(PinId, PortLine); 3] = [
    (TIM3_CH1_OUT, PortLine::new(Port::A, 6)),
    (TIM3_CH2_OUT, PortLine::new(Port::A, 7)),
    (TIM3_CH3_OUT, PortLine::new(Port::B, 0)),
];

/// Alternate function number of TIM3 on PA6, PA7 and PB0.
pub const AF_TIM3: u8 = 2;

/// Push-pull, no pull resistor, low slew, routed to TIM3.
pub const fn tim3_channel_output() -> OutputConfig {
    OutputConfig::led().alternate(AF_TIM3)
}

/// Order and step delay of the blocking chase.
pub const CHASE_ORDER: [PinId; 4] = [LED3, LED4, LED5, LED6];
pub const CHASE_STEP_MS: u32 = 100;

/// TIM3 setup with the reference thresholds.
pub fn timer_config() -> Result<TimerConfig<TIM3_CHANNELS>, TimerError> {
    let mut builder = TimerConfig::builder().prescale(PRESCALE).period(PERIOD);
    for (channel, threshold) in THRESHOLDS {
        builder = builder.channel(channel, threshold)?;
    }
    builder.build()
}

/// Complete setup: four LEDs, TIM3, one binding per event.
pub fn blink_plan() -> Result<BlinkPlan<'static, TIM3_CHANNELS>, TimerError> {
    Ok(BlinkPlan {
        pins: &LEDS,
        output: OutputConfig::led(),
        timer: timer_config()?,
        bindings: &BINDINGS,
    })
}
