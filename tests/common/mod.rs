#![allow(dead_code)]

use embedded_hal::delay::DelayNs;
use timer_blink::{
    Channel, DeviceId, EventSource, GpioPort, Level, OutputConfig, PinBank, PinId, Port,
    PortLine, SimTimer, TimerConfig,
};

pub const TIM3: DeviceId = DeviceId(3);
pub const TIM4: DeviceId = DeviceId(4);

pub const PD12: PortLine = PortLine::new(Port::D, 12);
pub const PD13: PortLine = PortLine::new(Port::D, 13);
pub const PD14: PortLine = PortLine::new(Port::D, 14);
pub const PD15: PortLine = PortLine::new(Port::D, 15);

pub const CH1: EventSource = EventSource::Compare(Channel(1));
pub const CH2: EventSource = EventSource::Compare(Channel(2));
pub const CH3: EventSource = EventSource::Compare(Channel(3));
pub const OVF: EventSource = EventSource::Overflow;

// Mock GPIO port that records every hardware call
pub struct MockGpio {
    latch: [u16; 11],
    pub configured: Vec<(PortLine, OutputConfig)>,
    pub toggles: Vec<PortLine>,
}

impl MockGpio {
    pub fn new() -> Self {
        Self {
            latch: [0; 11],
            configured: Vec::new(),
            toggles: Vec::new(),
        }
    }
}

impl GpioPort for MockGpio {
    fn configure_line(&mut self, line: PortLine, config: OutputConfig) {
        self.configured.push((line, config));
    }

    fn toggle(&mut self, line: PortLine) {
        self.latch[line.port.index()] ^= line.mask();
        self.toggles.push(line);
    }

    fn level(&self, line: PortLine) -> Level {
        if self.latch[line.port.index()] & line.mask() != 0 {
            Level::High
        } else {
            Level::Low
        }
    }
}

// Mock delay that records requested milliseconds
pub struct MockDelay {
    pub total_ns: u64,
    pub calls_ms: Vec<u32>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self {
            total_ns: 0,
            calls_ms: Vec::new(),
        }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls_ms.push(ms);
        self.total_ns += ms as u64 * 1_000_000;
    }
}

pub fn led_bank() -> PinBank<MockGpio, 8> {
    let mut bank = PinBank::new(MockGpio::new());
    bank.configure_group(
        &[
            (PinId(3), PD13),
            (PinId(4), PD12),
            (PinId(5), PD14),
            (PinId(6), PD15),
        ],
        OutputConfig::led(),
    )
    .unwrap();
    bank
}

/// prescale 100, period 64000, CH1/CH2/CH3 at 10000/35000/50000
pub fn reference_config() -> TimerConfig<4> {
    TimerConfig::<4>::builder()
        .prescale(100)
        .period(64_000)
        .channel(Channel(1), 10_000)
        .unwrap()
        .channel(Channel(2), 35_000)
        .unwrap()
        .channel(Channel(3), 50_000)
        .unwrap()
        .build()
        .unwrap()
}

pub type Sim = SimTimer<4>;
