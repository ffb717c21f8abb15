use stm32f4xx_hal::pac;
use timer_blink::{Drive, GpioPort, Level, Mode, OutputConfig, Port, PortLine, Pull, Slew};

/// GPIO ports A, B and D: the user LEDs and the TIM3 channel pins.
///
/// Lines on other ports are not wired on this board; they are ignored and
/// read back low.
pub struct Gpio {
    gpioa: pac::GPIOA,
    gpiob: pac::GPIOB,
    gpiod: pac::GPIOD,
}

// Runs `$body` with `$regs` bound to the register block of `$port`.
macro_rules! with_port {
    ($self:ident, $port:expr, |$regs:ident| $body:expr) => {
        match $port {
            Port::A => {
                let $regs = &$self.gpioa;
                $body
            }
            Port::B => {
                let $regs = &$self.gpiob;
                $body
            }
            Port::D => {
                let $regs = &$self.gpiod;
                $body
            }
            _ => Default::default(),
        }
    };
}

impl Gpio {
    /// Takes the ports and turns on their bus clocks.
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB, gpiod: pac::GPIOD, rcc: &pac::RCC) -> Self {
        rcc.ahb1enr
            .modify(|_, w| w.gpioaen().set_bit().gpioben().set_bit().gpioden().set_bit());
        Self { gpioa, gpiob, gpiod }
    }
}

// Mask and value of a `width`-bit field for `line`.
fn field(line: u8, width: u32, value: u32) -> (u32, u32) {
    let shift = u32::from(line % (32 / width as u8)) * width;
    let ones = (1 << width) - 1;
    (ones << shift, value << shift)
}

impl GpioPort for Gpio {
    fn configure_line(&mut self, line: PortLine, config: OutputConfig) {
        let n = line.line;
        let bit = u32::from(line.mask());
        let speed = match config.slew {
            Slew::Low => 0b00,
            Slew::Medium => 0b01,
            Slew::High => 0b10,
            Slew::VeryHigh => 0b11,
        };
        let pull = match config.pull {
            Pull::None => 0b00,
            Pull::Up => 0b01,
            Pull::Down => 0b10,
        };
        let (moder, function) = match config.mode {
            Mode::Output => (0b01, None),
            Mode::Alternate(af) => (0b10, Some(u32::from(af))),
        };

        with_port!(self, line.port, |regs| {
            // Output latch starts low.
            regs.bsrr.write(|w| unsafe { w.bits(bit << 16) });

            let (mask, bits) = field(n, 2, speed);
            regs.ospeedr
                .modify(|r, w| unsafe { w.bits((r.bits() & !mask) | bits) });
            let (mask, bits) = field(n, 2, pull);
            regs.pupdr
                .modify(|r, w| unsafe { w.bits((r.bits() & !mask) | bits) });
            regs.otyper.modify(|r, w| unsafe {
                w.bits(match config.drive {
                    Drive::PushPull => r.bits() & !bit,
                    Drive::OpenDrain => r.bits() | bit,
                })
            });

            if let Some(af) = function {
                let (mask, bits) = field(n, 4, af);
                if n < 8 {
                    regs.afrl
                        .modify(|r, w| unsafe { w.bits((r.bits() & !mask) | bits) });
                } else {
                    regs.afrh
                        .modify(|r, w| unsafe { w.bits((r.bits() & !mask) | bits) });
                }
            }

            let (mask, bits) = field(n, 2, moder);
            regs.moder
                .modify(|r, w| unsafe { w.bits((r.bits() & !mask) | bits) });
        })
    }

    fn toggle(&mut self, line: PortLine) {
        let bit = u32::from(line.mask());
        with_port!(self, line.port, |regs| {
            // BSRR sets or resets only this line, so no read-modify-write race.
            let high = regs.odr.read().bits() & bit != 0;
            let value = if high { bit << 16 } else { bit };
            regs.bsrr.write(|w| unsafe { w.bits(value) });
        })
    }

    fn level(&self, line: PortLine) -> Level {
        let bit = u32::from(line.mask());
        with_port!(self, line.port, |regs| {
            if regs.odr.read().bits() & bit != 0 {
                Level::High
            } else {
                Level::Low
            }
        })
    }
}
