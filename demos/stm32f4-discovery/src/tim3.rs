use stm32f4xx_hal::pac;
use timer_blink::{Channel, EventFlags, EventSource, RegisterImage, TimerHardware};

/// Compare channels of TIM3.
pub const CHANNELS: u8 = 4;

/// TIM3 general purpose timer, 16-bit prescaler and counter.
///
/// UIF/UIE sit at bit 0 of SR/DIER, CCxIF/CCxIE at bit x.
pub struct Tim3 {
    tim: pac::TIM3,
}

impl Tim3 {
    /// Takes TIM3 and turns on its bus clock.
    pub fn new(tim: pac::TIM3, rcc: &pac::RCC) -> Self {
        rcc.apb1enr.modify(|_, w| w.tim3en().set_bit());
        Self { tim }
    }

    fn from_hw(bits: u32) -> EventFlags {
        let mut flags = EventFlags::NONE;
        if bits & 1 != 0 {
            flags.insert(EventSource::Overflow);
        }
        for n in 1..=CHANNELS {
            if bits & (1 << n) != 0 {
                flags.insert(EventSource::Compare(Channel(n)));
            }
        }
        flags
    }
}

impl TimerHardware for Tim3 {
    const MAX_PRESCALER: u32 = 0xFFFF;
    const MAX_RELOAD: u32 = 0xFFFF;

    fn load(&mut self, image: &RegisterImage<'_>) {
        let tim = &self.tim;
        // Widths were checked against MAX_PRESCALER / MAX_RELOAD.
        tim.psc.write(|w| unsafe { w.bits(image.psc) });
        tim.arr.write(|w| unsafe { w.bits(image.arr) });
        for &(Channel(n), threshold) in image.compare {
            match n {
                1 => tim.ccr1.write(|w| unsafe { w.bits(threshold) }),
                2 => tim.ccr2.write(|w| unsafe { w.bits(threshold) }),
                3 => tim.ccr3.write(|w| unsafe { w.bits(threshold) }),
                4 => tim.ccr4.write(|w| unsafe { w.bits(threshold) }),
                _ => {}
            }
        }
        // Latch PSC now, then drop the update flag this raises.
        tim.egr.write(|w| w.ug().set_bit());
        tim.sr.write(|w| unsafe { w.bits(0) });
    }

    fn arm(&mut self, enable: EventFlags) {
        let tim = &self.tim;
        let on = |channel: u8| enable.contains(EventSource::Compare(Channel(channel)));

        tim.cnt.reset();
        tim.sr.write(|w| unsafe { w.bits(0) });
        tim.dier.write(|w| {
            w.uie()
                .bit(enable.contains(EventSource::Overflow))
                .cc1ie()
                .bit(on(1))
                .cc2ie()
                .bit(on(2))
                .cc3ie()
                .bit(on(3))
                .cc4ie()
                .bit(on(4))
        });
        tim.cr1.modify(|_, w| w.cen().set_bit());
    }

    fn disarm(&mut self) {
        let tim = &self.tim;
        tim.cr1.modify(|_, w| w.cen().clear_bit());
        tim.dier.reset();
        tim.sr.write(|w| unsafe { w.bits(0) });
    }

    fn take_pending(&mut self) -> EventFlags {
        let tim = &self.tim;
        let pending = tim.sr.read().bits() & tim.dier.read().bits() & 0x1F;
        // SR flags are cleared by writing 0; ones leave other flags raised.
        tim.sr.write(|w| unsafe { w.bits(!pending) });
        Self::from_hw(pending)
    }

    fn counter(&self) -> u32 {
        self.tim.cnt.read().bits() & 0xFFFF
    }
}
