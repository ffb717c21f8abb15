#![no_std]
#![no_main]

use cortex_m_rt::entry;
use panic_halt as _;
use rtt_target::{rprintln, rtt_init_print};

use stm32f4xx_hal::{pac, prelude::*};

use stm32f4_discovery_demos::gpio::Gpio;

use timer_blink::{board, Chase, OutputConfig, PinBank};

fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}

/// Toggles LED3..LED6 in turn with a SysTick delay between steps.
#[entry]
fn main() -> ! {
    rtt_init_print!();
    rprintln!("=== Delay Chase Example ===");

    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    let gpio = Gpio::new(dp.GPIOA, dp.GPIOB, dp.GPIOD, &dp.RCC);
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    rprintln!("System clock: {} Hz", clocks.sysclk().raw());

    let mut pins: PinBank<Gpio, 4> = PinBank::new(gpio);
    if let Err(err) = pins.configure_group(&board::LEDS, OutputConfig::led()) {
        rprintln!("LED setup failed: {}", err);
        halt();
    }
    rprintln!("LEDs configured on PD12..PD15");

    let mut delay = cp.SYST.delay(&clocks);
    let mut chase = Chase::new(&board::CHASE_ORDER, board::CHASE_STEP_MS);

    match chase.run_forever(&mut pins, &mut delay) {
        Ok(never) => match never {},
        Err(err) => rprintln!("chase stopped: {}", err),
    }

    halt()
}
