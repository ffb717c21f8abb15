#![no_std]
#![no_main]

use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use panic_halt as _;
use rtt_target::{rprintln, rtt_init_print};

use stm32f4xx_hal::{
    pac::{self, interrupt},
    prelude::*,
};

use stm32f4_discovery_demos::gpio::Gpio;
use stm32f4_discovery_demos::tim3::Tim3;

use timer_blink::{board, idle_forever, Blinker, IrqShared};

/// LEDs, TIM3 with four compare slots, four event bindings.
type App = Blinker<Gpio, Tim3, 4, { board::TIM3_CHANNELS }, 4>;

/// Owned by `main` until setup is done, then by the TIM3 handler.
static APP: IrqShared<App> = IrqShared::new();

/// Any TIM3 event: compare match on CH1..CH3 or counter overflow.
#[interrupt]
fn TIM3() {
    APP.with(|app| app.on_timer_interrupt(board::TIM3));
}

fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}

#[entry]
fn main() -> ! {
    rtt_init_print!();
    rprintln!("=== Timer Blink Example ===");

    let dp = pac::Peripherals::take().unwrap();

    let plan = match board::blink_plan() {
        Ok(plan) => plan,
        Err(err) => {
            rprintln!("bad timer setup: {}", err);
            halt();
        }
    };

    let gpio = Gpio::new(dp.GPIOA, dp.GPIOB, dp.GPIOD, &dp.RCC);
    let tim3 = Tim3::new(dp.TIM3, &dp.RCC);
    let clocks = dp.RCC.constrain().cfgr.freeze();
    let clock_hz = clocks.pclk1().raw();

    let mut app = App::new(gpio, board::TIM3, tim3);
    if let Err(err) = app.init(plan) {
        rprintln!("{}", err);
        halt();
    }

    let wrap_us = app
        .timer()
        .config()
        .map(|config| config.wrap_period_us(clock_hz))
        .unwrap_or(0);
    rprintln!("TIM3 running, wraps every {} us", wrap_us);

    APP.install(app);
    // SAFETY: the handler only touches APP inside a critical section.
    unsafe { NVIC::unmask(pac::Interrupt::TIM3) };

    idle_forever(cortex_m::asm::wfi)
}
