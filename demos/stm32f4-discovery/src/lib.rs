#![no_std]

//! `GpioPort` and `TimerHardware` backends for the STM32F4 Discovery board,
//! written against the typed PAC register blocks re-exported by
//! `stm32f4xx-hal`.

pub mod gpio;
pub mod tim3;
