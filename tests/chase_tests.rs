//! Integration tests for the blocking chase pattern

mod common;
use common::*;

use timer_blink::board::{CHASE_ORDER, CHASE_STEP_MS};
use timer_blink::{Chase, Level, PinBank, PinError, PinId};

#[test]
fn steps_toggle_pins_in_order_with_delay() {
    let mut pins = led_bank();
    let mut delay = MockDelay::new();
    let mut chase = Chase::new(&CHASE_ORDER, CHASE_STEP_MS);

    for expected in CHASE_ORDER {
        assert_eq!(chase.step(&mut pins, &mut delay), Ok(Some(expected)));
    }

    assert_eq!(pins.port().toggles, vec![PD13, PD12, PD14, PD15]);
    assert_eq!(delay.calls_ms, vec![100; 4]);
    assert_eq!(chase.position(), 0);
}

#[test]
fn full_cycles_return_leds_to_start() {
    let mut pins = led_bank();
    let mut delay = MockDelay::new();
    let mut chase = Chase::new(&CHASE_ORDER, CHASE_STEP_MS);

    chase.run_cycles(2, &mut pins, &mut delay).unwrap();

    assert_eq!(pins.port().toggles.len(), 8);
    for id in CHASE_ORDER {
        assert_eq!(pins.level(id).unwrap(), Level::Low);
    }
    assert_eq!(delay.total_ns, 8 * 100 * 1_000_000);
}

#[test]
fn odd_cycle_count_leaves_leds_on() {
    let mut pins = led_bank();
    let mut delay = MockDelay::new();
    let mut chase = Chase::new(&CHASE_ORDER, CHASE_STEP_MS);

    chase.run_cycles(1, &mut pins, &mut delay).unwrap();

    for id in CHASE_ORDER {
        assert_eq!(pins.level(id).unwrap(), Level::High);
    }
}

#[test]
fn unconfigured_pin_stops_the_chase() {
    let mut pins: PinBank<MockGpio, 4> = PinBank::new(MockGpio::new());
    let mut delay = MockDelay::new();
    let order = [PinId(1)];
    let mut chase = Chase::new(&order, 10);

    let result = chase.run_forever(&mut pins, &mut delay);

    assert!(matches!(result, Err(PinError::NotConfigured(PinId(1)))));
    assert!(delay.calls_ms.is_empty());
}

#[test]
fn empty_order_only_delays() {
    let mut pins = led_bank();
    let mut delay = MockDelay::new();
    let mut chase = Chase::new(&[], 5);

    assert_eq!(chase.step(&mut pins, &mut delay), Ok(None));
    assert!(pins.port().toggles.is_empty());
    assert_eq!(delay.calls_ms, vec![5]);
}

#[test]
fn huge_cycle_count_runs_until_first_failure() {
    let mut pins: PinBank<MockGpio, 4> = PinBank::new(MockGpio::new());
    let mut delay = MockDelay::new();
    let order = [PinId(1), PinId(2)];
    let mut chase = Chase::new(&order, 10);

    let result = chase.run_cycles(usize::MAX, &mut pins, &mut delay);

    assert_eq!(result, Err(PinError::NotConfigured(PinId(1))));
}
