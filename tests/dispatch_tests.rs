//! Integration tests for DispatchTable

mod common;
use common::*;

use timer_blink::{DispatchError, DispatchTable, Level, PinAction, PinBank, PinId};

type Table = DispatchTable<PinAction, 8>;

#[test]
fn dispatch_runs_bound_action() {
    let mut pins = led_bank();
    let mut table = Table::new();
    table.bind(TIM3, CH1, PinAction::Toggle(PinId(3))).unwrap();

    assert!(table.dispatch(TIM3, CH1, &mut pins));

    assert_eq!(pins.level(PinId(3)).unwrap(), Level::High);
    assert_eq!(pins.port().toggles, vec![PD13]);
}

#[test]
fn dispatch_of_unbound_source_is_noop() {
    let mut pins = led_bank();
    let mut table = Table::new();
    table.bind(TIM3, CH1, PinAction::Toggle(PinId(3))).unwrap();

    assert!(!table.dispatch(TIM3, OVF, &mut pins));
    assert!(!table.dispatch(TIM4, CH1, &mut pins));

    assert!(pins.port().toggles.is_empty());
}

#[test]
fn rebinding_replaces_previous_action() {
    let mut pins = led_bank();
    let mut table = Table::new();
    table.bind(TIM3, OVF, PinAction::Toggle(PinId(3))).unwrap();
    table.bind(TIM3, OVF, PinAction::Toggle(PinId(6))).unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.binding(TIM3, OVF), Some(&PinAction::Toggle(PinId(6))));

    table.dispatch(TIM3, OVF, &mut pins);

    assert_eq!(pins.port().toggles, vec![PD15]);
    assert_eq!(pins.level(PinId(3)).unwrap(), Level::Low);
}

#[test]
fn full_table_rejects_new_keys() {
    let mut table: DispatchTable<PinAction, 2> = DispatchTable::new();
    table.bind(TIM3, CH1, PinAction::Toggle(PinId(3))).unwrap();
    table.bind(TIM3, CH2, PinAction::Toggle(PinId(4))).unwrap();

    assert_eq!(
        table.bind(TIM3, CH3, PinAction::Toggle(PinId(5))),
        Err(DispatchError::Full)
    );
    // Existing keys can still be rebound.
    assert!(table.bind(TIM3, CH2, PinAction::Toggle(PinId(5))).is_ok());
}

#[test]
fn dispatch_to_unconfigured_pin_does_not_fail() {
    let mut pins: PinBank<MockGpio, 4> = PinBank::new(MockGpio::new());
    let mut table = Table::new();
    table.bind(TIM3, CH1, PinAction::Toggle(PinId(3))).unwrap();

    assert!(table.dispatch(TIM3, CH1, &mut pins));
    assert!(pins.port().toggles.is_empty());
}

#[test]
fn function_pointers_are_actions() {
    fn count(hits: &mut Vec<&'static str>) {
        hits.push("overflow");
    }

    let mut table: DispatchTable<fn(&mut Vec<&'static str>), 4> = DispatchTable::new();
    table.bind(TIM3, OVF, count).unwrap();

    let mut hits: Vec<&'static str> = Vec::new();
    table.dispatch(TIM3, OVF, &mut hits);
    table.dispatch(TIM3, CH1, &mut hits);

    assert_eq!(hits, vec!["overflow"]);
}

#[test]
fn iter_lists_bindings() {
    let mut table = Table::new();
    table.bind(TIM3, CH1, PinAction::Toggle(PinId(3))).unwrap();
    table.bind(TIM4, OVF, PinAction::Toggle(PinId(6))).unwrap();

    let keys: Vec<_> = table.iter().map(|b| (b.device, b.source)).collect();
    assert_eq!(keys, vec![(TIM3, CH1), (TIM4, OVF)]);
}
