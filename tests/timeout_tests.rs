use std::sync::Arc;

use relaynode::{
    AppConfig, AppError, Command, Controller, Level, MockGpioBackend, Primitive, TimeoutEntry,
};

fn controller(relay_count: u8) -> (Controller<MockGpioBackend>, Arc<MockGpioBackend>) {
    let cfg = AppConfig::from_json(&format!(
        r#"
        {{
            "http": {{ "host": "localhost:8080", "path": "", "timeout": 30 }},
            "relay_count": {relay_count},
            "inputs": {{ "min": 0, "max": 3 }},
            "gpio": {{ "chip": "/dev/gpiochip0", "input_line_offset": 20 }}
        }}
        "#
    ))
    .expect("valid config");
    let backend = Arc::new(MockGpioBackend::default());
    (Controller::new(&cfg, backend.clone()), backend)
}

fn ticks(ctl: &Controller<MockGpioBackend>, n: usize) {
    for _ in 0..n {
        ctl.tick();
    }
}

#[test]
fn bounds_follow_relay_count() {
    for count in [2u8, 4, 8] {
        let (ctl, _) = controller(count);
        let max = i32::from(count) + 1;
        for i in 0..=max + 1 {
            let accepted = ctl
                .run_immediate(Primitive::Set, &i.to_string())
                .is_ok();
            assert_eq!(accepted, (2..=max).contains(&i), "count {count} index {i}");
        }
    }
}

#[test]
fn invalid_relay_count_rejected() {
    let err = AppConfig::from_json(
        r#"{ "http": { "path": "", "timeout": 1 }, "relay_count": 3,
             "inputs": { "min": 0, "max": 1 }, "gpio": { "chip": "c", "input_line_offset": 20 } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn default_on_outside_range_rejected() {
    let err = AppConfig::from_json(
        r#"{ "http": { "path": "", "timeout": 1 }, "relay_count": 2, "default_on": [4],
             "inputs": { "min": 0, "max": 1 }, "gpio": { "chip": "c", "input_line_offset": 20 } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn overlapping_line_sets_rejected() {
    // outputs 2..=5 on lines 2..=5, inputs 0..=3 on lines 0..=3
    let err = AppConfig::from_json(
        r#"{ "http": { "path": "", "timeout": 1 }, "relay_count": 4,
             "inputs": { "min": 0, "max": 3 }, "gpio": { "chip": "c" } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Config(_)));

    // inputs on lines 5..=6 touch the last output line
    let err = AppConfig::from_json(
        r#"{ "http": { "path": "", "timeout": 1 }, "relay_count": 4,
             "inputs": { "min": 0, "max": 1 },
             "gpio": { "chip": "c", "input_line_offset": 5 } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Config(_)));

    let cfg = AppConfig::from_json(
        r#"{ "http": { "path": "", "timeout": 1 }, "relay_count": 4,
             "inputs": { "min": 0, "max": 1 },
             "gpio": { "chip": "c", "input_line_offset": 6 } }"#,
    )
    .unwrap();
    assert_eq!(cfg.gpio.input_line(0), 6);
}

#[test]
fn oversized_duration_saturates() {
    let (ctl, _) = controller(4);
    ctl.execute(Command::Timed(Primitive::Set), "3/99999999999")
        .unwrap();

    let timeout = ctl.timeout(3).unwrap();
    assert!(timeout.active);
    assert_eq!(timeout.remaining_ms, (i32::MAX / 100) * 100);
    assert_eq!(ctl.is_on(3), Some(true));
}

#[test]
fn duration_quantized_and_lower_bound_enforced() {
    let (ctl, _) = controller(4);

    ctl.run_timed(Primitive::Set, "2/250").unwrap();
    assert_eq!(ctl.timeout(2).unwrap().remaining_ms, 200);

    ctl.run_timed(Primitive::Set, "3/101").unwrap();
    assert_eq!(ctl.timeout(3).unwrap().remaining_ms, 100);

    let err = ctl.run_timed(Primitive::Set, "4/100").unwrap_err();
    assert!(matches!(err, AppError::InvalidDuration(_)));
    assert_eq!(ctl.is_on(4), Some(false));
    assert!(!ctl.timeout(4).unwrap().active);
}

#[test]
fn toggle_pair_restores_level() {
    let (ctl, backend) = controller(4);
    ctl.run_immediate(Primitive::Set, "5").unwrap();

    ctl.run_immediate(Primitive::Toggle, "5").unwrap();
    assert_eq!(ctl.is_on(5), Some(false));
    ctl.run_immediate(Primitive::Toggle, "5").unwrap();
    assert_eq!(ctl.is_on(5), Some(true));
    assert_eq!(backend.output_level(5), Some(Level::High));
}

#[test]
fn direct_command_cancels_timer() {
    let (ctl, backend) = controller(4);
    ctl.run_timed(Primitive::Set, "3/5000").unwrap();
    ctl.run_immediate(Primitive::Clear, "3").unwrap();
    assert!(!ctl.timeout(3).unwrap().active);

    let writes = backend.write_count(3);
    ticks(&ctl, 60);
    assert_eq!(ctl.is_on(3), Some(false));
    assert_eq!(backend.write_count(3), writes);
}

#[test]
fn expiry_toggles_once_and_deactivates() {
    let (ctl, backend) = controller(4);
    ctl.execute(Command::Timed(Primitive::Set), "4/300").unwrap();
    assert_eq!(ctl.is_on(4), Some(true));

    ticks(&ctl, 2);
    assert_eq!(ctl.is_on(4), Some(true));

    ticks(&ctl, 1);
    assert_eq!(ctl.is_on(4), Some(false));
    assert_eq!(backend.output_level(4), Some(Level::Low));
    assert!(!ctl.timeout(4).unwrap().active);

    ticks(&ctl, 10);
    assert_eq!(ctl.is_on(4), Some(false));
    // one write from the set, one from the expiry
    assert_eq!(backend.write_count(4), 2);
}

#[test]
fn rearm_discards_previous_timer() {
    let (ctl, _) = controller(4);
    ctl.run_timed(Primitive::Set, "5/1000").unwrap();
    ticks(&ctl, 2);
    ctl.run_timed(Primitive::Toggle, "5/300").unwrap();
    assert_eq!(ctl.is_on(5), Some(false));
    assert_eq!(
        ctl.timeout(5),
        Some(TimeoutEntry {
            remaining_ms: 300,
            active: true
        })
    );

    ticks(&ctl, 3);
    assert_eq!(ctl.is_on(5), Some(true));
    assert!(!ctl.timeout(5).unwrap().active);

    // the original 1000 ms deadline passes without effect
    ticks(&ctl, 10);
    assert_eq!(ctl.is_on(5), Some(true));
}

#[test]
fn timed_clear_expiry_toggles_from_current_level() {
    let (ctl, _) = controller(2);
    ctl.run_immediate(Primitive::Clear, "2").unwrap();
    ctl.run_timed(Primitive::Clear, "2/200").unwrap();
    ticks(&ctl, 2);
    // expiry toggles rather than reversing the clear
    assert_eq!(ctl.is_on(2), Some(true));
}

#[test]
fn parse_failures_change_nothing() {
    let (ctl, backend) = controller(4);
    ctl.run_immediate(Primitive::Set, "2").unwrap();
    let before = serde_json::to_value(ctl.snapshot()).unwrap();
    let writes = backend.write_count(2);

    for (command, operand) in [
        (Command::Immediate(Primitive::Set), "abc"),
        (Command::Immediate(Primitive::Clear), ""),
        (Command::Timed(Primitive::Set), "3/"),
        (Command::Timed(Primitive::Toggle), "2x"),
        (Command::Timed(Primitive::Clear), "2/50"),
        (Command::GetInput, "x"),
    ] {
        assert!(ctl.execute(command, operand).is_err(), "{operand}");
    }

    assert_eq!(serde_json::to_value(ctl.snapshot()).unwrap(), before);
    assert_eq!(backend.write_count(2), writes);
}

#[test]
fn defaults_energise_configured_outputs() {
    let cfg = AppConfig::from_json(
        r#"{ "http": { "path": "", "timeout": 1 }, "relay_count": 8, "default_on": [3, 9],
             "inputs": { "min": 0, "max": 1 }, "gpio": { "chip": "c", "input_line_offset": 20 } }"#,
    )
    .unwrap();
    let backend = Arc::new(MockGpioBackend::default());
    let ctl = Controller::new(&cfg, backend.clone());
    ctl.apply_defaults().unwrap();

    assert_eq!(ctl.is_on(3), Some(true));
    assert_eq!(ctl.is_on(9), Some(true));
    assert_eq!(ctl.is_on(4), Some(false));
    assert_eq!(backend.output_level(9), Some(Level::High));
}
