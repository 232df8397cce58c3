//! Edge case and boundary condition tests for the controllers

use rs_homenode::{
    config::{Config, ServoConfig},
    controller,
    device::{format_percentage, Blinds, ColorSetting, DeviceKind, Fan, Matrix},
    handle,
    hal::{MockAcceptor, MockButton, MockPotentiometer, MockServo, MockStrip, MockSwitch},
    services::{PotentiometerAction, ToggleAction, DEFAULT_REQUEST_BUFFER},
    ConnectionServer, Device, InputPoller, Rgb, SharedDevice, Status,
};
use std::sync::Arc;

fn post<D: Device>(device: &SharedDevice<D>, target: &str) -> Status {
    let raw = format!("POST {target} HTTP/1.1\r\n\r\n");
    handle(raw.as_bytes(), device).status
}

// ============================================================================
// Blinds Boundaries
// ============================================================================

#[test]
fn fractional_percentage_is_rejected() {
    let blinds = SharedDevice::new(Blinds::new(MockServo::new()));
    assert_eq!(post(&blinds, "/position?percentage=55.5"), Status::BadRequest);
    assert_eq!(post(&blinds, "/position?percentage=1e2"), Status::BadRequest);
    assert_eq!(blinds.with_state(|b| b.servo().call_count), 0);
}

#[test]
fn duplicate_percentage_uses_last_value() {
    let blinds = SharedDevice::new(Blinds::new(MockServo::new()));
    assert_eq!(
        post(&blinds, "/position?percentage=10&percentage=90"),
        Status::Ok
    );
    assert_eq!(blinds.snapshot().unwrap().to_body(), "90");
}

#[test]
fn out_of_range_after_valid_in_same_query() {
    let blinds = SharedDevice::new(Blinds::new(MockServo::new()));
    assert_eq!(
        post(&blinds, "/position?percentage=90&percentage=101"),
        Status::BadRequest
    );
    assert_eq!(blinds.snapshot().unwrap().to_body(), "0");
}

#[test]
fn servo_failure_leaves_position_unchanged() {
    let blinds = SharedDevice::new(Blinds::new(MockServo::new()));
    post(&blinds, "/position?percentage=20");
    blinds.with_state(|b| b.servo_mut().fail = true);

    let raw = b"POST /position?percentage=70 HTTP/1.1\r\n";
    assert_eq!(handle(raw, &blinds).status, Status::InternalServerError);
    assert_eq!(blinds.snapshot().unwrap().to_body(), "20");
}

#[test]
fn custom_duty_range_from_config() {
    let config = Config::for_kind(DeviceKind::Blinds)
        .with_servo(ServoConfig::default().with_duty_range(2000, 1000));
    let mut blinds = controller::blinds(MockServo::new(), &config);

    assert_eq!(blinds.duty_for(0.0), 1000);
    assert_eq!(blinds.duty_for(1.0), 2000);
    blinds.release().unwrap();
    assert_eq!(blinds.servo().duty, 0);
    assert_eq!(blinds.percent(), 0.0);
}

#[test]
fn potentiometer_position_keeps_two_decimals() {
    let blinds = Arc::new(SharedDevice::new(Blinds::new(MockServo::new())));
    let button = MockButton::new();
    let pot = MockPotentiometer::new();
    let mut poller = InputPoller::new(
        Arc::clone(&blinds),
        button.clone(),
        PotentiometerAction::new(pot.clone()),
    );

    pot.set_raw(12_345);
    button.press();
    poller.poll();
    assert_eq!(blinds.snapshot().unwrap().to_body(), "18.84");
}

#[test]
fn potentiometer_read_failure_keeps_position() {
    let blinds = Arc::new(SharedDevice::new(Blinds::new(MockServo::new())));
    let button = MockButton::new();
    let pot = MockPotentiometer::new();
    let mut poller = InputPoller::new(
        Arc::clone(&blinds),
        button.clone(),
        PotentiometerAction::new(pot.clone()),
    );
    post(&*blinds, "/position?percentage=35");

    pot.set_failing(true);
    button.press();
    assert!(poller.poll());
    assert_eq!(blinds.snapshot().unwrap().to_body(), "35");
}

#[test]
fn percentage_formatting() {
    assert_eq!(format_percentage(0.0), "0");
    assert_eq!(format_percentage(1.0), "100");
    assert_eq!(format_percentage(0.375), "37.5");
    assert_eq!(format_percentage(2.0), "100");
    assert_eq!(format_percentage(-1.0), "0");
}

#[test]
fn request_line_past_buffer_is_rejected_not_cut() {
    let blinds = SharedDevice::new(Blinds::new(MockServo::new()));
    let head = "POST /position?x=";
    let tail = "&percentage=100 HTTP/1.1";
    let pad = "a".repeat(DEFAULT_REQUEST_BUFFER - head.len() - tail.len() + 1);

    let mut acceptor = MockAcceptor::new();
    let response = acceptor.push_request(format!("{head}{pad}{tail}\r\n\r\n"));
    let outcome = ConnectionServer::new(acceptor, &blinds).serve_one().unwrap();

    assert_eq!(outcome.status, Status::BadRequest);
    assert!(response.text().starts_with("HTTP/1.0 400 Bad Request\r\n"));
    assert_eq!(blinds.snapshot().unwrap().to_body(), "0");
    assert_eq!(blinds.with_state(|b| b.servo().call_count), 0);
}

// ============================================================================
// Switch
// ============================================================================

#[test]
fn switch_output_failure_keeps_state() {
    let fan = SharedDevice::new(Fan::new(MockSwitch::new()));
    fan.with_state(|f| f.output_mut().fail = true);

    assert_eq!(post(&fan, "/toggle"), Status::InternalServerError);
    assert_eq!(post(&fan, "/set-status?status=on"), Status::InternalServerError);
    assert!(!fan.with_state(|f| f.is_on()));
}

#[test]
fn held_button_toggles_once() {
    let fan = Arc::new(SharedDevice::new(Fan::new(MockSwitch::new())));
    let button = MockButton::new();
    let mut poller = InputPoller::new(Arc::clone(&fan), button.clone(), ToggleAction);

    button.press();
    let presses = (0..50).filter(|_| poller.poll()).count();
    assert_eq!(presses, 1);
    assert!(fan.with_state(|f| f.is_on()));

    button.release();
    assert!(!poller.poll());
    button.press();
    assert!(poller.poll());
    assert!(!fan.with_state(|f| f.is_on()));
}

#[test]
fn button_held_at_boot_counts_as_press() {
    let fan = Arc::new(SharedDevice::new(Fan::new(MockSwitch::new())));
    let button = MockButton::new();
    button.press();

    let mut poller = InputPoller::new(Arc::clone(&fan), button, ToggleAction);
    assert!(poller.poll());
    assert_eq!(poller.presses(), 1);
}

// ============================================================================
// Matrix
// ============================================================================

#[test]
fn toggle_from_boot_restores_default_color() {
    let matrix = Arc::new(SharedDevice::new(Matrix::new(MockStrip::default())));
    let button = MockButton::new();
    let mut poller = InputPoller::new(Arc::clone(&matrix), button.clone(), ToggleAction);

    button.press();
    poller.poll();
    matrix.with_state(|m| {
        assert_eq!(m.current(), ColorSetting::new(Rgb::new(255, 0, 0), 10));
    });

    button.release();
    poller.poll();
    button.press();
    poller.poll();
    matrix.with_state(|m| {
        assert!(m.is_off());
        assert_eq!(m.current().brightness, 10);
    });
}

#[test]
fn zero_brightness_color_is_not_off() {
    let matrix = SharedDevice::new(Matrix::new(MockStrip::default()));
    assert_eq!(
        post(&matrix, "/set-color?red=0&green=0&blue=1&brightness=0"),
        Status::Ok
    );
    assert!(!matrix.with_state(|m| m.is_off()));
}

#[test]
fn strip_failure_keeps_color_and_memory() {
    let matrix = SharedDevice::new(Matrix::new(MockStrip::default()));
    post(&matrix, "/set-color?red=9&green=9&blue=9&brightness=9");
    matrix.with_state(|m| m.strip_mut().fail = true);

    assert_eq!(
        post(&matrix, "/set-color?red=0&green=0&blue=0&brightness=9"),
        Status::InternalServerError
    );
    matrix.with_state(|m| {
        assert_eq!(m.current(), ColorSetting::new(Rgb::new(9, 9, 9), 9));
        assert_eq!(m.last_active(), ColorSetting::new(Rgb::new(255, 0, 0), 10));
    });
}

#[test]
fn strip_failure_then_toggle_latches_recorded_color() {
    let matrix = SharedDevice::new(Matrix::new(MockStrip::default()));
    post(&matrix, "/set-color?red=9&green=9&blue=9&brightness=9");
    matrix.with_state(|m| m.strip_mut().fail = true);
    assert_eq!(
        post(&matrix, "/set-color?red=50&green=0&blue=0&brightness=200"),
        Status::InternalServerError
    );

    matrix.with_state(|m| {
        assert!(m.strip().pixels.iter().all(|&p| p == Rgb::new(9, 9, 9)));
        assert_eq!(m.strip().brightness, 9);

        m.strip_mut().fail = false;
        m.toggle().unwrap();
        m.toggle().unwrap();
        assert_eq!(m.current(), ColorSetting::new(Rgb::new(9, 9, 9), 9));
        assert!(m.strip().pixels.iter().all(|&p| p == m.current().color));
        assert_eq!(m.strip().brightness, m.current().brightness);
    });
}

#[test]
fn matrix_from_config_uses_configured_memory() {
    let remembered = ColorSetting::new(Rgb::new(0, 0, 255), 60);
    let config = Config::for_kind(DeviceKind::Matrix).with_matrix(
        rs_homenode::config::MatrixConfig::default().with_initial_last_active(remembered),
    );
    let mut matrix = controller::matrix(MockStrip::default(), &config);

    matrix.toggle().unwrap();
    assert_eq!(matrix.current(), remembered);
}
