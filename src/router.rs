//! Request router: maps a decoded request onto a device operation.
//!
//! Resolution order for one request:
//!
//! 1. Route not in the device's table → 400
//! 2. Verb does not match the route → 405 (parameters are not looked at)
//! 3. Mutating route: parse parameters outside the guard → 400 on failure,
//!    then apply inside the guard → 500 if the hardware fails
//! 4. Read route: snapshot inside the guard → 500 if an acquisition fails,
//!    body rendered after the guard is released
//!
//! Rejected requests never touch the device.
//!
//! # Example
//!
//! ```rust
//! use rs_homenode::device::Blinds;
//! use rs_homenode::hal::MockServo;
//! use rs_homenode::router::handle;
//! use rs_homenode::services::SharedDevice;
//! use rs_homenode::Status;
//!
//! let blinds = SharedDevice::new(Blinds::new(MockServo::new()));
//!
//! let outcome = handle(b"POST /position?percentage=55 HTTP/1.1\r\n", &blinds);
//! assert_eq!(outcome.status, Status::Ok);
//!
//! let outcome = handle(b"GET /status HTTP/1.1\r\n", &blinds);
//! assert_eq!(outcome.body(), "55");
//!
//! let outcome = handle(b"POST /position?percentage=150 HTTP/1.1\r\n", &blinds);
//! assert_eq!(outcome.status, Status::BadRequest);
//! ```

use tracing::{debug, warn};

use crate::device::{Action, Device};
use crate::error::{Error, Result};
use crate::response::Outcome;
use crate::traits::StateGuard;
use crate::wire::{decode, Request};

/// Route a decoded request and turn any failure into its status.
pub fn dispatch<G: StateGuard>(request: &Request, guard: &G) -> Outcome {
    match try_dispatch(request, guard) {
        Ok(outcome) => outcome,
        Err(err @ Error::HardwareFault(_)) => {
            warn!(route = %request.route, error = %err, "hardware fault");
            err.into()
        }
        Err(err) => {
            debug!(verb = %request.verb, route = %request.route, error = %err, "request rejected");
            err.into()
        }
    }
}

/// Route a decoded request, keeping the typed error.
///
/// # Errors
///
/// See the module documentation for the resolution order.
pub fn try_dispatch<G: StateGuard>(request: &Request, guard: &G) -> Result<Outcome> {
    let route = <G::Device as Device>::route(&request.route)
        .ok_or_else(|| Error::UnknownRoute(request.route.clone()))?;

    if request.verb != route.verb() {
        return Err(Error::MethodNotAllowed {
            route: request.route.clone(),
            verb: request.verb.clone(),
        });
    }

    match route.action {
        Action::Read => {
            let state = guard.with_state(|device| device.state())?;
            Ok(Outcome::with_body(state.to_body()))
        }
        Action::Mutate => {
            let command = <G::Device as Device>::parse_command(route.name, &request.params)?;
            debug!(route = route.name, ?command, "applying");
            guard.with_state(|device| device.apply(command))?;
            Ok(Outcome::ok())
        }
    }
}

/// Decode a raw request buffer and route it.
///
/// A buffer that does not decode yields a 400 without touching the device.
pub fn handle<G: StateGuard>(raw: &[u8], guard: &G) -> Outcome {
    match decode(raw) {
        Ok(request) => dispatch(&request, guard),
        Err(err) => {
            debug!(error = %err, "malformed request");
            Error::from(err).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Blinds, ColorSetting, Fan, Matrix, Sensor, Switch};
    use crate::hal::{MockSensor, MockServo, MockStrip, MockSwitch};
    use crate::response::Status;
    use crate::traits::Rgb;
    use core::cell::RefCell;

    /// Single-threaded guard for exercising the router alone.
    struct Local<D>(RefCell<D>);

    impl<D: Device> StateGuard for Local<D> {
        type Device = D;

        fn with_state<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
            f(&mut self.0.borrow_mut())
        }
    }

    fn local<D>(device: D) -> Local<D> {
        Local(RefCell::new(device))
    }

    // =========================================================================
    // Route resolution
    // =========================================================================

    #[test]
    fn unknown_route_is_bad_request() {
        let fan = local(Fan::new(MockSwitch::new()));
        assert_eq!(handle(b"GET /nope HTTP/1.1\r\n", &fan).status, Status::BadRequest);
        assert_eq!(handle(b"POST /position?percentage=5 HTTP/1.1\r\n", &fan).status, Status::BadRequest);
    }

    #[test]
    fn empty_route_is_bad_request() {
        let fan = local(Fan::new(MockSwitch::new()));
        assert_eq!(handle(b"GET / HTTP/1.1\r\n", &fan).status, Status::BadRequest);
    }

    #[test]
    fn wrong_verb_is_405_even_with_bad_params() {
        let blinds = local(Blinds::new(MockServo::new()));
        let outcome = handle(b"GET /position?percentage=abc HTTP/1.1\r\n", &blinds);
        assert_eq!(outcome.status, Status::MethodNotAllowed);
        assert!(outcome.body.is_none());
        assert_eq!(blinds.0.borrow().servo().call_count, 0);
    }

    #[test]
    fn unrecognised_verb_on_known_route_is_405() {
        let fan = local(Fan::new(MockSwitch::new()));
        assert_eq!(
            handle(b"DELETE /status HTTP/1.1\r\n", &fan).status,
            Status::MethodNotAllowed
        );
    }

    #[test]
    fn malformed_is_bad_request() {
        let fan = local(Fan::new(MockSwitch::new()));
        assert_eq!(handle(b"", &fan).status, Status::BadRequest);
        assert_eq!(handle(b"GARBAGE", &fan).status, Status::BadRequest);
        assert_eq!(handle(b"GET status HTTP/1.1", &fan).status, Status::BadRequest);
    }

    // =========================================================================
    // Blinds
    // =========================================================================

    #[test]
    fn blinds_set_then_read() {
        let blinds = local(Blinds::new(MockServo::new()));
        assert!(handle(b"POST /position?percentage=55 HTTP/1.1\r\n", &blinds).is_ok());
        assert_eq!(handle(b"GET /status HTTP/1.1\r\n", &blinds).body(), "55");
    }

    #[test]
    fn blinds_rejected_value_keeps_state() {
        let blinds = local(Blinds::new(MockServo::new()));
        handle(b"POST /position?percentage=40 HTTP/1.1\r\n", &blinds);
        let outcome = handle(b"POST /position?percentage=150 HTTP/1.1\r\n", &blinds);
        assert_eq!(outcome.status, Status::BadRequest);
        assert_eq!(handle(b"GET /status HTTP/1.1\r\n", &blinds).body(), "40");
        assert_eq!(blinds.0.borrow().servo().call_count, 1);
    }

    #[test]
    fn mutation_has_no_body() {
        let blinds = local(Blinds::new(MockServo::new()));
        let outcome = handle(b"POST /position?percentage=10 HTTP/1.1\r\n", &blinds);
        assert_eq!(outcome, Outcome::ok());
    }

    #[test]
    fn servo_failure_is_500() {
        let blinds = local(Blinds::new(MockServo::new()));
        blinds.0.borrow_mut().servo_mut().fail = true;
        let outcome = handle(b"POST /position?percentage=10 HTTP/1.1\r\n", &blinds);
        assert_eq!(outcome.status, Status::InternalServerError);
    }

    // =========================================================================
    // Switch
    // =========================================================================

    #[test]
    fn fan_set_status_and_toggle() {
        let fan = local(Fan::new(MockSwitch::new()));
        assert!(handle(b"POST /set-status?status=on HTTP/1.1\r\n", &fan).is_ok());
        assert_eq!(handle(b"GET /status HTTP/1.1\r\n", &fan).body(), "1");
        assert!(handle(b"POST /toggle HTTP/1.1\r\n", &fan).is_ok());
        assert_eq!(handle(b"GET /status HTTP/1.1\r\n", &fan).body(), "0");
    }

    #[test]
    fn fan_bad_status_value() {
        let fan = local(Switch::<_>::new(MockSwitch::new()));
        let outcome = handle(b"POST /set-status?status=maybe HTTP/1.1\r\n", &fan);
        assert_eq!(outcome.status, Status::BadRequest);
        assert!(!fan.0.borrow().is_on());
    }

    // =========================================================================
    // Matrix
    // =========================================================================

    #[test]
    fn matrix_set_color_then_status() {
        let matrix = local(Matrix::new(MockStrip::default()));
        let outcome = handle(
            b"POST /set-color?red=10&green=20&blue=30&brightness=5 HTTP/1.1\r\n",
            &matrix,
        );
        assert!(outcome.is_ok());
        assert_eq!(
            handle(b"GET /status HTTP/1.1\r\n", &matrix).body(),
            r#"{"red": 10, "green": 20, "blue": 30, "brightness": 5}"#
        );
    }

    #[test]
    fn matrix_partial_params_rejected() {
        let matrix = local(Matrix::new(MockStrip::default()));
        let outcome = handle(b"POST /set-color?red=10&green=20 HTTP/1.1\r\n", &matrix);
        assert_eq!(outcome.status, Status::BadRequest);
        assert_eq!(
            matrix.0.borrow().current(),
            ColorSetting::off(255),
            "state must be untouched"
        );
        assert_eq!(matrix.0.borrow().strip().show_count, 0);
    }

    #[test]
    fn matrix_black_then_toggle_restores() {
        let matrix = local(Matrix::new(MockStrip::default()));
        handle(b"POST /set-color?red=10&green=20&blue=30&brightness=5 HTTP/1.1\r\n", &matrix);
        handle(b"POST /set-color?red=0&green=0&blue=0&brightness=5 HTTP/1.1\r\n", &matrix);
        matrix.with_state(|m| m.toggle()).unwrap();
        assert_eq!(
            matrix.0.borrow().current(),
            ColorSetting::new(Rgb::new(10, 20, 30), 5)
        );
    }

    // =========================================================================
    // Sensor
    // =========================================================================

    #[test]
    fn sensor_reading() {
        let mut mock = MockSensor::new();
        mock.queue_reading(21.5, 40.0);
        mock.queue_failure();
        let sensor = local(Sensor::new(mock));

        let ok = handle(b"GET /reading HTTP/1.1\r\n", &sensor);
        assert_eq!(ok.body(), r#"{"temperature": 21.5, "humidity": 40}"#);

        let failed = handle(b"GET /reading HTTP/1.1\r\n", &sensor);
        assert_eq!(failed.status, Status::InternalServerError);
        assert!(failed.body.is_none());
    }

    #[test]
    fn sensor_post_is_405() {
        let sensor = local(Sensor::new(MockSensor::with_fallback(20.0, 50.0)));
        let outcome = handle(b"POST /reading HTTP/1.1\r\n", &sensor);
        assert_eq!(outcome.status, Status::MethodNotAllowed);
        assert_eq!(sensor.0.borrow().sensor().read_count, 0);
    }

    #[test]
    fn try_dispatch_keeps_error() {
        let fan = local(Fan::new(MockSwitch::new()));
        let request = decode(b"POST /status HTTP/1.1").unwrap();
        assert!(matches!(
            try_dispatch(&request, &fan),
            Err(Error::MethodNotAllowed { .. })
        ));
    }
}
