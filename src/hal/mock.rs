//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware and transport traits,
//! enabling development and testing on desktop without a board.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockServo`] | [`PwmOutput`] | Records duty writes |
//! | [`MockSwitch`] | [`DigitalOutput`] | Records the output level |
//! | [`MockStrip`] | [`LedStrip`] | In-memory pixels, brightness, latch count |
//! | [`MockSensor`] | [`ClimateSensor`] | Queued readings and failures |
//! | [`MockButton`] | [`DigitalInput`] | Shared level, drivable from another thread |
//! | [`MockPotentiometer`] | [`AnalogInput`] | Shared raw level |
//! | [`MockConnection`] | `Read + Write` | Canned request, captured response |
//! | [`MockAcceptor`] | [`Acceptor`] | Queue of connections |
//!
//! Input mocks are cheap to clone and every clone shares the same level, so
//! a test can keep one handle while the poller owns another.
//!
//! # Example
//!
//! ```rust
//! use rs_homenode::device::{Device, Matrix};
//! use rs_homenode::hal::MockStrip;
//! use rs_homenode::traits::Rgb;
//!
//! let mut matrix = Matrix::new(MockStrip::new(64));
//! matrix.toggle().unwrap();
//!
//! assert_eq!(matrix.strip().brightness, 10);
//! assert_eq!(matrix.strip().pixels[0], Rgb::new(255, 0, 0));
//! assert_eq!(matrix.state().unwrap().to_body(),
//!            r#"{"red": 255, "green": 0, "blue": 0, "brightness": 10}"#);
//! ```
//!
//! [`PwmOutput`]: crate::traits::PwmOutput
//! [`DigitalOutput`]: crate::traits::DigitalOutput
//! [`LedStrip`]: crate::traits::LedStrip
//! [`ClimateSensor`]: crate::traits::ClimateSensor
//! [`DigitalInput`]: crate::traits::DigitalInput
//! [`AnalogInput`]: crate::traits::AnalogInput
//! [`Acceptor`]: crate::traits::Acceptor

use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use crate::traits::{
    AnalogInput, ClimateSensor, DigitalInput, DigitalOutput, LedStrip, Measurement, PwmOutput,
    Rgb,
};

/// Error returned by a mock whose `fail` flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFailure;

// ============================================================================
// Actuator Mocks
// ============================================================================

/// Mock servo PWM output.
///
/// # Example
///
/// ```rust
/// use rs_homenode::hal::MockServo;
/// use rs_homenode::traits::PwmOutput;
///
/// let mut servo = MockServo::new();
/// servo.set_duty_u16(7700).unwrap();
/// assert_eq!(servo.duty, 7700);
/// assert_eq!(servo.call_count, 1);
///
/// servo.fail = true;
/// assert!(servo.set_duty_u16(1400).is_err());
/// assert_eq!(servo.duty, 7700);
/// ```
#[derive(Debug, Default)]
pub struct MockServo {
    /// Last duty written.
    pub duty: u16,
    /// Number of successful writes.
    pub call_count: usize,
    /// Reject every write while set.
    pub fail: bool,
}

impl MockServo {
    /// A servo that has never been written.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PwmOutput for MockServo {
    type Error = MockFailure;

    fn set_duty_u16(&mut self, duty: u16) -> Result<(), MockFailure> {
        if self.fail {
            return Err(MockFailure);
        }
        self.duty = duty;
        self.call_count += 1;
        Ok(())
    }
}

/// Mock digital output for the fan and light.
#[derive(Debug, Default)]
pub struct MockSwitch {
    /// Current pin level.
    pub level: bool,
    /// Number of successful writes.
    pub call_count: usize,
    /// Reject every write while set.
    pub fail: bool,
}

impl MockSwitch {
    /// A low output.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DigitalOutput for MockSwitch {
    type Error = MockFailure;

    fn set_level(&mut self, high: bool) -> Result<(), MockFailure> {
        if self.fail {
            return Err(MockFailure);
        }
        self.level = high;
        self.call_count += 1;
        Ok(())
    }
}

/// Mock LED strip with in-memory pixels.
///
/// `fill` and `set_brightness` stage changes; `show` counts latches.
#[derive(Debug)]
pub struct MockStrip {
    /// Staged colour of every LED.
    pub pixels: Vec<Rgb>,
    /// Staged brightness.
    pub brightness: u8,
    /// Number of successful `show` calls.
    pub show_count: usize,
    /// Reject `show` while set.
    pub fail: bool,
}

impl MockStrip {
    /// A dark strip of `len` LEDs at full brightness.
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![Rgb::BLACK; len],
            brightness: u8::MAX,
            show_count: 0,
            fail: false,
        }
    }
}

impl Default for MockStrip {
    fn default() -> Self {
        Self::new(crate::device::matrix::DEFAULT_LED_COUNT)
    }
}

impl LedStrip for MockStrip {
    type Error = MockFailure;

    fn fill(&mut self, color: Rgb) {
        self.pixels.iter_mut().for_each(|p| *p = color);
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    fn show(&mut self) -> Result<(), MockFailure> {
        if self.fail {
            return Err(MockFailure);
        }
        self.show_count += 1;
        Ok(())
    }

    fn pixel(&self, index: usize) -> Option<Rgb> {
        self.pixels.get(index).copied()
    }
}

// ============================================================================
// Sensor Mock
// ============================================================================

/// Why a mock acquisition failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSensorError {
    /// Queued failure.
    Timeout,
    /// Nothing queued and no fallback reading.
    NoReading,
}

/// Mock climate sensor.
///
/// Queued results are returned in FIFO order. Once the queue is empty the
/// fallback reading is returned, if any.
///
/// # Example
///
/// ```rust
/// use rs_homenode::hal::MockSensor;
/// use rs_homenode::traits::ClimateSensor;
///
/// let mut sensor = MockSensor::with_fallback(20.0, 50.0);
/// sensor.queue_reading(21.5, 40.0);
/// sensor.queue_failure();
///
/// assert_eq!(sensor.read().unwrap().temperature, 21.5);
/// assert!(sensor.read().is_err());
/// assert_eq!(sensor.read().unwrap().temperature, 20.0);
/// assert_eq!(sensor.read_count, 3);
/// ```
#[derive(Debug, Default)]
pub struct MockSensor {
    queue: VecDeque<Result<Measurement, MockSensorError>>,
    /// Reading returned once the queue is drained.
    pub fallback: Option<Measurement>,
    /// Number of acquisitions attempted.
    pub read_count: usize,
}

impl MockSensor {
    /// A sensor that fails until something is queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sensor that always returns the same reading when nothing is queued.
    pub fn with_fallback(temperature: f32, humidity: f32) -> Self {
        Self {
            fallback: Some(Measurement {
                temperature,
                humidity,
            }),
            ..Self::default()
        }
    }

    /// Queue a successful acquisition.
    pub fn queue_reading(&mut self, temperature: f32, humidity: f32) {
        self.queue.push_back(Ok(Measurement {
            temperature,
            humidity,
        }));
    }

    /// Queue a failed acquisition.
    pub fn queue_failure(&mut self) {
        self.queue.push_back(Err(MockSensorError::Timeout));
    }
}

impl ClimateSensor for MockSensor {
    type Error = MockSensorError;

    fn read(&mut self) -> Result<Measurement, MockSensorError> {
        self.read_count += 1;
        match self.queue.pop_front() {
            Some(result) => result,
            None => self.fallback.ok_or(MockSensorError::NoReading),
        }
    }
}

// ============================================================================
// Input Mocks
// ============================================================================

/// Mock push button with a shared level.
///
/// # Example
///
/// ```rust
/// use rs_homenode::hal::MockButton;
/// use rs_homenode::traits::DigitalInput;
///
/// let mut polled = MockButton::new();
/// let handle = polled.clone();
///
/// handle.press();
/// assert!(polled.is_high());
/// handle.release();
/// assert!(!polled.is_high());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockButton {
    level: Arc<AtomicBool>,
}

impl MockButton {
    /// A released button.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the button down.
    pub fn press(&self) {
        self.set_level(true);
    }

    /// Let the button go.
    pub fn release(&self) {
        self.set_level(false);
    }

    /// Set the level directly.
    pub fn set_level(&self, high: bool) {
        self.level.store(high, Ordering::SeqCst);
    }

    /// Current level without going through the trait.
    pub fn level(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }
}

impl DigitalInput for MockButton {
    fn is_high(&mut self) -> bool {
        self.level()
    }
}

/// Mock potentiometer with a shared raw level.
#[derive(Debug, Clone, Default)]
pub struct MockPotentiometer {
    raw: Arc<AtomicU16>,
    fail: Arc<AtomicBool>,
}

impl MockPotentiometer {
    /// A potentiometer at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw 16-bit level.
    pub fn set_raw(&self, raw: u16) {
        self.raw.store(raw, Ordering::SeqCst);
    }

    /// Set the level as a fraction in `[0, 1]`.
    pub fn set_fraction(&self, fraction: f32) {
        let clamped = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.set_raw((clamped * f32::from(u16::MAX) + 0.5) as u16);
    }

    /// Make conversions fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl AnalogInput for MockPotentiometer {
    type Error = MockFailure;

    fn read_u16(&mut self) -> Result<u16, MockFailure> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MockFailure);
        }
        Ok(self.raw.load(Ordering::SeqCst))
    }
}

// ============================================================================
// Transport Mocks
// ============================================================================

#[cfg(feature = "std")]
pub use self::transport::{MockAcceptor, MockConnection, ResponseSink};

#[cfg(feature = "std")]
mod transport {
    use std::collections::VecDeque;
    use std::io::{self, Cursor, Read, Write};
    use std::net::SocketAddr;
    use std::string::String;
    use std::sync::{Arc, Mutex, PoisonError};
    use std::vec::Vec;

    use crate::traits::Acceptor;

    /// Shared view of what a [`MockConnection`] wrote.
    ///
    /// Stays readable after the connection itself has been dropped.
    #[derive(Debug, Clone, Default)]
    pub struct ResponseSink(Arc<Mutex<Vec<u8>>>);

    impl ResponseSink {
        /// Bytes written so far.
        pub fn bytes(&self) -> Vec<u8> {
            self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        /// Bytes written so far, lossily decoded.
        pub fn text(&self) -> String {
            String::from_utf8_lossy(&self.bytes()).into_owned()
        }

        fn extend(&self, buf: &[u8]) {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(buf);
        }
    }

    /// In-memory connection with a canned request.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::io::{Read, Write};
    /// use rs_homenode::hal::MockConnection;
    ///
    /// let mut conn = MockConnection::new("GET /status HTTP/1.1\r\n\r\n").chunked(4);
    /// let sink = conn.sink();
    ///
    /// let mut buf = [0u8; 16];
    /// assert_eq!(conn.read(&mut buf).unwrap(), 4);
    ///
    /// conn.write_all(b"HTTP/1.0 200 OK").unwrap();
    /// drop(conn);
    /// assert_eq!(sink.text(), "HTTP/1.0 200 OK");
    /// ```
    #[derive(Debug)]
    pub struct MockConnection {
        input: Cursor<Vec<u8>>,
        output: ResponseSink,
        chunk: Option<usize>,
        fail_writes: bool,
    }

    impl MockConnection {
        /// A connection whose peer sends `request` and then half-closes.
        pub fn new(request: impl Into<Vec<u8>>) -> Self {
            Self {
                input: Cursor::new(request.into()),
                output: ResponseSink::default(),
                chunk: None,
                fail_writes: false,
            }
        }

        /// Deliver the request at most `size` bytes per read.
        pub fn chunked(mut self, size: usize) -> Self {
            self.chunk = Some(size.max(1));
            self
        }

        /// Make every write fail as if the peer had reset.
        pub fn failing_writes(mut self) -> Self {
            self.fail_writes = true;
            self
        }

        /// Handle on the response bytes.
        pub fn sink(&self) -> ResponseSink {
            self.output.clone()
        }
    }

    impl Read for MockConnection {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let limit = self.chunk.unwrap_or(buf.len()).min(buf.len());
            self.input.read(&mut buf[..limit])
        }
    }

    impl Write for MockConnection {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer reset"));
            }
            self.output.extend(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Acceptor over a queue of mock connections.
    ///
    /// Once the queue is drained `accept` fails with
    /// [`io::ErrorKind::NotConnected`].
    #[derive(Debug, Default)]
    pub struct MockAcceptor {
        pending: VecDeque<io::Result<MockConnection>>,
    }

    impl MockAcceptor {
        /// An acceptor with nothing queued.
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a connection and return the handle on its response.
        pub fn push(&mut self, conn: MockConnection) -> ResponseSink {
            let sink = conn.sink();
            self.pending.push_back(Ok(conn));
            sink
        }

        /// Queue a connection carrying `request`.
        pub fn push_request(&mut self, request: impl Into<Vec<u8>>) -> ResponseSink {
            self.push(MockConnection::new(request))
        }

        /// Queue a failed accept.
        pub fn push_error(&mut self, kind: io::ErrorKind) {
            self.pending
                .push_back(Err(io::Error::new(kind, "mock accept failure")));
        }

        /// Number of queued accepts.
        pub fn remaining(&self) -> usize {
            self.pending.len()
        }
    }

    impl Acceptor for MockAcceptor {
        type Stream = MockConnection;

        fn accept(&mut self) -> io::Result<(MockConnection, Option<SocketAddr>)> {
            match self.pending.pop_front() {
                Some(Ok(conn)) => Ok((conn, None)),
                Some(Err(err)) => Err(err),
                None => Err(io::Error::new(
                    io::ErrorKind::NotConnected,
                    "no pending connections",
                )),
            }
        }
    }
}
