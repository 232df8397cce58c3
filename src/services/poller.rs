//! Input poller: the physical side of a controller.
//!
//! Samples a button at a fixed interval and, on a rising edge (released →
//! pressed), applies the device's physical action inside the shared guard.
//!
//! | Device | Action on press |
//! |--------|-----------------|
//! | Fan / light | Toggle the output |
//! | Matrix | Restore `last_active` when dark, else go dark |
//! | Blinds | Move to the potentiometer position (`raw / 65535`) |
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use rs_homenode::device::{Device, Light};
//! use rs_homenode::hal::{MockButton, MockSwitch};
//! use rs_homenode::services::{InputPoller, SharedDevice, ToggleAction};
//!
//! let light = Arc::new(SharedDevice::new(Light::new(MockSwitch::new())));
//! let button = MockButton::new();
//! let mut poller = InputPoller::new(Arc::clone(&light), button.clone(), ToggleAction);
//!
//! button.press();
//! assert!(poller.poll());   // rising edge
//! assert!(!poller.poll());  // still held
//! button.release();
//! poller.poll();
//!
//! assert_eq!(light.snapshot().unwrap().to_body(), "1");
//! ```

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::device::{Blinds, Device, Matrix, Switch, SwitchKind};
use crate::error::{Error, Result};
use crate::traits::{AnalogInput, DigitalInput, DigitalOutput, LedStrip, PwmOutput, StateGuard};

/// Default sampling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

// ============================================================================
// Edge Detection
// ============================================================================

/// Rising-edge detector over sampled levels.
///
/// The first sample is compared against "released", so a button held at
/// boot counts as one press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeDetector {
    previous: bool,
}

impl EdgeDetector {
    /// A detector whose previous sample is low.
    pub const fn new() -> Self {
        Self { previous: false }
    }

    /// Feed one sample. Returns `true` on a low → high transition.
    pub fn update(&mut self, level: bool) -> bool {
        let rising = !self.previous && level;
        self.previous = level;
        rising
    }

    /// The last sample seen.
    pub fn previous(&self) -> bool {
        self.previous
    }
}

// ============================================================================
// Physical Actions
// ============================================================================

/// What a press does to a device. Runs inside the guard.
pub trait PhysicalAction<D: Device> {
    /// Apply the press.
    ///
    /// # Errors
    ///
    /// [`Error::HardwareFault`] if an input or output driver fails.
    fn on_press(&mut self, device: &mut D) -> Result<()>;
}

/// Devices with an on/off toggle.
pub trait Toggle {
    /// Flip between on and off.
    ///
    /// # Errors
    ///
    /// [`Error::HardwareFault`] if the output fails.
    fn toggle(&mut self) -> Result<()>;
}

impl<O: DigitalOutput, K: SwitchKind> Toggle for Switch<O, K> {
    fn toggle(&mut self) -> Result<()> {
        Switch::toggle(self)
    }
}

impl<S: LedStrip> Toggle for Matrix<S> {
    fn toggle(&mut self) -> Result<()> {
        Matrix::toggle(self)
    }
}

/// Press toggles the device.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleAction;

impl<D: Device + Toggle> PhysicalAction<D> for ToggleAction {
    fn on_press(&mut self, device: &mut D) -> Result<()> {
        device.toggle()
    }
}

/// Press moves the blinds to the potentiometer position.
#[derive(Debug)]
pub struct PotentiometerAction<A: AnalogInput> {
    potentiometer: A,
}

impl<A: AnalogInput> PotentiometerAction<A> {
    /// Wrap an analog input.
    pub fn new(potentiometer: A) -> Self {
        Self { potentiometer }
    }

    /// Access the potentiometer.
    pub fn potentiometer_mut(&mut self) -> &mut A {
        &mut self.potentiometer
    }
}

impl<A: AnalogInput, P: PwmOutput> PhysicalAction<Blinds<P>> for PotentiometerAction<A> {
    fn on_press(&mut self, blinds: &mut Blinds<P>) -> Result<()> {
        let raw = self.potentiometer.read_u16().map_err(Error::hardware)?;
        let percent = f32::from(raw) / f32::from(u16::MAX);
        debug!(raw, percent, "potentiometer sampled");
        blinds.set_percent(percent)
    }
}

// ============================================================================
// Input Poller
// ============================================================================

/// Samples one button and applies a [`PhysicalAction`] on each press.
pub struct InputPoller<G, B, X>
where
    G: StateGuard,
    B: DigitalInput,
    X: PhysicalAction<G::Device>,
{
    guard: G,
    button: B,
    action: X,
    edge: EdgeDetector,
    interval: Duration,
    presses: u64,
}

impl<G, B, X> InputPoller<G, B, X>
where
    G: StateGuard,
    B: DigitalInput,
    X: PhysicalAction<G::Device>,
{
    /// Create a poller sampling every 20 ms.
    pub fn new(guard: G, button: B, action: X) -> Self {
        Self {
            guard,
            button,
            action,
            edge: EdgeDetector::new(),
            interval: DEFAULT_POLL_INTERVAL,
            presses: 0,
        }
    }

    /// Set the sampling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// The sampling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of presses detected so far.
    pub fn presses(&self) -> u64 {
        self.presses
    }

    /// Access the button.
    pub fn button_mut(&mut self) -> &mut B {
        &mut self.button
    }

    /// Access the action.
    pub fn action_mut(&mut self) -> &mut X {
        &mut self.action
    }

    /// Take one sample. Returns `true` if it was a press.
    ///
    /// A failing action is logged; the poller carries on with the next
    /// sample either way.
    pub fn poll(&mut self) -> bool {
        let level = self.button.is_high();
        if !self.edge.update(level) {
            return false;
        }

        self.presses += 1;
        let kind = <G::Device as Device>::KIND;
        let action = &mut self.action;
        match self.guard.with_state(|device| action.on_press(device)) {
            Ok(()) => info!(%kind, presses = self.presses, "physical input applied"),
            Err(err) => warn!(%kind, error = %err, "physical input failed"),
        }
        true
    }

    /// Sample forever at the configured interval.
    pub fn run(&mut self) -> ! {
        info!(interval_ms = self.interval.as_millis() as u64, "input poller running");
        loop {
            self.poll();
            thread::sleep(self.interval);
        }
    }

    /// Run on a dedicated thread named `input-poller`.
    ///
    /// # Errors
    ///
    /// If the thread cannot be spawned.
    pub fn spawn(mut self) -> io::Result<JoinHandle<()>>
    where
        Self: Send + 'static,
    {
        thread::Builder::new()
            .name("input-poller".into())
            .spawn(move || {
                self.run();
            })
    }

    /// Sample forever on the tokio timer.
    #[cfg(feature = "tokio")]
    pub async fn run_async(mut self) {
        use tokio::time::{interval, MissedTickBehavior};

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_ms = self.interval.as_millis() as u64, "input poller running (async)");
        loop {
            ticker.tick().await;
            self.poll();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{ColorSetting, Fan};
    use crate::hal::{MockButton, MockPotentiometer, MockServo, MockStrip, MockSwitch};
    use crate::services::SharedDevice;
    use crate::traits::Rgb;
    use std::sync::Arc;
    use std::time::Instant;

    // ========================================================================
    // EdgeDetector
    // ========================================================================

    #[test]
    fn test_edge_sequence() {
        let mut edge = EdgeDetector::new();
        let samples = [false, true, true, false, true, false, false, true];
        let rising: Vec<bool> = samples.iter().map(|&s| edge.update(s)).collect();
        assert_eq!(
            rising,
            [false, true, false, false, true, false, false, true]
        );
    }

    #[test]
    fn test_held_at_boot_counts_once() {
        let mut edge = EdgeDetector::new();
        assert!(edge.update(true));
        assert!(!edge.update(true));
        assert!(edge.previous());
    }

    // ========================================================================
    // Switch
    // ========================================================================

    #[test]
    fn test_press_toggles_fan() {
        let fan = Arc::new(SharedDevice::new(Fan::new(MockSwitch::new())));
        let button = MockButton::new();
        let mut poller = InputPoller::new(Arc::clone(&fan), button.clone(), ToggleAction);

        assert!(!poller.poll());
        button.press();
        assert!(poller.poll());
        assert!(fan.with_state(|f| f.is_on()));

        // Held: no repeat.
        for _ in 0..10 {
            assert!(!poller.poll());
        }
        assert!(fan.with_state(|f| f.is_on()));

        button.release();
        poller.poll();
        button.press();
        poller.poll();
        assert!(!fan.with_state(|f| f.is_on()));
        assert_eq!(poller.presses(), 2);
    }

    #[test]
    fn test_failing_output_is_logged_and_skipped() {
        let fan = Arc::new(SharedDevice::new(Fan::new(MockSwitch::new())));
        fan.with_state(|f| f.output_mut().fail = true);
        let button = MockButton::new();
        let mut poller = InputPoller::new(Arc::clone(&fan), button.clone(), ToggleAction);

        button.press();
        assert!(poller.poll());
        assert!(!fan.with_state(|f| f.is_on()));
    }

    // ========================================================================
    // Matrix
    // ========================================================================

    #[test]
    fn test_press_cycles_matrix() {
        let matrix = Arc::new(SharedDevice::new(Matrix::new(MockStrip::default())));
        matrix
            .with_state(|m| m.set_color(ColorSetting::new(Rgb::new(10, 20, 30), 5)))
            .unwrap();

        let button = MockButton::new();
        let mut poller = InputPoller::new(Arc::clone(&matrix), button.clone(), ToggleAction);

        button.press();
        poller.poll();
        assert_eq!(matrix.with_state(|m| m.current()), ColorSetting::off(5));

        button.release();
        poller.poll();
        button.press();
        poller.poll();
        assert_eq!(
            matrix.with_state(|m| m.current()),
            ColorSetting::new(Rgb::new(10, 20, 30), 5)
        );
    }

    // ========================================================================
    // Blinds
    // ========================================================================

    #[test]
    fn test_press_samples_potentiometer() {
        let blinds = Arc::new(SharedDevice::new(Blinds::new(MockServo::new())));
        let button = MockButton::new();
        let pot = MockPotentiometer::new();
        let mut poller = InputPoller::new(
            Arc::clone(&blinds),
            button.clone(),
            PotentiometerAction::new(pot.clone()),
        );

        pot.set_raw(u16::MAX);
        button.press();
        poller.poll();
        assert_eq!(blinds.snapshot().unwrap().to_body(), "100");
        assert_eq!(blinds.with_state(|b| b.servo().duty), 7700);
    }

    #[test]
    fn test_potentiometer_ignored_without_press() {
        let blinds = Arc::new(SharedDevice::new(Blinds::new(MockServo::new())));
        let button = MockButton::new();
        let pot = MockPotentiometer::new();
        let mut poller =
            InputPoller::new(Arc::clone(&blinds), button, PotentiometerAction::new(pot.clone()));

        pot.set_raw(40_000);
        for _ in 0..5 {
            poller.poll();
        }
        assert_eq!(blinds.with_state(|b| b.servo().call_count), 0);
    }

    #[test]
    fn test_potentiometer_failure_keeps_position() {
        let blinds = Arc::new(SharedDevice::new(Blinds::new(MockServo::new())));
        blinds.with_state(|b| b.set_percent(0.3)).unwrap();
        let button = MockButton::new();
        let pot = MockPotentiometer::new();
        pot.set_failing(true);
        let mut poller = InputPoller::new(
            Arc::clone(&blinds),
            button.clone(),
            PotentiometerAction::new(pot),
        );

        button.press();
        assert!(poller.poll());
        assert_eq!(blinds.snapshot().unwrap().to_body(), "30");
    }

    // ========================================================================
    // Threaded run
    // ========================================================================

    #[test]
    fn test_spawned_poller_sees_press() {
        let light = Arc::new(SharedDevice::new(Fan::new(MockSwitch::new())));
        let button = MockButton::new();
        let poller = InputPoller::new(Arc::clone(&light), button.clone(), ToggleAction)
            .with_interval(Duration::from_millis(1));
        let handle = poller.spawn().unwrap();
        assert_eq!(handle.thread().name(), Some("input-poller"));

        button.press();
        let deadline = Instant::now() + Duration::from_secs(5);
        while !light.with_state(|l| l.is_on()) {
            assert!(Instant::now() < deadline, "press was never applied");
            thread::sleep(Duration::from_millis(1));
        }
    }
}
