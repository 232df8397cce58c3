//! Controller assembly: one device, its guard, its server and its poller.
//!
//! ```text
//!                 ┌──────────────────────┐
//!  TCP ──► ConnectionServer ──┐          │
//!                             ├─► SharedDevice<D> ─► hardware
//!  button ──► InputPoller ────┘          │
//!                 └──────────────────────┘
//! ```
//!
//! The sensor controller has no poller; every other kind starts one before
//! serving.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::info;

use crate::config::Config;
use crate::device::{Blinds, Device, Matrix};
use crate::services::{bind_listener, ConnectionServer, InputPoller, PhysicalAction, SharedDevice};
use crate::traits::{Acceptor, DigitalInput, LedStrip, PwmOutput};

/// A device plus the configuration its services run with.
pub struct Controller<D: Device> {
    device: Arc<SharedDevice<D>>,
    config: Config,
}

impl<D: Device> Controller<D> {
    /// Wrap an already built device.
    pub fn new(device: D, config: Config) -> Self {
        Self {
            device: Arc::new(SharedDevice::new(device)),
            config,
        }
    }

    /// The shared device, for handing to further contexts or inspecting.
    pub fn shared(&self) -> Arc<SharedDevice<D>> {
        Arc::clone(&self.device)
    }

    /// The configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Address the server listens on: all interfaces, configured port.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.config.server.port))
    }

    /// Build an input poller over the shared device.
    pub fn poller<B, X>(&self, button: B, action: X) -> InputPoller<Arc<SharedDevice<D>>, B, X>
    where
        B: DigitalInput,
        X: PhysicalAction<D>,
    {
        InputPoller::new(self.shared(), button, action)
            .with_interval(self.config.input.poll_interval())
    }

    /// Start the input poller on its own thread.
    ///
    /// # Errors
    ///
    /// If the thread cannot be spawned.
    pub fn spawn_poller<B, X>(&self, button: B, action: X) -> io::Result<JoinHandle<()>>
    where
        D: Send + 'static,
        B: DigitalInput + Send + 'static,
        X: PhysicalAction<D> + Send + 'static,
    {
        let handle = self.poller(button, action).spawn()?;
        let kind = D::KIND;
        info!(%kind, "input poller started");
        Ok(handle)
    }

    /// Build a connection server over any acceptor.
    pub fn server<A: Acceptor>(&self, acceptor: A) -> ConnectionServer<A, Arc<SharedDevice<D>>> {
        ConnectionServer::new(acceptor, self.shared())
            .with_buffer_size(self.config.server.request_buffer)
    }

    /// Bind the configured port with the configured backlog.
    ///
    /// # Errors
    ///
    /// If the port cannot be bound.
    pub fn bind(&self) -> io::Result<TcpListener> {
        let backlog = self.config.server.backlog;
        let listener = bind_listener(self.listen_addr(), backlog)?;
        let kind = D::KIND;
        let addr = listener.local_addr()?;
        info!(%kind, %addr, backlog, name = self.config.device.name.as_str(), "listening");
        Ok(listener)
    }

    /// Bind and serve forever on the calling thread.
    ///
    /// # Errors
    ///
    /// Only if the port cannot be bound; once serving, this never returns.
    pub fn serve(&self) -> io::Result<()> {
        let listener = self.bind()?;
        self.server(listener).run()
    }
}

// ============================================================================
// Device construction from config
// ============================================================================

/// Blinds using the configured duty range.
pub fn blinds<P: PwmOutput>(servo: P, config: &Config) -> Blinds<P> {
    Blinds::with_duty_range(servo, config.servo.min_duty, config.servo.max_duty)
}

/// A matrix using the configured restore setting.
pub fn matrix<S: LedStrip>(strip: S, config: &Config) -> Matrix<S> {
    Matrix::with_last_active(strip, config.matrix.initial_last_active)
}
