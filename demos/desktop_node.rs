//! Desktop controller node with mock hardware.
//!
//! Runs any controller kind on localhost so the request protocol can be
//! exercised with `curl` or `nc`, and the physical inputs driven from
//! stdin:
//!
//! | stdin        | Effect                                   |
//! |--------------|------------------------------------------|
//! | `press`      | Press and release the button             |
//! | `pot <0-100>`| Move the potentiometer (blinds only)     |
//! | `state`      | Print the current state body             |
//! | `quit`       | Exit                                     |
//!
//! # Usage
//!
//! ```sh
//! cargo run --example desktop_node --features desktop -- --device blinds --port 8080
//! curl -X POST 'http://localhost:8080/position?percentage=55'
//! curl 'http://localhost:8080/status'
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rs_homenode::config::{Config, ServerConfig};
use rs_homenode::controller;
use rs_homenode::device::{Device, DeviceKind, Fan, Light, Sensor};
use rs_homenode::hal::{MockButton, MockPotentiometer, MockSensor, MockServo, MockStrip, MockSwitch};
use rs_homenode::services::{
    AsyncConnectionServer, InputPoller, PhysicalAction, PotentiometerAction, SharedDevice,
    ToggleAction,
};

#[derive(Parser, Debug)]
#[command(name = "desktop_node", about = "Home controller node with mock hardware")]
struct Args {
    /// Controller kind: blinds, fan, light, matrix or sensor
    #[arg(long, default_value = "light", value_parser = parse_kind)]
    device: DeviceKind,

    /// TCP port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn parse_kind(s: &str) -> Result<DeviceKind, String> {
    DeviceKind::from_text(s).ok_or_else(|| format!("unknown device kind '{s}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::for_kind(args.device)
        .with_server(ServerConfig::default().with_port(args.port));

    let button = MockButton::new();
    let pot = MockPotentiometer::new();

    match args.device {
        DeviceKind::Blinds => {
            let shared = Arc::new(SharedDevice::new(controller::blinds(MockServo::new(), &config)));
            start_poller(&shared, &config, button.clone(), PotentiometerAction::new(pot.clone()));
            run(shared, &config, button, pot).await
        }
        DeviceKind::Fan => {
            let shared = Arc::new(SharedDevice::new(Fan::new(MockSwitch::new())));
            start_poller(&shared, &config, button.clone(), ToggleAction);
            run(shared, &config, button, pot).await
        }
        DeviceKind::Light => {
            let shared = Arc::new(SharedDevice::new(Light::new(MockSwitch::new())));
            start_poller(&shared, &config, button.clone(), ToggleAction);
            run(shared, &config, button, pot).await
        }
        DeviceKind::Matrix => {
            let strip = MockStrip::new(config.matrix.led_count);
            let shared = Arc::new(SharedDevice::new(controller::matrix(strip, &config)));
            start_poller(&shared, &config, button.clone(), ToggleAction);
            run(shared, &config, button, pot).await
        }
        DeviceKind::Sensor => {
            let sensor = Sensor::new(MockSensor::with_fallback(21.5, 40.0));
            run(Arc::new(SharedDevice::new(sensor)), &config, button, pot).await
        }
    }
}

fn start_poller<D, X>(shared: &Arc<SharedDevice<D>>, config: &Config, button: MockButton, action: X)
where
    D: Device + Send + 'static,
    X: PhysicalAction<D> + Send + 'static,
{
    let poller = InputPoller::new(Arc::clone(shared), button, action)
        .with_interval(config.input.poll_interval());
    tokio::spawn(poller.run_async());
}

async fn run<D>(
    shared: Arc<SharedDevice<D>>,
    config: &Config,
    button: MockButton,
    pot: MockPotentiometer,
) -> anyhow::Result<()>
where
    D: Device + Send + 'static,
{
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], config.server.port));
    let server =
        AsyncConnectionServer::bind_with_backlog(addr, config.server.backlog, Arc::clone(&shared))
            .await?
            .with_buffer_size(config.server.request_buffer);
    let kind = D::KIND;
    info!(%kind, addr = %server.local_addr()?, "desktop node ready");
    tokio::spawn(server.run());

    let hold = config.input.poll_interval() * 3;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (Some("press"), _) => {
                button.press();
                tokio::time::sleep(hold).await;
                button.release();
            }
            (Some("pot"), Some(value)) => match value.parse::<f32>() {
                Ok(percent) if (0.0..=100.0).contains(&percent) => {
                    pot.set_fraction(percent / 100.0);
                    println!("potentiometer at {percent}% (press to apply)");
                }
                _ => println!("usage: pot <0-100>"),
            },
            (Some("state"), _) => match shared.snapshot() {
                Ok(state) => println!("{}", state.to_body()),
                Err(e) => warn!(error = %e, "state read failed"),
            },
            (Some("quit"), _) => break,
            (None, _) => {}
            _ => println!("commands: press | pot <0-100> | state | quit"),
        }
    }

    Ok(())
}
