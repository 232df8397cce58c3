//! ESP32-C3 SuperMini home controller.
//!
//! One firmware image per controller; the kind is chosen at build time with
//! `HOMENODE_DEVICE` (`blinds`, `fan`, `light`, `matrix` or `sensor`). The
//! image:
//! - Joins WiFi with the kind's static address (if the `wifi` feature is on)
//! - Starts the input poller on its own thread (not on the sensor)
//! - Serves the request protocol on the configured port, one connection at
//!   a time
//!
//! # Build
//!
//! ```bash
//! HOMENODE_DEVICE=blinds WIFI_SSID=home WIFI_PASSWORD=secret \
//!     cargo build --release --features wifi --bin esp32_main
//! ```

use esp_idf_hal::adc::oneshot::AdcDriver;
use esp_idf_hal::peripherals::Peripherals;
use rs_homenode::config::{Config, NetworkConfig, WifiConfig};
use rs_homenode::controller::{self, Controller};
use rs_homenode::device::{DeviceKind, Fan, Light, Sensor};
use rs_homenode::hal::esp32::{
    Esp32Button, Esp32Dht11, Esp32Matrix, Esp32Output, Esp32Potentiometer, Esp32Servo,
};
use rs_homenode::services::{PotentiometerAction, ToggleAction};
use rs_homenode::traits::{LedStrip, Rgb};

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    tracing_subscriber::fmt().with_target(false).init();

    let kind_name = option_env!("HOMENODE_DEVICE").unwrap_or("light");
    let kind = DeviceKind::from_text(kind_name)
        .ok_or_else(|| anyhow::anyhow!("unknown device kind '{kind_name}'"))?;

    println!();
    println!("================================");
    println!("  rs-homenode {kind} controller");
    println!("================================");
    println!();

    // =========================================================================
    // Configuration
    // =========================================================================
    let config = Config::for_kind(kind).with_wifi(
        WifiConfig::default()
            .with_ssid(option_env!("WIFI_SSID").unwrap_or(""))
            .with_password(option_env!("WIFI_PASSWORD").unwrap_or(""))
            .with_network(NetworkConfig::for_kind(kind)),
    );

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Initialize WiFi
    // =========================================================================
    #[cfg(feature = "wifi")]
    let _wifi = {
        use esp_idf_svc::eventloop::EspSystemEventLoop;
        use esp_idf_svc::nvs::EspDefaultNvsPartition;
        use rs_homenode::hal::esp32::Esp32Wifi;

        if !config.wifi.is_configured() {
            anyhow::bail!("WIFI_SSID not set at build time");
        }
        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take().ok();
        Esp32Wifi::new(peripherals.modem, sysloop, nvs, &config.wifi)?
    };

    let button = Esp32Button::active_high(peripherals.pins.gpio10)?;
    println!("[OK] Button initialized (GPIO10)");

    // =========================================================================
    // Device, poller, server
    // =========================================================================
    match kind {
        DeviceKind::Blinds => {
            let servo = Esp32Servo::new(
                peripherals.pins.gpio2,
                peripherals.ledc.timer0,
                peripherals.ledc.channel0,
                config.servo.frequency_hz,
            )?;
            println!("[OK] Servo initialized (GPIO2 PWM)");

            // The poller thread outlives main's stack frame
            let adc1: &'static AdcDriver<'static, _> =
                Box::leak(Box::new(AdcDriver::new(peripherals.adc1)?));
            let pot = Esp32Potentiometer::new(adc1, peripherals.pins.gpio4)?;
            println!("[OK] Potentiometer initialized (GPIO4 ADC)");

            let mut blinds = controller::blinds(servo, &config);
            blinds.release()?;

            let node = Controller::new(blinds, config);
            node.spawn_poller(button, PotentiometerAction::new(pot))?;
            node.serve()?;
        }
        DeviceKind::Fan => {
            let output = Esp32Output::new(peripherals.pins.gpio3)?;
            println!("[OK] Fan output initialized (GPIO3)");

            let node = Controller::new(Fan::new(output), config);
            node.spawn_poller(button, ToggleAction)?;
            node.serve()?;
        }
        DeviceKind::Light => {
            let output = Esp32Output::new(peripherals.pins.gpio3)?;
            println!("[OK] Light output initialized (GPIO3)");

            let node = Controller::new(Light::new(output), config);
            node.spawn_poller(button, ToggleAction)?;
            node.serve()?;
        }
        DeviceKind::Matrix => {
            let mut strip = Esp32Matrix::new(
                peripherals.rmt.channel0,
                peripherals.pins.gpio5,
                config.matrix.led_count,
            )?;
            // Blank whatever the LEDs latched at power-up
            strip.fill(Rgb::BLACK);
            strip.show()?;
            println!("[OK] Matrix initialized (GPIO5 RMT, {} LEDs)", config.matrix.led_count);

            let node = Controller::new(controller::matrix(strip, &config), config);
            node.spawn_poller(button, ToggleAction)?;
            node.serve()?;
        }
        DeviceKind::Sensor => {
            let dht = Esp32Dht11::new(peripherals.pins.gpio6)?;
            println!("[OK] DHT11 initialized (GPIO6)");

            let node = Controller::new(Sensor::new(dht), config);
            node.serve()?;
        }
    }

    Ok(())
}
