//! WiFi station with static addressing for ESP32.
//!
//! Every controller lives at a fixed address on the home network (see
//! [`NetworkConfig`]), so the station netif is created with a fixed IPv4
//! configuration instead of DHCP.
//!
//! # Example
//!
//! ```ignore
//! use rs_homenode::hal::esp32::Esp32Wifi;
//! use rs_homenode::config::{NetworkConfig, WifiConfig};
//! use rs_homenode::DeviceKind;
//!
//! let config = WifiConfig::default()
//!     .with_ssid("MyNetwork")
//!     .with_password("secret123")
//!     .with_network(NetworkConfig::for_kind(DeviceKind::Fan));
//!
//! let wifi = Esp32Wifi::new(modem, sysloop, nvs, &config)?;
//! println!("IP: {:?}", wifi.ip_addr());
//! ```

use crate::config::{NetworkConfig, WifiConfig};
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::ipv4::{
    self, ClientConfiguration as IpClientConfiguration, ClientSettings, Mask, Subnet,
};
use esp_idf_svc::netif::{EspNetif, NetifConfiguration, NetifStack};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, ClientConfiguration, Configuration, EspWifi, WifiDriver};
use std::net::Ipv4Addr;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Pause between association attempts.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// WiFi connection manager for ESP32.
///
/// The connection is established during construction and maintained for the
/// lifetime of this struct.
pub struct Esp32Wifi<'a> {
    wifi: BlockingWifi<EspWifi<'a>>,
}

impl<'a> Esp32Wifi<'a> {
    /// Connect to the configured access point.
    ///
    /// Association is retried until `connect_timeout_ms` has elapsed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - WiFi or netif initialization fails
    /// - The access point cannot be joined before the timeout
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        config: &WifiConfig,
    ) -> anyhow::Result<Self> {
        let driver = WifiDriver::new(modem, sysloop.clone(), nvs)?;
        let sta_netif = EspNetif::new_with_conf(&static_netif(&config.network))?;
        let ap_netif = EspNetif::new(NetifStack::Ap)?;
        let esp_wifi = EspWifi::wrap_all(driver, sta_netif, ap_netif)?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

        let mut ssid: heapless::String<32> = heapless::String::new();
        let _ = ssid.push_str(config.ssid.as_str());
        let mut password: heapless::String<64> = heapless::String::new();
        let _ = password.push_str(config.password.as_str());

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid,
            password,
            ..Default::default()
        }))?;

        wifi.start()?;

        let deadline = Instant::now() + Duration::from_millis(u64::from(config.connect_timeout_ms));
        loop {
            info!(ssid = %config.ssid, "connecting");
            match wifi.connect() {
                Ok(()) => break,
                Err(e) if Instant::now() < deadline => {
                    warn!(error = %e, "association failed, retrying");
                    thread::sleep(RETRY_DELAY);
                }
                Err(e) => return Err(e.into()),
            }
        }

        wifi.wait_netif_up()?;
        info!(address = %config.network.address(), "connected");

        Ok(Self { wifi })
    }

    /// Current IP address, if connected.
    pub fn ip_addr(&self) -> Option<Ipv4Addr> {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip)
    }

    /// Check if WiFi is connected.
    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }
}

/// Station netif configuration with a fixed address.
fn static_netif(network: &NetworkConfig) -> NetifConfiguration {
    NetifConfiguration {
        ip_configuration: Some(ipv4::Configuration::Client(IpClientConfiguration::Fixed(
            ClientSettings {
                ip: network.address(),
                subnet: Subnet {
                    gateway: network.gateway(),
                    mask: Mask(network.prefix_len()),
                },
                dns: Some(network.dns()),
                secondary_dns: None,
            },
        ))),
        ..NetifConfiguration::wifi_default_client()
    }
}
