//! Shared configuration system for desktop and ESP32.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use rs_homenode::config::{Config, ServerConfig, WifiConfig};
//! use rs_homenode::device::DeviceKind;
//!
//! // Defaults for one controller of the stock deployment
//! let config = Config::for_kind(DeviceKind::Matrix);
//! assert_eq!(config.wifi.network.address().octets(), [192, 168, 1, 252]);
//!
//! // Or customize
//! let config = Config::for_kind(DeviceKind::Fan)
//!     .with_wifi(WifiConfig::default().with_ssid("home").with_password("secret"))
//!     .with_server(ServerConfig::default().with_port(8080));
//! assert_eq!(config.server.port, 8080);
//! ```

use core::net::Ipv4Addr;
use core::time::Duration;

use heapless::String as HString;

use crate::device::blinds::{DEFAULT_MAX_DUTY, DEFAULT_MIN_DUTY};
use crate::device::matrix::{DEFAULT_LAST_ACTIVE, DEFAULT_LED_COUNT};
use crate::device::{ColorSetting, DeviceKind};

/// Maximum length for short config strings (SSIDs, passwords, names)
pub const MAX_SHORT_STRING: usize = 64;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

/// Create a ShortString from a &str, truncating at a character boundary if too long
pub fn short_string(s: &str) -> ShortString {
    let mut end = s.len().min(MAX_SHORT_STRING);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut hs = ShortString::new();
    // Cannot fail: `end` bytes fit by construction.
    let _ = hs.push_str(&s[..end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete configuration of one controller
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// WiFi connection and static addressing
    pub wifi: WifiConfig,
    /// Connection server settings
    pub server: ServerConfig,
    /// Input poller settings
    pub input: InputConfig,
    /// Servo settings (blinds)
    pub servo: ServoConfig,
    /// LED matrix settings
    pub matrix: MatrixConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_kind(DeviceKind::Light)
    }
}

impl Config {
    /// Defaults for one controller kind, including its static address.
    pub fn for_kind(kind: DeviceKind) -> Self {
        Self {
            wifi: WifiConfig::default().with_network(NetworkConfig::for_kind(kind)),
            server: ServerConfig::default(),
            input: InputConfig::default(),
            servo: ServoConfig::default(),
            matrix: MatrixConfig::default(),
            device: DeviceConfig::for_kind(kind),
        }
    }

    /// Set WiFi configuration
    pub fn with_wifi(mut self, wifi: WifiConfig) -> Self {
        self.wifi = wifi;
        self
    }

    /// Set server configuration
    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.server = server;
        self
    }

    /// Set input configuration
    pub fn with_input(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    /// Set servo configuration
    pub fn with_servo(mut self, servo: ServoConfig) -> Self {
        self.servo = servo;
        self
    }

    /// Set matrix configuration
    pub fn with_matrix(mut self, matrix: MatrixConfig) -> Self {
        self.matrix = matrix;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }
}

// ============================================================================
// Network Config
// ============================================================================

/// Static IPv4 addressing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkConfig {
    /// Controller address
    pub address: [u8; 4],
    /// Subnet mask
    pub netmask: [u8; 4],
    /// Default gateway
    pub gateway: [u8; 4],
    /// DNS server
    pub dns: [u8; 4],
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            address: [192, 168, 1, 250],
            netmask: [255, 255, 255, 0],
            gateway: [192, 168, 1, 1],
            dns: [212, 230, 135, 1],
        }
    }
}

impl NetworkConfig {
    /// Stock addressing for a controller kind.
    pub fn for_kind(kind: DeviceKind) -> Self {
        let mut network = Self::default();
        network.address[3] = kind.default_host_octet();
        network
    }

    /// Set the address
    pub fn with_address(mut self, address: Ipv4Addr) -> Self {
        self.address = address.octets();
        self
    }

    /// Set the gateway
    pub fn with_gateway(mut self, gateway: Ipv4Addr) -> Self {
        self.gateway = gateway.octets();
        self
    }

    /// Set the DNS server
    pub fn with_dns(mut self, dns: Ipv4Addr) -> Self {
        self.dns = dns.octets();
        self
    }

    /// Controller address
    pub fn address(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.address)
    }

    /// Subnet mask
    pub fn netmask(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.netmask)
    }

    /// Default gateway
    pub fn gateway(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.gateway)
    }

    /// DNS server
    pub fn dns(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.dns)
    }

    /// Subnet mask as a prefix length (255.255.255.0 → 24).
    pub fn prefix_len(&self) -> u8 {
        u32::from_be_bytes(self.netmask).leading_ones() as u8
    }
}

// ============================================================================
// WiFi Config
// ============================================================================

/// WiFi connection configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WifiConfig {
    /// WiFi network SSID
    pub ssid: ShortString,
    /// WiFi password
    pub password: ShortString,
    /// Static addressing
    pub network: NetworkConfig,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u32,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: ShortString::new(),
            password: ShortString::new(),
            network: NetworkConfig::default(),
            connect_timeout_ms: 30_000,
        }
    }
}

impl WifiConfig {
    /// Set the SSID
    pub fn with_ssid(mut self, ssid: &str) -> Self {
        self.ssid = short_string(ssid);
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = short_string(password);
        self
    }

    /// Set the static addressing
    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout_ms(mut self, ms: u32) -> Self {
        self.connect_timeout_ms = ms;
        self
    }

    /// Check if WiFi credentials are configured
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }
}

// ============================================================================
// Server Config
// ============================================================================

/// Connection server configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Longest request line accepted, terminator included
    pub request_buffer: usize,
    /// Pending connections queued while one is served
    pub backlog: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 80,
            request_buffer: 1024,
            backlog: 1,
        }
    }
}

impl ServerConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the request buffer size (at least 1 byte)
    pub fn with_request_buffer(mut self, bytes: usize) -> Self {
        self.request_buffer = bytes.max(1);
        self
    }

    /// Set the listen backlog (at least 1)
    pub fn with_backlog(mut self, backlog: u32) -> Self {
        self.backlog = backlog.max(1);
        self
    }
}

// ============================================================================
// Input Config
// ============================================================================

/// Input poller configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputConfig {
    /// Sampling interval in milliseconds
    pub poll_interval_ms: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 20,
        }
    }
}

impl InputConfig {
    /// Set the sampling interval (at least 1 ms)
    pub fn with_poll_interval_ms(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms.max(1);
        self
    }

    /// Sampling interval as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.poll_interval_ms))
    }
}

// ============================================================================
// Servo Config
// ============================================================================

/// Servo PWM configuration (blinds)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServoConfig {
    /// PWM frequency in Hz
    pub frequency_hz: u32,
    /// Duty (u16 scale) at 0 %
    pub min_duty: u16,
    /// Duty (u16 scale) at 100 %
    pub max_duty: u16,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 50,
            min_duty: DEFAULT_MIN_DUTY,
            max_duty: DEFAULT_MAX_DUTY,
        }
    }
}

impl ServoConfig {
    /// Set the PWM frequency
    pub fn with_frequency_hz(mut self, hz: u32) -> Self {
        self.frequency_hz = hz;
        self
    }

    /// Set the duty range, swapping the bounds if given in reverse
    pub fn with_duty_range(mut self, min: u16, max: u16) -> Self {
        self.min_duty = min.min(max);
        self.max_duty = min.max(max);
        self
    }
}

// ============================================================================
// Matrix Config
// ============================================================================

/// LED matrix configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixConfig {
    /// Number of LEDs
    pub led_count: usize,
    /// Setting restored by the first "on" press
    pub initial_last_active: ColorSetting,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            led_count: DEFAULT_LED_COUNT,
            initial_last_active: DEFAULT_LAST_ACTIVE,
        }
    }
}

impl MatrixConfig {
    /// Set the LED count
    pub fn with_led_count(mut self, count: usize) -> Self {
        self.led_count = count;
        self
    }

    /// Set the initial restore setting
    pub fn with_initial_last_active(mut self, setting: ColorSetting) -> Self {
        self.initial_last_active = setting;
        self
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: ShortString,
    /// Which controller this is
    pub kind: DeviceKind,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::for_kind(DeviceKind::Light)
    }
}

impl DeviceConfig {
    /// Named after the kind, e.g. `homenode-blinds`.
    pub fn for_kind(kind: DeviceKind) -> Self {
        let mut name = short_string("homenode-");
        let _ = name.push_str(kind.as_str());
        Self { name, kind }
    }

    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Rgb;
    use alloc::string::String;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 80);
        assert_eq!(config.server.request_buffer, 1024);
        assert_eq!(config.server.backlog, 1);
        assert_eq!(config.input.poll_interval_ms, 20);
        assert_eq!(config.device.kind, DeviceKind::Light);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::for_kind(DeviceKind::Blinds)
            .with_server(ServerConfig::default().with_port(3000))
            .with_input(InputConfig::default().with_poll_interval_ms(50))
            .with_device(DeviceConfig::for_kind(DeviceKind::Blinds).with_name("Bedroom"));

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.input.poll_interval(), Duration::from_millis(50));
        assert_eq!(config.device.name.as_str(), "Bedroom");
        assert_eq!(config.device.kind, DeviceKind::Blinds);
    }

    // =========================================================================
    // String helper
    // =========================================================================

    #[test]
    fn short_string_truncation() {
        let long_input: String = "a".repeat(100);
        let s = short_string(&long_input);
        assert_eq!(s.len(), MAX_SHORT_STRING);
    }

    #[test]
    fn short_string_utf8_boundary() {
        // 3 ASCII bytes + 16 four-byte chars: the cut lands inside a char.
        let mut input = String::from("abc");
        for _ in 0..16 {
            input.push('\u{1F4A1}');
        }
        let s = short_string(&input);
        assert_eq!(s.len(), 63);
        assert!(s.as_str().starts_with("abc"));
    }

    // =========================================================================
    // NetworkConfig
    // =========================================================================

    #[test]
    fn stock_addresses_per_kind() {
        let expected = [
            (DeviceKind::Sensor, 250),
            (DeviceKind::Fan, 251),
            (DeviceKind::Matrix, 252),
            (DeviceKind::Blinds, 253),
            (DeviceKind::Light, 254),
        ];
        for (kind, octet) in expected {
            let config = Config::for_kind(kind);
            assert_eq!(
                config.wifi.network.address(),
                Ipv4Addr::new(192, 168, 1, octet)
            );
        }
    }

    #[test]
    fn network_accessors() {
        let network = NetworkConfig::default()
            .with_address(Ipv4Addr::new(10, 0, 0, 5))
            .with_gateway(Ipv4Addr::new(10, 0, 0, 1))
            .with_dns(Ipv4Addr::new(1, 1, 1, 1));
        assert_eq!(network.address(), Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(network.gateway(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(network.dns(), Ipv4Addr::new(1, 1, 1, 1));
        assert_eq!(network.netmask(), Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(network.prefix_len(), 24);
    }

    // =========================================================================
    // WifiConfig
    // =========================================================================

    #[test]
    fn wifi_config_is_configured() {
        assert!(!WifiConfig::default().is_configured());
        assert!(WifiConfig::default().with_ssid("MyNetwork").is_configured());
        assert!(!WifiConfig::default().with_ssid("").is_configured());
    }

    #[test]
    fn wifi_config_builder() {
        let wifi = WifiConfig::default()
            .with_ssid("TestNetwork")
            .with_password("secret123")
            .with_connect_timeout_ms(15_000);

        assert_eq!(wifi.ssid.as_str(), "TestNetwork");
        assert_eq!(wifi.password.as_str(), "secret123");
        assert_eq!(wifi.connect_timeout_ms, 15_000);
    }

    // =========================================================================
    // Device-specific configs
    // =========================================================================

    #[test]
    fn servo_defaults_and_range() {
        let servo = ServoConfig::default();
        assert_eq!((servo.frequency_hz, servo.min_duty, servo.max_duty), (50, 1400, 7700));

        let swapped = ServoConfig::default().with_duty_range(8000, 1000);
        assert_eq!((swapped.min_duty, swapped.max_duty), (1000, 8000));
    }

    #[test]
    fn matrix_defaults() {
        let matrix = MatrixConfig::default();
        assert_eq!(matrix.led_count, 64);
        assert_eq!(
            matrix.initial_last_active,
            ColorSetting::new(Rgb::new(255, 0, 0), 10)
        );
    }

    #[test]
    fn buffer_and_interval_floors() {
        assert_eq!(ServerConfig::default().with_request_buffer(0).request_buffer, 1);
        assert_eq!(ServerConfig::default().with_backlog(0).backlog, 1);
        assert_eq!(ServerConfig::default().with_backlog(4).backlog, 4);
        assert_eq!(InputConfig::default().with_poll_interval_ms(0).poll_interval_ms, 1);
    }

    #[test]
    fn device_name_from_kind() {
        assert_eq!(
            DeviceConfig::for_kind(DeviceKind::Matrix).name.as_str(),
            "homenode-matrix"
        );
    }
}
