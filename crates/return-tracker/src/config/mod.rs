use crate::queue::{ProjectionSettings, WorkingWeekdays};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::time::Duration;

const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:8888/.netlify/functions/get-tax-data";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the tracker service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub relay: RelayConfig,
    pub projection: ProjectionSettings,
    pub refresh: RefreshConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let relay_url =
            env::var("TRACKER_RELAY_URL").unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string());
        let relay_timeout = env::var("TRACKER_RELAY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidRelayTimeout)?;

        let daily_throughput = env::var("TRACKER_DAILY_THROUGHPUT")
            .unwrap_or_else(|_| "5".to_string())
            .trim()
            .parse::<NonZeroU32>()
            .map_err(|_| ConfigError::InvalidThroughput)?;

        let working_weekdays = match env::var("TRACKER_WORKING_DAYS") {
            Ok(raw) => parse_working_days(&raw)?,
            Err(_) => WorkingWeekdays::default(),
        };

        let refresh_secs = env::var("TRACKER_REFRESH_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidRefreshInterval)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            relay: RelayConfig {
                url: relay_url,
                timeout: Duration::from_secs(relay_timeout),
            },
            projection: ProjectionSettings {
                daily_throughput,
                working_weekdays,
            },
            refresh: RefreshConfig {
                interval: (refresh_secs > 0).then(|| Duration::from_secs(refresh_secs)),
            },
        })
    }
}

/// Parses a comma-separated list of ISO weekday numbers (Monday=1 ... Sunday=7).
fn parse_working_days(raw: &str) -> Result<WorkingWeekdays, ConfigError> {
    let mut days = WorkingWeekdays::none();
    for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        let number = part
            .parse::<u8>()
            .map_err(|_| ConfigError::InvalidWorkingDays(raw.to_string()))?;
        days = days
            .with_iso_number(number)
            .ok_or_else(|| ConfigError::InvalidWorkingDays(raw.to_string()))?;
    }

    if days.is_empty() {
        return Err(ConfigError::InvalidWorkingDays(raw.to_string()));
    }
    Ok(days)
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the spreadsheet relay lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub url: String,
    pub timeout: Duration,
}

/// Background snapshot refresh; `None` disables it.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub interval: Option<Duration>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidRelayTimeout,
    InvalidThroughput,
    InvalidWorkingDays(String),
    InvalidRefreshInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidRelayTimeout => {
                write!(f, "TRACKER_RELAY_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidThroughput => {
                write!(f, "TRACKER_DAILY_THROUGHPUT must be a positive integer")
            }
            ConfigError::InvalidWorkingDays(raw) => write!(
                f,
                "TRACKER_WORKING_DAYS '{raw}' must list weekday numbers 1-7 (Monday=1)"
            ),
            ConfigError::InvalidRefreshInterval => {
                write!(f, "TRACKER_REFRESH_SECS must be a non-negative number of seconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
