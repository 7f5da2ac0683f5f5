use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_PLACES_ENDPOINT: &str =
    "https://maps.googleapis.com/maps/api/place/autocomplete/json";

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub providers: ProviderConfig,
    pub query: QueryConfig,
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

        let providers = ProviderConfig {
            places_api_key: non_empty_var("GOOGLE_API_KEY"),
            places_endpoint: non_empty_var("GOOGLE_PLACES_URL")
                .unwrap_or_else(|| DEFAULT_PLACES_ENDPOINT.to_string()),
            property_base_url: non_empty_var("RAPID_API_URL"),
            property_api_key: non_empty_var("RAPID_API_KEY"),
            request_timeout: Duration::from_secs(numeric_var("APP_UPSTREAM_TIMEOUT_SECS", 10)?),
        };

        let query = QueryConfig {
            debounce: Duration::from_millis(numeric_var("APP_DEBOUNCE_MS", 300)?),
            min_suggestion_chars: numeric_var("APP_MIN_SUGGESTION_CHARS", 3)? as usize,
            suggestion_stale_time: Duration::from_secs(numeric_var(
                "APP_SUGGESTION_STALE_SECS",
                120,
            )?),
            insights_stale_time: Duration::from_secs(numeric_var("APP_INSIGHTS_STALE_SECS", 300)?),
            cache_gc_time: Duration::from_secs(numeric_var("APP_CACHE_GC_SECS", 300)?),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            providers,
            query,
        })
    }
}

fn non_empty_var(name: &'static str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn numeric_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match non_empty_var(name) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { name }),
        None => Ok(default),
    }
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Upstream credentials and endpoints. Absent credentials are reported per
/// request rather than at startup.
#[derive(Clone)]
pub struct ProviderConfig {
    pub places_api_key: Option<String>,
    pub places_endpoint: String,
    pub property_base_url: Option<String>,
    pub property_api_key: Option<String>,
    pub request_timeout: Duration,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("places_api_key", &self.places_api_key.as_ref().map(|_| "***"))
            .field("places_endpoint", &self.places_endpoint)
            .field("property_base_url", &self.property_base_url)
            .field(
                "property_api_key",
                &self.property_api_key.as_ref().map(|_| "***"),
            )
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Debounce and request-cache tuning shared by the controller and the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub debounce: Duration,
    pub min_suggestion_chars: usize,
    pub suggestion_stale_time: Duration,
    pub insights_stale_time: Duration,
    pub cache_gc_time: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_suggestion_chars: 3,
            suggestion_stale_time: Duration::from_secs(120),
            insights_stale_time: Duration::from_secs(300),
            cache_gc_time: Duration::from_secs(300),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name } => {
                write!(f, "{name} must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
