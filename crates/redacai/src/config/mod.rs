use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::path::PathBuf;

use reqwest::Url;

/// Key of the durable slot holding today's usage record.
pub const USAGE_STORAGE_KEY: &str = "redacai-usage";

const DEFAULT_DAILY_LIMIT: u32 = 2;
const DEFAULT_DATA_DIR: &str = ".redacai";
const DEFAULT_EVALUATION_URL: &str = "http://127.0.0.1:5678/webhook/redacao";

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
    pub quota: QuotaConfig,
    pub evaluation: EvaluationServiceConfig,
    pub session: SessionConfig,
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

        let daily_limit = match env::var("APP_DAILY_LIMIT") {
            Ok(raw) => parse_daily_limit(&raw)?,
            Err(_) => QuotaConfig::default().daily_limit,
        };
        let storage_dir = env::var("APP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

        let endpoint_raw =
            env::var("APP_EVALUATION_URL").unwrap_or_else(|_| DEFAULT_EVALUATION_URL.to_string());
        let endpoint = parse_endpoint(&endpoint_raw)?;

        let user = env::var("APP_SESSION_USER")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            quota: QuotaConfig {
                daily_limit,
                storage_dir,
            },
            evaluation: EvaluationServiceConfig { endpoint },
            session: SessionConfig { user },
        })
    }
}

fn parse_daily_limit(raw: &str) -> Result<NonZeroU32, ConfigError> {
    raw.trim()
        .parse::<NonZeroU32>()
        .map_err(|_| ConfigError::InvalidDailyLimit {
            value: raw.to_string(),
        })
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidEvaluationUrl {
        value: raw.to_string(),
        reason: err.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEvaluationUrl {
            value: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Free-tier metering settings. The limit is fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaConfig {
    pub daily_limit: NonZeroU32,
    pub storage_dir: PathBuf,
}

impl QuotaConfig {
    pub fn with_daily_limit(daily_limit: NonZeroU32) -> Self {
        Self {
            daily_limit,
            ..Self::default()
        }
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: NonZeroU32::new(DEFAULT_DAILY_LIMIT).unwrap_or(NonZeroU32::MIN),
            storage_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

/// Location of the remote scoring boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationServiceConfig {
    pub endpoint: Url,
}

/// Identity supplied by the surrounding sign-in flow, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub user: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDailyLimit { value: String },
    InvalidEvaluationUrl { value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDailyLimit { value } => write!(
                f,
                "APP_DAILY_LIMIT must be a positive integer (got '{}')",
                value
            ),
            ConfigError::InvalidEvaluationUrl { value, reason } => write!(
                f,
                "APP_EVALUATION_URL '{}' is not a usable http(s) URL: {}",
                value, reason
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidDailyLimit { .. }
            | ConfigError::InvalidEvaluationUrl { .. } => None,
        }
    }
}
