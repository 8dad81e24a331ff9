use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::risk::adapter::{RoundingPolicy, MAX_PROBABILITY_DECIMALS};

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

const DEFAULT_HEALTH_WEIGHTS: &str = "artifacts/health_weights.json";
const DEFAULT_CARDIOMETABOLIC_WEIGHTS: &str = "artifacts/cardiometabolic_weights.json";
const DEFAULT_MODEL: &str = "artifacts/model.json";
const DEFAULT_PREPROCESSOR: &str = "artifacts/preprocessor.json";
const DEFAULT_PROBABILITY_DECIMALS: u32 = 4;

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub pipeline: PipelineConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            pipeline: PipelineConfig::from_env()?,
        })
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
}

/// Locations of the fitted artifacts and the knobs applied to every prediction.
///
/// Artifacts are read once at startup; nothing here is re-read per request.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub health_weights_path: PathBuf,
    pub cardiometabolic_weights_path: PathBuf,
    pub model_path: PathBuf,
    /// `None` disables the normalization stage.
    pub preprocessor_path: Option<PathBuf>,
    pub strict_weights: bool,
    pub probability_decimals: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            health_weights_path: PathBuf::from(DEFAULT_HEALTH_WEIGHTS),
            cardiometabolic_weights_path: PathBuf::from(DEFAULT_CARDIOMETABOLIC_WEIGHTS),
            model_path: PathBuf::from(DEFAULT_MODEL),
            preprocessor_path: Some(PathBuf::from(DEFAULT_PREPROCESSOR)),
            strict_weights: false,
            probability_decimals: DEFAULT_PROBABILITY_DECIMALS,
        }
    }
}

impl PipelineConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let path_or = |key: &str, fallback: PathBuf| {
            env::var(key).map(PathBuf::from).unwrap_or(fallback)
        };

        let preprocessor_path = match env::var("APP_PREPROCESSOR_PATH") {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(PathBuf::from(value)),
            Err(_) => defaults.preprocessor_path.clone(),
        };

        let strict_weights = match env::var("APP_STRICT_WEIGHTS") {
            Ok(value) => parse_flag("APP_STRICT_WEIGHTS", &value)?,
            Err(_) => defaults.strict_weights,
        };

        let probability_decimals = match env::var("APP_PROBABILITY_DECIMALS") {
            Ok(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|decimals| RoundingPolicy::new(*decimals).is_ok())
                .ok_or(ConfigError::InvalidPrecision { value })?,
            Err(_) => defaults.probability_decimals,
        };

        Ok(Self {
            health_weights_path: path_or("APP_HEALTH_WEIGHTS_PATH", defaults.health_weights_path),
            cardiometabolic_weights_path: path_or(
                "APP_CARDIOMETABOLIC_WEIGHTS_PATH",
                defaults.cardiometabolic_weights_path,
            ),
            model_path: path_or("APP_MODEL_PATH", defaults.model_path),
            preprocessor_path,
            strict_weights,
            probability_decimals,
        })
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_string(),
        }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { name: &'static str, value: String },
    InvalidPrecision { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be a boolean flag, found '{value}'")
            }
            ConfigError::InvalidPrecision { value } => write!(
                f,
                "APP_PROBABILITY_DECIMALS must be an integer between 0 and {MAX_PROBABILITY_DECIMALS}, found '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidPrecision { .. } => None,
        }
    }
}
