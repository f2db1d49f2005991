use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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

/// Top-level configuration for the matching service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub recommendations: RecommendationSettings,
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
            recommendations: RecommendationSettings::from_env()?,
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

/// Optional overrides for scoring tables, composer economics, and seed data files.
///
/// Unset values keep the library defaults; paths are resolved by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationSettings {
    pub scoring_config: Option<PathBuf>,
    pub composer_config: Option<PathBuf>,
    pub cost_ceiling: Option<f32>,
    pub target_weight_grams: Option<f32>,
    pub selling_price: Option<f32>,
    pub catalog_path: Option<PathBuf>,
    pub inventory_path: Option<PathBuf>,
}

impl RecommendationSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            scoring_config: path_var("APP_SCORING_CONFIG"),
            composer_config: path_var("APP_COMPOSER_CONFIG"),
            cost_ceiling: amount_var("APP_COST_CEILING")?,
            target_weight_grams: amount_var("APP_TARGET_WEIGHT_GRAMS")?,
            selling_price: amount_var("APP_SELLING_PRICE")?,
            catalog_path: path_var("APP_CATALOG_PATH"),
            inventory_path: path_var("APP_INVENTORY_PATH"),
        })
    }
}

fn path_var(name: &str) -> Option<PathBuf> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn amount_var(name: &'static str) -> Result<Option<f32>, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match raw.parse::<f32>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(ConfigError::InvalidAmount {
            variable: name,
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidAmount { variable: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidAmount { variable, value } => {
                write!(f, "{variable} must be a non-negative number, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidAmount { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_SCORING_CONFIG",
            "APP_COMPOSER_CONFIG",
            "APP_COST_CEILING",
            "APP_TARGET_WEIGHT_GRAMS",
            "APP_SELLING_PRICE",
            "APP_CATALOG_PATH",
            "APP_INVENTORY_PATH",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.recommendations, RecommendationSettings::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_recommendation_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_COST_CEILING", "4.5");
        env::set_var("APP_TARGET_WEIGHT_GRAMS", " 400 ");
        env::set_var("APP_INVENTORY_PATH", "data/inventory.csv");
        env::set_var("APP_CATALOG_PATH", "  ");

        let settings = RecommendationSettings::from_env().expect("settings load");

        assert_eq!(settings.cost_ceiling, Some(4.5));
        assert_eq!(settings.target_weight_grams, Some(400.0));
        assert_eq!(settings.selling_price, None);
        assert_eq!(
            settings.inventory_path,
            Some(PathBuf::from("data/inventory.csv"))
        );
        assert_eq!(settings.catalog_path, None);
        reset_env();
    }

    #[test]
    fn rejects_invalid_amounts() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SELLING_PRICE", "twelve");

        let error = AppConfig::load().expect_err("invalid price rejected");

        assert!(matches!(
            error,
            ConfigError::InvalidAmount {
                variable: "APP_SELLING_PRICE",
                ..
            }
        ));
        env::set_var("APP_SELLING_PRICE", "-1");
        assert!(RecommendationSettings::from_env().is_err());
        reset_env();
    }
}
