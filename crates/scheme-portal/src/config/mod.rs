use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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

/// Admin credential used outside production when `APP_ADMIN_TOKEN` is unset.
pub const DEVELOPMENT_ADMIN_TOKEN: &str = "dev-admin-token";

const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 30;

/// Longest citizen token lifetime accepted from `APP_TOKEN_TTL_HOURS` (one year).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
    pub catalog: CatalogConfig,
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

        let admin_token = match env::var("APP_ADMIN_TOKEN") {
            Ok(token) if !token.trim().is_empty() => token.trim().to_string(),
            _ if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingAdminToken)
            }
            _ => DEVELOPMENT_ADMIN_TOKEN.to_string(),
        };

        let token_ttl_hours = match env::var("APP_TOKEN_TTL_HOURS") {
            Ok(raw) => match raw.trim().parse::<i64>() {
                Ok(hours) if (1..=MAX_TOKEN_TTL_HOURS).contains(&hours) => hours,
                _ => return Err(ConfigError::InvalidTokenTtl { value: raw }),
            },
            Err(_) => DEFAULT_TOKEN_TTL_HOURS,
        };

        let seed_catalog = match env::var("APP_SEED_CATALOG") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "APP_SEED_CATALOG",
                value: raw,
            })?,
            Err(_) => true,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            auth: AuthConfig {
                admin_token,
                token_ttl_hours,
            },
            catalog: CatalogConfig { seed_catalog },
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
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

/// Credentials handed to the identity provider at startup.
#[derive(Clone)]
pub struct AuthConfig {
    pub admin_token: String,
    pub token_ttl_hours: i64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_token", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

/// Scheme catalog bootstrap behavior.
#[derive(Debug, Clone, Copy)]
pub struct CatalogConfig {
    pub seed_catalog: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingAdminToken,
    InvalidTokenTtl { value: String },
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingAdminToken => {
                write!(f, "APP_ADMIN_TOKEN must be set in production")
            }
            ConfigError::InvalidTokenTtl { value } => write!(
                f,
                "APP_TOKEN_TTL_HOURS must be an integer between 1 and {} (got '{}')",
                MAX_TOKEN_TTL_HOURS, value
            ),
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{} must be true or false (got '{}')", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::MissingAdminToken
            | ConfigError::InvalidTokenTtl { .. }
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}
