//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use quill_infra::DatabaseConfig;

/// Where the acting principal of a mutating call comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// Trust the identifier sent in the request body.
    #[default]
    Client,
    /// Require a bearer session token; its subject replaces any body identifier.
    Session,
}

impl FromStr for AuthMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "session" => Ok(Self::Session),
            other => Err(ConfigError::Invalid {
                key: "AUTH_MODE",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub auth_mode: AuthMode,
    /// Browser origins allowed to call the API. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| DatabaseConfig {
                url,
                max_connections: parse_or("DB_MAX_CONNECTIONS", 20),
                min_connections: parse_or("DB_MIN_CONNECTIONS", 2),
                connect_timeout: Duration::from_secs(parse_or("DB_CONNECT_TIMEOUT_SECS", 10)),
            });

        let auth_mode = match env::var("AUTH_MODE") {
            Ok(value) => value.parse()?,
            Err(_) => AuthMode::default(),
        };

        let cors_origins = match env::var("CORS_ORIGIN") {
            Ok(value) => parse_cors_origins(&value)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 5000),
            database,
            auth_mode,
            cors_origins,
        })
    }
}

/// Comma-separated origins; `*` or blank means any origin.
fn parse_cors_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    if raw.trim() == "*" {
        return Ok(Vec::new());
    }

    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            let origin = origin.trim_end_matches('/');
            let host = origin
                .strip_prefix("http://")
                .or_else(|| origin.strip_prefix("https://"));
            match host {
                Some(host) if !host.is_empty() && !host.contains(['/', ' ', '*']) => {
                    Ok(origin.to_string())
                }
                _ => Err(ConfigError::Invalid {
                    key: "CORS_ORIGIN",
                    value: origin.to_string(),
                }),
            }
        })
        .collect()
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
