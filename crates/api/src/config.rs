use std::path::PathBuf;
use std::time::Duration;

use axum::http::HeaderValue;
use talent_integration::catalog::DEFAULT_CONNECTION_KEY;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
#[error("{var} must be {expected}, got '{value}'")]
pub struct ConfigError {
    pub var: &'static str,
    pub expected: &'static str,
    pub value: String,
}

/// Integration platform connection settings.
#[derive(Debug, Clone)]
pub struct IntegrationConfig {
    /// Base URL of the integration platform REST API.
    pub api_url: String,
    /// Bearer token; empty means unauthenticated.
    pub token: String,
    /// Connection key of the HR connector.
    pub connection_key: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for open sessions to wind down after the listener stops.
    pub shutdown_timeout_secs: u64,
    /// JSON file with the candidate list; the bundled list when unset.
    pub candidates_file: Option<PathBuf>,
    /// Debounce applied to onboarding form edits.
    pub form_debounce: Duration,
    /// Sessions untouched for this long are closed by the sweeper.
    pub session_idle_timeout: Duration,
    /// How often the sweeper looks for idle sessions.
    pub session_sweep_interval: Duration,
    pub integration: IntegrationConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                       |
    /// |------------------------------|-------------------------------|
    /// | `HOST`                       | `0.0.0.0`                     |
    /// | `PORT`                       | `3000`                        |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`       |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                          |
    /// | `SHUTDOWN_TIMEOUT_SECS`      | `30`                          |
    /// | `CANDIDATES_FILE`            | bundled list                  |
    /// | `FORM_DEBOUNCE_MS`           | `300`                         |
    /// | `SESSION_IDLE_TIMEOUT_SECS`  | `1800`                        |
    /// | `SESSION_SWEEP_INTERVAL_SECS`| `60`                          |
    /// | `INTEGRATION_API_URL`        | `https://api.integration.app` |
    /// | `INTEGRATION_TOKEN`          | empty                         |
    /// | `INTEGRATION_CONNECTION_KEY` | `adp-workforce`               |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("HOST", "0.0.0.0");
        let port: u16 = parse_env("PORT", "3000", "a valid u16")?;

        let cors_origins = parse_origins(&env_or("CORS_ORIGINS", "http://localhost:5173"))?;

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", "30", "a valid u64")?;
        let shutdown_timeout_secs: u64 =
            parse_env("SHUTDOWN_TIMEOUT_SECS", "30", "a valid u64")?;
        let form_debounce_ms: u64 = parse_env("FORM_DEBOUNCE_MS", "300", "a valid u64")?;
        let session_idle_timeout_secs: u64 =
            parse_env("SESSION_IDLE_TIMEOUT_SECS", "1800", "a valid u64")?;
        let session_sweep_interval_secs: u64 =
            parse_env("SESSION_SWEEP_INTERVAL_SECS", "60", "a valid u64")?;
        if session_sweep_interval_secs == 0 {
            return Err(ConfigError {
                var: "SESSION_SWEEP_INTERVAL_SECS",
                expected: "greater than zero",
                value: session_sweep_interval_secs.to_string(),
            });
        }

        let candidates_file = std::env::var("CANDIDATES_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let integration = IntegrationConfig {
            api_url: env_or("INTEGRATION_API_URL", "https://api.integration.app"),
            token: env_or("INTEGRATION_TOKEN", ""),
            connection_key: env_or("INTEGRATION_CONNECTION_KEY", DEFAULT_CONNECTION_KEY),
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            candidates_file,
            form_debounce: Duration::from_millis(form_debounce_ms),
            session_idle_timeout: Duration::from_secs(session_idle_timeout_secs),
            session_sweep_interval: Duration::from_secs(session_sweep_interval_secs),
            integration,
        })
    }
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            let invalid = || ConfigError {
                var: "CORS_ORIGINS",
                expected: "a comma-separated list of explicit origins",
                value: origin.to_string(),
            };
            // Credentialed CORS cannot use the wildcard.
            if origin == "*" {
                return Err(invalid());
            }
            HeaderValue::from_str(origin).map_err(|_| invalid())
        })
        .collect()
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.into())
}

fn parse_env<T: std::str::FromStr>(
    var: &'static str,
    default: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let value = env_or(var, default);
    value.trim().parse().map_err(|_| ConfigError {
        var,
        expected,
        value,
    })
}
