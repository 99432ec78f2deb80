use std::fmt;
use std::str::FromStr;

use axum::http::HeaderValue;

/// Longest accepted session lifetime: one year.
pub const MAX_SESSION_LIFETIME_HOURS: i64 = 24 * 365;

/// A required environment variable is missing or malformed.
///
/// Raised at startup only; a running server never re-reads its configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
///
/// Everything except `SECRET_KEY` and the database location has a default
/// suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub app_name: String,
    pub app_env: String,
    pub app_debug: bool,
    /// Minimum length of a new account password (default: `8`).
    pub min_password_length: usize,
    pub session: SessionConfig,
}

/// Session cookie and token settings.
#[derive(Clone)]
pub struct SessionConfig {
    /// Key for the HMAC applied to session tokens before they are stored.
    pub secret_key: String,
    /// Absolute session lifetime in hours (default: `24`).
    pub lifetime_hours: i64,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// How often expired sessions are deleted (default: `900`).
    pub sweep_interval_secs: u64,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret_key", &"<redacted>")
            .field("lifetime_hours", &self.lifetime_hours)
            .field("cookie_secure", &self.cookie_secure)
            .field("sweep_interval_secs", &self.sweep_interval_secs)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `HOST`                        | `0.0.0.0`               |
    /// | `PORT`                        | `3000`                  |
    /// | `CORS_ORIGINS`                | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                    |
    /// | `APP_NAME`                    | `AttendFT`              |
    /// | `APP_ENV`                     | `development`           |
    /// | `APP_DEBUG`                   | `false`                 |
    /// | `MIN_PASSWORD_LENGTH`         | `8`                     |
    /// | `SECRET_KEY`                  | required                |
    /// | `SESSION_LIFETIME_HOURS`      | `24` (at most 8760)     |
    /// | `SESSION_COOKIE_SECURE`       | `false`                 |
    /// | `SESSION_SWEEP_INTERVAL_SECS` | `900`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.string_or("HOST", "0.0.0.0");
        if host.parse::<std::net::IpAddr>().is_err() {
            return Err(ConfigError::Invalid {
                name: "HOST",
                value: host,
            });
        }

        let cors_origins: Vec<String> = env
            .string_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| o.parse::<HeaderValue>().is_err())
        {
            return Err(ConfigError::Invalid {
                name: "CORS_ORIGINS",
                value: bad.clone(),
            });
        }

        let secret_key = env
            .get("SECRET_KEY")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("SECRET_KEY"))?;

        let lifetime_hours: i64 = env.parse_or("SESSION_LIFETIME_HOURS", 24)?;
        if !(1..=MAX_SESSION_LIFETIME_HOURS).contains(&lifetime_hours) {
            return Err(ConfigError::Invalid {
                name: "SESSION_LIFETIME_HOURS",
                value: lifetime_hours.to_string(),
            });
        }

        Ok(Self {
            host,
            port: env.parse_or("PORT", 3000)?,
            cors_origins,
            request_timeout_secs: env.parse_or("REQUEST_TIMEOUT_SECS", 30)?,
            app_name: env.string_or("APP_NAME", "AttendFT"),
            app_env: env.string_or("APP_ENV", "development"),
            app_debug: env.flag_or("APP_DEBUG", false)?,
            min_password_length: env.parse_or("MIN_PASSWORD_LENGTH", 8)?,
            session: SessionConfig {
                secret_key,
                lifetime_hours,
                cookie_secure: env.flag_or("SESSION_COOKIE_SECURE", false)?,
                sweep_interval_secs: env.parse_or("SESSION_SWEEP_INTERVAL_SECS", 900)?,
            },
        })
    }
}

/// Resolve the database connection URL.
///
/// `DATABASE_URL` wins; otherwise the URL is assembled from `DB_HOST`,
/// `DB_PORT`, `DB_USER`, `DB_PASS` and `DB_NAME`, of which user and name are
/// required.
pub fn database_url_from_env() -> Result<String, ConfigError> {
    database_url_from_lookup(|name| std::env::var(name).ok())
}

pub fn database_url_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let env = Env(&lookup);
    if let Some(url) = env.get("DATABASE_URL").filter(|s| !s.is_empty()) {
        return Ok(url);
    }

    let host = env.string_or("DB_HOST", "localhost");
    let port: u16 = env.parse_or("DB_PORT", 5432)?;
    let user = env.get("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
    let name = env.get("DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?;
    let credentials = match env.get("DB_PASS").filter(|p| !p.is_empty()) {
        Some(pass) => format!("{user}:{pass}"),
        None => user,
    };
    Ok(format!("postgres://{credentials}@{host}:{port}/{name}"))
}

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
    }

    fn string_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        let Some(value) = self.get(name) else {
            return Ok(default);
        };
        let parsed = value.trim().parse::<T>();
        parsed.map_err(|_| ConfigError::Invalid { name, value })
    }

    fn flag_or(&self, name: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = self.get(name) else {
            return Ok(default);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigError::Invalid { name, value }),
        }
    }
}
