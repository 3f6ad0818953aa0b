//! Server configuration

use std::time::Duration;

/// Runtime configuration, loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Redis URL for the session/code cache; absent means in-process fallback
    pub redis_url: Option<String>,

    /// Shared secret for signing access tokens
    pub token_secret: String,

    /// How long a session (and its token) stays valid
    pub session_ttl: Duration,

    /// How long a one-time login code stays valid
    pub code_ttl: Duration,

    /// Length of the one-time login code
    pub code_length: usize,

    /// Seed admin account, created on first start
    pub default_admin_email: String,
    pub default_admin_password: String,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Recognized variables: PORT, DATABASE_PATH, REDIS_URL, TOKEN_SECRET,
    /// SESSION_TTL_SECS, CODE_TTL_SECS, CODE_LENGTH, DEFAULT_ADMIN_EMAIL,
    /// DEFAULT_ADMIN_PASSWORD.
    pub fn from_env() -> Self {
        fn get_env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|s| !s.is_empty())
        }

        fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
            get_env(key).and_then(|s| s.parse().ok()).unwrap_or(default)
        }

        Self {
            port: parse_env("PORT", 3000),
            database_path: get_env("DATABASE_PATH").unwrap_or_else(|| "stockade.db".to_string()),
            redis_url: get_env("REDIS_URL"),
            token_secret: get_env("TOKEN_SECRET")
                .unwrap_or_else(|| "insecure-dev-secret".to_string()),
            session_ttl: Duration::from_secs(parse_env("SESSION_TTL_SECS", 3600)),
            code_ttl: Duration::from_secs(parse_env("CODE_TTL_SECS", 300)),
            code_length: parse_env("CODE_LENGTH", 6),
            default_admin_email: get_env("DEFAULT_ADMIN_EMAIL")
                .unwrap_or_else(|| "admin@example.com".to_string()),
            default_admin_password: get_env("DEFAULT_ADMIN_PASSWORD")
                .unwrap_or_else(|| "Admin@1234xyz".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            database_path: "stockade.db".to_string(),
            redis_url: None,
            token_secret: "insecure-dev-secret".to_string(),
            session_ttl: Duration::from_secs(3600),
            code_ttl: Duration::from_secs(300),
            code_length: 6,
            default_admin_email: "admin@example.com".to_string(),
            default_admin_password: "Admin@1234xyz".to_string(),
        }
    }
}
