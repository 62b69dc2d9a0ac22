use super::error::{ApiError, Result};
use serde::Deserialize;
use std::{env, time::Duration};

/// Origins that are always accepted alongside `FRONTEND_URL`.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
];

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    pub api_port: u16,
    pub database_url: Option<String>,
    pub db_host: String,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub db_port: u16,
    pub db_ssl: bool,
    pub db_ssl_root_cert: Option<String>,
    pub max_db_connections: u32,
    pub connect_attempts: u32,
    pub connect_retry_delay_ms: u64,
    pub frontend_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_port: Self::parse_var(&lookup, "PORT", "3405")?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            db_host: lookup("DB_HOST").unwrap_or_else(|| "postgres".to_owned()),
            db_user: lookup("DB_USER").unwrap_or_else(|| "postgres".to_owned()),
            db_password: lookup("DB_PASSWORD").unwrap_or_else(|| "admin123".to_owned()),
            db_name: lookup("DB_NAME").unwrap_or_else(|| "new_employee_db".to_owned()),
            db_port: Self::parse_var(&lookup, "DB_PORT", "5432")?,
            db_ssl: Self::parse_var(&lookup, "DB_SSL", "false")?,
            db_ssl_root_cert: lookup("DB_SSL_ROOT_CERT"),
            max_db_connections: Self::parse_var(&lookup, "DB_MAX_CONNECTIONS", "10")?,
            connect_attempts: Self::parse_var(&lookup, "DB_CONNECT_ATTEMPTS", "5")?,
            connect_retry_delay_ms: Self::parse_var(&lookup, "DB_CONNECT_RETRY_DELAY_MS", "5000")?,
            frontend_url: lookup("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_owned()),
        })
    }

    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_millis(self.connect_retry_delay_ms)
    }

    /// `FRONTEND_URL` first, then the fixed development hosts, without duplicates.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = vec![self.frontend_url.trim_end_matches('/').to_owned()];
        for origin in DEFAULT_ALLOWED_ORIGINS {
            if !origins.iter().any(|o| o == origin) {
                origins.push(origin.to_owned());
            }
        }
        origins
    }

    fn parse_var<F, T>(lookup: &F, key: &str, default: &str) -> Result<T>
    where
        F: Fn(&str) -> Option<String>,
        T: std::str::FromStr,
        T::Err: std::fmt::Debug,
    {
        lookup(key)
            .as_deref()
            .unwrap_or(default)
            .parse()
            .map_err(|_| ApiError::Config(format!("Invalid {}", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_with(&[]).unwrap();

        assert_eq!(config.api_port, 3405);
        assert_eq!(config.db_host, "postgres");
        assert_eq!(config.db_user, "postgres");
        assert_eq!(config.db_password, "admin123");
        assert_eq!(config.db_name, "new_employee_db");
        assert_eq!(config.db_port, 5432);
        assert!(!config.db_ssl);
        assert!(config.database_url.is_none());
        assert_eq!(config.connect_attempts, 5);
        assert_eq!(config.connect_retry_delay(), Duration::from_secs(5));
        assert_eq!(config.frontend_url, "http://localhost:3000");
    }

    #[test]
    fn overrides_are_read() {
        let config = config_with(&[
            ("PORT", "8080"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_SSL", "true"),
            ("FRONTEND_URL", "https://appraisals.example.com/"),
        ])
        .unwrap();

        assert_eq!(config.api_port, 8080);
        assert_eq!(config.db_host, "db.internal");
        assert_eq!(config.db_port, 6543);
        assert!(config.db_ssl);
        assert_eq!(
            config.allowed_origins().first().map(String::as_str),
            Some("https://appraisals.example.com")
        );
    }

    #[test]
    fn malformed_number_is_a_config_error() {
        let err = config_with(&[("PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ApiError::Config(ref msg) if msg == "Invalid PORT"));
    }

    #[test]
    fn allowed_origins_do_not_repeat_frontend_url() {
        let config = config_with(&[("FRONTEND_URL", "http://localhost:5173")]).unwrap();
        let origins = config.allowed_origins();

        assert_eq!(origins.len(), DEFAULT_ALLOWED_ORIGINS.len());
        assert_eq!(origins[0], "http://localhost:5173");
    }
}
