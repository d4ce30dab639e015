use std::{str::FromStr, time::Duration};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub query_timeout_secs: u64,
}

impl DbConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

/// Argon2id work factor used for every stored credential.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub version: String,
    pub max_body_bytes: usize,
    pub db: DbConfig,
    pub password: PasswordConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let defaults = PasswordConfig::default();
        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 4000),
            environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            version: env!("CARGO_PKG_VERSION").into(),
            max_body_bytes: env_or("MAX_BODY_BYTES", 1_048_576),
            db: DbConfig {
                url: database_url,
                max_connections: env_or("DB_MAX_CONNECTIONS", 10),
                query_timeout_secs: env_or("DB_QUERY_TIMEOUT_SECS", 3),
            },
            password: PasswordConfig {
                memory_kib: env_or("PASSWORD_MEMORY_KIB", defaults.memory_kib),
                iterations: env_or("PASSWORD_ITERATIONS", defaults.iterations),
                parallelism: env_or("PASSWORD_PARALLELISM", defaults.parallelism),
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
