use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

const RDS_PORT: u16 = 5432;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub port: u16,
    pub max_connections: u32,
    /// Deadline given to every listing operation.
    pub request_timeout: Duration,
    pub run_migrations: bool,
}

/// Where the database lives. Either a plain URL (local development, tests)
/// or the deployed layout: a JSON credentials secret plus endpoint and name.
#[derive(Clone)]
pub enum DatabaseConfig {
    Url(String),
    Rds {
        host: String,
        database: String,
        username: String,
        password: String,
    },
}

#[derive(Deserialize)]
struct DbSecret {
    username: String,
    password: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            database: DatabaseConfig::from_lookup(&lookup)?,
            port: parse_or(&lookup, "PORT", 8080).context("PORT must be a valid number")?,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)
                .context("DB_MAX_CONNECTIONS must be a valid number")?,
            request_timeout: Duration::from_millis(
                parse_or(&lookup, "REQUEST_TIMEOUT_MS", 1000)
                    .context("REQUEST_TIMEOUT_MS must be a valid number")?,
            ),
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", false)
                .context("RUN_MIGRATIONS must be true or false")?,
        })
    }

    pub async fn connect_pool(&self) -> Result<PgPool> {
        let options = self.database.connect_options()?;
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to database")
    }
}

impl DatabaseConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            return Ok(DatabaseConfig::Url(url));
        }

        let secret = lookup("DB_SECRET").context("DATABASE_URL or DB_SECRET must be set")?;
        let secret: DbSecret =
            serde_json::from_str(&secret).context("DB_SECRET must be JSON with username and password")?;
        let endpoint = lookup("RDS_ENDPOINT").context("RDS_ENDPOINT must be set")?;
        let database = lookup("DB_NAME").context("DB_NAME must be set")?;

        Ok(DatabaseConfig::Rds {
            host: endpoint_host(&endpoint).to_string(),
            database,
            username: secret.username,
            password: secret.password,
        })
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        match self {
            DatabaseConfig::Url(url) => {
                PgConnectOptions::from_str(url).context("DATABASE_URL is not a valid Postgres URL")
            }
            DatabaseConfig::Rds {
                host,
                database,
                username,
                password,
            } => Ok(PgConnectOptions::new()
                .host(host)
                .port(RDS_PORT)
                .username(username)
                .password(password)
                .database(database)
                .ssl_mode(PgSslMode::Require)),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseConfig::Url(_) => f.write_str("Url(<redacted>)"),
            DatabaseConfig::Rds {
                host,
                database,
                username,
                ..
            } => f
                .debug_struct("Rds")
                .field("host", host)
                .field("database", database)
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// `host:port` endpoints carry their own port; only the host is kept.
fn endpoint_host(endpoint: &str) -> &str {
    endpoint.split(':').next().unwrap_or(endpoint)
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
