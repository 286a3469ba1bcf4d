use std::{fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// Hosted identity provider reached with an API key.
    Identity { api_key: String, base_url: String },
    /// Single admin account held in configuration.
    Static { email: String, password: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    pub storage_dir: PathBuf,
    pub session_minutes: i64,
    pub secure_cookies: bool,
    pub auth: AuthConfig,
}

pub const IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

impl Config {
    /// Reads the environment, after merging in `.env` if there is one.
    pub fn load() -> anyhow::Result<Self> {
        let _ = dotenv::dotenv();

        Ok(Self {
            bind_addr: try_load("BIND_ADDR", "0.0.0.0:8080".to_owned()),
            database_url: try_load("DATABASE_URL", "sqlite://portfolio.db?mode=rwc".to_owned()),
            storage_dir: PathBuf::from(try_load("STORAGE_DIR", "storage".to_owned())),
            session_minutes: try_load("SESSION_MINUTES", 60),
            secure_cookies: try_load("SECURE_COOKIES", false),
            auth: load_auth()?,
        })
    }
}

fn load_auth() -> anyhow::Result<AuthConfig> {
    if let Ok(api_key) = dotenv::var("IDENTITY_API_KEY") {
        info!("using hosted identity provider");
        return Ok(AuthConfig::Identity {
            api_key,
            base_url: try_load("IDENTITY_BASE_URL", IDENTITY_BASE_URL.to_owned()),
        });
    }

    match (dotenv::var("ADMIN_EMAIL"), dotenv::var("ADMIN_PASSWORD")) {
        (Ok(email), Ok(password)) if !password.is_empty() => {
            info!("using static admin account {email}");
            Ok(AuthConfig::Static { email, password })
        }
        _ => anyhow::bail!("set IDENTITY_API_KEY, or ADMIN_EMAIL and ADMIN_PASSWORD"),
    }
}

fn try_load<T: FromStr + Display>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match dotenv::var(key) {
        Ok(value) => value.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {value:?}: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
