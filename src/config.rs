/*
 * Responsibility
 * - Load settings from the environment (.env supported)
 * - Validate them up front: a bad strategy name or flag fails startup
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::services::oauth::{LocatorError, Strategy};

const DEFAULT_STRATEGIES: &str = "bearer_authorization,access_token_param,bearer_param";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    Strategy(LocatorError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::Strategy(e) => write!(f, "invalid TOKEN_LOOKUP_STRATEGIES: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<LocatorError> for ConfigError {
    fn from(e: LocatorError) -> Self {
        ConfigError::Strategy(e)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub database_max_connections: u32,

    // Revoke the superseded refresh token whenever an access token is used.
    pub refresh_token_rotation: bool,
    // Tokens are stored as hex(sha256) and looked up the same way.
    pub hash_token_secrets: bool,
    // Order in which credential strategies are tried.
    pub token_lookup_strategies: Vec<Strategy>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let refresh_token_rotation = env_flag("REFRESH_TOKEN_ROTATION")?;
        let hash_token_secrets = env_flag("HASH_TOKEN_SECRETS")?;

        let token_lookup_strategies = parse_strategies(
            &std::env::var("TOKEN_LOOKUP_STRATEGIES")
                .unwrap_or_else(|_| DEFAULT_STRATEGIES.to_string()),
        )?;

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            refresh_token_rotation,
            hash_token_secrets,
            token_lookup_strategies,
        })
    }
}

// Unset means false; anything unrecognised is rejected rather than guessed.
fn env_flag(key: &'static str) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Ok(v) => parse_flag(&v).ok_or(ConfigError::Invalid(key)),
        Err(_) => Ok(false),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_strategies(raw: &str) -> Result<Vec<Strategy>, ConfigError> {
    let names = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    if names.is_empty() {
        return Err(ConfigError::Invalid("TOKEN_LOOKUP_STRATEGIES"));
    }

    Ok(Strategy::resolve_all(names)?)
}
