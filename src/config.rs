//! Runtime settings read from the environment (optionally seeded from a `.env` file).

use std::path::Path;
use std::time::Duration;

use crate::error::EtlError;

pub const API_KEY_VAR: &str = "FRED_API_KEY";
pub const DB_URL_VAR: &str = "DB_URL";
pub const BASE_URL_VAR: &str = "FRED_BASE_URL";
pub const TIMEOUT_VAR: &str = "FRED_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Env file tried first when none is given explicitly; `.env` is the fallback.
const DEFAULT_ENV_FILE: &str = "FRED.env";

#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    pub database_url: String,
    pub fred_base_url: String,
    pub http_timeout: Duration,
}

impl Settings {
    /// Load the env file (if any) and read settings from the process environment.
    pub fn from_env(env_file: Option<&Path>) -> Result<Self, EtlError> {
        load_env_file(env_file)?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EtlError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get(API_KEY_VAR);
        let database_url = get(DB_URL_VAR);

        let missing: Vec<&str> = [(API_KEY_VAR, &api_key), (DB_URL_VAR, &database_url)]
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| key)
            .collect();
        let (Some(api_key), Some(database_url)) = (api_key, database_url) else {
            return Err(EtlError::Configuration(format!(
                "Missing {} in environment (.env).",
                missing.join(" and ")
            )));
        };

        let http_timeout = match get(TIMEOUT_VAR) {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    EtlError::Configuration(format!("{TIMEOUT_VAR} must be a whole number of seconds (got '{raw}')."))
                })?;
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_key,
            database_url,
            fred_base_url: get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            http_timeout,
        })
    }
}

// Credentials stay out of logs and panic messages.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("database_url", &"<redacted>")
            .field("fred_base_url", &self.fred_base_url)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

fn load_env_file(env_file: Option<&Path>) -> Result<(), EtlError> {
    match env_file {
        Some(path) => {
            dotenvy::from_path(path).map_err(|e| {
                EtlError::Configuration(format!("Failed to load env file '{}': {e}", path.display()))
            })?;
        }
        None => {
            if dotenvy::from_filename(DEFAULT_ENV_FILE).is_err() {
                dotenvy::dotenv().ok();
            }
        }
    }
    Ok(())
}
