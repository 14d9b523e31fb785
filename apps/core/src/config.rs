//! Environment-driven configuration.
//!
//! All settings come from the process environment (optionally seeded from a
//! `.env` file by `main`). A missing provider key is a valid configuration:
//! the orchestrator then degrades to the local responder instead of failing.

use crate::error::AppError;
use std::env;
use std::time::Duration;
use url::Url;

const DEFAULT_PROVIDER_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

fn env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Connection settings for the model provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    /// Base URL of an OpenAI-compatible chat-completions API.
    pub base_url: String,
    pub model: String,
    /// Hard deadline for one completion call.
    pub timeout: Duration,
}

impl ProviderSettings {
    /// Reads provider settings from the environment. Returns `Ok(None)` when
    /// no API key is set: the system runs, it just never dispatches.
    pub fn from_env() -> Result<Option<Self>, AppError> {
        let api_key = match env::var("GUESTWISE_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => return Ok(None),
        };

        let base_url = env_var_or("GUESTWISE_PROVIDER_URL", DEFAULT_PROVIDER_URL);
        Url::parse(&base_url)
            .map_err(|e| AppError::Config(format!("Invalid GUESTWISE_PROVIDER_URL: {}", e)))?;

        let timeout_secs = env_var_or(
            "GUESTWISE_PROVIDER_TIMEOUT_SECS",
            &DEFAULT_PROVIDER_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            AppError::Config(format!("Invalid GUESTWISE_PROVIDER_TIMEOUT_SECS: {}", e))
        })?;

        Ok(Some(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: env_var_or("GUESTWISE_MODEL", DEFAULT_MODEL),
            timeout: Duration::from_secs(timeout_secs),
        }))
    }
}

/// Top-level application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: String,
    pub provider: Option<ProviderSettings>,
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            db_path: env_var_or("GUESTWISE_DB_PATH", crate::database::DEFAULT_DB_PATH),
            provider: ProviderSettings::from_env()?,
        })
    }
}
