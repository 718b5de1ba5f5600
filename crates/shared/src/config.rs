use anyhow::Result;
use std::env;
use thiserror::Error;

pub const WEBHOOK_ENV: &str = "DISCORD_WEBHOOK_URL";

/// Environment variables checked for a YouTube Data API key, highest precedence first
pub const API_KEY_ENVS: &[&str] = &["YOUTUBE_API_KEY", "GOOGLE_API_KEY"];

/// A required setting is missing; the run cannot start
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(pub String);

#[derive(Debug, Clone)]
pub struct Config {
    pub webhook_url: String,
    pub api_key: Option<String>,
}

impl Config {
    /// Build the run configuration from the environment (and any `.env` file).
    ///
    /// `api_key_flag` is the `--api-key` CLI value, which wins over the environment.
    /// When `require_api_key` is set a missing key is a [`ConfigError`].
    pub fn from_env(api_key_flag: Option<String>, require_api_key: bool) -> Result<Self> {
        Self::try_load_dotenv();
        Self::from_lookup(api_key_flag, require_api_key, |name| env::var(name).ok())
    }

    fn from_lookup(
        api_key_flag: Option<String>,
        require_api_key: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let webhook_url = non_empty(lookup(WEBHOOK_ENV)).ok_or_else(|| {
            ConfigError(format!(
                "{WEBHOOK_ENV} is not set.\n\n\
                Set it as an environment variable or add it to ~/.config/announce-videos/.env"
            ))
        })?;

        let api_key = resolve_api_key(api_key_flag, &lookup);
        if require_api_key && api_key.is_none() {
            return Err(ConfigError(format!(
                "No YouTube API key found. Pass --api-key or set one of: {}",
                API_KEY_ENVS.join(", ")
            ))
            .into());
        }

        Ok(Self {
            webhook_url,
            api_key,
        })
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/announce-videos/.env
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("announce-videos").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }
    }
}

/// CLI flag first, then each of [`API_KEY_ENVS`] in order
pub fn resolve_api_key(
    flag: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    non_empty(flag).or_else(|| {
        API_KEY_ENVS
            .iter()
            .find_map(|name| non_empty(lookup(name)))
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
