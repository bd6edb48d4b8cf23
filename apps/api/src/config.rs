use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// System-wide env file checked before the working-directory `.env`.
const SYSTEM_ENV_FILE: &str = "/etc/salesai/.env";

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_CLOSE_BASE_URL: &str = "https://api.close.com/api/v1";
const DEFAULT_CONTENT_FILE: &str = "content_catalog.csv";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub close_api_key: String,
    pub close_base_url: String,
    pub content_file: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        load_env_file();

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_model: env_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            close_api_key: require_env("CLOSE_API_KEY")?,
            close_base_url: env_or("CLOSE_BASE_URL", DEFAULT_CLOSE_BASE_URL),
            content_file: PathBuf::from(env_or("CONTENT_FILE", DEFAULT_CONTENT_FILE)),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

/// Loads the first env file that exists; a missing file is not an error.
fn load_env_file() {
    let system = Path::new(SYSTEM_ENV_FILE);
    if system.exists() {
        dotenvy::from_path(system).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
