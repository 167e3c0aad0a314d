use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::jobs::catalog::LoadPolicy;
use crate::roadmap::library::SelectionPolicy;

const DEFAULT_AI_API_URL: &str = "https://api.chatanywhere.com.cn/v1/chat/completions";
const DEFAULT_AI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_JOBS_CSV_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/jobs.csv");
const DEFAULT_ROADMAPS_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/roadmaps.json");

/// Application configuration loaded from environment variables.
/// Every variable except `STATIC_DIR` has a default, so an empty environment starts a
/// local server. The default data paths point at the crate's bundled `data/` directory,
/// whatever the working directory. Without `STATIC_DIR` no static files are served and
/// unmatched paths return 404.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub jobs_csv_path: PathBuf,
    pub roadmaps_path: PathBuf,
    pub static_dir: Option<PathBuf>,
    pub ai_api_url: String,
    pub ai_model: String,
    pub ai_api_key: Option<String>,
    pub roadmap_selection: SelectionPolicy,
    pub jobs_load_policy: LoadPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_or("PORT", "3000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            jobs_csv_path: env_or("JOBS_CSV_PATH", DEFAULT_JOBS_CSV_PATH).into(),
            roadmaps_path: env_or("ROADMAPS_PATH", DEFAULT_ROADMAPS_PATH).into(),
            static_dir: std::env::var("STATIC_DIR")
                .ok()
                .filter(|d| !d.is_empty())
                .map(PathBuf::from),
            ai_api_url: env_or("AI_API_URL", DEFAULT_AI_API_URL),
            ai_model: env_or("AI_MODEL", DEFAULT_AI_MODEL),
            ai_api_key: std::env::var("AI_API_KEY").ok().filter(|k| !k.is_empty()),
            roadmap_selection: parse_env("ROADMAP_SELECTION", SelectionPolicy::Fixed)?,
            jobs_load_policy: parse_env("JOBS_LOAD_POLICY", LoadPolicy::FailFast)?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr<Err = String>,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow!("Invalid value for environment variable '{key}': {e}")),
        Err(_) => Ok(default),
    }
}
