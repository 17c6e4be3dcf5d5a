use anyhow::{bail, Result};
use screener_core::MAX_PERIODS;
use std::env;
use std::path::PathBuf;

/// Process-level server settings. Screening thresholds live in
/// [`screener_core::ScreeningConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_requests: bool,
    pub log_responses: bool,
    /// Serve facts from this JSON file instead of Alpha Vantage
    pub facts_file: Option<PathBuf>,
    pub periods: u32,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("HOST_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,
            log_requests: flag("LOG_REQUESTS"),
            log_responses: flag("LOG_RESPONSES"),
            facts_file: env::var("FACTS_FILE")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            periods: env::var("SCREEN_PERIODS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
        };

        if config.periods == 0 || config.periods > MAX_PERIODS {
            bail!("SCREEN_PERIODS must be between 1 and {}", MAX_PERIODS);
        }
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Any value other than empty, `0` or `false` turns a flag on.
fn flag(key: &str) -> bool {
    env::var(key)
        .map(|v| {
            let v = v.trim();
            !(v.is_empty() || v == "0" || v.eq_ignore_ascii_case("false"))
        })
        .unwrap_or(false)
}
