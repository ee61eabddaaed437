use std::time::Duration;

use anyhow::{Result, bail};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::cli::Cli;

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Proxy root prefixing every backend request
    pub proxy_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Terminal width below which secondary list columns are hidden
    #[serde(default = "default_narrow_width")]
    pub narrow_width: u16,
    #[serde(default = "default_notification_secs")]
    pub notification_secs: u64,
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default)]
    pub admin_user: String,
    #[serde(default)]
    pub admin_password: String,
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_narrow_width() -> u16 {
    80
}

fn default_notification_secs() -> u64 {
    4
}

fn default_log_file() -> String {
    "comandas_admin.log".to_string()
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Command line flags win over the environment.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(url) = &cli.base_url {
            self.proxy_base_url = url.clone();
        }
        if let Some(secs) = cli.timeout {
            self.request_timeout_secs = secs;
        }
        if let Some(path) = &cli.log_file {
            self.log_file = path.clone();
        }
        self
    }

    /// Proxy root, always ending with a slash so entity segments can be appended.
    pub fn proxy_root(&self) -> String {
        normalize_root(&self.proxy_base_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.proxy_base_url.trim().is_empty() {
            bail!("PROXY_BASE_URL must not be empty");
        }
        if self.request_timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }
}

pub fn normalize_root(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

/// Initialize environment variables and load configuration
pub fn init(cli: &Cli) -> Result<Config> {
    dotenv().ok();

    let config = Config::load()?.apply_cli(cli);
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            proxy_base_url: "http://localhost:3000/api".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
            narrow_width: default_narrow_width(),
            notification_secs: default_notification_secs(),
            log_file: default_log_file(),
            admin_user: "admin".to_string(),
            admin_password: "secret1".to_string(),
        }
    }

    #[test]
    fn proxy_root_gets_trailing_slash() {
        assert_eq!(sample().proxy_root(), "http://localhost:3000/api/");
        assert_eq!(normalize_root("http://x/"), "http://x/");
    }

    #[test]
    fn cli_flags_override_environment() {
        let cli = Cli {
            base_url: Some("http://other:9000/".to_string()),
            timeout: Some(30),
            log_file: None,
            route: None,
        };
        let config = sample().apply_cli(&cli);
        assert_eq!(config.proxy_base_url, "http://other:9000/");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.log_file, "comandas_admin.log");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = sample();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
