use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/console.toml";
const ENV_PREFIX: &str = "JUMLA_CONSOLE";

/// Which half of the dashboard the console shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Seller,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub role: Role,
    pub per_page: u32,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub recaptcha_enabled: bool,
    pub recaptcha_site_key: Option<String>,
    pub log_level: String,
    pub log_file: String,
    pub state_file: String,
    pub timezone: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            token: None,
            role: Role::Admin,
            per_page: engine::DEFAULT_PER_PAGE,
            request_timeout_secs: 30,
            poll_interval_ms: 5000,
            recaptcha_enabled: false,
            recaptcha_site_key: None,
            log_level: "info".to_string(),
            log_file: "config/console.log".to_string(),
            state_file: "config/console_state.json".to_string(),
            timezone: "Africa/Dar_es_Salaam".to_string(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(100))
    }

    /// Configured timezone, falling back to UTC on an unknown name.
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!(timezone = %self.timezone, "unknown timezone, using UTC");
            chrono_tz::UTC
        })
    }
}

#[derive(Debug, Default, Parser)]
#[command(name = "jumla_console", disable_version_flag = true)]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override API server root (e.g. https://api.jumla.co.tz).
    #[arg(long)]
    base_url: Option<String>,
    /// Bearer token to start with.
    #[arg(long)]
    token: Option<String>,
    /// Dashboard to open.
    #[arg(long, value_enum)]
    role: Option<Role>,
    /// Rows per page.
    #[arg(long)]
    per_page: Option<u32>,
}

pub fn load() -> Result<AppConfig> {
    load_with(Args::parse())
}

fn load_with(args: Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(token) = args.token {
        settings.token = Some(token);
    }
    if let Some(role) = args.role {
        settings.role = role;
    }
    if let Some(per_page) = args.per_page {
        settings.per_page = per_page;
    }
    settings.per_page = settings.per_page.max(1);

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn args(config: &str) -> Args {
        Args {
            config: Some(config.to_string()),
            ..Args::default()
        }
    }

    #[test]
    fn missing_file_gives_defaults() {
        let settings = load_with(args("config/does-not-exist.toml")).unwrap();
        assert_eq!(settings.role, Role::Admin);
        assert_eq!(settings.per_page, 10);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.poll_interval(), Duration::from_millis(5000));
        assert_eq!(settings.tz(), chrono_tz::Africa::Dar_es_Salaam);
        assert!(!settings.recaptcha_enabled);
    }

    #[test]
    fn file_then_flags() {
        let dir = std::env::temp_dir().join(format!("jumla-console-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("console.toml");
        fs::write(
            &path,
            "base_url = \"https://api.jumla.test\"\nrole = \"seller\"\nper_page = 25\n",
        )
        .unwrap();

        let mut cli = args(path.to_str().unwrap());
        cli.per_page = Some(50);
        let settings = load_with(cli).unwrap();
        assert_eq!(settings.base_url, "https://api.jumla.test");
        assert_eq!(settings.role, Role::Seller);
        assert_eq!(settings.per_page, 50);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn zero_per_page_is_raised() {
        let mut cli = args("config/does-not-exist.toml");
        cli.per_page = Some(0);
        assert_eq!(load_with(cli).unwrap().per_page, 1);
    }

    #[test]
    fn unknown_timezone_falls_back_to_utc() {
        let settings = AppConfig {
            timezone: "Mars/Olympus".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(settings.tz(), chrono_tz::UTC);
    }
}
