use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:4000";

/// Persisted CLI settings (`cli.json` in the config directory)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CliConfig {
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CliConfig {
    pub fn server_url(&self) -> &str {
        self.server.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    /// Token with everything but the edges hidden, for display
    pub fn masked_token(&self) -> Option<String> {
        self.token.as_ref().map(|t| {
            if t.len() <= 12 {
                "*".repeat(t.len())
            } else {
                format!("{}...{}", &t[..6], &t[t.len() - 4..])
            }
        })
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("NEUROMATE_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("neuromate")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_cli_config() -> anyhow::Result<CliConfig> {
    let config_file = get_config_dir()?.join("cli.json");

    if !config_file.exists() {
        return Ok(CliConfig::default());
    }

    let content = fs::read_to_string(config_file)?;
    let config: CliConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_cli_config(config: &CliConfig) -> anyhow::Result<()> {
    let config_file = get_config_dir()?.join("cli.json");

    let mut config = config.clone();
    config.updated_at = Some(Utc::now());
    let content = serde_json::to_string_pretty(&config)?;
    fs::write(config_file, content)?;
    Ok(())
}
