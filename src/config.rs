use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Sender addresses to leave out of the output (case-insensitive)
    pub excluded_senders: Vec<String>,
    /// Where the per-date folders go
    pub output_dir: Option<String>,
    /// Maildir root for the direct-scan backend
    pub maildir: Option<String>,
    pub himalaya: HimalayaConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HimalayaConfig {
    /// Account name (if not set, himalaya's default account is used)
    pub account: Option<String>,
    /// Folder to search
    pub folder: String,
    /// How many envelopes to list per run
    pub page_size: u32,
}

impl Default for HimalayaConfig {
    fn default() -> Self {
        Self {
            account: None,
            folder: "INBOX".to_string(),
            page_size: 500,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = dirs::config_dir()
            .map(|p| p.join("mailsum/config.toml"))
            .unwrap_or_else(|| PathBuf::from("~/.config/mailsum/config.toml"));

        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => eprintln!("Config parse error: {}", e),
                },
                Err(e) => eprintln!("Config read error: {}", e),
            }
        }

        Self::default()
    }

    pub fn output_path(&self) -> PathBuf {
        let raw = self.output_dir.as_deref().unwrap_or("~/Email Summaries");
        PathBuf::from(shellexpand::tilde(raw).into_owned())
    }

    pub fn maildir_path(&self) -> PathBuf {
        let raw = self.maildir.as_deref().unwrap_or("~/Mail");
        PathBuf::from(shellexpand::tilde(raw).into_owned())
    }
}
