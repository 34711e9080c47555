//! CLI Configuration

use anyhow::{anyhow, Context as _};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://api.rishta.app/v1";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub default_format: Option<String>,
    /// Accept this code locally instead of calling the OTP endpoints
    pub dev_otp_code: Option<String>,
}

impl Config {
    pub fn load(profile: Option<&str>) -> anyhow::Result<Self> {
        let path = Self::config_path(profile)?;
        if path.exists() {
            let content = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, profile: Option<&str>) -> anyhow::Result<PathBuf> {
        let path = Self::config_path(profile)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(path)
    }

    pub fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
        let slot = self.slot(key)?;
        *slot = if value.is_empty() { None } else { Some(value) };
        Ok(())
    }

    /// Value for display; the token is masked
    pub fn display_value(&self, key: &str) -> anyhow::Result<String> {
        let value = match key {
            "api_url" => self.api_url.clone(),
            "token" => self.token.as_deref().map(mask),
            "user_id" => self.user_id.clone(),
            "default_format" => self.default_format.clone(),
            "dev_otp_code" => self.dev_otp_code.clone(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value.unwrap_or_else(|| "(not set)".into()))
    }

    pub const KEYS: [&'static str; 5] = ["api_url", "token", "user_id", "default_format", "dev_otp_code"];

    fn slot(&mut self, key: &str) -> anyhow::Result<&mut Option<String>> {
        match key {
            "api_url" => Ok(&mut self.api_url),
            "token" => Ok(&mut self.token),
            "user_id" => Ok(&mut self.user_id),
            "default_format" => Ok(&mut self.default_format),
            "dev_otp_code" => Ok(&mut self.dev_otp_code),
            _ => Err(unknown_key(key)),
        }
    }

    fn config_path(profile: Option<&str>) -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot find home directory"))?;
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(home.join(".rishta").join(filename))
    }
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow!("Unknown config key: {} (expected one of {})", key, Config::KEYS.join(", "))
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(8).collect();
    format!("{}****", visible)
}
