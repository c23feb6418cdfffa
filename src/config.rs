use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::auth::DEFAULT_APP_ID;
use crate::matcher::DEFAULT_MATCH_PATTERNS;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feishu: FeishuConfig,
    #[serde(default)]
    pub launcher: LauncherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeishuConfig {
    #[serde(default = "default_app_id")]
    pub app_id: String,
    /// Where the consent flow redirects after authorization. Environment
    /// specific, so there is no meaningful default.
    #[serde(default)]
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    #[serde(default = "default_match_patterns")]
    pub match_patterns: Vec<String>,
}

// Defaults
fn default_app_id() -> String {
    DEFAULT_APP_ID.to_string()
}
fn default_match_patterns() -> Vec<String> {
    DEFAULT_MATCH_PATTERNS.iter().map(|s| s.to_string()).collect()
}

impl Default for FeishuConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            redirect_uri: String::new(),
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            match_patterns: default_match_patterns(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment. A missing file is
    /// not an error: the tool runs on defaults until `config` writes one.
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        match Self::find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        // Substitute environment variables
        let content = Self::substitute_env_vars(&content);

        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Write the configuration, creating parent directories as needed
    pub fn store(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config dir: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("failed to write config file: {}", path.display()))
    }

    /// The file the `config` command reads and writes: the
    /// FEISHU_AUTHLINK_CONFIG override, or the per-user location.
    pub fn default_file_path() -> PathBuf {
        env::var("FEISHU_AUTHLINK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = env::var("HOME").unwrap_or_default();
                PathBuf::from(format!("{home}/.config/feishu-authlink/config.toml"))
            })
    }

    fn find_config_file() -> Option<PathBuf> {
        if let Ok(path) = env::var("FEISHU_AUTHLINK_CONFIG") {
            return Some(PathBuf::from(path));
        }

        let home_config = format!(
            "{}/.config/feishu-authlink/config.toml",
            env::var("HOME").unwrap_or_default()
        );
        let locations = ["./feishu-authlink.toml", home_config.as_str()];

        locations
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Substitute ${VAR_NAME} with environment variable values
    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        while let Some(start) = result.find("${") {
            if let Some(end) = result[start..].find('}') {
                let var_name = &result[start + 2..start + end];
                let value = env::var(var_name).unwrap_or_default();
                result.replace_range(start..start + end + 1, &value);
            } else {
                break;
            }
        }

        result
    }
}
