//! User configuration loaded from `config.toml`.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "taskdeck";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "taskdeck.db";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default)]
    pub log_level: Option<String>,

    /// Tasks per page in `task list`.
    #[serde(default)]
    pub page_size: Option<u32>,

    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub recipient: Option<String>,

    #[serde(default)]
    pub from: Option<String>,

    #[serde(default)]
    pub smtp_host: Option<String>,

    #[serde(default)]
    pub smtp_user: Option<String>,

    #[serde(default)]
    pub smtp_password: Option<String>,
}

pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Cannot find config directory"))?;
    Ok(base.join(APP_DIR_NAME))
}

fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Cannot find data directory"))?;
    Ok(base.join(APP_DIR_NAME))
}

impl Config {
    /// Loads `explicit` when given, otherwise the platform config file.
    ///
    /// A missing default file yields defaults; a missing explicit file is an
    /// error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let path = config_dir()?.join(CONFIG_FILE_NAME);
                if !path.exists() {
                    return Ok(Config::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(DB_FILE_NAME)),
        }
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        match &self.log_dir {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("logs")),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or(taskdeck_core::default_log_level())
    }
}
