use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use notedrive_sync::SyncConfig;
use notedrive_types::OwnerId;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "notedrive.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub owner: Option<String>,
    pub data_dir: PathBuf,
    /// Whether the record store answers sorted queries.
    pub sort_index: bool,
    pub url_ttl_secs: u64,
    pub sync: SyncConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            owner: None,
            data_dir: PathBuf::from(".notedrive"),
            sort_index: true,
            url_ttl_secs: 15 * 60,
            sync: SyncConfig::default(),
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load `explicit`, else `./notedrive.toml` if present, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn apply_overrides(&mut self, owner: Option<String>, data_dir: Option<PathBuf>) {
        if let Some(owner) = owner {
            self.owner = Some(owner);
        }
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }
    }

    pub fn owner(&self) -> anyhow::Result<OwnerId> {
        match &self.owner {
            Some(owner) => OwnerId::new(owner.as_str()).context("invalid owner"),
            None => bail!("no owner configured; pass --owner or set `owner` in {DEFAULT_CONFIG_FILE}"),
        }
    }

    pub fn url_ttl(&self) -> Duration {
        Duration::from_secs(self.url_ttl_secs)
    }
}
