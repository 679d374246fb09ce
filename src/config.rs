use crate::store::DEFAULT_DATA_FILE;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "studentd.toml";

/// Per-workspace settings read from `studentd.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentdConfig {
    /// Data file name, relative to the workspace.
    pub data_file: String,
}

impl Default for StudentdConfig {
    fn default() -> Self {
        StudentdConfig {
            data_file: DEFAULT_DATA_FILE.to_string(),
        }
    }
}

impl StudentdConfig {
    pub fn data_path(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.data_file)
    }

    /// `Ok(None)` when the workspace has no config file.
    pub fn load(workspace: &Path) -> anyhow::Result<Option<Self>> {
        let path = workspace.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let cfg: StudentdConfig = toml::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        if cfg.data_file.trim().is_empty() {
            anyhow::bail!("{}: data_file must not be empty", path.display());
        }
        Ok(Some(cfg))
    }

    /// Like [`StudentdConfig::load`], but a bad config must not keep the
    /// workspace from opening: problems are logged and defaults used.
    pub fn load_or_default(workspace: &Path) -> Self {
        match Self::load(workspace) {
            Ok(Some(cfg)) => cfg,
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!("ignoring workspace config: {e:#}");
                Self::default()
            }
        }
    }
}
