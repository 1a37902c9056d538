//! Layered configuration.
//!
//! Priority order (highest to lowest):
//! 1. Environment (`CLAUDE_ORG_ID`, `CLAUDE_BASE_URL`)
//! 2. ./artifactctl.toml (project-specific)
//! 3. ~/.artifactctl/config.toml (user defaults)
//! 4. Built-in defaults
//!
//! Command-line flags are applied on top by the CLI. The session key is never
//! read from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ExportError, Result};
use crate::export::DEFAULT_PACING;
use crate::remote::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};

pub const SESSION_KEY_ENV: &str = "CLAUDE_SESSION_KEY";
pub const ORG_ID_ENV: &str = "CLAUDE_ORG_ID";
pub const BASE_URL_ENV: &str = "CLAUDE_BASE_URL";

/// Get the artifactctl config directory path (~/.artifactctl)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".artifactctl"))
}

/// Default place for finished archives (~/.artifactctl/exports)
pub fn default_output_dir() -> PathBuf {
    config_dir()
        .map(|dir| dir.join("exports"))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub remote: RemoteConfig,
    pub export: JobConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub org_id: Option<String>,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub pacing: Duration,
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                org_id: None,
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
            export: JobConfig {
                pacing: DEFAULT_PACING,
                output_dir: default_output_dir(),
            },
        }
    }
}

/// One config file as written on disk. Every field is optional so a file
/// only overrides what it mentions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub remote: RemoteSection,
    #[serde(default)]
    pub export: ExportSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSection {
    pub base_url: Option<String>,
    pub org_id: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportSection {
    pub pacing_ms: Option<u64>,
    pub output_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ExportError::config(e.to_string()))
    }

    /// Read a config file; a missing file is `Ok(None)`.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents).map(Some)
    }
}

impl ExportConfig {
    /// Load global and local config files, then the environment.
    /// Unreadable or invalid files are logged and skipped.
    pub fn load() -> Self {
        let mut paths = Vec::new();
        if let Some(dir) = config_dir() {
            paths.push(dir.join("config.toml"));
        }
        paths.push(PathBuf::from("artifactctl.toml"));

        let mut config = Self::from_files(&paths);
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Layer config files in order, later files winning.
    pub fn from_files(paths: &[PathBuf]) -> Self {
        let mut config = Self::default();
        for path in paths {
            match ConfigFile::read(path) {
                Ok(Some(file)) => {
                    debug!("Loaded config from {}", path.display());
                    config.merge(file);
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to load {}: {}", path.display(), e),
            }
        }
        config
    }

    pub fn merge(&mut self, file: ConfigFile) {
        if let Some(base_url) = file.remote.base_url {
            self.remote.base_url = base_url;
        }
        if let Some(org_id) = file.remote.org_id {
            self.remote.org_id = Some(org_id);
        }
        if let Some(user_agent) = file.remote.user_agent {
            self.remote.user_agent = user_agent;
        }
        if let Some(ms) = file.export.pacing_ms {
            self.export.pacing = Duration::from_millis(ms);
        }
        if let Some(dir) = file.export.output_dir {
            self.export.output_dir = dir;
        }
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(org) = non_empty(ORG_ID_ENV) {
            self.remote.org_id = Some(org);
        }
        if let Some(url) = non_empty(BASE_URL_ENV) {
            self.remote.base_url = url;
        }
    }
}
