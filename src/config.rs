use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::timeline::EntryPolicy;

pub const DEFAULT_PROFILE_URL: &str = "https://x.com/elonmusk";
pub const DEFAULT_POST_CAP: usize = 50;
pub const DEFAULT_SETTLE_MS: u64 = 7000;
pub const DEFAULT_OUTPUT: &str = "profile.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Profile page to open.
    pub profile_url: String,
    /// Maximum number of posts kept, pinned post included.
    pub post_cap: usize,
    /// How long to keep the page open after navigation so background calls
    /// can complete.
    pub settle_ms: u64,
    /// Where the snapshot is written.
    pub output: PathBuf,
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Fail a timeline batch on any entry that is not a post, instead of
    /// skipping it.
    pub strict_entries: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile_url: DEFAULT_PROFILE_URL.to_string(),
            post_cap: DEFAULT_POST_CAP,
            settle_ms: DEFAULT_SETTLE_MS,
            output: PathBuf::from(DEFAULT_OUTPUT),
            headless: false,
            strict_entries: false,
        }
    }
}

impl Config {
    /// Load from an explicit TOML file, or from the default location when
    /// one exists there, or fall back to the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(explicit) => Some(explicit.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        };
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("profetch").join("config.toml"))
    }

    pub fn entry_policy(&self) -> EntryPolicy {
        if self.strict_entries {
            EntryPolicy::Abort
        } else {
            EntryPolicy::Skip
        }
    }
}
