//! Fetcher configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `CAIRN_`-prefixed environment variables.
//!
//! ```toml
//! cache_dirs = ["/var/cache/cairn/packages", "/media/dvd"]
//! trusted_keys = ["/etc/cairn/keys/vendor.key"]
//! link = "hardlink"
//! ```

use std::path::{Path, PathBuf};

use cairn_fs::HardlinkOrCopyOptions;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Figment(#[from] figment::Error),
}

/// How cached files are placed into the destination directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// Hardlink, falling back to a byte copy.
    #[default]
    Hardlink,
    /// Always copy bytes.
    Copy,
}

impl LinkMode {
    pub fn options(self) -> HardlinkOrCopyOptions {
        match self {
            LinkMode::Hardlink => HardlinkOrCopyOptions::new(),
            LinkMode::Copy => HardlinkOrCopyOptions::new().copy_only(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Cache directories, searched in order.
    pub cache_dirs:   Vec<PathBuf>,
    /// Key files trusted by every directory signature check.
    pub trusted_keys: Vec<PathBuf>,
    pub link:         LinkMode,
}

impl FetchConfig {
    pub const ENV_PREFIX: &'static str = "CAIRN_";

    /// The layered provider chain, for callers that merge in more sources.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(FetchConfig::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(Self::ENV_PREFIX))
    }

    /// Load defaults, `file` (when given and present) and the environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self::figment(file).extract()?)
    }

    /// Parse a TOML document on top of the defaults, ignoring the environment.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let figment = Figment::from(Serialized::defaults(FetchConfig::default())).merge(Toml::string(toml));
        Ok(figment.extract()?)
    }
}
