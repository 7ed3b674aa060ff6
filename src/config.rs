//! User configuration, read from `config.toml`
//!
//! ```toml
//! data_dir = "/home/me/.local/share/pocket-classroom"
//! quota_bytes = 5242880   # 0 disables the limit
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::capsules::CapsuleStore;
use crate::kv::FileStore;

const APP_DIR: &str = "pocket-classroom";

/// Same budget browsers give local storage
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Data directory not found")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub quota_bytes: Option<u64>,
}

impl Config {
    /// `~/.config/pocket-classroom/config.toml` or the platform equivalent
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("config.toml"))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_local_dir()
                .map(|p| p.join(APP_DIR))
                .ok_or(ConfigError::DataDirNotFound),
        }
    }

    /// Effective storage quota; `None` means unlimited
    pub fn quota(&self) -> Option<u64> {
        match self.quota_bytes {
            Some(0) => None,
            Some(bytes) => Some(bytes),
            None => Some(DEFAULT_QUOTA_BYTES),
        }
    }

    pub fn open_store(&self) -> Result<CapsuleStore<FileStore>> {
        let backend = FileStore::open(self.data_dir()?).with_quota(self.quota());
        log::debug!("Capsule storage at {:?}", backend.root());
        Ok(CapsuleStore::new(backend))
    }
}
