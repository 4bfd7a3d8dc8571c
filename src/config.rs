//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::Result;

use crate::board::DeletePolicy;
use crate::client::DEFAULT_URL;
use crate::store::FileStore;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Debug)]
pub struct Config {
    /// Port for `serve` (from WORKBOARD_PORT)
    pub port: u16,
    /// Directory holding `data.json` (from WORKBOARD_DATA_DIR). `None` means the
    /// platform data directory.
    pub data_dir: Option<PathBuf>,
    /// Store URL used by the CLI commands (from WORKBOARD_URL)
    pub server_url: String,
    /// What deleting a release or feature area does to its tasks (from
    /// WORKBOARD_DELETE_POLICY)
    pub delete_policy: DeletePolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let port = std::env::var("WORKBOARD_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_dir = std::env::var("WORKBOARD_DATA_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let server_url =
            std::env::var("WORKBOARD_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());

        let delete_policy = match std::env::var("WORKBOARD_DELETE_POLICY") {
            Ok(value) => value.parse::<DeletePolicy>().unwrap_or_else(|e| {
                tracing::warn!("{}; using cascade", e);
                DeletePolicy::Cascade
            }),
            Err(_) => DeletePolicy::Cascade,
        };

        Self {
            port,
            data_dir,
            server_url,
            delete_policy,
        }
    }

    /// The file store this configuration points at.
    pub fn store(&self) -> Result<FileStore> {
        match &self.data_dir {
            Some(dir) => Ok(FileStore::new(dir)),
            None => FileStore::open_default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: None,
            server_url: DEFAULT_URL.to_string(),
            delete_policy: DeletePolicy::Cascade,
        }
    }
}
