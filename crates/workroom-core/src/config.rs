use crate::error::{Result, WorkroomError};
use crate::paths;
use crate::user::UserStore;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Client-side settings written by `workroom init`. Unlike the JSON stores,
/// this file is meant to be hand-edited, so it lives in YAML with defaults
/// that tolerate older files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_version() -> u32 {
    1
}

fn default_api_base() -> String {
    "https://workroom.orchard9.dev/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            version: default_version(),
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ClientConfig {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(WorkroomError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: ClientConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Effective API base: `WORKROOM_API_BASE` beats the user override
    /// beats this config. Trailing slashes are trimmed so route building
    /// can always join with `/`.
    pub fn resolved_api_base(&self, user: &UserStore) -> String {
        let base = std::env::var("WORKROOM_API_BASE")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| user.api_base.clone())
            .unwrap_or_else(|| self.api_base.clone());
        base.trim_end_matches('/').to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
