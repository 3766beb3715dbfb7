use crate::error::{Result, WorkroomError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// UserStore
// ---------------------------------------------------------------------------

/// The logged-in identity: bearer token plus optional display name and a
/// per-user API base override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl UserStore {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::user_path(root);
        match crate::io::read_if_exists(&path)? {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Ok(UserStore::default()),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::user_path(root);
        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Bearer token for API calls. `WORKROOM_TOKEN` wins over the stored
    /// value so CI and one-off shells never have to write the store.
    pub fn resolve_token(&self) -> Result<String> {
        if let Ok(token) = std::env::var("WORKROOM_TOKEN") {
            if !token.is_empty() {
                return Ok(token);
            }
        }
        self.token.clone().ok_or(WorkroomError::NotLoggedIn)
    }

    pub fn logout(&mut self) {
        self.token = None;
        self.display_name = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
