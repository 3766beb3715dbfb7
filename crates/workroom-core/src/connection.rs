use crate::error::Result;
use crate::paths;
use crate::provider::Provider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConnectionStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub connected: bool,
    /// Server-side integration row id, needed to delete the integration.
    pub integration_id: i64,
    pub connected_at: DateTime<Utc>,
}

/// Which providers this client believes are connected, and under which
/// integration id. Local belief only: nothing reconciles it against the
/// server, so a revoked token stays "connected" here until the user
/// disconnects or reconnects explicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionStore {
    #[serde(default)]
    connections: HashMap<Provider, Connection>,
}

impl ConnectionStore {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::connections_path(root);
        match crate::io::read_if_exists(&path)? {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Ok(ConnectionStore::default()),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::connections_path(root);
        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn connect(&mut self, provider: Provider, integration_id: i64) {
        self.connections.insert(
            provider,
            Connection {
                connected: true,
                integration_id,
                connected_at: Utc::now(),
            },
        );
    }

    pub fn disconnect(&mut self, provider: Provider) {
        self.connections.remove(&provider);
    }

    pub fn is_connected(&self, provider: Provider) -> bool {
        self.connections
            .get(&provider)
            .map(|c| c.connected)
            .unwrap_or(false)
    }

    pub fn integration_id(&self, provider: Provider) -> Option<i64> {
        self.connections
            .get(&provider)
            .filter(|c| c.connected)
            .map(|c| c.integration_id)
    }

    pub fn get(&self, provider: Provider) -> Option<&Connection> {
        self.connections.get(&provider)
    }

    pub fn reset(&mut self) {
        self.connections.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
