//! Session transcript persistence.
//!
//! Each streamed session leaves a directory under `.workroom/sessions/<id>/`:
//! - `manifest.yaml` — session metadata
//! - `messages.jsonl` — chat turns, one per line
//! - `events.jsonl` — data events in delivery order
//!
//! The event log is the source of truth: every report view folds from it,
//! so `workroom report` works offline on any saved session.

use crate::error::{Result, WorkroomError};
use crate::event::DataEvent;
use crate::provider::AgentKind;
use crate::{io, paths};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One chat turn. `synthetic` marks turns the client injected itself (the
/// auto-start prompt, the create-PR follow-up) rather than typed input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub created_at: String,
    #[serde(default)]
    pub synthetic: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content, false)
    }

    pub fn synthetic_user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content, true)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content, false)
    }

    fn new(role: ChatRole, content: impl Into<String>, synthetic: bool) -> Self {
        ChatMessage {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            synthetic,
        }
    }
}

/// Session-level metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionManifest {
    pub id: String,
    pub agent: AgentKind,
    pub title: String,
    /// Terminal state of the last run: "done", "errored" or "aborted";
    /// "streaming" while a run is underway.
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

// ---------------------------------------------------------------------------
// Session CRUD
// ---------------------------------------------------------------------------

/// Create a session directory with a fresh manifest.
pub fn create_session(root: &Path, id: &str, agent: AgentKind, title: &str) -> Result<SessionManifest> {
    paths::validate_session_id(id)?;
    let now = chrono::Utc::now().to_rfc3339();
    let manifest = SessionManifest {
        id: id.to_string(),
        agent,
        title: title.to_string(),
        status: "streaming".to_string(),
        created_at: now.clone(),
        updated_at: now,
    };
    save_manifest(root, &manifest)?;
    Ok(manifest)
}

pub fn load_manifest(root: &Path, id: &str) -> Result<SessionManifest> {
    let path = paths::session_manifest(root, id);
    if !path.exists() {
        return Err(WorkroomError::SessionNotFound(id.to_string()));
    }
    let data = std::fs::read_to_string(&path)?;
    let manifest = serde_yaml::from_str(&data)?;
    Ok(manifest)
}

pub fn save_manifest(root: &Path, manifest: &SessionManifest) -> Result<()> {
    let path = paths::session_manifest(root, &manifest.id);
    let data = serde_yaml::to_string(manifest)?;
    io::atomic_write(&path, data.as_bytes())
}

/// Update the manifest's status and bump `updated_at`.
pub fn mark_status(root: &Path, id: &str, status: &str) -> Result<()> {
    let mut manifest = load_manifest(root, id)?;
    manifest.status = status.to_string();
    manifest.updated_at = chrono::Utc::now().to_rfc3339();
    save_manifest(root, &manifest)
}

/// List all sessions, newest first.
pub fn list_sessions(root: &Path, limit: usize) -> Result<Vec<SessionManifest>> {
    let dir = paths::sessions_dir(root);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut sessions: Vec<SessionManifest> = std::fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|e| {
            let manifest = e.path().join(paths::MANIFEST_FILE);
            let data = std::fs::read_to_string(manifest).ok()?;
            serde_yaml::from_str(&data).ok()
        })
        .collect();

    sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    if limit > 0 {
        sessions.truncate(limit);
    }

    Ok(sessions)
}

/// Delete a session directory and everything in it.
pub fn delete_session(root: &Path, id: &str) -> Result<()> {
    let dir = paths::session_dir(root, id);
    if !dir.is_dir() {
        return Err(WorkroomError::SessionNotFound(id.to_string()));
    }
    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Transcript append/load
// ---------------------------------------------------------------------------

pub fn append_event(root: &Path, id: &str, event: &DataEvent) -> Result<()> {
    let line = serde_json::to_string(event)?;
    io::append_line(&paths::session_events(root, id), &line)
}

pub fn append_message(root: &Path, id: &str, message: &ChatMessage) -> Result<()> {
    let line = serde_json::to_string(message)?;
    io::append_line(&paths::session_messages(root, id), &line)
}

/// Load the event log in delivery order. Blank lines are skipped; anything
/// else that fails to parse reports its 1-based line number.
pub fn load_events(root: &Path, id: &str) -> Result<Vec<DataEvent>> {
    read_jsonl(&paths::session_events(root, id))
}

pub fn load_messages(root: &Path, id: &str) -> Result<Vec<ChatMessage>> {
    read_jsonl(&paths::session_messages(root, id))
}

fn read_jsonl<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let Some(data) = io::read_if_exists(path)? else {
        return Ok(Vec::new());
    };
    let mut items = Vec::new();
    for (idx, line) in data.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let item = serde_json::from_str(line).map_err(|source| WorkroomError::EventParse {
            line: idx + 1,
            source,
        })?;
        items.push(item);
    }
    Ok(items)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
