use crate::error::{Result, WorkroomError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const WORKROOM_DIR: &str = ".workroom";
pub const SESSIONS_DIR: &str = ".workroom/sessions";

pub const CONFIG_FILE: &str = ".workroom/config.yaml";
pub const USER_FILE: &str = ".workroom/user.json";
pub const CONNECTIONS_FILE: &str = ".workroom/connections.json";
pub const PROJECT_FILE: &str = ".workroom/project.json";

pub const MANIFEST_FILE: &str = "manifest.yaml";
pub const EVENTS_FILE: &str = "events.jsonl";
pub const MESSAGES_FILE: &str = "messages.jsonl";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn workroom_dir(root: &Path) -> PathBuf {
    root.join(WORKROOM_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn user_path(root: &Path) -> PathBuf {
    root.join(USER_FILE)
}

pub fn connections_path(root: &Path) -> PathBuf {
    root.join(CONNECTIONS_FILE)
}

pub fn project_path(root: &Path) -> PathBuf {
    root.join(PROJECT_FILE)
}

pub fn sessions_dir(root: &Path) -> PathBuf {
    root.join(SESSIONS_DIR)
}

pub fn session_dir(root: &Path, id: &str) -> PathBuf {
    root.join(SESSIONS_DIR).join(id)
}

pub fn session_manifest(root: &Path, id: &str) -> PathBuf {
    session_dir(root, id).join(MANIFEST_FILE)
}

pub fn session_events(root: &Path, id: &str) -> PathBuf {
    session_dir(root, id).join(EVENTS_FILE)
}

pub fn session_messages(root: &Path, id: &str) -> PathBuf {
    session_dir(root, id).join(MESSAGES_FILE)
}

// ---------------------------------------------------------------------------
// Session id validation
// ---------------------------------------------------------------------------

static SESSION_ID_RE: OnceLock<Regex> = OnceLock::new();

fn session_id_re() -> &'static Regex {
    SESSION_ID_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

/// Session ids double as directory names, so they are restricted to the
/// same shape UUIDv4 strings already have.
pub fn validate_session_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !session_id_re().is_match(id) {
        return Err(WorkroomError::InvalidSessionId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
