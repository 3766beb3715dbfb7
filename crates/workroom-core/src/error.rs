use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkroomError {
    #[error("not initialized: run 'workroom init'")]
    NotInitialized,

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    #[error("unknown report view: {0}")]
    UnknownReport(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("invalid session id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSessionId(String),

    #[error("not logged in: run 'workroom login' or set WORKROOM_TOKEN")]
    NotLoggedIn,

    #[error("provider not connected: {0}")]
    NotConnected(String),

    #[error("malformed event on line {line}: {source}")]
    EventParse {
        line: usize,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WorkroomError>;
