use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse stream frame: {source}\n  line: {line}")]
    Parse {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Not a GitHub pull request URL: {0}")]
    InvalidPullRequestUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
