//! `agent-client` — native Rust client for the Workroom agents API.
//!
//! The hosted agents speak two protocols: a streaming NDJSON run endpoint
//! and a set of envelope-wrapped REST endpoints for integrations, uploads,
//! tickets and pull requests. This crate wraps both so the `workroom` CLI
//! never touches raw HTTP.
//!
//! # Architecture
//!
//! ```text
//! ChatSession      ← transcript + artifact events + status machine
//!     │  request()
//!     ▼
//! ApiClient        ← POST /agents/{agent}/run and the REST endpoints
//!     │
//!     ▼
//! SessionStream    ← implements futures::Stream<Item = Result<Frame>>
//!     │               background task + mpsc channel
//!     ▼
//! Frame            ← control frames (text/done/error) or a core DataEvent
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use agent_client::{ApiClient, ChatSession};
//! use futures::StreamExt;
//! use workroom_core::provider::AgentKind;
//!
//! let api = ApiClient::new("https://workroom.example.dev/api", token)?;
//! let mut session = ChatSession::new(id, AgentKind::TestGeneration);
//! session.ensure_started();
//! session.mark_submitted();
//!
//! let mut stream = api.run_session(session.agent, &session.id, &session.request());
//! while let Some(frame) = stream.next().await {
//!     session.apply(frame?);
//! }
//! ```

pub mod api;
pub mod bulk;
pub mod error;
pub mod session;
pub mod types;

pub use api::{ApiClient, CredentialPayload, IntegrationRecord};
pub use bulk::{join_partial, BulkOutcome};
pub use error::AgentClientError;
pub use session::{
    ChatSession, SessionStatus, SessionStream, AUTO_START_PROMPT, CREATE_PR_PROMPT,
};
pub use types::{
    parse_frame, ApiEnvelope, ChatMessage, ChatRole, ControlFrame, Frame, SessionRequest,
};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, AgentClientError>;
