use serde::{Deserialize, Serialize};

use workroom_core::event::DataEvent;

pub use workroom_core::session_log::{ChatMessage, ChatRole};

use crate::{AgentClientError, Result};

// ─── Frames ───────────────────────────────────────────────────────────────

/// One NDJSON line from an agent run stream.
///
/// Every line is a JSON object discriminated by its `"type"` field. The
/// control frames (`text`, `done`, `error`) drive the chat transcript and
/// the session state machine; everything else is a [`DataEvent`] artifact
/// that view models fold over. The two tag sets are disjoint, so an
/// untagged union resolves unambiguously.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Frame {
    Control(ControlFrame),
    Data(DataEvent),
}

impl Frame {
    /// Terminal frames end the run; nothing after them is consumed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Frame::Control(ControlFrame::Done) | Frame::Control(ControlFrame::Error { .. })
        )
    }
}

/// `type = "text" | "done" | "error"` — the non-artifact lines of a run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlFrame {
    /// Incremental assistant prose; deltas concatenate into one reply.
    Text { delta: String },
    /// The run finished cleanly.
    Done,
    /// The run failed server-side; the message is user-facing.
    Error { message: String },
}

/// Decode one line of a run stream.
///
/// Blank lines yield `Ok(None)`. Valid JSON with a `"type"` tag this client
/// does not recognise also yields `Ok(None)` — agents ship new frame types
/// ahead of clients, and skipping them keeps old binaries working. Anything
/// else that fails to decode is a hard [`AgentClientError::Parse`].
pub fn parse_frame(line: &str) -> Result<Option<Frame>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Frame>(trimmed) {
        Ok(frame) => Ok(Some(frame)),
        Err(source) => {
            if is_unknown_frame_type(trimmed) {
                tracing::debug!(line = %trimmed, "skipping unknown frame type");
                return Ok(None);
            }
            Err(AgentClientError::Parse {
                line: trimmed.to_owned(),
                source,
            })
        }
    }
}

fn is_unknown_frame_type(line: &str) -> bool {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(line) {
        // Valid JSON with a "type" field is just a frame kind we don't
        // know yet (e.g. heartbeat or usage frames).
        v.get("type").is_some()
    } else {
        false
    }
}

// ─── Requests & envelopes ─────────────────────────────────────────────────

/// POST body of the run endpoint: the full message history so far. The
/// server re-derives context from it on every submission, which is what
/// makes regenerate a plain resubmit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub messages: Vec<ChatMessage>,
}

/// Response wrapper of the non-streaming endpoints. `success == false`
/// carries a user-facing `message` even when the HTTP status is 200.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

/// Pull a user-facing message out of an error response body, if the body
/// turns out to be an envelope.
pub(crate) fn envelope_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
        .ok()
        .and_then(|e| e.message)
}

// ─── Tests ────────────────────────────────────────────────────────────────
