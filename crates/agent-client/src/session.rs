use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use workroom_core::event::DataEvent;
use workroom_core::provider::AgentKind;
use workroom_core::session_log::{ChatMessage, ChatRole};

use crate::types::{envelope_message, parse_frame, ControlFrame, Frame, SessionRequest};
use crate::{AgentClientError, Result};

/// The user turn injected when a run starts without typed input.
pub const AUTO_START_PROMPT: &str = "Start Analysing";

/// The follow-up turn injected by the create-PR action.
pub const CREATE_PR_PROMPT: &str = "Create PR";

// ─── ChatSession ──────────────────────────────────────────────────────────

/// Where a session is in its request cycle. Input is accepted only while
/// `Idle` or `Done`; `Submitted` covers the window between issuing the POST
/// and the first frame arriving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Submitted,
    Streaming,
    Done,
    Errored,
}

/// Client-side state of one agent conversation: the transcript, every
/// artifact event received so far, and the request-cycle status.
///
/// The session never rolls anything back. Text deltas accumulate into an
/// in-progress reply that is flushed into the transcript when the run ends,
/// however it ends, so cancellation and failure both keep partial output.
#[derive(Debug)]
pub struct ChatSession {
    pub id: String,
    pub agent: AgentKind,
    messages: Vec<ChatMessage>,
    data: Vec<DataEvent>,
    status: SessionStatus,
    started: bool,
    reply: String,
    error: Option<String>,
}

impl ChatSession {
    pub fn new(id: impl Into<String>, agent: AgentKind) -> Self {
        ChatSession {
            id: id.into(),
            agent,
            messages: Vec::new(),
            data: Vec::new(),
            status: SessionStatus::Idle,
            started: false,
            reply: String::new(),
            error: None,
        }
    }

    /// Rebuild a session from a saved transcript. Resumed sessions count as
    /// started, so [`ChatSession::ensure_started`] will not inject a second
    /// auto-start turn.
    pub fn resume(id: impl Into<String>, agent: AgentKind, messages: Vec<ChatMessage>) -> Self {
        let started = !messages.is_empty();
        ChatSession {
            id: id.into(),
            agent,
            messages,
            data: Vec::new(),
            status: SessionStatus::Done,
            started,
            reply: String::new(),
            error: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Every artifact event applied so far, in arrival order. This is the
    /// slice the view-model folds consume.
    pub fn data(&self) -> &[DataEvent] {
        &self.data
    }

    /// The user-facing message of the last failure, while `Errored`.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Assistant text received in the current run, before it is flushed
    /// into the transcript.
    pub fn reply_in_progress(&self) -> &str {
        &self.reply
    }

    pub fn accepts_input(&self) -> bool {
        matches!(self.status, SessionStatus::Idle | SessionStatus::Done)
    }

    /// Inject the auto-start turn if this instance has not run yet. One-shot:
    /// the flag decides, not the transcript, so clearing messages elsewhere
    /// can never re-trigger it.
    pub fn ensure_started(&mut self) -> Option<&ChatMessage> {
        if self.started {
            return None;
        }
        self.started = true;
        self.messages.push(ChatMessage::synthetic_user(AUTO_START_PROMPT));
        self.messages.last()
    }

    /// Append a typed user turn. Rejected while a run is in flight.
    pub fn append_user(&mut self, text: impl Into<String>) -> Option<&ChatMessage> {
        if !self.accepts_input() {
            return None;
        }
        self.started = true;
        self.messages.push(ChatMessage::user(text));
        self.messages.last()
    }

    /// Append a client-injected turn (the create-PR follow-up). Rejected
    /// while a run is in flight.
    pub fn append_synthetic(&mut self, text: impl Into<String>) -> Option<&ChatMessage> {
        if !self.accepts_input() {
            return None;
        }
        self.started = true;
        self.messages.push(ChatMessage::synthetic_user(text));
        self.messages.last()
    }

    /// Move into `Submitted` for the POST that is about to go out.
    pub fn mark_submitted(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.status = SessionStatus::Submitted;
        true
    }

    /// Fold one frame into the session. Returns the flushed assistant turn
    /// when a terminal frame completes the reply, so callers can persist it.
    pub fn apply(&mut self, frame: Frame) -> Option<ChatMessage> {
        if self.status == SessionStatus::Submitted {
            self.status = SessionStatus::Streaming;
        }
        match frame {
            Frame::Control(ControlFrame::Text { delta }) => {
                self.reply.push_str(&delta);
                None
            }
            Frame::Control(ControlFrame::Done) => {
                self.status = SessionStatus::Done;
                self.flush_reply()
            }
            Frame::Control(ControlFrame::Error { message }) => {
                self.status = SessionStatus::Errored;
                self.error = Some(message);
                self.flush_reply()
            }
            Frame::Data(event) => {
                self.data.push(event);
                None
            }
        }
    }

    /// Record a client-side failure (transport or decode). Partial output
    /// stays applied; the transcript can be resubmitted.
    pub fn fail(&mut self, message: impl Into<String>) -> Option<ChatMessage> {
        self.status = SessionStatus::Errored;
        self.error = Some(message.into());
        self.flush_reply()
    }

    /// User-driven cancellation. Whatever arrived stays, and the session
    /// goes back to accepting input.
    pub fn abort(&mut self) -> Option<ChatMessage> {
        if matches!(self.status, SessionStatus::Submitted | SessionStatus::Streaming) {
            self.status = SessionStatus::Done;
        }
        self.flush_reply()
    }

    /// Re-arm a finished or failed session so the identical transcript can
    /// be resubmitted. Trailing assistant turns (full or partial) are
    /// dropped from the request; the on-disk log keeps them.
    pub fn prepare_regenerate(&mut self) -> bool {
        if !matches!(self.status, SessionStatus::Done | SessionStatus::Errored) {
            return false;
        }
        while matches!(self.messages.last(), Some(m) if m.role == ChatRole::Assistant) {
            self.messages.pop();
        }
        self.reply.clear();
        self.error = None;
        self.status = SessionStatus::Idle;
        true
    }

    /// The POST body for the next submission.
    pub fn request(&self) -> SessionRequest {
        SessionRequest {
            messages: self.messages.clone(),
        }
    }

    fn flush_reply(&mut self) -> Option<ChatMessage> {
        if self.reply.is_empty() {
            return None;
        }
        let message = ChatMessage::assistant(std::mem::take(&mut self.reply));
        self.messages.push(message.clone());
        Some(message)
    }
}

// ─── SessionStream ────────────────────────────────────────────────────────

/// An async stream of [`Frame`]s from a live agent run.
///
/// Backed by a Tokio mpsc channel. A background task owns the HTTP transfer:
/// it POSTs the transcript to `/agents/{agent}/run`, decodes the NDJSON
/// response body line by line, and forwards frames until a terminal frame or
/// a failure. Dropping `SessionStream` closes the receiver, which cancels
/// the transfer on the next send attempt.
pub struct SessionStream {
    rx: mpsc::Receiver<Result<Frame>>,
}

impl SessionStream {
    pub(crate) fn open(
        http: reqwest::Client,
        api_base: String,
        token: String,
        agent: AgentKind,
        session_id: String,
        request: SessionRequest,
    ) -> Self {
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let url = format!("{}/agents/{}/run", api_base, agent.route_segment());
            tracing::debug!(url = %url, session_id = %session_id, "opening run stream");

            let response = match http
                .post(&url)
                .query(&[("session_id", session_id.as_str())])
                .bearer_auth(&token)
                .json(&request)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    let _ = tx.send(Err(e.into())).await;
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = match envelope_message(&body) {
                    Some(m) => m,
                    None => body,
                };
                let _ = tx
                    .send(Err(AgentClientError::Api {
                        status: status.as_u16(),
                        message,
                    }))
                    .await;
                return;
            }

            pump(response.bytes_stream(), tx).await;
        });

        SessionStream { rx }
    }

    /// Test-only constructor: wrap a raw mpsc receiver as a `SessionStream`.
    #[cfg(test)]
    pub(crate) fn from_channel(rx: mpsc::Receiver<Result<Frame>>) -> Self {
        Self { rx }
    }

    /// Stop the transfer. Dropping the stream has the same effect; this is
    /// the explicit form for Ctrl-C handling.
    pub fn abort(self) {
        drop(self);
    }
}

impl Stream for SessionStream {
    type Item = Result<Frame>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Decode an NDJSON byte stream into frames, forwarding them until a
/// terminal frame, a decode failure, or the receiver going away. Chunk
/// boundaries fall anywhere, so bytes are buffered until a newline; a final
/// unterminated line is decoded at end of stream.
async fn pump<S, B, E>(mut body: S, tx: mpsc::Sender<Result<Frame>>)
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut buffer = String::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                let _ = tx.send(Err(AgentClientError::Stream(e.to_string()))).await;
                return;
            }
        };
        buffer.push_str(&String::from_utf8_lossy(chunk.as_ref()));

        while let Some(line_end) = buffer.find('\n') {
            let line: String = buffer.drain(..=line_end).collect();
            match parse_frame(&line) {
                Ok(None) => {}
                Ok(Some(frame)) => {
                    let terminal = frame.is_terminal();
                    if tx.send(Ok(frame)).await.is_err() || terminal {
                        return;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            }
        }
    }

    if !buffer.trim().is_empty() {
        match parse_frame(&buffer) {
            Ok(Some(frame)) => {
                let _ = tx.send(Ok(frame)).await;
            }
            Ok(None) => {}
            Err(e) => {
                let _ = tx.send(Err(e)).await;
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
