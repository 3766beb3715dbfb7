use crate::cmd::{api_client, block_on};
use agent_client::{
    ApiClient, ChatSession, ControlFrame, Frame, SessionRequest, SessionStatus, CREATE_PR_PROMPT,
};
use anyhow::Context;
use futures::StreamExt;
use std::io::Write;
use std::path::Path;
use workroom_core::event::DataEvent;
use workroom_core::provider::AgentKind;
use workroom_core::session_log;

/// How the streaming loop ended. The session status carries the rest
/// (a server-side `error` frame still counts as `Completed` here).
enum RunOutcome {
    Completed,
    Interrupted,
    StreamError(String),
}

pub fn run(
    root: &Path,
    agent: AgentKind,
    session_id: Option<&str>,
    message: Option<&str>,
    create_pr: bool,
    regenerate: bool,
) -> anyhow::Result<()> {
    // Auth and config problems surface before any session dir is created.
    let api = api_client(root)?;

    let mut session = match session_id {
        Some(id) => {
            let manifest = session_log::load_manifest(root, id)?;
            if manifest.agent != agent {
                anyhow::bail!("session {id} belongs to {}, not {agent}", manifest.agent);
            }
            let messages = session_log::load_messages(root, id)?;
            ChatSession::resume(id, agent, messages)
        }
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            let title = match message {
                Some(text) => truncate_title(text),
                None => format!("{agent} run"),
            };
            session_log::create_session(root, &id, agent, &title)?;
            println!("Session {id}");
            ChatSession::new(id, agent)
        }
    };

    if regenerate && !session.prepare_regenerate() {
        anyhow::bail!("nothing to regenerate: the session has not finished a run");
    }

    // Build the outgoing turn(s). Synthetic prompts are persisted like typed
    // ones, so a later resume replays the exact transcript.
    let turn = match message {
        Some(text) => session.append_user(text).cloned(),
        None => session.ensure_started().cloned(),
    };
    if let Some(turn) = &turn {
        session_log::append_message(root, &session.id, turn)?;
    } else if message.is_some() {
        anyhow::bail!("session is not accepting input");
    }
    if create_pr {
        if let Some(turn) = session.append_synthetic(CREATE_PR_PROMPT).cloned() {
            session_log::append_message(root, &session.id, &turn)?;
        }
    }

    if !session.mark_submitted() {
        anyhow::bail!("session is not accepting input");
    }
    session_log::mark_status(root, &session.id, "streaming")?;

    let request = session.request();
    let outcome = block_on(drive(root, &api, &mut session, &request))?;
    finish(root, &mut session, outcome)
}

/// Consume the frame stream, persisting and rendering as frames arrive.
/// Ctrl-C aborts the transfer; everything already received stays on disk.
async fn drive(
    root: &Path,
    api: &ApiClient,
    session: &mut ChatSession,
    request: &SessionRequest,
) -> anyhow::Result<RunOutcome> {
    let mut stream = api.run_session(session.agent, &session.id, request);

    let outcome = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break RunOutcome::Interrupted,
            frame = stream.next() => match frame {
                None => {
                    break RunOutcome::StreamError(
                        "stream ended before completion".to_string(),
                    )
                }
                Some(Err(e)) => break RunOutcome::StreamError(e.to_string()),
                Some(Ok(frame)) => {
                    match &frame {
                        Frame::Control(ControlFrame::Text { delta }) => {
                            print!("{delta}");
                            let _ = std::io::stdout().flush();
                        }
                        Frame::Data(event) => {
                            session_log::append_event(root, &session.id, event)?;
                            render_event(event);
                        }
                        Frame::Control(_) => {}
                    }

                    let terminal = frame.is_terminal();
                    if let Some(reply) = session.apply(frame) {
                        session_log::append_message(root, &session.id, &reply)?;
                    }
                    if terminal {
                        break RunOutcome::Completed;
                    }
                }
            },
        }
    };

    if matches!(outcome, RunOutcome::Interrupted) {
        stream.abort();
    }
    Ok(outcome)
}

fn finish(root: &Path, session: &mut ChatSession, outcome: RunOutcome) -> anyhow::Result<()> {
    match outcome {
        RunOutcome::Interrupted => {
            if let Some(reply) = session.abort() {
                session_log::append_message(root, &session.id, &reply)?;
            }
            session_log::mark_status(root, &session.id, "aborted")?;
            println!("\nAborted. Partial output kept in session {}.", session.id);
            Ok(())
        }
        RunOutcome::StreamError(message) => {
            if let Some(reply) = session.fail(&message) {
                session_log::append_message(root, &session.id, &reply)?;
            }
            session_log::mark_status(root, &session.id, "errored")?;
            eprintln!("\nRetry with: workroom run {} --session {} --regenerate", session.agent, session.id);
            anyhow::bail!("stream failed: {message}");
        }
        RunOutcome::Completed => {
            if session.status() == SessionStatus::Errored {
                session_log::mark_status(root, &session.id, "errored")?;
                let message = session.error().unwrap_or("agent reported an error").to_string();
                eprintln!("\nRetry with: workroom run {} --session {} --regenerate", session.agent, session.id);
                anyhow::bail!("agent failed: {message}");
            }

            session_log::mark_status(root, &session.id, "done")
                .context("failed to update session status")?;
            println!("\n---");
            println!(
                "Session: {}  Turns: {}  Artifacts: {}",
                session.id,
                session.messages().len(),
                session.data().len()
            );
            println!("Next: workroom report {} {}", session.id, default_view(session.agent));
            Ok(())
        }
    }
}

fn render_event(event: &DataEvent) {
    match event {
        DataEvent::FileWrite { data } => {
            tracing::info!(
                path = %data.content.path,
                status = data.content.status.as_str(),
                "file write"
            );
        }
        _ => {
            tracing::info!(kind = event.kind(), id = %event.artifact_id(), "artifact");
        }
    }
}

/// First line of the message, capped for the session list.
fn truncate_title(message: &str) -> String {
    let line = message.lines().next().unwrap_or("");
    let mut title: String = line.chars().take(57).collect();
    if line.chars().count() > 57 {
        title.push_str("...");
    }
    title
}

fn default_view(agent: AgentKind) -> &'static str {
    match agent {
        AgentKind::TestGeneration | AgentKind::ApiTestGeneration => "tests",
        AgentKind::RequirementsBreakdown => "requirements",
        AgentKind::RootCauseAnalysis => "rca",
        AgentKind::CodeReview => "summary",
    }
}
