use crate::output;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use workroom_core::session_log;

#[derive(Subcommand)]
pub enum SessionsSubcommand {
    /// List saved sessions, newest first
    List {
        /// Maximum number to show (0 = all)
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Delete a session and its transcript
    Delete {
        /// Session id
        id: String,
    },
}

pub fn run(root: &Path, subcmd: Option<SessionsSubcommand>, json: bool) -> anyhow::Result<()> {
    match subcmd.unwrap_or(SessionsSubcommand::List { limit: 20 }) {
        SessionsSubcommand::List { limit } => list(root, limit, json),
        SessionsSubcommand::Delete { id } => delete(root, &id),
    }
}

fn list(root: &Path, limit: usize, json: bool) -> anyhow::Result<()> {
    let sessions = session_log::list_sessions(root, limit).context("failed to list sessions")?;

    if json {
        return output::print_json(&sessions);
    }

    if sessions.is_empty() {
        println!("No sessions. Run: workroom run <agent>");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = sessions
        .iter()
        .map(|s| {
            vec![
                s.id.clone(),
                s.agent.to_string(),
                s.status.clone(),
                short_timestamp(&s.updated_at),
                s.title.clone(),
            ]
        })
        .collect();
    output::print_table(&["ID", "AGENT", "STATUS", "UPDATED", "TITLE"], rows);
    Ok(())
}

fn delete(root: &Path, id: &str) -> anyhow::Result<()> {
    session_log::delete_session(root, id)?;
    println!("Deleted session {id}.");
    Ok(())
}

/// rfc3339 down to seconds; anything shorter passes through untouched.
fn short_timestamp(ts: &str) -> String {
    ts.get(..19).unwrap_or(ts).to_string()
}
