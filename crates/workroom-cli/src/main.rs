mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::project::ProjectSubcommand;
use cmd::sessions::SessionsSubcommand;
use std::path::PathBuf;
use workroom_core::provider::{AgentKind, Provider};

#[derive(Parser)]
#[command(
    name = "workroom",
    about = "Workroom agents — stream hosted SDLC agent runs and read their reports offline",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .workroom/ or .git/)
    #[arg(long, global = true, env = "WORKROOM_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a .workroom/ directory in the current project
    Init,

    /// Store an API token for this user
    Login {
        /// Bearer token for the Workroom API
        #[arg(long)]
        token: String,

        /// Override the API base URL for this user
        #[arg(long)]
        api_base: Option<String>,

        /// Display name to record alongside the token
        #[arg(long)]
        name: Option<String>,
    },

    /// Forget the stored token
    Logout,

    /// Connect a provider (jira, github, datadog, ...)
    Connect {
        /// Provider to connect
        provider: Provider,

        /// Provider credential (API token, key, ...)
        #[arg(long)]
        token: String,

        /// Instance base URL (required for jira, confluence, datadog, grafana)
        #[arg(long)]
        base_url: Option<String>,

        /// Organization slug (required for sentry, pagerduty)
        #[arg(long)]
        org: Option<String>,
    },

    /// Disconnect a provider and drop its project context
    Disconnect {
        /// Provider to disconnect
        provider: Provider,
    },

    /// Show connection status for every provider
    Connections,

    /// Manage project context (documents, tickets, files, spec, PR)
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },

    /// Run an agent session and stream its output
    Run {
        /// Agent to run (code_review, test_generation, api_test_generation,
        /// requirements_breakdown, root_cause_analysis)
        agent: AgentKind,

        /// Resume an existing session instead of creating one
        #[arg(long)]
        session: Option<String>,

        /// Message to send (omit to auto-start a fresh session)
        #[arg(long)]
        message: Option<String>,

        /// Ask the agent to open a pull request after the run
        #[arg(long)]
        create_pr: bool,

        /// Resubmit the last request of a finished or failed session
        #[arg(long, conflicts_with = "message")]
        regenerate: bool,
    },

    /// List or delete saved sessions
    Sessions {
        #[command(subcommand)]
        subcommand: Option<SessionsSubcommand>,
    },

    /// Render a report view from a saved session
    Report {
        /// Session id
        session_id: String,

        /// View: tests, requirements, rca, automation or summary
        #[arg(default_value = "summary")]
        view: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Login {
            token,
            api_base,
            name,
        } => cmd::login::run(&root, &token, api_base.as_deref(), name.as_deref()),
        Commands::Logout => cmd::login::run_logout(&root),
        Commands::Connect {
            provider,
            token,
            base_url,
            org,
        } => cmd::connect::run(&root, provider, &token, base_url.as_deref(), org.as_deref()),
        Commands::Disconnect { provider } => cmd::connect::run_disconnect(&root, provider),
        Commands::Connections => cmd::connect::run_list(&root, cli.json),
        Commands::Project { subcommand } => cmd::project::run(&root, subcommand, cli.json),
        Commands::Run {
            agent,
            session,
            message,
            create_pr,
            regenerate,
        } => cmd::run::run(
            &root,
            agent,
            session.as_deref(),
            message.as_deref(),
            create_pr,
            regenerate,
        ),
        Commands::Sessions { subcommand } => cmd::sessions::run(&root, subcommand, cli.json),
        Commands::Report { session_id, view } => {
            cmd::report::run(&root, &session_id, &view, cli.json)
        }
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
