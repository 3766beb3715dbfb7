use crate::cmd::{api_client, block_on};
use crate::output;
use agent_client::join_partial;
use anyhow::Context;
use clap::Subcommand;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use workroom_core::connection::ConnectionStore;
use workroom_core::error::WorkroomError;
use workroom_core::project::{
    ApiSpecRef, DocumentRef, LogResource, OutputFormats, ProjectConfig, TicketRef,
};
use workroom_core::provider::Provider;

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// Show the assembled project context
    Show,

    /// Attach a provider document (Confluence page, Notion doc, Figma file, ...)
    AddDoc {
        /// Source provider
        provider: Provider,

        /// Provider-side document id
        id: String,

        /// Human-readable title
        title: String,

        /// Browser URL of the document
        #[arg(long)]
        url: Option<String>,
    },

    /// Detach a provider document
    RemoveDoc {
        provider: Provider,

        /// Provider-side document id
        id: String,
    },

    /// Manage the Jira ticket selection
    Tickets {
        #[command(subcommand)]
        subcommand: TicketsSubcommand,
    },

    /// Manage uploaded context files
    Files {
        #[command(subcommand)]
        subcommand: FilesSubcommand,
    },

    /// Manage the API spec selection
    Spec {
        #[command(subcommand)]
        subcommand: SpecSubcommand,
    },

    /// Manage the pull request selection
    Pr {
        #[command(subcommand)]
        subcommand: PrSubcommand,
    },

    /// Choose which output formats agents should produce
    Formats {
        /// Produce manual test cases
        #[arg(long)]
        manual: bool,

        /// Produce automation scripts
        #[arg(long)]
        automation: bool,
    },

    /// Search a logging service for monitors/dashboards (cached per query)
    Resources {
        /// Logging provider (datadog, sentry, ...)
        provider: Provider,

        /// Search query
        query: String,
    },

    /// Manage the log-resource search cache
    Cache {
        #[command(subcommand)]
        subcommand: CacheSubcommand,
    },

    /// Clear the whole project context
    Reset,
}

#[derive(Subcommand)]
pub enum TicketsSubcommand {
    /// Fetch tickets for one or more project keys, replacing the selection
    Fetch {
        /// Jira project keys (e.g. PAY CORE)
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Drop the ticket selection
    Clear,
}

#[derive(Subcommand)]
pub enum FilesSubcommand {
    /// Upload files and attach them to the project context
    Add {
        /// Files to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Detach an uploaded file by its canonical server name
    Remove { name: String },
}

#[derive(Subcommand)]
pub enum SpecSubcommand {
    /// Select an API spec by id and display name (replaces any prior pick)
    Select { id: String, name: String },

    /// Drop the API spec selection
    Clear,
}

#[derive(Subcommand)]
pub enum PrSubcommand {
    /// Validate a pull request URL and select it (replaces any prior pick)
    Select { url: String },

    /// Drop the pull request selection
    Clear,
}

#[derive(Subcommand)]
pub enum CacheSubcommand {
    /// Drop cached search results
    Clear {
        /// Only this provider's cache (omit for all)
        #[arg(long)]
        provider: Option<Provider>,
    },
}

pub fn run(root: &Path, subcmd: ProjectSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProjectSubcommand::Show => show(root, json),
        ProjectSubcommand::AddDoc {
            provider,
            id,
            title,
            url,
        } => add_doc(root, provider, id, title, url),
        ProjectSubcommand::RemoveDoc { provider, id } => remove_doc(root, provider, &id),
        ProjectSubcommand::Tickets { subcommand } => match subcommand {
            TicketsSubcommand::Fetch { keys } => tickets_fetch(root, keys),
            TicketsSubcommand::Clear => tickets_clear(root),
        },
        ProjectSubcommand::Files { subcommand } => match subcommand {
            FilesSubcommand::Add { paths } => files_add(root, paths),
            FilesSubcommand::Remove { name } => files_remove(root, &name),
        },
        ProjectSubcommand::Spec { subcommand } => match subcommand {
            SpecSubcommand::Select { id, name } => spec_select(root, id, name),
            SpecSubcommand::Clear => spec_clear(root),
        },
        ProjectSubcommand::Pr { subcommand } => match subcommand {
            PrSubcommand::Select { url } => pr_select(root, &url),
            PrSubcommand::Clear => pr_clear(root),
        },
        ProjectSubcommand::Formats { manual, automation } => formats(root, manual, automation),
        ProjectSubcommand::Resources { provider, query } => resources(root, provider, &query),
        ProjectSubcommand::Cache { subcommand } => match subcommand {
            CacheSubcommand::Clear { provider } => cache_clear(root, provider),
        },
        ProjectSubcommand::Reset => reset(root),
    }
}

// ---------------------------------------------------------------------------
// Show
// ---------------------------------------------------------------------------

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let project = ProjectConfig::load(root).context("failed to load project context")?;

    if json {
        // The stored blob verbatim, cache included.
        return output::print_json(&project);
    }

    println!("DOCUMENTS");
    let mut any_docs = false;
    for provider in Provider::all() {
        for doc in project.documents(*provider) {
            any_docs = true;
            println!("  {:<12} {} ({})", provider.as_str(), doc.title, doc.id);
        }
    }
    if !any_docs {
        println!("  (none)");
    }

    println!("\nTICKETS");
    if project.tickets.is_empty() {
        println!("  (none)");
    } else {
        println!("  projects: {}", project.ticket_projects.join(", "));
        for ticket in &project.tickets {
            println!("  {:<12} {}", ticket.key, ticket.summary);
        }
    }

    println!("\nFILES");
    if project.files.is_empty() {
        println!("  (none)");
    } else {
        for file in &project.files {
            match file.size {
                Some(size) => {
                    println!("  {} ({}, {} bytes)", file.name, file.original_name, size)
                }
                None => println!("  {} ({})", file.name, file.original_name),
            }
        }
    }

    println!("\nSELECTIONS");
    match &project.api_spec {
        Some(spec) => println!("  api spec:     {} ({})", spec.name, spec.id),
        None => println!("  api spec:     (none)"),
    }
    match &project.pull_request {
        Some(pr) => println!(
            "  pull request: #{} {} [{}] {} <- {}",
            pr.number, pr.title, pr.state, pr.base_branch, pr.head_branch
        ),
        None => println!("  pull request: (none)"),
    }

    println!("\nFORMATS");
    println!(
        "  manual: {}  automation: {}",
        on_off(project.formats.manual),
        on_off(project.formats.automation)
    );

    Ok(())
}

fn on_off(v: bool) -> &'static str {
    if v {
        "on"
    } else {
        "off"
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

fn add_doc(
    root: &Path,
    provider: Provider,
    id: String,
    title: String,
    url: Option<String>,
) -> anyhow::Result<()> {
    let mut project = ProjectConfig::load(root).context("failed to load project context")?;
    project.add_document(provider, DocumentRef { id: id.clone(), title, url });
    project.save(root).context("failed to save project context")?;
    println!("Added {provider} document {id}.");
    Ok(())
}

fn remove_doc(root: &Path, provider: Provider, id: &str) -> anyhow::Result<()> {
    let mut project = ProjectConfig::load(root).context("failed to load project context")?;
    if !project.remove_document(provider, id) {
        anyhow::bail!("no {provider} document with id {id}");
    }
    project.save(root).context("failed to save project context")?;
    println!("Removed {provider} document {id}.");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

fn tickets_fetch(root: &Path, keys: Vec<String>) -> anyhow::Result<()> {
    let connections = ConnectionStore::load(root).context("failed to load connections")?;
    if !connections.is_connected(Provider::Jira) {
        return Err(WorkroomError::NotConnected(Provider::Jira.to_string()).into());
    }

    let api = api_client(root)?;
    let outcome = block_on(async {
        let items = keys
            .iter()
            .map(|key| (key.clone(), api.fetch_tickets(key)))
            .collect();
        join_partial(items).await
    });

    if outcome.is_total_failure() {
        anyhow::bail!(
            "ticket fetch failed: {}",
            outcome.warning().unwrap_or_default()
        );
    }
    if let Some(warning) = outcome.warning() {
        eprintln!("warning: {warning}");
    }

    let failed: HashSet<&str> = outcome.failed.iter().map(|(key, _)| key.as_str()).collect();
    let fetched_keys: Vec<String> = keys
        .iter()
        .filter(|k| !failed.contains(k.as_str()))
        .cloned()
        .collect();
    let tickets: Vec<TicketRef> = outcome.succeeded.into_iter().flatten().collect();

    let mut project = ProjectConfig::load(root).context("failed to load project context")?;
    println!(
        "Fetched {} ticket(s) from {}.",
        tickets.len(),
        fetched_keys.join(", ")
    );
    project.set_tickets(tickets, fetched_keys);
    project.save(root).context("failed to save project context")?;
    Ok(())
}

fn tickets_clear(root: &Path) -> anyhow::Result<()> {
    let mut project = ProjectConfig::load(root).context("failed to load project context")?;
    project.clear_tickets();
    project.save(root).context("failed to save project context")?;
    println!("Cleared ticket selection.");
    Ok(())
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

fn files_add(root: &Path, paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let api = api_client(root)?;
    let outcome = block_on(api.upload_files(&paths));

    if outcome.is_total_failure() {
        anyhow::bail!("upload failed: {}", outcome.warning().unwrap_or_default());
    }
    if let Some(warning) = outcome.warning() {
        eprintln!("warning: {warning}");
    }

    let mut project = ProjectConfig::load(root).context("failed to load project context")?;
    for file in &outcome.succeeded {
        println!("  uploaded: {} ({})", file.name, file.original_name);
    }
    project.add_files(outcome.succeeded);
    project.save(root).context("failed to save project context")?;
    Ok(())
}

fn files_remove(root: &Path, name: &str) -> anyhow::Result<()> {
    let mut project = ProjectConfig::load(root).context("failed to load project context")?;
    if !project.remove_file(name) {
        anyhow::bail!("no uploaded file named {name}");
    }
    project.save(root).context("failed to save project context")?;
    println!("Removed file {name}.");
    Ok(())
}

// ---------------------------------------------------------------------------
// Single selections
// ---------------------------------------------------------------------------

fn spec_select(root: &Path, id: String, name: String) -> anyhow::Result<()> {
    let mut project = ProjectConfig::load(root).context("failed to load project context")?;
    println!("Selected API spec {name}.");
    project.select_api_spec(ApiSpecRef { id, name });
    project.save(root).context("failed to save project context")?;
    Ok(())
}

fn spec_clear(root: &Path) -> anyhow::Result<()> {
    let mut project = ProjectConfig::load(root).context("failed to load project context")?;
    project.clear_api_spec();
    project.save(root).context("failed to save project context")?;
    println!("Cleared API spec selection.");
    Ok(())
}

fn pr_select(root: &Path, url: &str) -> anyhow::Result<()> {
    let api = api_client(root)?;
    let pr = block_on(api.validate_pull_request(url))
        .context("failed to validate pull request")?;

    let mut project = ProjectConfig::load(root).context("failed to load project context")?;
    println!(
        "Selected PR #{}: {} [{}] {} <- {}",
        pr.number, pr.title, pr.state, pr.base_branch, pr.head_branch
    );
    project.select_pull_request(pr);
    project.save(root).context("failed to save project context")?;
    Ok(())
}

fn pr_clear(root: &Path) -> anyhow::Result<()> {
    let mut project = ProjectConfig::load(root).context("failed to load project context")?;
    project.clear_pull_request();
    project.save(root).context("failed to save project context")?;
    println!("Cleared pull request selection.");
    Ok(())
}

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

fn formats(root: &Path, manual: bool, automation: bool) -> anyhow::Result<()> {
    if !manual && !automation {
        anyhow::bail!("select at least one of --manual or --automation");
    }

    let mut project = ProjectConfig::load(root).context("failed to load project context")?;
    project.set_formats(OutputFormats { manual, automation });
    project.save(root).context("failed to save project context")?;
    println!(
        "Formats: manual {} / automation {}",
        on_off(manual),
        on_off(automation)
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Log resources
// ---------------------------------------------------------------------------

fn resources(root: &Path, provider: Provider, query: &str) -> anyhow::Result<()> {
    if !provider.is_logging_service() {
        anyhow::bail!("{provider} is not a logging service");
    }

    let connections = ConnectionStore::load(root).context("failed to load connections")?;
    if !connections.is_connected(provider) {
        return Err(WorkroomError::NotConnected(provider.to_string()).into());
    }

    let mut project = ProjectConfig::load(root).context("failed to load project context")?;

    // A cached empty list is a real answer; only a miss triggers a fetch.
    if let Some(cached) = project.cached_log_resources(provider, query) {
        println!("{} result(s) for \"{query}\" (cached):", cached.len());
        for resource in cached {
            print_resource(resource);
        }
        return Ok(());
    }

    let api = api_client(root)?;
    let results = block_on(api.search_log_resources(provider, query))
        .with_context(|| format!("failed to search {provider}"))?;

    println!("{} result(s) for \"{query}\":", results.len());
    for resource in &results {
        print_resource(resource);
    }

    project.cache_log_resources(provider, query, results);
    project.save(root).context("failed to save project context")?;
    Ok(())
}

fn print_resource(resource: &LogResource) {
    match &resource.kind {
        Some(kind) => println!("  {:<28} {} [{}]", resource.id, resource.name, kind),
        None => println!("  {:<28} {}", resource.id, resource.name),
    }
}

fn cache_clear(root: &Path, provider: Option<Provider>) -> anyhow::Result<()> {
    let mut project = ProjectConfig::load(root).context("failed to load project context")?;
    match provider {
        Some(p) => {
            project.clear_provider_log_cache(p);
            println!("Cleared {p} resource cache.");
        }
        None => {
            project.clear_log_cache();
            println!("Cleared resource cache.");
        }
    }
    project.save(root).context("failed to save project context")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

fn reset(root: &Path) -> anyhow::Result<()> {
    let mut project = ProjectConfig::load(root).context("failed to load project context")?;
    project.reset();
    project.save(root).context("failed to save project context")?;
    println!("Project context reset.");
    Ok(())
}
