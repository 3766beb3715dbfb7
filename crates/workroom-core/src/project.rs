use crate::error::Result;
use crate::paths;
use crate::provider::Provider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// A document/page selected from a provider for agent context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRef {
    pub key: String,
    pub summary: String,
    pub project_key: String,
}

/// An uploaded context file under its canonical server name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub original_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSpecRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub url: String,
    pub number: u64,
    pub title: String,
    pub author: String,
    pub head_branch: String,
    pub base_branch: String,
    pub state: String,
}

/// A monitor/dashboard/alert catalog entry from a logging service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogResource {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputFormats {
    pub manual: bool,
    pub automation: bool,
}

impl Default for OutputFormats {
    fn default() -> Self {
        OutputFormats {
            manual: true,
            automation: false,
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

/// Everything the user has curated for the current project: provider
/// document selections, tickets, uploaded files, the single API-spec and
/// pull-request selections, output-format flags, and the logging-service
/// search cache. Persisted as one JSON blob whose schema is exactly this
/// struct; a missing file loads as the empty default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub documents: HashMap<Provider, Vec<DocumentRef>>,
    #[serde(default)]
    pub tickets: Vec<TicketRef>,
    /// Project keys the current tickets were fetched for.
    #[serde(default)]
    pub ticket_projects: Vec<String>,
    #[serde(default)]
    pub files: Vec<UploadedFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_spec: Option<ApiSpecRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<PullRequestRef>,
    #[serde(default)]
    pub formats: OutputFormats,
    /// provider → search key → cached results. An empty vec is a real entry:
    /// it means the search ran and found nothing, and must not refetch.
    #[serde(default)]
    log_cache: HashMap<Provider, HashMap<String, Vec<LogResource>>>,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            documents: HashMap::new(),
            tickets: Vec::new(),
            ticket_projects: Vec::new(),
            files: Vec::new(),
            api_spec: None,
            pull_request: None,
            formats: OutputFormats::default(),
            log_cache: HashMap::new(),
            last_updated: Utc::now(),
        }
    }
}

impl ProjectConfig {
    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::project_path(root);
        match crate::io::read_if_exists(&path)? {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Ok(ProjectConfig::default()),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::project_path(root);
        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    pub fn documents(&self, provider: Provider) -> &[DocumentRef] {
        self.documents
            .get(&provider)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Upsert by document id; re-adding an id replaces its entry in place.
    pub fn add_document(&mut self, provider: Provider, doc: DocumentRef) {
        let docs = self.documents.entry(provider).or_default();
        if let Some(existing) = docs.iter_mut().find(|d| d.id == doc.id) {
            *existing = doc;
        } else {
            docs.push(doc);
        }
        self.touch();
    }

    pub fn remove_document(&mut self, provider: Provider, id: &str) -> bool {
        let Some(docs) = self.documents.get_mut(&provider) else {
            return false;
        };
        let before = docs.len();
        docs.retain(|d| d.id != id);
        let removed = docs.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    // -----------------------------------------------------------------------
    // Tickets
    // -----------------------------------------------------------------------

    /// Replace the ticket selection wholesale, remembering which project
    /// keys produced it.
    pub fn set_tickets(&mut self, tickets: Vec<TicketRef>, project_keys: Vec<String>) {
        self.tickets = tickets;
        self.ticket_projects = project_keys;
        self.touch();
    }

    pub fn clear_tickets(&mut self) {
        self.tickets.clear();
        self.ticket_projects.clear();
        self.touch();
    }

    // -----------------------------------------------------------------------
    // Files
    // -----------------------------------------------------------------------

    /// Append uploads, deduplicating on canonical server name.
    pub fn add_files(&mut self, files: Vec<UploadedFile>) {
        for file in files {
            if !self.files.iter().any(|f| f.name == file.name) {
                self.files.push(file);
            }
        }
        self.touch();
    }

    pub fn remove_file(&mut self, name: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.name != name);
        let removed = self.files.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    // -----------------------------------------------------------------------
    // Single selections
    // -----------------------------------------------------------------------

    /// Replaces any prior selection; there is never more than one API spec.
    pub fn select_api_spec(&mut self, spec: ApiSpecRef) {
        self.api_spec = Some(spec);
        self.touch();
    }

    pub fn clear_api_spec(&mut self) {
        self.api_spec = None;
        self.touch();
    }

    /// Replaces any prior selection; there is never more than one PR.
    pub fn select_pull_request(&mut self, pr: PullRequestRef) {
        self.pull_request = Some(pr);
        self.touch();
    }

    pub fn clear_pull_request(&mut self) {
        self.pull_request = None;
        self.touch();
    }

    pub fn set_formats(&mut self, formats: OutputFormats) {
        self.formats = formats;
        self.touch();
    }

    // -----------------------------------------------------------------------
    // Log-resource cache
    // -----------------------------------------------------------------------

    /// `None` means the search never ran and the caller should fetch.
    /// `Some(&[])` means it ran and found nothing — do not refetch.
    pub fn cached_log_resources(&self, provider: Provider, query: &str) -> Option<&[LogResource]> {
        self.log_cache
            .get(&provider)
            .and_then(|m| m.get(query))
            .map(|v| v.as_slice())
    }

    pub fn cache_log_resources(
        &mut self,
        provider: Provider,
        query: &str,
        results: Vec<LogResource>,
    ) {
        self.log_cache
            .entry(provider)
            .or_default()
            .insert(query.to_string(), results);
        self.touch();
    }

    /// Invalidation is caller-driven only; nothing here expires on its own.
    pub fn clear_log_cache(&mut self) {
        self.log_cache.clear();
        self.touch();
    }

    pub fn clear_provider_log_cache(&mut self, provider: Provider) {
        self.log_cache.remove(&provider);
        self.touch();
    }

    // -----------------------------------------------------------------------
    // Resets
    // -----------------------------------------------------------------------

    pub fn reset(&mut self) {
        *self = ProjectConfig::default();
    }

    /// Drop everything tied to one provider: its documents and cache slice,
    /// plus tickets for jira and the PR selection for github.
    pub fn reset_provider(&mut self, provider: Provider) {
        self.documents.remove(&provider);
        self.log_cache.remove(&provider);
        if provider == Provider::Jira {
            self.tickets.clear();
            self.ticket_projects.clear();
        }
        if provider == Provider::Github {
            self.pull_request = None;
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
