use crate::cmd::{api_client, block_on};
use crate::output;
use agent_client::CredentialPayload;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::path::Path;
use workroom_core::connection::ConnectionStore;
use workroom_core::error::WorkroomError;
use workroom_core::project::ProjectConfig;
use workroom_core::provider::Provider;

pub fn run(
    root: &Path,
    provider: Provider,
    token: &str,
    base_url: Option<&str>,
    org: Option<&str>,
) -> anyhow::Result<()> {
    if provider.needs_base_url() && base_url.is_none() {
        anyhow::bail!("--base-url is required for {provider}");
    }
    if provider.needs_org() && org.is_none() {
        anyhow::bail!("--org is required for {provider}");
    }

    let api = api_client(root)?;
    let credentials = CredentialPayload {
        token: token.to_string(),
        base_url: base_url.map(str::to_string),
        org: org.map(str::to_string),
    };

    let record = block_on(api.create_integration(provider, &credentials))
        .with_context(|| format!("failed to connect {provider}"))?;

    let mut store = ConnectionStore::load(root).context("failed to load connections")?;
    store.connect(provider, record.id);
    store.save(root).context("failed to save connections")?;

    println!("Connected {provider} (integration {}).", record.id);
    Ok(())
}

pub fn run_disconnect(root: &Path, provider: Provider) -> anyhow::Result<()> {
    let mut store = ConnectionStore::load(root).context("failed to load connections")?;
    let Some(id) = store.integration_id(provider) else {
        return Err(WorkroomError::NotConnected(provider.to_string()).into());
    };

    let api = api_client(root)?;
    block_on(api.delete_integration(id))
        .with_context(|| format!("failed to disconnect {provider}"))?;

    store.disconnect(provider);
    store.save(root).context("failed to save connections")?;

    // Project context referencing the provider is stale once the integration
    // is gone.
    let mut project = ProjectConfig::load(root).context("failed to load project context")?;
    project.reset_provider(provider);
    project.save(root).context("failed to save project context")?;

    println!("Disconnected {provider}.");
    Ok(())
}

pub fn run_list(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = ConnectionStore::load(root).context("failed to load connections")?;

    if json {
        #[derive(serde::Serialize)]
        struct Row<'a> {
            provider: &'static str,
            connected: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            integration_id: Option<i64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            connected_at: Option<&'a DateTime<Utc>>,
        }

        let rows: Vec<Row> = Provider::all()
            .iter()
            .map(|p| {
                let conn = store.get(*p).filter(|c| c.connected);
                Row {
                    provider: p.as_str(),
                    connected: conn.is_some(),
                    integration_id: conn.map(|c| c.integration_id),
                    connected_at: conn.map(|c| &c.connected_at),
                }
            })
            .collect();
        return output::print_json(&rows);
    }

    let rows: Vec<Vec<String>> = Provider::all()
        .iter()
        .map(|p| match store.get(*p).filter(|c| c.connected) {
            Some(c) => vec![
                p.as_str().to_string(),
                "connected".to_string(),
                c.integration_id.to_string(),
                c.connected_at.format("%Y-%m-%d %H:%M").to_string(),
            ],
            None => vec![
                p.as_str().to_string(),
                "-".to_string(),
                "-".to_string(),
                "-".to_string(),
            ],
        })
        .collect();
    output::print_table(&["PROVIDER", "STATUS", "INTEGRATION", "SINCE"], rows);
    Ok(())
}
