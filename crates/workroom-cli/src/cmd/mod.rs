pub mod connect;
pub mod init;
pub mod login;
pub mod project;
pub mod report;
pub mod run;
pub mod sessions;

use agent_client::ApiClient;
use anyhow::Context;
use std::future::Future;
use std::path::Path;
use workroom_core::config::ClientConfig;
use workroom_core::user::UserStore;

/// Build an authenticated API client from the stored config and token.
pub(crate) fn api_client(root: &Path) -> anyhow::Result<ApiClient> {
    let config = ClientConfig::load(root).context("failed to load config")?;
    let user = UserStore::load(root).context("failed to load user store")?;
    let token = user.resolve_token()?;
    let client = ApiClient::new(config.resolved_api_base(&user), token)?
        .with_request_timeout(config.request_timeout_secs);
    Ok(client)
}

/// Block on a future from synchronous command code.
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    let rt = tokio::runtime::Handle::try_current()
        .map(|_| None)
        .unwrap_or_else(|_| Some(tokio::runtime::Runtime::new().expect("tokio runtime")));

    match rt {
        Some(rt) => rt.block_on(future),
        None => {
            // Already inside a runtime (e.g., integration test)
            tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
        }
    }
}
