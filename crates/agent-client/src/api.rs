use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use workroom_core::project::{LogResource, PullRequestRef, TicketRef, UploadedFile};
use workroom_core::provider::{AgentKind, Provider};

use crate::bulk::{self, BulkOutcome};
use crate::session::SessionStream;
use crate::types::{envelope_message, ApiEnvelope, SessionRequest};
use crate::{AgentClientError, Result};

// ─── Resource types ───────────────────────────────────────────────────────

/// Secret material for creating an integration. Serialized into the create
/// request and never persisted locally; what the stores keep afterwards is
/// only the returned integration id.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialPayload {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
}

/// A server-side integration row. The id is what `disconnect` later deletes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationRecord {
    pub id: i64,
    pub provider: Provider,
}

#[derive(Serialize)]
struct CreateIntegrationBody<'a> {
    provider: Provider,
    #[serde(flatten)]
    credentials: &'a CredentialPayload,
}

#[derive(Deserialize)]
struct TicketWire {
    key: String,
    summary: String,
}

#[derive(Deserialize)]
struct PullRequestWire {
    number: u64,
    title: String,
    author: String,
    head_branch: String,
    base_branch: String,
    state: String,
}

static PR_URL_RE: OnceLock<Regex> = OnceLock::new();

fn pr_url_re() -> &'static Regex {
    PR_URL_RE.get_or_init(|| Regex::new(r"github\.com/[^/\s]+/[^/\s]+/pull/\d+(/|$)").unwrap())
}

// ─── ApiClient ────────────────────────────────────────────────────────────

/// Typed client for the Workroom platform API.
///
/// Wraps one `reqwest` client. Every non-streaming endpoint speaks the
/// [`ApiEnvelope`] contract: a non-2xx status or `success == false` both
/// surface as [`AgentClientError::Api`] with the server's message.
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    token: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let base: String = base.into();
        Ok(ApiClient {
            http,
            base: base.trim_end_matches('/').to_string(),
            token: token.into(),
            timeout: Duration::from_secs(30),
        })
    }

    /// Per-request timeout for the non-streaming endpoints. Run streams are
    /// not subject to it; they end on a terminal frame or cancellation.
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{}", self.base, path))
            .bearer_auth(&self.token)
            .timeout(self.timeout)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}{}", self.base, path))
            .bearer_auth(&self.token)
            .timeout(self.timeout)
    }

    fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .delete(format!("{}{}", self.base, path))
            .bearer_auth(&self.token)
            .timeout(self.timeout)
    }

    // ── Integrations ──

    pub async fn create_integration(
        &self,
        provider: Provider,
        credentials: &CredentialPayload,
    ) -> Result<IntegrationRecord> {
        let body = CreateIntegrationBody {
            provider,
            credentials,
        };
        let response = self.post("/integrations").json(&body).send().await?;
        decode(response).await
    }

    pub async fn list_integrations(&self) -> Result<Vec<IntegrationRecord>> {
        let response = self.get("/integrations").send().await?;
        decode(response).await
    }

    pub async fn delete_integration(&self, id: i64) -> Result<()> {
        let response = self.delete(&format!("/integrations/{id}")).send().await?;
        expect_ok(response).await
    }

    // ── Uploads ──

    /// Upload one context file. The server assigns the canonical name the
    /// project store keeps.
    pub async fn upload_file(&self, path: &Path) -> Result<UploadedFile> {
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(name)
            .mime_str(mime.essence_str())?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self.post("/files/upload").multipart(form).send().await?;
        decode(response).await
    }

    /// Upload several files, tolerating per-file failure. A file that cannot
    /// be read fails locally without a request; the rest still go out.
    pub async fn upload_files(&self, paths: &[PathBuf]) -> BulkOutcome<UploadedFile> {
        let items = paths
            .iter()
            .map(|p| (p.display().to_string(), self.upload_file(p)))
            .collect();
        bulk::join_partial(items).await
    }

    // ── Pull requests ──

    /// Validate a GitHub pull-request URL and fetch its metadata. The URL
    /// shape is checked locally first; anything that is not
    /// `github.com/{owner}/{repo}/pull/{number}` never reaches the server.
    pub async fn validate_pull_request(&self, url: &str) -> Result<PullRequestRef> {
        if !pr_url_re().is_match(url) {
            return Err(AgentClientError::InvalidPullRequestUrl(url.to_string()));
        }
        let response = self
            .post("/github/pull-request")
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;
        let wire: PullRequestWire = decode(response).await?;
        Ok(PullRequestRef {
            url: url.to_string(),
            number: wire.number,
            title: wire.title,
            author: wire.author,
            head_branch: wire.head_branch,
            base_branch: wire.base_branch,
            state: wire.state,
        })
    }

    // ── Catalogs ──

    /// Search a logging service's monitor/dashboard catalog. Results feed
    /// the project store's per-provider cache.
    pub async fn search_log_resources(
        &self,
        provider: Provider,
        query: &str,
    ) -> Result<Vec<LogResource>> {
        let response = self
            .get(&format!("/integrations/{}/resources", provider.as_str()))
            .query(&[("query", query)])
            .send()
            .await?;
        decode(response).await
    }

    /// Fetch the open tickets of one Jira project. The project key is
    /// stamped onto every ticket so multi-project selections stay traceable.
    pub async fn fetch_tickets(&self, project_key: &str) -> Result<Vec<TicketRef>> {
        let response = self
            .get("/jira/tickets")
            .query(&[("project", project_key)])
            .send()
            .await?;
        let wire: Vec<TicketWire> = decode(response).await?;
        Ok(wire
            .into_iter()
            .map(|t| TicketRef {
                key: t.key,
                summary: t.summary,
                project_key: project_key.to_string(),
            })
            .collect())
    }

    // ── Runs ──

    /// Open a streaming run against `/agents/{agent}/run`.
    pub fn run_session(
        &self,
        agent: AgentKind,
        session_id: &str,
        request: &SessionRequest,
    ) -> SessionStream {
        SessionStream::open(
            self.http.clone(),
            self.base.clone(),
            self.token.clone(),
            agent,
            session_id.to_string(),
            request.clone(),
        )
    }
}

// ─── Envelope decoding ────────────────────────────────────────────────────

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(api_error(status.as_u16(), body));
    }
    let envelope: ApiEnvelope<T> =
        serde_json::from_str(&body).map_err(|source| AgentClientError::Parse {
            line: body.clone(),
            source,
        })?;
    if !envelope.success {
        return Err(AgentClientError::Api {
            status: status.as_u16(),
            message: envelope
                .message
                .unwrap_or_else(|| "request failed".to_string()),
        });
    }
    envelope.data.ok_or_else(|| AgentClientError::Api {
        status: status.as_u16(),
        message: "response envelope has no data".to_string(),
    })
}

/// Like [`decode`] but for endpoints whose success response carries no data.
async fn expect_ok(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(api_error(status.as_u16(), body));
    }
    let envelope: ApiEnvelope<serde_json::Value> =
        serde_json::from_str(&body).map_err(|source| AgentClientError::Parse {
            line: body.clone(),
            source,
        })?;
    if !envelope.success {
        return Err(AgentClientError::Api {
            status: status.as_u16(),
            message: envelope
                .message
                .unwrap_or_else(|| "request failed".to_string()),
        });
    }
    Ok(())
}

fn api_error(status: u16, body: String) -> AgentClientError {
    let message = match envelope_message(&body) {
        Some(m) => m,
        None => body,
    };
    AgentClientError::Api { status, message }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::io::Write;

    use crate::session::ChatSession;

    fn client(server: &mockito::Server) -> ApiClient {
        ApiClient::new(server.url(), "tok-123").unwrap()
    }

    #[tokio::test]
    async fn create_integration_returns_record() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/integrations")
            .match_header("authorization", "Bearer tok-123")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "provider": "jira",
                "token": "jira-secret",
                "base_url": "https://acme.atlassian.net"
            })))
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"id":7,"provider":"jira"}}"#)
            .create_async()
            .await;

        let payload = CredentialPayload {
            token: "jira-secret".into(),
            base_url: Some("https://acme.atlassian.net".into()),
            org: None,
        };
        let record = client(&server)
            .create_integration(Provider::Jira, &payload)
            .await
            .unwrap();

        assert_eq!(record, IntegrationRecord { id: 7, provider: Provider::Jira });
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn envelope_failure_is_an_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/integrations")
            .with_status(200)
            .with_body(r#"{"success":false,"message":"invalid credentials"}"#)
            .create_async()
            .await;

        let payload = CredentialPayload {
            token: "bad".into(),
            base_url: None,
            org: None,
        };
        let err = client(&server)
            .create_integration(Provider::Sentry, &payload)
            .await
            .unwrap_err();

        let AgentClientError::Api { status, message } = err else {
            panic!("expected api error, got {err:?}");
        };
        assert_eq!(status, 200);
        assert_eq!(message, "invalid credentials");
    }

    #[tokio::test]
    async fn http_failure_surfaces_status_and_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/integrations")
            .with_status(401)
            .with_body(r#"{"success":false,"message":"token expired"}"#)
            .create_async()
            .await;

        let err = client(&server).list_integrations().await.unwrap_err();
        let AgentClientError::Api { status, message } = err else {
            panic!("expected api error, got {err:?}");
        };
        assert_eq!(status, 401);
        assert_eq!(message, "token expired");
    }

    #[tokio::test]
    async fn delete_integration_accepts_bare_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/integrations/42")
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        client(&server).delete_integration(42).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn validate_pull_request_rejects_bad_urls_locally() {
        let server = mockito::Server::new_async().await;
        // No mock registered; rejection must happen before any request.
        for url in [
            "https://gitlab.com/acme/app/pull/12",
            "https://github.com/acme/app/issues/12",
            "not a url",
        ] {
            let err = client(&server).validate_pull_request(url).await.unwrap_err();
            assert!(
                matches!(err, AgentClientError::InvalidPullRequestUrl(_)),
                "expected local rejection for {url}, got {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn validate_pull_request_fetches_metadata() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/github/pull-request")
            .with_status(200)
            .with_body(
                r#"{"success":true,"data":{
                    "number":512,"title":"Fix login retry","author":"mira",
                    "head_branch":"fix/login-retry","base_branch":"main","state":"open"
                }}"#,
            )
            .create_async()
            .await;

        let pr = client(&server)
            .validate_pull_request("https://github.com/acme/app/pull/512")
            .await
            .unwrap();
        assert_eq!(pr.number, 512);
        assert_eq!(pr.head_branch, "fix/login-retry");
        assert_eq!(pr.url, "https://github.com/acme/app/pull/512");
    }

    #[tokio::test]
    async fn search_log_resources_passes_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/integrations/datadog/resources")
            .match_query(mockito::Matcher::UrlEncoded("query".into(), "checkout".into()))
            .with_status(200)
            .with_body(r#"{"success":true,"data":[{"id":"m-1","name":"checkout p99","kind":"monitor"}]}"#)
            .create_async()
            .await;

        let resources = client(&server)
            .search_log_resources(Provider::Datadog, "checkout")
            .await
            .unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].name, "checkout p99");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_tickets_stamps_project_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/jira/tickets")
            .match_query(mockito::Matcher::UrlEncoded("project".into(), "PAY".into()))
            .with_status(200)
            .with_body(
                r#"{"success":true,"data":[
                    {"key":"PAY-1","summary":"Declined cards retried forever"},
                    {"key":"PAY-2","summary":"Add 3DS challenge flow"}
                ]}"#,
            )
            .create_async()
            .await;

        let tickets = client(&server).fetch_tickets("PAY").await.unwrap();
        assert_eq!(tickets.len(), 2);
        assert!(tickets.iter().all(|t| t.project_key == "PAY"));
    }

    #[tokio::test]
    async fn upload_files_tolerates_partial_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/files/upload")
            .match_header(
                "content-type",
                mockito::Matcher::Regex("multipart/form-data.*".to_string()),
            )
            .with_status(200)
            .with_body(
                r#"{"success":true,"data":{"name":"ctx-0a1b-notes.md","original_name":"notes.md"}}"#,
            )
            .create_async()
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let good = dir.path().join("notes.md");
        let mut f = std::fs::File::create(&good).unwrap();
        writeln!(f, "# context").unwrap();
        let missing = dir.path().join("nope.md");

        let outcome = client(&server).upload_files(&[good, missing]).await;
        assert_eq!(outcome.succeeded.len(), 1);
        assert_eq!(outcome.succeeded[0].name, "ctx-0a1b-notes.md");
        assert_eq!(outcome.failed.len(), 1);
        assert!(!outcome.is_total_failure());
        assert!(outcome.warning().unwrap().contains("nope.md"));
    }

    #[tokio::test]
    async fn run_session_streams_frames_until_done() {
        let mut server = mockito::Server::new_async().await;
        let body = concat!(
            r#"{"type":"text","delta":"Reviewing"}"#, "\n",
            r#"{"type":"data-testcase","data":{"artifact_id":"tc-1","content":{"id":"tc-1","type":"edge","title":"Empty cart"}}}"#, "\n",
            r#"{"type":"done"}"#, "\n",
        );
        let mock = server
            .mock("POST", "/agents/test-generation/run")
            .match_query(mockito::Matcher::UrlEncoded("session_id".into(), "s-1".into()))
            .match_header("authorization", "Bearer tok-123")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let mut session = ChatSession::new("s-1", AgentKind::TestGeneration);
        session.ensure_started();
        session.mark_submitted();

        let api = client(&server);
        let mut stream = api.run_session(session.agent, &session.id, &session.request());
        while let Some(frame) = stream.next().await {
            session.apply(frame.unwrap());
        }

        assert_eq!(session.status(), crate::session::SessionStatus::Done);
        assert_eq!(session.data().len(), 1);
        assert_eq!(session.messages().len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn run_session_maps_http_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/agents/code-review/run")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .with_body(r#"{"success":false,"message":"agents are restarting"}"#)
            .create_async()
            .await;

        let api = client(&server);
        let request = crate::types::SessionRequest { messages: vec![] };
        let frames: Vec<_> = api
            .run_session(AgentKind::CodeReview, "s-9", &request)
            .collect()
            .await;

        assert_eq!(frames.len(), 1);
        let err = frames.into_iter().next().unwrap().unwrap_err();
        let AgentClientError::Api { status, message } = err else {
            panic!("expected api error, got {err:?}");
        };
        assert_eq!(status, 503);
        assert_eq!(message, "agents are restarting");
    }

    #[test]
    fn pr_url_shapes() {
        let re = pr_url_re();
        assert!(re.is_match("https://github.com/acme/app/pull/12"));
        assert!(re.is_match("https://github.com/acme/app/pull/12/files"));
        assert!(!re.is_match("https://github.com/acme/app/pulls"));
        assert!(!re.is_match("https://github.com/acme/app/pull/"));
    }

    #[test]
    fn create_body_flattens_credentials() {
        let payload = CredentialPayload {
            token: "t".into(),
            base_url: None,
            org: Some("acme".into()),
        };
        let body = CreateIntegrationBody {
            provider: Provider::Pagerduty,
            credentials: &payload,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["provider"], "pagerduty");
        assert_eq!(json["token"], "t");
        assert_eq!(json["org"], "acme");
        assert!(json.get("base_url").is_none());
    }
}
