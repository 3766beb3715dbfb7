use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn workroom(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("workroom").unwrap();
    cmd.current_dir(dir.path())
        .env("WORKROOM_ROOT", dir.path())
        .env_remove("WORKROOM_TOKEN")
        .env_remove("WORKROOM_API_BASE");
    cmd
}

fn init_project(dir: &TempDir) {
    workroom(dir).arg("init").assert().success();
}

/// Write a session directory by hand, the way a finished run leaves it.
fn seed_session(dir: &TempDir, id: &str, agent: &str, events: &str) {
    let session_dir = dir.path().join(".workroom/sessions").join(id);
    std::fs::create_dir_all(&session_dir).unwrap();
    let manifest = format!(
        "id: {id}\nagent: {agent}\ntitle: seeded session\nstatus: done\n\
         created_at: \"2026-02-01T09:00:00+00:00\"\nupdated_at: \"2026-02-01T09:05:00+00:00\"\n"
    );
    std::fs::write(session_dir.join("manifest.yaml"), manifest).unwrap();
    if !events.is_empty() {
        std::fs::write(session_dir.join("events.jsonl"), events).unwrap();
    }
}

// ---------------------------------------------------------------------------
// workroom init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_directory_tree() {
    let dir = TempDir::new().unwrap();
    workroom(&dir).arg("init").assert().success();

    assert!(dir.path().join(".workroom").is_dir());
    assert!(dir.path().join(".workroom/sessions").is_dir());
    assert!(dir.path().join(".workroom/config.yaml").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    workroom(&dir).arg("init").assert().success();
    workroom(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  .workroom/config.yaml"));
}

// ---------------------------------------------------------------------------
// workroom login / logout
// ---------------------------------------------------------------------------

#[test]
fn login_requires_init() {
    let dir = TempDir::new().unwrap();
    workroom(&dir)
        .args(["login", "--token", "tok-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn login_logout_roundtrip() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .args(["login", "--token", "tok-1", "--name", "Priya"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as Priya."));

    let user = std::fs::read_to_string(dir.path().join(".workroom/user.json")).unwrap();
    assert!(user.contains("tok-1"));

    workroom(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));

    let user = std::fs::read_to_string(dir.path().join(".workroom/user.json")).unwrap();
    assert!(!user.contains("tok-1"));
}

// ---------------------------------------------------------------------------
// workroom connect / disconnect / connections
// ---------------------------------------------------------------------------

#[test]
fn connections_starts_fully_disconnected() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .arg("connections")
        .assert()
        .success()
        .stdout(predicate::str::contains("jira"))
        .stdout(predicate::str::contains("cloudwatch"))
        .stdout(predicate::str::contains("connected").not());
}

#[test]
fn connections_json_covers_every_provider() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let out = workroom(&dir)
        .args(["--json", "connections"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 11);
    assert_eq!(rows[0]["provider"], "jira");
    assert_eq!(rows[0]["connected"], false);
    assert!(rows[0].get("integration_id").is_none());
}

#[test]
fn connect_jira_requires_base_url() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .args(["connect", "jira", "--token", "jt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--base-url is required for jira"));
}

#[test]
fn connect_rejects_unknown_provider() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .args(["connect", "gitlab", "--token", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown provider: gitlab"));
}

#[test]
fn connect_then_disconnect_against_mock_api() {
    let mut server = mockito::Server::new();
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let create = server
        .mock("POST", "/integrations")
        .with_status(200)
        .with_body(r#"{"success":true,"data":{"id":41,"provider":"github"}}"#)
        .create();

    workroom(&dir)
        .env("WORKROOM_API_BASE", server.url())
        .env("WORKROOM_TOKEN", "test-token")
        .args(["connect", "github", "--token", "gh-pat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Connected github (integration 41)"));

    workroom(&dir)
        .arg("connections")
        .assert()
        .success()
        .stdout(predicate::str::contains("connected"));

    let delete = server
        .mock("DELETE", "/integrations/41")
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .create();

    workroom(&dir)
        .env("WORKROOM_API_BASE", server.url())
        .env("WORKROOM_TOKEN", "test-token")
        .args(["disconnect", "github"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Disconnected github"));

    workroom(&dir)
        .arg("connections")
        .assert()
        .success()
        .stdout(predicate::str::contains("connected").not());

    create.assert();
    delete.assert();
}

#[test]
fn disconnect_without_connection_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .args(["disconnect", "github"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("provider not connected: github"));
}

#[test]
fn disconnect_drops_provider_project_context() {
    let mut server = mockito::Server::new();
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let connections = r#"{"connections":{"github":{"connected":true,"integration_id":41,"connected_at":"2026-01-01T00:00:00Z"}}}"#;
    std::fs::write(dir.path().join(".workroom/connections.json"), connections).unwrap();
    let project = r#"{"pull_request":{"url":"https://github.com/acme/app/pull/512","number":512,"title":"Fix login retry","author":"mira","head_branch":"fix/login-retry","base_branch":"main","state":"open"}}"#;
    std::fs::write(dir.path().join(".workroom/project.json"), project).unwrap();

    server
        .mock("DELETE", "/integrations/41")
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .create();

    workroom(&dir)
        .env("WORKROOM_API_BASE", server.url())
        .env("WORKROOM_TOKEN", "test-token")
        .args(["disconnect", "github"])
        .assert()
        .success();

    let out = workroom(&dir)
        .args(["--json", "project", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert!(v.get("pull_request").is_none());
}

// ---------------------------------------------------------------------------
// workroom project — documents, formats, reset
// ---------------------------------------------------------------------------

#[test]
fn project_add_show_remove_document() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .args(["project", "add-doc", "confluence", "12345", "Payment flows"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added confluence document 12345"));

    workroom(&dir)
        .args(["project", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Payment flows"));

    workroom(&dir)
        .args(["project", "remove-doc", "confluence", "12345"])
        .assert()
        .success();

    workroom(&dir)
        .args(["project", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Payment flows").not());

    workroom(&dir)
        .args(["project", "remove-doc", "confluence", "12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no confluence document"));
}

#[test]
fn project_formats_requires_a_flag() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .args(["project", "formats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one of"));
}

#[test]
fn project_formats_replaces_flags() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .args(["project", "formats", "--automation"])
        .assert()
        .success();

    let out = workroom(&dir)
        .args(["--json", "project", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["formats"]["manual"], false);
    assert_eq!(v["formats"]["automation"], true);
}

#[test]
fn project_reset_clears_context() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .args(["project", "add-doc", "notion", "n-1", "Design notes"])
        .assert()
        .success();
    workroom(&dir).args(["project", "reset"]).assert().success();

    workroom(&dir)
        .args(["project", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Design notes").not());
}

// ---------------------------------------------------------------------------
// workroom project tickets / files / pr — API-backed mutations
// ---------------------------------------------------------------------------

#[test]
fn tickets_fetch_requires_jira_connection() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .args(["project", "tickets", "fetch", "PAY"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("provider not connected: jira"));
}

#[test]
fn tickets_fetch_keeps_partial_results() {
    let mut server = mockito::Server::new();
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let connections = r#"{"connections":{"jira":{"connected":true,"integration_id":7,"connected_at":"2026-01-01T00:00:00Z"}}}"#;
    std::fs::write(dir.path().join(".workroom/connections.json"), connections).unwrap();

    server
        .mock("GET", "/jira/tickets")
        .match_query(mockito::Matcher::UrlEncoded("project".into(), "PAY".into()))
        .with_status(200)
        .with_body(r#"{"success":true,"data":[{"key":"PAY-1","summary":"Declined cards retried forever"}]}"#)
        .create();
    server
        .mock("GET", "/jira/tickets")
        .match_query(mockito::Matcher::UrlEncoded("project".into(), "CORE".into()))
        .with_status(500)
        .with_body(r#"{"success":false,"message":"jira is down"}"#)
        .create();

    workroom(&dir)
        .env("WORKROOM_API_BASE", server.url())
        .env("WORKROOM_TOKEN", "test-token")
        .args(["project", "tickets", "fetch", "PAY", "CORE"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fetched 1 ticket(s) from PAY"))
        .stderr(predicate::str::contains("warning: 1 of 2 failed: CORE"));

    let out = workroom(&dir)
        .args(["--json", "project", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["tickets"][0]["key"], "PAY-1");
    assert_eq!(v["ticket_projects"], serde_json::json!(["PAY"]));
}

#[test]
fn files_add_uploads_and_records() {
    let mut server = mockito::Server::new();
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(dir.path().join("notes.md"), "# context\n").unwrap();

    server
        .mock("POST", "/files/upload")
        .with_status(200)
        .with_body(
            r#"{"success":true,"data":{"name":"ctx-0a1b-notes.md","original_name":"notes.md"}}"#,
        )
        .create();

    workroom(&dir)
        .env("WORKROOM_API_BASE", server.url())
        .env("WORKROOM_TOKEN", "test-token")
        .args(["project", "files", "add", "notes.md", "missing.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("uploaded: ctx-0a1b-notes.md"))
        .stderr(predicate::str::contains("warning: 1 of 2 failed"));

    workroom(&dir)
        .args(["project", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ctx-0a1b-notes.md"));
}

#[test]
fn pr_select_rejects_non_github_urls_locally() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .env("WORKROOM_TOKEN", "test-token")
        .args(["project", "pr", "select", "https://example.com/not-a-pr"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a GitHub pull request URL"));
}

#[test]
fn pr_select_stores_validated_metadata() {
    let mut server = mockito::Server::new();
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    server
        .mock("POST", "/github/pull-request")
        .with_status(200)
        .with_body(
            r#"{"success":true,"data":{
                "number":512,"title":"Fix login retry","author":"mira",
                "head_branch":"fix/login-retry","base_branch":"main","state":"open"
            }}"#,
        )
        .create();

    workroom(&dir)
        .env("WORKROOM_API_BASE", server.url())
        .env("WORKROOM_TOKEN", "test-token")
        .args(["project", "pr", "select", "https://github.com/acme/app/pull/512"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Selected PR #512"));

    let out = workroom(&dir)
        .args(["--json", "project", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["pull_request"]["number"], 512);
    assert_eq!(v["pull_request"]["head_branch"], "fix/login-retry");
}

// ---------------------------------------------------------------------------
// workroom project resources — cache contract
// ---------------------------------------------------------------------------

#[test]
fn resources_fetches_once_then_serves_from_cache() {
    let mut server = mockito::Server::new();
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let connections = r#"{"connections":{"datadog":{"connected":true,"integration_id":9,"connected_at":"2026-01-01T00:00:00Z"}}}"#;
    std::fs::write(dir.path().join(".workroom/connections.json"), connections).unwrap();

    let search = server
        .mock("GET", "/integrations/datadog/resources")
        .match_query(mockito::Matcher::UrlEncoded("query".into(), "checkout".into()))
        .with_status(200)
        .with_body(r#"{"success":true,"data":[{"id":"m-1","name":"checkout p99","kind":"monitor"}]}"#)
        .expect(1)
        .create();

    workroom(&dir)
        .env("WORKROOM_API_BASE", server.url())
        .env("WORKROOM_TOKEN", "test-token")
        .args(["project", "resources", "datadog", "checkout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("checkout p99"));

    // Second invocation answers from the cache without an upstream call.
    workroom(&dir)
        .env("WORKROOM_API_BASE", server.url())
        .env("WORKROOM_TOKEN", "test-token")
        .args(["project", "resources", "datadog", "checkout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(cached)"))
        .stdout(predicate::str::contains("checkout p99"));

    search.assert();
}

#[test]
fn resources_rejects_non_logging_providers() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .args(["project", "resources", "github", "checkout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a logging service"));
}

// ---------------------------------------------------------------------------
// workroom run
// ---------------------------------------------------------------------------

#[test]
fn run_rejects_unknown_agent() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .args(["run", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown agent: bogus"));
}

#[test]
fn run_requires_login() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .args(["run", "code_review"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn run_message_conflicts_with_regenerate() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .args(["run", "code_review", "--message", "hi", "--regenerate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn run_unknown_session_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .env("WORKROOM_TOKEN", "test-token")
        .args(["run", "code_review", "--session", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("session not found: nope"));
}

#[test]
fn run_rejects_agent_mismatch_on_resume() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    seed_session(&dir, "s-1", "test_generation", "");

    workroom(&dir)
        .env("WORKROOM_TOKEN", "test-token")
        .args(["run", "code_review", "--session", "s-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("belongs to test_generation"));
}

#[test]
fn run_streams_and_persists_transcript() {
    let mut server = mockito::Server::new();
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let run_mock = server
        .mock("POST", "/agents/code-review/run")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(concat!(
            "{\"type\":\"text\",\"delta\":\"Looks \"}\n",
            "{\"type\":\"text\",\"delta\":\"good.\"}\n",
            "{\"type\":\"done\"}\n",
        ))
        .create();

    let out = workroom(&dir)
        .env("WORKROOM_API_BASE", server.url())
        .env("WORKROOM_TOKEN", "test-token")
        .args(["run", "code_review", "--message", "review the diff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Looks good."))
        .stdout(predicate::str::contains("Next: workroom report"))
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(out).unwrap();
    let id = stdout
        .lines()
        .find_map(|l| l.strip_prefix("Session "))
        .unwrap()
        .trim();

    let session_dir = dir.path().join(".workroom/sessions").join(id);
    let manifest: serde_yaml::Value = serde_yaml::from_str(
        &std::fs::read_to_string(session_dir.join("manifest.yaml")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest["status"], "done");
    assert_eq!(manifest["agent"], "code_review");

    let messages = std::fs::read_to_string(session_dir.join("messages.jsonl")).unwrap();
    assert!(messages.contains("review the diff"));
    assert!(messages.contains("Looks good."));
    run_mock.assert();
}

#[test]
fn run_stream_error_marks_session_and_prints_retry_hint() {
    let mut server = mockito::Server::new();
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    server
        .mock("POST", "/agents/code-review/run")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(concat!(
            "{\"type\":\"text\",\"delta\":\"Partial reply\"}\n",
            "{\"type\":\"error\",\"message\":\"agent exploded\"}\n",
        ))
        .create();

    let out = workroom(&dir)
        .env("WORKROOM_API_BASE", server.url())
        .env("WORKROOM_TOKEN", "test-token")
        .args(["run", "code_review", "--message", "review the diff"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Partial reply"))
        .stderr(predicate::str::contains("agent failed: agent exploded"))
        .stderr(predicate::str::contains("--regenerate"))
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(out).unwrap();
    let id = stdout
        .lines()
        .find_map(|l| l.strip_prefix("Session "))
        .unwrap()
        .trim();

    let session_dir = dir.path().join(".workroom/sessions").join(id);
    let manifest = std::fs::read_to_string(session_dir.join("manifest.yaml")).unwrap();
    assert!(manifest.contains("status: errored"));

    // The partial assistant turn survives for the next resume.
    let messages = std::fs::read_to_string(session_dir.join("messages.jsonl")).unwrap();
    assert!(messages.contains("Partial reply"));
}

// ---------------------------------------------------------------------------
// workroom sessions
// ---------------------------------------------------------------------------

#[test]
fn sessions_list_empty() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .arg("sessions")
        .assert()
        .success()
        .stdout(predicate::str::contains("No sessions"));
}

#[test]
fn sessions_list_and_delete() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    seed_session(&dir, "s-1", "test_generation", "");
    seed_session(&dir, "s-2", "code_review", "");

    workroom(&dir)
        .arg("sessions")
        .assert()
        .success()
        .stdout(predicate::str::contains("s-1"))
        .stdout(predicate::str::contains("s-2"));

    workroom(&dir)
        .args(["sessions", "delete", "s-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted session s-1"));

    workroom(&dir)
        .arg("sessions")
        .assert()
        .success()
        .stdout(predicate::str::contains("s-1").not())
        .stdout(predicate::str::contains("s-2"));

    workroom(&dir)
        .args(["sessions", "delete", "s-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("session not found: s-1"));
}

// ---------------------------------------------------------------------------
// workroom report
// ---------------------------------------------------------------------------

const TEST_EVENTS: &str = concat!(
    r#"{"type":"data-source","data":{"artifact_id":"src-1","content":{"name":"Checkout flows","provider":"confluence","test_case_index":[{"id":"tc-1"}]}}}"#,
    "\n",
    r#"{"type":"data-testcase","data":{"artifact_id":"a-1","content":{"id":"tc-1","type":"functional","title":"Pay with saved card","steps":["open checkout","pay"]}}}"#,
    "\n",
);

#[test]
fn report_tests_view_renders_seeded_transcript() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    seed_session(&dir, "s-1", "test_generation", TEST_EVENTS);

    workroom(&dir)
        .args(["report", "s-1", "tests"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checkout flows"))
        .stdout(predicate::str::contains("Pay with saved card"))
        .stdout(predicate::str::contains("functional (1)"));
}

#[test]
fn report_defaults_to_summary() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    seed_session(&dir, "s-1", "test_generation", TEST_EVENTS);

    let out = workroom(&dir)
        .args(["--json", "report", "s-1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["session"]["agent"], "test_generation");
    assert_eq!(v["test_cases"], 1);
    assert_eq!(v["events"], 2);
}

#[test]
fn report_rca_view_groups_solutions_by_tier() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let events = concat!(
        r#"{"type":"data-index","data":{"artifact_id":"idx-1","content":{"title":"Checkout latency spike","summary":"p99 regressed","severity":"sev2","services":["checkout"]}}}"#,
        "\n",
        r#"{"type":"data-rca","data":{"artifact_id":"rca-1","content":{"incident":{"title":"Checkout latency spike","impact":"payments slow","root_cause":"cache stampede"},"solutions":[{"id":"sol-1","title":"Add request coalescing","type":"immediate"}]}}}"#,
        "\n",
        r#"{"type":"data-solution","data":{"artifact_id":"d-1","content":{"solution_id":"sol-1","steps":["add lock","deploy"],"effort":"low"}}}"#,
        "\n",
    );
    seed_session(&dir, "s-1", "root_cause_analysis", events);

    workroom(&dir)
        .args(["report", "s-1", "rca"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checkout latency spike"))
        .stdout(predicate::str::contains("IMMEDIATE (1)"))
        .stdout(predicate::str::contains("Add request coalescing"))
        .stdout(predicate::str::contains("effort: low"));
}

#[test]
fn report_unknown_view_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    seed_session(&dir, "s-1", "test_generation", "");

    workroom(&dir)
        .args(["report", "s-1", "coverage"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown report view: coverage"));
}

#[test]
fn report_missing_session_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    workroom(&dir)
        .args(["report", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("session not found: nope"));
}
