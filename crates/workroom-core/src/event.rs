use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DataEvent
// ---------------------------------------------------------------------------

/// One typed artifact frame from an agent run stream, discriminated by the
/// JSON `"type"` field. Every variant carries `{ artifact_id, content }`;
/// a later event with the same `artifact_id` replaces the earlier one
/// wholesale, so view models are folds that keep the last value per id.
///
/// Unknown `"type"` tags never reach this enum — the stream layer skips
/// them before deserializing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum DataEvent {
    /// `data-source` — a requirement document/ticket a test agent derives cases from.
    #[serde(rename = "data-source")]
    Source { data: EventBody<SourceContent> },
    /// `data-testcase` — one generated test case.
    #[serde(rename = "data-testcase")]
    TestCase { data: EventBody<TestCaseContent> },
    /// `data-requirement` — one epic/story/task record.
    #[serde(rename = "data-requirement")]
    Requirement { data: EventBody<RequirementContent> },
    /// `data-index` — incident header for a root-cause run.
    #[serde(rename = "data-index")]
    RcaIndex { data: EventBody<RcaIndexContent> },
    /// `data-rca` — incident narrative plus solution stubs.
    #[serde(rename = "data-rca")]
    Rca { data: EventBody<RcaContent> },
    /// `data-solution` — detail for one solution stub, matched by `solution_id`.
    #[serde(rename = "data-solution")]
    Solution { data: EventBody<SolutionContent> },
    /// `tool-write_file` — a file the agent wrote while automating.
    #[serde(rename = "tool-write_file")]
    FileWrite { data: EventBody<FileWriteContent> },
}

impl DataEvent {
    pub fn artifact_id(&self) -> &str {
        match self {
            DataEvent::Source { data } => &data.artifact_id,
            DataEvent::TestCase { data } => &data.artifact_id,
            DataEvent::Requirement { data } => &data.artifact_id,
            DataEvent::RcaIndex { data } => &data.artifact_id,
            DataEvent::Rca { data } => &data.artifact_id,
            DataEvent::Solution { data } => &data.artifact_id,
            DataEvent::FileWrite { data } => &data.artifact_id,
        }
    }

    /// The wire tag, for log lines and progress rendering.
    pub fn kind(&self) -> &'static str {
        match self {
            DataEvent::Source { .. } => "data-source",
            DataEvent::TestCase { .. } => "data-testcase",
            DataEvent::Requirement { .. } => "data-requirement",
            DataEvent::RcaIndex { .. } => "data-index",
            DataEvent::Rca { .. } => "data-rca",
            DataEvent::Solution { .. } => "data-solution",
            DataEvent::FileWrite { .. } => "tool-write_file",
        }
    }
}

/// Shared envelope under every event's `data` key.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EventBody<P> {
    pub artifact_id: String,
    pub content: P,
}

// ---------------------------------------------------------------------------
// Sources and test cases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceContent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Ids of the test cases this source currently claims. Replaced, not
    /// merged, when the source is re-emitted — an index may shrink.
    #[serde(default)]
    pub test_case_index: Vec<TestCasePointer>,
}

/// Snapshot entry inside a source's index. Only `id` is authoritative;
/// title/type/file may lag the individual test-case records.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TestCasePointer {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, alias = "file_path", skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCaseKind {
    Functional,
    Edge,
    Negative,
    Regression,
}

impl TestCaseKind {
    /// Fixed rendering order of the per-source buckets.
    pub fn all() -> &'static [TestCaseKind] {
        &[
            TestCaseKind::Functional,
            TestCaseKind::Edge,
            TestCaseKind::Negative,
            TestCaseKind::Regression,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TestCaseKind::Functional => "functional",
            TestCaseKind::Edge => "edge",
            TestCaseKind::Negative => "negative",
            TestCaseKind::Regression => "regression",
        }
    }
}

impl std::fmt::Display for TestCaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generated test case, normalized at the parse boundary: agents have
/// shipped both `steps`/`test_steps` and `expected_results`/`expected_result`
/// spellings, and `file` vs `file_path`. Aliases absorb the variants so
/// nothing downstream branches on wire field names.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TestCaseContent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TestCaseKind,
    pub title: String,
    #[serde(default, alias = "test_steps")]
    pub steps: Vec<String>,
    #[serde(default, alias = "precondition", skip_serializing_if = "Option::is_none")]
    pub preconditions: Option<String>,
    #[serde(default, alias = "expected_result", skip_serializing_if = "Option::is_none")]
    pub expected_results: Option<String>,
    /// Path of the file the case was generated into, when the agent wrote
    /// one. Used as the fallback grouping key for cases no index claims.
    #[serde(default, alias = "file_path", skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    Epic,
    Story,
    Task,
}

impl RequirementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequirementKind::Epic => "epic",
            RequirementKind::Story => "story",
            RequirementKind::Task => "task",
        }
    }
}

impl std::fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One requirements-breakdown record. Stories point up at their epic;
/// tasks point up at their story. Children are grouped by inverting those
/// back-references, never by a parent-held child list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RequirementContent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RequirementKind,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Root-cause analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RcaIndexContent {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RcaContent {
    pub incident: Incident,
    #[serde(default)]
    pub solutions: Vec<SolutionStub>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Incident {
    pub title: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub root_cause: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SolutionStub {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub tier: SolutionTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Remediation horizon of a solution stub. Agents occasionally emit tiers
/// outside the three known ones; those parse as `Unknown` and stay out of
/// the tiered report buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionTier {
    Immediate,
    ShortTerm,
    LongTerm,
    #[serde(other)]
    Unknown,
}

impl SolutionTier {
    pub fn as_str(self) -> &'static str {
        match self {
            SolutionTier::Immediate => "immediate",
            SolutionTier::ShortTerm => "short_term",
            SolutionTier::LongTerm => "long_term",
            SolutionTier::Unknown => "unknown",
        }
    }
}

/// Expanded detail for one solution stub, matched by `solution_id`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SolutionContent {
    pub solution_id: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

// ---------------------------------------------------------------------------
// File writes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileWriteContent {
    #[serde(alias = "file_path")]
    pub path: String,
    #[serde(default)]
    pub status: FileWriteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileWriteStatus {
    #[default]
    Created,
    Updated,
    Failed,
    #[serde(other)]
    Unknown,
}

impl FileWriteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FileWriteStatus::Created => "created",
            FileWriteStatus::Updated => "updated",
            FileWriteStatus::Failed => "failed",
            FileWriteStatus::Unknown => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
