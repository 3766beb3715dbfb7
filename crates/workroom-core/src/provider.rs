use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// External services the platform can hold an integration for. The platform
/// talks to them server-side; the client only selects and labels them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Jira,
    Confluence,
    Notion,
    Figma,
    Github,
    Datadog,
    Sentry,
    Newrelic,
    Pagerduty,
    Grafana,
    Cloudwatch,
}

impl Provider {
    pub fn all() -> &'static [Provider] {
        &[
            Provider::Jira,
            Provider::Confluence,
            Provider::Notion,
            Provider::Figma,
            Provider::Github,
            Provider::Datadog,
            Provider::Sentry,
            Provider::Newrelic,
            Provider::Pagerduty,
            Provider::Grafana,
            Provider::Cloudwatch,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Jira => "jira",
            Provider::Confluence => "confluence",
            Provider::Notion => "notion",
            Provider::Figma => "figma",
            Provider::Github => "github",
            Provider::Datadog => "datadog",
            Provider::Sentry => "sentry",
            Provider::Newrelic => "newrelic",
            Provider::Pagerduty => "pagerduty",
            Provider::Grafana => "grafana",
            Provider::Cloudwatch => "cloudwatch",
        }
    }

    /// Providers whose resources are searched through the logging-service
    /// cache rather than picked from a document list.
    pub fn is_logging_service(self) -> bool {
        matches!(
            self,
            Provider::Datadog
                | Provider::Sentry
                | Provider::Newrelic
                | Provider::Pagerduty
                | Provider::Grafana
                | Provider::Cloudwatch
        )
    }

    /// Providers that require a site/base URL alongside the token.
    pub fn needs_base_url(self) -> bool {
        matches!(
            self,
            Provider::Jira | Provider::Confluence | Provider::Datadog | Provider::Grafana
        )
    }

    /// Providers that scope credentials to an organization slug.
    pub fn needs_org(self) -> bool {
        matches!(self, Provider::Sentry | Provider::Pagerduty)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = crate::error::WorkroomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jira" => Ok(Provider::Jira),
            "confluence" => Ok(Provider::Confluence),
            "notion" => Ok(Provider::Notion),
            "figma" => Ok(Provider::Figma),
            "github" => Ok(Provider::Github),
            "datadog" => Ok(Provider::Datadog),
            "sentry" => Ok(Provider::Sentry),
            "newrelic" => Ok(Provider::Newrelic),
            "pagerduty" => Ok(Provider::Pagerduty),
            "grafana" => Ok(Provider::Grafana),
            "cloudwatch" => Ok(Provider::Cloudwatch),
            _ => Err(crate::error::WorkroomError::UnknownProvider(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// AgentKind
// ---------------------------------------------------------------------------

/// The hosted agents a session can be opened against. The kind picks the
/// run-endpoint path segment and which report views make sense afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    CodeReview,
    TestGeneration,
    ApiTestGeneration,
    RequirementsBreakdown,
    RootCauseAnalysis,
}

impl AgentKind {
    pub fn all() -> &'static [AgentKind] {
        &[
            AgentKind::CodeReview,
            AgentKind::TestGeneration,
            AgentKind::ApiTestGeneration,
            AgentKind::RequirementsBreakdown,
            AgentKind::RootCauseAnalysis,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::CodeReview => "code_review",
            AgentKind::TestGeneration => "test_generation",
            AgentKind::ApiTestGeneration => "api_test_generation",
            AgentKind::RequirementsBreakdown => "requirements_breakdown",
            AgentKind::RootCauseAnalysis => "root_cause_analysis",
        }
    }

    /// Path segment of `/agents/{segment}/run`.
    pub fn route_segment(self) -> &'static str {
        match self {
            AgentKind::CodeReview => "code-review",
            AgentKind::TestGeneration => "test-generation",
            AgentKind::ApiTestGeneration => "api-test-generation",
            AgentKind::RequirementsBreakdown => "requirements-breakdown",
            AgentKind::RootCauseAnalysis => "root-cause-analysis",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentKind {
    type Err = crate::error::WorkroomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code_review" | "code-review" => Ok(AgentKind::CodeReview),
            "test_generation" | "test-generation" => Ok(AgentKind::TestGeneration),
            "api_test_generation" | "api-test-generation" => Ok(AgentKind::ApiTestGeneration),
            "requirements_breakdown" | "requirements-breakdown" => {
                Ok(AgentKind::RequirementsBreakdown)
            }
            "root_cause_analysis" | "root-cause-analysis" => Ok(AgentKind::RootCauseAnalysis),
            _ => Err(crate::error::WorkroomError::UnknownAgent(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
