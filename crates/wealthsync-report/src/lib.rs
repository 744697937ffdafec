//! AI-generated wealth reports.
//!
//! A report is one completion call: the client profile is rendered into a
//! prompt for the requested [`ReportKind`], and the completion text is
//! parsed into typed findings. Output that does not fit the schema for the
//! kind is an error, never a partial report.

pub mod engine;
mod error;
pub mod export;
mod parse;
pub mod prompt;
pub mod summary;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use wealthsync_core::{ClientProfile, DeadlineCategory, Priority, Recurrence};

pub use engine::{
    complete_with, provider_from_config, AnthropicProvider, CallOptions, Completion,
    CompletionProvider, CompletionRequest, LlmProvider, TokenUsage,
};
pub use error::ReportError;
pub use parse::{extract_json, parse_report};
pub use summary::{summarize, Summary, SummaryKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    WealthAudit,
    AdvisorCoordination,
    ComplianceCalendar,
    EstateSummary,
    QuarterlyReview,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        Self::WealthAudit,
        Self::AdvisorCoordination,
        Self::ComplianceCalendar,
        Self::EstateSummary,
        Self::QuarterlyReview,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WealthAudit => "wealth_audit",
            Self::AdvisorCoordination => "advisor_coordination",
            Self::ComplianceCalendar => "compliance_calendar",
            Self::EstateSummary => "estate_summary",
            Self::QuarterlyReview => "quarterly_review",
        }
    }

    /// Top-level keys the completion must contain for this kind.
    pub fn required_keys(self) -> &'static [&'static str] {
        match self {
            Self::WealthAudit => &[
                "executiveSummary",
                "netWorthSummary",
                "risks",
                "recommendations",
            ],
            Self::AdvisorCoordination => &["executiveSummary", "advisorActions", "recommendations"],
            Self::ComplianceCalendar => &[
                "executiveSummary",
                "complianceCalendar",
                "recommendations",
            ],
            Self::EstateSummary => &[
                "executiveSummary",
                "risks",
                "advisorActions",
                "recommendations",
            ],
            Self::QuarterlyReview => &[
                "executiveSummary",
                "netWorthSummary",
                "risks",
                "advisorActions",
                "complianceCalendar",
                "recommendations",
            ],
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown report kind: {s}"))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Models write estimates as either `"$25,000"` or `25000`; keep both as text.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn default_action_status() -> String {
    "pending".to_string()
}

fn default_compliance_status() -> String {
    "upcoming".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    #[serde(default)]
    pub id: String,
    pub severity: Severity,
    /// Free-form area such as tax, liquidity or succession.
    #[serde(default)]
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub financial_impact: Option<String>,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_advisor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorAction {
    #[serde(default)]
    pub id: String,
    pub priority: Priority,
    #[serde(default)]
    pub advisor_role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisor_name: Option<String>,
    pub action: String,
    #[serde(default)]
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<String>,
    #[serde(default = "default_action_status")]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceItem {
    #[serde(default)]
    pub id: String,
    /// Calendar month, 1-12.
    pub month: u8,
    pub title: String,
    pub category: DeadlineCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub responsible_party: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_fee: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub penalty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(default = "default_compliance_status")]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntityNetValue {
    pub entity_name: String,
    #[serde(default)]
    pub entity_type: String,
    pub net_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodChange {
    pub amount: f64,
    pub percentage: f64,
    pub period: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthSummary {
    #[serde(default)]
    pub total_assets: f64,
    #[serde(default)]
    pub total_liabilities: f64,
    #[serde(default)]
    pub net_worth: f64,
    #[serde(default)]
    pub liquid_assets: f64,
    #[serde(default)]
    pub illiquid_assets: f64,
    /// Percent of total assets per category.
    #[serde(default)]
    pub asset_allocation: BTreeMap<String, f64>,
    #[serde(default)]
    pub entity_breakdown: Vec<EntityNetValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_from_previous: Option<PeriodChange>,
}

/// The JSON object a completion is parsed into. Which keys must be present
/// depends on the kind; the rest default to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub executive_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_worth_summary: Option<NetWorthSummary>,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub advisor_actions: Vec<AdvisorAction>,
    #[serde(default)]
    pub compliance_calendar: Vec<ComplianceItem>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    pub executive_summary: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Findings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_worth_summary: Option<NetWorthSummary>,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub advisor_actions: Vec<AdvisorAction>,
    #[serde(default)]
    pub compliance_calendar: Vec<ComplianceItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportResult {
    pub id: String,
    pub kind: ReportKind,
    pub client_id: String,
    pub title: String,
    pub narrative: Narrative,
    pub findings: Findings,
    pub raw_provider_text: String,
    pub usage: TokenUsage,
    pub generated_at: DateTime<Utc>,
}

impl ReportResult {
    fn assemble(
        kind: ReportKind,
        profile: &ClientProfile,
        content: ReportContent,
        completion: Completion,
        now: DateTime<Utc>,
    ) -> Self {
        let title = content
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| prompt::report_title(kind, &profile.client_name, now.date_naive()));
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            client_id: profile.id.clone(),
            title,
            narrative: Narrative {
                executive_summary: content.executive_summary,
                recommendations: content.recommendations,
            },
            findings: Findings {
                net_worth_summary: content.net_worth_summary,
                risks: content.risks,
                advisor_actions: content.advisor_actions,
                compliance_calendar: content.compliance_calendar,
            },
            raw_provider_text: completion.text,
            usage: completion.usage,
            generated_at: now,
        }
    }
}

/// Generate one report of `kind` for `profile`.
pub async fn generate_report(
    provider: &dyn CompletionProvider,
    profile: &ClientProfile,
    kind: ReportKind,
    options: &CallOptions,
) -> Result<ReportResult, ReportError> {
    let now = Utc::now();
    let today = now.date_naive();
    let request = CompletionRequest {
        model: options.model.clone(),
        system: prompt::system_prompt(kind),
        prompt: prompt::user_prompt(kind, profile, today),
        max_tokens: options.max_tokens,
    };
    tracing::debug!(
        kind = %kind,
        client = %profile.id,
        prompt_chars = request.prompt.len(),
        "requesting report"
    );

    let completion = complete_with(provider, &request, options).await?;
    let content = parse_report(kind, &completion.text)?;

    tracing::info!(
        kind = %kind,
        client = %profile.id,
        risks = content.risks.len(),
        actions = content.advisor_actions.len(),
        calendar_items = content.compliance_calendar.len(),
        output_tokens = completion.usage.output_tokens,
        "report generated"
    );
    Ok(ReportResult::assemble(kind, profile, content, completion, now))
}
