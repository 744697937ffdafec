//! Server state and the operations behind each tool.
//!
//! Every operation returns the tool's text output or an error message; the
//! MCP layer only wraps them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use wealthsync_core::format::{format_currency, format_percent, truncate};
use wealthsync_core::{deadlines, export, ClientProfile, ClientStore, NotificationFeed, WealthConfig};
use wealthsync_report::{
    export as findings_export, generate_report, provider_from_config, summarize, CallOptions,
    CompletionProvider, ReportError, ReportKind, ReportResult, SummaryKind,
};

/// Raw provider text attached to a parse error is cut to this length.
const RAW_EXCERPT_CHARS: usize = 2000;
pub const DEFAULT_UPCOMING: usize = 5;

#[derive(Clone)]
pub struct AppContext {
    config: WealthConfig,
    store: ClientStore,
    provider: Option<Arc<dyn CompletionProvider>>,
}

fn pretty<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Serialization error: {e}"))
}

fn report_error_text(e: &ReportError) -> String {
    match e.raw_text() {
        Some(raw) => format!(
            "{e}\n\nProvider output:\n{}",
            truncate(raw, RAW_EXCERPT_CHARS)
        ),
        None => e.to_string(),
    }
}

impl AppContext {
    /// Build from loaded config. A missing AI configuration is not fatal:
    /// record tools keep working and AI tools report what is missing.
    pub fn new(config: WealthConfig) -> Self {
        let store = ClientStore::from_config(&config.storage);
        let provider = match provider_from_config(&config.ai) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(error = %e, "AI tools disabled");
                None
            }
        };
        Self::with_parts(config, store, provider)
    }

    pub fn with_parts(
        config: WealthConfig,
        store: ClientStore,
        provider: Option<Arc<dyn CompletionProvider>>,
    ) -> Self {
        Self {
            config,
            store,
            provider,
        }
    }

    pub fn store(&self) -> &ClientStore {
        &self.store
    }

    fn provider(&self) -> Result<&dyn CompletionProvider, String> {
        self.provider.as_deref().ok_or_else(|| {
            format!(
                "AI provider '{}' is not configured. Set WEALTHSYNC_AI__API_KEY or add [ai] to .wealthsync/config.toml.",
                self.config.ai.provider
            )
        })
    }

    fn call_options(&self, cancel: CancellationToken) -> CallOptions {
        CallOptions::from_config(&self.config.ai).with_cancel(cancel)
    }

    fn read(&self, client_id: &str) -> Result<ClientProfile, String> {
        self.store
            .read_client(client_id)
            .map_err(|e| format!("Failed to read client '{client_id}': {e}"))
    }

    fn write(&self, profile: &ClientProfile) -> Result<(), String> {
        self.store
            .write_client(profile)
            .map_err(|e| format!("Failed to write client '{}': {e}", profile.id))
    }

    pub fn list_clients(&self) -> Result<String, String> {
        let ids = self.store.list_clients().map_err(|e| e.to_string())?;
        if ids.is_empty() {
            return Ok("No clients found. Use set_client to create one.".to_string());
        }
        Ok(ids.join("\n"))
    }

    pub fn get_client(&self, client_id: &str) -> Result<String, String> {
        self.store
            .read_client_raw(client_id)
            .map_err(|e| format!("Failed to read client '{client_id}': {e}"))
    }

    pub fn set_client(&self, client_id: &str, data: &str) -> Result<String, String> {
        self.store
            .write_client_raw(client_id, data)
            .map_err(|e| format!("Failed to save client '{client_id}': {e}"))?;
        Ok(format!("Client '{client_id}' saved"))
    }

    pub fn delete_client(&self, client_id: &str) -> Result<String, String> {
        self.store
            .delete_client(client_id)
            .map_err(|e| format!("Failed to delete client '{client_id}': {e}"))?;
        Ok(format!("Client '{client_id}' deleted"))
    }

    pub fn notifications(&self, client_id: &str, now: DateTime<Utc>) -> Result<String, String> {
        let profile = self.read(client_id)?;
        let mut feed = NotificationFeed::with_capacity(self.config.notifications.feed_capacity);
        feed.refresh_from_deadlines(now, &profile.deadlines);

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Out<'a> {
            unread_count: usize,
            urgent_count: usize,
            notifications: &'a [wealthsync_core::Notification],
        }
        pretty(&Out {
            unread_count: feed.unread_count(),
            urgent_count: feed.urgent().count(),
            notifications: feed.notifications(),
        })
    }

    /// Open deadlines by due date, with statuses brought up to date for `now`.
    pub fn upcoming_deadlines(
        &self,
        client_id: &str,
        count: usize,
        now: DateTime<Utc>,
    ) -> Result<String, String> {
        let mut profile = self.read(client_id)?;
        let today = now.date_naive();
        for deadline in &mut profile.deadlines {
            deadlines::refresh_status(deadline, today);
        }
        let list = deadlines::upcoming(&profile.deadlines, count);
        if list.is_empty() {
            return Ok("No open deadlines.".to_string());
        }
        pretty(&list)
    }

    /// Mark a deadline completed and schedule its next occurrence when it recurs.
    pub fn complete_deadline(
        &self,
        client_id: &str,
        deadline_id: &str,
        now: DateTime<Utc>,
    ) -> Result<String, String> {
        let mut profile = self.read(client_id)?;
        let deadline = profile
            .deadlines
            .iter_mut()
            .find(|d| d.id == deadline_id)
            .ok_or_else(|| format!("Deadline '{deadline_id}' not found for client '{client_id}'"))?;
        let next = deadlines::complete(deadline, now).map_err(|e| e.to_string())?;
        let completed = deadline.clone();
        if let Some(next) = &next {
            profile.deadlines.push(next.clone());
        }
        self.write(&profile)?;

        tracing::info!(client = client_id, deadline = deadline_id, recurs = next.is_some(), "deadline completed");
        pretty(&serde_json::json!({ "completed": completed, "next": next }))
    }

    /// Record a net worth snapshot and compare it with the previous one.
    pub fn take_snapshot(&self, client_id: &str, now: DateTime<Utc>) -> Result<String, String> {
        let profile = self.read(client_id)?;
        let previous = self
            .store
            .list_snapshots(client_id, 1)
            .map_err(|e| e.to_string())?
            .into_iter()
            .next();
        let snapshot = profile.snapshot(now);
        self.store
            .save_snapshot(client_id, &snapshot)
            .map_err(|e| format!("Failed to save snapshot: {e}"))?;

        let mut text = format!(
            "Snapshot {} recorded: net worth {}",
            snapshot.id,
            format_currency(snapshot.total_net_worth, false)
        );
        if let Some(prev) = previous {
            let delta = snapshot.total_net_worth - prev.total_net_worth;
            text.push_str(&format!(
                "\nChange since {}: {}",
                prev.date.format("%Y-%m-%d"),
                format_currency(delta, false)
            ));
            if prev.total_net_worth != 0.0 {
                text.push_str(&format!(
                    " ({})",
                    format_percent(delta / prev.total_net_worth.abs() * 100.0)
                ));
            }
        }
        text.push_str("\n\n");
        text.push_str(&pretty(&snapshot)?);
        Ok(text)
    }

    pub async fn generate_report(
        &self,
        client_id: &str,
        kind: &str,
        cancel: CancellationToken,
    ) -> Result<String, String> {
        let kind: ReportKind = kind.parse()?;
        let provider = self.provider()?;
        let profile = self.read(client_id)?;
        let report = generate_report(provider, &profile, kind, &self.call_options(cancel))
            .await
            .map_err(|e| report_error_text(&e))?;
        pretty(&report)
    }

    pub async fn summarize(
        &self,
        kind: Option<&str>,
        text: &str,
        cancel: CancellationToken,
    ) -> Result<String, String> {
        let kind: SummaryKind = kind.unwrap_or("general").parse()?;
        let provider = self.provider()?;
        let summary = summarize(provider, kind, text, &self.call_options(cancel))
            .await
            .map_err(|e| report_error_text(&e))?;
        Ok(summary.text)
    }

    /// CSV for a client record set, or for the findings of a generated report.
    pub fn export_csv(
        &self,
        what: &str,
        client_id: Option<&str>,
        report: Option<&str>,
    ) -> Result<String, String> {
        let csv = match what {
            "deadlines" | "advisors" | "wealth_summary" => {
                let client_id =
                    client_id.ok_or_else(|| format!("client_id is required to export {what}"))?;
                let profile = self.read(client_id)?;
                match what {
                    "deadlines" => export::deadlines_csv(&profile.deadlines),
                    "advisors" => export::advisors_csv(&profile.advisors),
                    _ => export::wealth_summary_csv(&profile),
                }
            }
            "risks" | "advisor_actions" | "compliance_calendar" => {
                let raw = report.ok_or_else(|| {
                    format!("report is required to export {what}: pass the JSON returned by generate_report")
                })?;
                let report: ReportResult =
                    serde_json::from_str(raw).map_err(|e| format!("Invalid report JSON: {e}"))?;
                let findings = &report.findings;
                match what {
                    "risks" => findings_export::risks_csv(&findings.risks),
                    "advisor_actions" => findings_export::advisor_actions_csv(&findings.advisor_actions),
                    _ => findings_export::compliance_calendar_csv(&findings.compliance_calendar),
                }
            }
            other => {
                return Err(format!(
                    "Unknown export '{other}'. Use deadlines, advisors, wealth_summary, risks, advisor_actions or compliance_calendar."
                ))
            }
        };
        Ok(csv.unwrap_or_else(|| "Nothing to export.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::json;
    use wealthsync_report::{Completion, CompletionRequest, TokenUsage};

    struct Canned(&'static str);

    #[async_trait]
    impl CompletionProvider for Canned {
        async fn complete(&self, _request: &CompletionRequest) -> Result<Completion, ReportError> {
            Ok(Completion {
                text: self.0.to_string(),
                usage: TokenUsage::default(),
            })
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn context(dir: &tempfile::TempDir, provider: Option<Arc<dyn CompletionProvider>>) -> AppContext {
        AppContext::with_parts(
            WealthConfig::default(),
            ClientStore::at(dir.path()),
            provider,
        )
    }

    fn seed(ctx: &AppContext) {
        let client = json!({
            "id": "hartwell",
            "clientName": "Hartwell Family",
            "assets": [{"id": "a-1", "name": "Brokerage", "category": "investments", "value": 500000.0}],
            "deadlines": [
                {"id": "d-1", "title": "Q4 estimated tax", "dueDate": "2026-10-20", "category": "tax", "status": "upcoming", "recurrence": "quarterly"},
                {"id": "d-2", "title": "Umbrella renewal", "dueDate": "2026-12-01", "category": "insurance", "status": "upcoming"}
            ]
        });
        ctx.set_client("hartwell", &client.to_string()).unwrap();
    }

    #[test]
    fn record_tools_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, None);
        assert!(ctx.list_clients().unwrap().starts_with("No clients"));
        seed(&ctx);
        assert_eq!(ctx.list_clients().unwrap(), "hartwell");
        assert!(ctx.get_client("hartwell").unwrap().contains("Hartwell Family"));
        ctx.delete_client("hartwell").unwrap();
        assert!(ctx.get_client("hartwell").is_err());
    }

    #[test]
    fn notifications_come_from_deadlines() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, None);
        seed(&ctx);
        let out: serde_json::Value =
            serde_json::from_str(&ctx.notifications("hartwell", now()).unwrap()).unwrap();
        assert_eq!(out["unreadCount"], 1);
        assert_eq!(out["urgentCount"], 1);
        assert_eq!(out["notifications"][0]["title"], "Due Tomorrow");
    }

    #[test]
    fn completing_a_recurring_deadline_persists_the_next_one() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, None);
        seed(&ctx);
        let out: serde_json::Value =
            serde_json::from_str(&ctx.complete_deadline("hartwell", "d-1", now()).unwrap()).unwrap();
        assert_eq!(out["completed"]["status"], "completed");
        assert_eq!(out["next"]["dueDate"], "2027-01-20");

        let stored = ctx.store().read_client("hartwell").unwrap();
        assert_eq!(stored.deadlines.len(), 3);
        assert!(ctx.complete_deadline("hartwell", "missing", now()).is_err());
    }

    #[test]
    fn snapshots_report_change() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, None);
        seed(&ctx);
        let first = ctx.take_snapshot("hartwell", now()).unwrap();
        assert!(first.contains("net worth $500,000"));
        assert!(!first.contains("Change since"));
        let later = now() + chrono::Duration::days(30);
        let second = ctx.take_snapshot("hartwell", later).unwrap();
        assert!(second.contains("Change since 2026-10-19: $0 (+0.0%)"));
    }

    #[test]
    fn export_validates_its_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, None);
        seed(&ctx);
        assert!(ctx
            .export_csv("deadlines", Some("hartwell"), None)
            .unwrap()
            .starts_with("\"Title\""));
        assert!(ctx.export_csv("deadlines", None, None).is_err());
        assert!(ctx.export_csv("risks", None, None).is_err());
        assert!(ctx.export_csv("balance_sheet", Some("hartwell"), None).is_err());
    }

    #[tokio::test]
    async fn ai_tools_explain_missing_provider() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, None);
        seed(&ctx);
        let err = ctx
            .generate_report("hartwell", "wealth_audit", CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.contains("not configured"));
        let err = ctx
            .generate_report("hartwell", "horoscope", CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.contains("unknown report kind"));
    }

    #[tokio::test]
    async fn report_findings_feed_the_csv_export() {
        let body = r#"{
            "executiveSummary": "Calendar.",
            "complianceCalendar": [
                {"month": 4, "title": "Form 1040", "category": "tax", "responsibleParty": "CPA"}
            ],
            "recommendations": []
        }"#;
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, Some(Arc::new(Canned(body))));
        seed(&ctx);
        let report = ctx
            .generate_report("hartwell", "compliance_calendar", CancellationToken::new())
            .await
            .unwrap();
        let csv = ctx
            .export_csv("compliance_calendar", None, Some(&report))
            .unwrap();
        assert!(csv.contains("\"April\",\"Form 1040\",\"Tax\",\"CPA\""));
    }

    #[tokio::test]
    async fn parse_failures_include_provider_output() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, Some(Arc::new(Canned("I cannot help with that."))));
        seed(&ctx);
        let err = ctx
            .generate_report("hartwell", "estate_summary", CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.starts_with("Malformed report"));
        assert!(err.contains("Provider output:\nI cannot help with that."));
    }
}
