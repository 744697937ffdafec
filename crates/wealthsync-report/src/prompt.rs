//! Prompt construction for report generation.

use chrono::{Datelike, NaiveDate};
use wealthsync_core::deadlines::{parse_due_date, quarter_of};
use wealthsync_core::format::{format_currency, format_date, truncate};
use wealthsync_core::guidelines::GUIDELINES;
use wealthsync_core::{ClientProfile, DeadlineStatus};

use crate::ReportKind;

/// Meeting summaries longer than this are cut in the context block.
const MEETING_SUMMARY_CHARS: usize = 240;
/// How many past meetings the context block lists.
const RECENT_MEETINGS: usize = 5;

fn section(out: &mut String, heading: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(heading);
    out.push_str(":\n");
}

fn item(out: &mut String, text: impl AsRef<str>) {
    out.push_str("- ");
    out.push_str(text.as_ref());
    out.push('\n');
}

/// Render a client profile as the plain-text block every report prompt embeds.
pub fn client_context(profile: &ClientProfile, today: NaiveDate) -> String {
    let mut out = String::with_capacity(4096);
    let total_assets = profile.total_assets();

    section(&mut out, "CLIENT PROFILE");
    item(&mut out, format!("Client Name: {}", profile.client_name));
    item(&mut out, format!("Client Type: {}", profile.client_type));
    item(&mut out, format!("Status: {}", profile.status));
    if let Some(email) = &profile.email {
        item(&mut out, format!("Email: {email}"));
    }
    if let Some(phone) = &profile.phone {
        item(&mut out, format!("Phone: {phone}"));
    }
    if let Some(spouse) = &profile.spouse_name {
        item(&mut out, format!("Spouse: {spouse}"));
    }
    if !profile.dependents.is_empty() {
        let deps: Vec<String> = profile
            .dependents
            .iter()
            .map(|d| format!("{} ({})", d.name, d.relationship))
            .collect();
        item(&mut out, format!("Dependents: {}", deps.join(", ")));
    }

    section(&mut out, "FINANCIAL SUMMARY");
    item(
        &mut out,
        format!("Estimated Net Worth: {}", format_currency(profile.net_worth(), false)),
    );
    item(&mut out, format!("Total Assets: {}", format_currency(total_assets, false)));
    item(
        &mut out,
        format!(
            "Total Liabilities: {}",
            format_currency(profile.total_liabilities(), false)
        ),
    );
    item(
        &mut out,
        format!("Liquid Assets: {}", format_currency(profile.liquid_assets(), false)),
    );
    if let Some(income) = profile.annual_income {
        item(&mut out, format!("Annual Income: {}", format_currency(income, false)));
    }
    if let Some(risk) = profile.risk_tolerance {
        item(&mut out, format!("Risk Tolerance: {}", risk.as_str()));
    }
    if let Some(horizon) = &profile.investment_horizon {
        item(&mut out, format!("Investment Horizon: {horizon}"));
    }

    section(&mut out, "ASSET ALLOCATION");
    for (category, value) in profile.assets_by_category() {
        let share = if total_assets > 0.0 {
            value / total_assets * 100.0
        } else {
            0.0
        };
        item(
            &mut out,
            format!(
                "{}: {} ({share:.1}%)",
                category.as_str(),
                format_currency(value, false)
            ),
        );
    }

    section(&mut out, &format!("ENTITIES ({})", profile.entities.len()));
    for balance in profile.entity_balances() {
        item(
            &mut out,
            format!(
                "{} ({}): {} net value, {} assets",
                balance.name,
                balance.entity_type.label(),
                format_currency(balance.net_value(), false),
                balance.asset_count
            ),
        );
    }

    section(&mut out, &format!("DETAILED ASSETS ({})", profile.assets.len()));
    for asset in &profile.assets {
        let mut line = format!(
            "{} ({}): {}",
            asset.name,
            asset.category.as_str(),
            format_currency(asset.value, false)
        );
        if let Some(custodian) = &asset.custodian {
            line.push_str(&format!(" at {custodian}"));
        }
        if let Some(entity_id) = &asset.entity_id {
            let name = profile.entity_name(entity_id).unwrap_or("Unknown");
            line.push_str(&format!(" [Entity: {name}]"));
        }
        item(&mut out, line);
    }

    section(&mut out, &format!("LIABILITIES ({})", profile.liabilities.len()));
    for liability in &profile.liabilities {
        let mut line = format!(
            "{} ({}): {}",
            liability.name,
            liability.category.as_str(),
            format_currency(liability.balance, false)
        );
        if let Some(rate) = liability.interest_rate {
            line.push_str(&format!(" @ {rate}%"));
        }
        if let Some(lender) = &liability.lender {
            line.push_str(&format!(" from {lender}"));
        }
        item(&mut out, line);
    }

    section(&mut out, &format!("ADVISORY TEAM ({})", profile.advisors.len()));
    for advisor in &profile.advisors {
        let mut line = format!("{} ({})", advisor.name, advisor.specialty.label());
        if !advisor.firm.is_empty() {
            line.push_str(&format!(" at {}", advisor.firm));
        }
        if advisor.is_primary {
            line.push_str(" [PRIMARY]");
        }
        if let Some(last) = advisor.last_contact_date {
            line.push_str(&format!(", last contact {}", format_date(last)));
        }
        item(&mut out, line);
    }

    let open: Vec<_> = profile
        .deadlines
        .iter()
        .filter(|d| d.status != DeadlineStatus::Completed)
        .collect();
    if !open.is_empty() {
        section(&mut out, "KEY DATES & DEADLINES");
        for deadline in open {
            let due = parse_due_date(&deadline.due_date)
                .map(format_date)
                .unwrap_or_else(|| deadline.due_date.clone());
            item(
                &mut out,
                format!(
                    "{}: {} ({}, {}, {})",
                    deadline.title,
                    due,
                    deadline.category.label(),
                    deadline.recurrence.label(),
                    deadline.status.as_str()
                ),
            );
        }
    }

    let mut meetings: Vec<_> = profile.meetings.iter().filter(|m| m.date <= today).collect();
    meetings.sort_by(|a, b| b.date.cmp(&a.date));
    if !meetings.is_empty() {
        section(&mut out, "RECENT MEETINGS");
        for meeting in meetings.into_iter().take(RECENT_MEETINGS) {
            let mut line = format!("{} ({})", meeting.title, format_date(meeting.date));
            if !meeting.summary.is_empty() {
                line.push_str(": ");
                line.push_str(&truncate(&meeting.summary, MEETING_SUMMARY_CHARS));
            }
            item(&mut out, line);
            for action in meeting.action_items.iter().filter(|a| !a.completed) {
                out.push_str("  - open action: ");
                out.push_str(&action.text);
                out.push('\n');
            }
        }
    }

    if !profile.goals.is_empty() {
        section(&mut out, "CLIENT GOALS");
        for goal in &profile.goals {
            item(&mut out, goal);
        }
    }

    if !profile.concerns.is_empty() {
        section(&mut out, "CLIENT CONCERNS");
        for concern in &profile.concerns {
            item(&mut out, concern);
        }
    }

    if let Some(notes) = profile.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        section(&mut out, "ADDITIONAL NOTES");
        out.push_str(notes);
        out.push('\n');
    }

    out
}

/// Title used in the prompt and as a fallback when the completion has none.
pub fn report_title(kind: ReportKind, client_name: &str, today: NaiveDate) -> String {
    let year = today.year();
    match kind {
        ReportKind::WealthAudit => format!("{year} Wealth Audit: {client_name}"),
        ReportKind::AdvisorCoordination => format!("Advisor Coordination Plan: {client_name}"),
        ReportKind::ComplianceCalendar => {
            format!("12-Month Compliance Calendar: {client_name} ({})", year + 1)
        }
        ReportKind::EstateSummary => format!("Estate Planning Summary: {client_name}"),
        ReportKind::QuarterlyReview => {
            format!("Q{} {year} Wealth Review: {client_name}", quarter_of(today))
        }
    }
}

pub fn system_prompt(kind: ReportKind) -> String {
    let role = match kind {
        ReportKind::WealthAudit => {
            "You are an expert wealth advisor generating comprehensive wealth audit reports for \
high-net-worth clients. Identify risks and opportunities, and give clear next steps with \
estimated financial impact where possible."
        }
        ReportKind::AdvisorCoordination => {
            "You are an expert wealth coordinator generating advisor coordination plans for \
high-net-worth families. Define roles, responsibilities and action items for each advisor on \
the team so nothing falls through the cracks."
        }
        ReportKind::ComplianceCalendar => {
            "You are an expert wealth compliance specialist generating 12-month compliance \
calendars for high-net-worth families. Cover tax, legal, insurance, trust and investment \
deadlines, with the penalties for missing them."
        }
        ReportKind::EstateSummary => {
            "You are an expert estate planning advisor generating estate planning summaries for \
high-net-worth families. Identify planning gaps, succession issues and wealth transfer \
opportunities."
        }
        ReportKind::QuarterlyReview => {
            "You are an expert wealth advisor generating quarterly wealth reviews for \
high-net-worth families. Give a quarterly snapshot with progress tracking and priorities for \
the next quarter."
        }
    };
    format!(
        "{role}\n\nRespond with a single JSON object and nothing else. Use exactly the field \
names and enum values given in the request.\n\nGUIDELINES:\n{GUIDELINES}"
    )
}

const RISK_SHAPE: &str = r#"{
      "id": "unique-id",
      "severity": "critical|warning|info",
      "category": "tax|legal|insurance|liquidity|concentration|succession|compliance",
      "title": "Risk title",
      "description": "Detailed description of the risk",
      "financialImpact": "Estimated dollar impact or percentage",
      "recommendation": "Specific action to mitigate",
      "assignedAdvisor": "CPA|Estate Attorney|Wealth Manager|Insurance Advisor|etc"
    }"#;

const ACTION_SHAPE: &str = r#"{
      "id": "unique-id",
      "priority": "urgent|high|medium|low",
      "advisorRole": "cpa|estate_attorney|wealth_manager|insurance|banker|other",
      "advisorName": "Name if known from the client's team",
      "action": "Specific action to take",
      "context": "Why this action matters",
      "deadline": "YYYY-MM-DD or null",
      "dependencies": ["Other actions this depends on"],
      "estimatedCost": "$X,XXX estimate if applicable",
      "status": "pending"
    }"#;

const COMPLIANCE_SHAPE: &str = r#"{
      "id": "unique-id",
      "month": 1,
      "title": "Deadline title",
      "category": "tax|legal|insurance|trust|investment|other",
      "description": "What needs to be done",
      "responsibleParty": "Advisor role or family member",
      "estimatedFee": 0,
      "penalty": "What happens if missed",
      "recurrence": "one_time|annual|quarterly|monthly",
      "status": "upcoming"
    }"#;

fn net_worth_shape(profile: &ClientProfile, with_change: Option<&str>) -> String {
    let total_assets = profile.total_assets();
    let liquid = profile.liquid_assets();
    let change = with_change
        .map(|period| {
            format!(
                ",\n    \"changeFromPrevious\": {{\"amount\": 0, \"percentage\": 0, \"period\": \"{period}\"}}"
            )
        })
        .unwrap_or_default();
    format!(
        r#"{{
    "totalAssets": {total_assets},
    "totalLiabilities": {},
    "netWorth": {},
    "liquidAssets": {liquid},
    "illiquidAssets": {},
    "assetAllocation": {{"cash": 0, "investments": 0, "real_estate": 0, "alternatives": 0, "other": 0}},
    "entityBreakdown": [
      {{"entityName": "string", "entityType": "personal|trust|llc|foundation|other", "netValue": 0}}
    ]{change}
  }}"#,
        profile.total_liabilities(),
        profile.net_worth(),
        total_assets - liquid,
    )
}

fn previous_quarter(today: NaiveDate) -> String {
    match quarter_of(today) {
        1 => format!("Q4 {}", today.year() - 1),
        q => format!("Q{} {}", q - 1, today.year()),
    }
}

/// The user message for one report: context block, exact JSON shape and
/// per-kind coverage instructions.
pub fn user_prompt(kind: ReportKind, profile: &ClientProfile, today: NaiveDate) -> String {
    let context = client_context(profile, today);
    let title = report_title(kind, &profile.client_name, today);
    let net_worth_m = format!("{:.1}", profile.net_worth() / 1_000_000.0);

    let (intro, fields, closing) = match kind {
        ReportKind::WealthAudit => (
            "Generate a comprehensive wealth audit report for this client.",
            format!(
                r#"  "executiveSummary": "2-3 paragraphs on net worth, key strengths, critical risks and recommended actions, suited to a ${net_worth_m}M client",
  "netWorthSummary": {},
  "risks": [
    {RISK_SHAPE}
  ],
  "recommendations": ["Top 5-7 prioritized strategic recommendations"]"#,
                net_worth_shape(profile, None)
            ),
            "Generate at least 5 risks across different categories (tax, legal, insurance, \
liquidity, concentration, succession). Reference the client's actual entities, assets and \
advisors.",
        ),
        ReportKind::AdvisorCoordination => (
            "Generate an advisor coordination plan for this client's advisory team.",
            format!(
                r#"  "executiveSummary": "2-3 paragraphs on the coordination strategy, key priorities and team structure",
  "advisorActions": [
    {ACTION_SHAPE}
  ],
  "recommendations": ["Top coordination recommendations for the family"]"#
            ),
            "Generate at least 10 action items distributed across the advisory team, mixing \
immediate (urgent/high) and longer-term (medium/low) work. Identify dependencies between \
advisors.",
        ),
        ReportKind::ComplianceCalendar => (
            "Generate a 12-month compliance calendar for this client.",
            format!(
                r#"  "executiveSummary": "2-3 paragraphs on key compliance requirements, critical deadlines and estimated annual compliance cost",
  "complianceCalendar": [
    {COMPLIANCE_SHAPE}
  ],
  "recommendations": ["Top recommendations for staying compliant"]"#
            ),
            "Generate 15-20 calendar items across all 12 months, including standard deadlines \
(taxes, trust distributions, insurance renewals, RMDs) and entity-specific filings for the \
client's trusts and LLCs. \"month\" is an integer 1-12.",
        ),
        ReportKind::EstateSummary => (
            "Generate an estate planning summary report for this client.",
            format!(
                r#"  "executiveSummary": "2-3 paragraphs on current estate planning status, key gaps and priority recommendations for a ${net_worth_m}M estate",
  "risks": [
    {RISK_SHAPE}
  ],
  "advisorActions": [
    {ACTION_SHAPE}
  ],
  "recommendations": ["Top estate planning recommendations"]"#
            ),
            "Generate at least 5 estate-related risks and 8 action items. Consider wills, \
trusts, powers of attorney, beneficiary designations, life insurance, business succession and \
charitable planning.",
        ),
        ReportKind::QuarterlyReview => (
            "Generate a quarterly wealth review report for this client.",
            format!(
                r#"  "executiveSummary": "3-4 paragraphs on net worth status, market outlook, key accomplishments and priorities for next quarter",
  "netWorthSummary": {},
  "risks": [
    {RISK_SHAPE}
  ],
  "advisorActions": [
    {ACTION_SHAPE}
  ],
  "complianceCalendar": [
    {COMPLIANCE_SHAPE}
  ],
  "recommendations": ["Top 5-7 recommendations for next quarter"]"#,
                net_worth_shape(profile, Some(&previous_quarter(today)))
            ),
            "Include a realistic quarterly change, 3-5 current risks, 5-8 advisor actions and \
4-6 compliance deadlines falling in the next 3 months.",
        ),
    };

    format!(
        "{intro}\n\n{context}\nReturn a JSON object with this exact structure:\n{{\n  \"title\": \"{title}\",\n{fields}\n}}\n\n{closing}\nToday's date is {}.",
        today.format("%Y-%m-%d")
    )
}
