//! CSV exports of report findings, in the same format as the client record exports.

use wealthsync_core::export::csv_table;

use crate::{AdvisorAction, ComplianceItem, Risk};

pub fn risks_csv(risks: &[Risk]) -> Option<String> {
    csv_table(
        &[
            "Severity",
            "Category",
            "Title",
            "Description",
            "Financial Impact",
            "Recommendation",
            "Assigned Advisor",
        ],
        risks.iter().map(|r| {
            vec![
                r.severity.as_str().to_string(),
                r.category.clone(),
                r.title.clone(),
                r.description.clone(),
                r.financial_impact.clone().unwrap_or_default(),
                r.recommendation.clone(),
                r.assigned_advisor.clone().unwrap_or_default(),
            ]
        }),
    )
}

pub fn advisor_actions_csv(actions: &[AdvisorAction]) -> Option<String> {
    csv_table(
        &[
            "Priority",
            "Advisor Role",
            "Advisor",
            "Action",
            "Deadline",
            "Depends On",
            "Estimated Cost",
            "Status",
        ],
        actions.iter().map(|a| {
            vec![
                a.priority.as_str().to_string(),
                a.advisor_role.clone(),
                a.advisor_name.clone().unwrap_or_default(),
                a.action.clone(),
                a.deadline.clone().unwrap_or_default(),
                a.dependencies.join("; "),
                a.estimated_cost.clone().unwrap_or_default(),
                a.status.clone(),
            ]
        }),
    )
}

/// Compliance items ordered by month.
pub fn compliance_calendar_csv(items: &[ComplianceItem]) -> Option<String> {
    let mut sorted: Vec<&ComplianceItem> = items.iter().collect();
    sorted.sort_by_key(|i| i.month);
    csv_table(
        &[
            "Month",
            "Title",
            "Category",
            "Responsible Party",
            "Estimated Fee",
            "Penalty",
            "Recurrence",
        ],
        sorted.into_iter().map(|i| {
            vec![
                month_name(i.month).to_string(),
                i.title.clone(),
                i.category.label().to_string(),
                i.responsible_party.clone(),
                i.estimated_fee
                    .map(|fee| wealthsync_core::format::format_currency(fee, false))
                    .unwrap_or_default(),
                i.penalty.clone().unwrap_or_default(),
                i.recurrence.map(|r| r.label()).unwrap_or("").to_string(),
            ]
        }),
    )
}

fn month_name(month: u8) -> &'static str {
    const NAMES: [&str; 12] = [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ];
    month
        .checked_sub(1)
        .and_then(|i| NAMES.get(usize::from(i)))
        .copied()
        .unwrap_or("")
}
