//! CSV exports of client records.
//!
//! Every cell is quoted, embedded quotes are doubled and rows are separated
//! by `\n`. An export with no rows yields `None`.

use crate::deadlines::parse_due_date;
use crate::format::{format_currency, format_date};
use crate::{Advisor, ClientProfile, Deadline};

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// Build a CSV table from a header and rows of already formatted cells.
pub fn csv_table<I>(header: &[&str], rows: I) -> Option<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut lines = vec![header.iter().map(|h| quote(h)).collect::<Vec<_>>().join(",")];
    lines.extend(
        rows.into_iter()
            .map(|row| row.iter().map(|c| quote(c)).collect::<Vec<_>>().join(",")),
    );
    if lines.len() == 1 {
        return None;
    }
    Some(lines.join("\n"))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn deadlines_csv(deadlines: &[Deadline]) -> Option<String> {
    csv_table(
        &["Title", "Category", "Due Date", "Status", "Recurrence", "Notes"],
        deadlines.iter().map(|d| {
            vec![
                d.title.clone(),
                d.category.label().to_string(),
                parse_due_date(&d.due_date)
                    .map(format_date)
                    .unwrap_or_else(|| d.due_date.clone()),
                capitalize(&d.status.as_str().replace('_', " ")),
                d.recurrence.label().to_string(),
                d.notes.clone(),
            ]
        }),
    )
}

pub fn advisors_csv(advisors: &[Advisor]) -> Option<String> {
    csv_table(
        &["Name", "Firm", "Email", "Phone", "Specialty", "Last Contact"],
        advisors.iter().map(|a| {
            vec![
                a.name.clone(),
                a.firm.clone(),
                a.email.clone(),
                a.phone.clone(),
                a.specialty.label().to_string(),
                a.last_contact_date
                    .map(format_date)
                    .unwrap_or_else(|| "Never".to_string()),
            ]
        }),
    )
}

/// Per-entity assets, liabilities and net worth, closed by a TOTAL row.
pub fn wealth_summary_csv(profile: &ClientProfile) -> Option<String> {
    let balances = profile.entity_balances();
    if balances.is_empty() {
        return None;
    }
    let total_assets: f64 = balances.iter().map(|b| b.total_assets).sum();
    let total_liabilities: f64 = balances.iter().map(|b| b.total_liabilities).sum();

    let rows = balances
        .iter()
        .map(|b| {
            vec![
                b.name.clone(),
                b.entity_type.label().to_string(),
                format_currency(b.total_assets, false),
                format_currency(b.total_liabilities, false),
                format_currency(b.net_value(), false),
            ]
        })
        .chain(std::iter::once(vec![
            "TOTAL".to_string(),
            String::new(),
            format_currency(total_assets, false),
            format_currency(total_liabilities, false),
            format_currency(total_assets - total_liabilities, false),
        ]));

    csv_table(
        &["Entity Name", "Type", "Total Assets", "Total Liabilities", "Net Worth"],
        rows,
    )
}
