//! Display formatting shared by prompts and exports.

use chrono::NaiveDate;

pub fn pluralize<'a>(count: u64, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

/// Group an integer with thousands separators.
fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// US dollar amount rounded to whole dollars, e.g. `$1,234,567` or `-$500`.
///
/// With `compact`, amounts of a million or more shorten to `$1.2M` / `$3.4B`.
pub fn format_currency(amount: f64, compact: bool) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let abs = amount.abs();

    if compact && abs >= 1_000_000.0 {
        let (scaled, suffix) = if abs >= 1_000_000_000.0 {
            (abs / 1_000_000_000.0, "B")
        } else {
            (abs / 1_000_000.0, "M")
        };
        let text = format!("{scaled:.1}");
        let text = text.strip_suffix(".0").unwrap_or(&text);
        return format!("{sign}${text}{suffix}");
    }

    format!("{sign}${}", group_thousands(abs.round() as u64))
}

/// Signed percentage with one decimal, e.g. `+4.2%`.
pub fn format_percent(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{value:.1}%")
}

/// `Apr 15, 2026`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Cut `text` to at most `max` characters, ending in `...` when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}
