use serde_json::Value;

use crate::{ReportContent, ReportError, ReportKind};

/// Allowed drift when asset allocation percentages are summed.
const ALLOCATION_TOLERANCE: f64 = 1.0;

/// Cut the JSON object out of raw completion text.
///
/// Uses the body of the first ``` fence when there is one (an optional
/// `json` tag is skipped), then slices from the first `{` to the last `}`.
pub fn extract_json(raw: &str) -> Option<&str> {
    let body = fenced_body(raw).unwrap_or(raw);
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&body[start..=end])
}

fn fenced_body(raw: &str) -> Option<&str> {
    let open = raw.find("```")?;
    let after = &raw[open + 3..];
    let after = after.strip_prefix("json").unwrap_or(after);
    let close = after.find("```")?;
    Some(&after[..close])
}

fn malformed(reason: impl Into<String>, raw: &str) -> ReportError {
    ReportError::MalformedReport {
        reason: reason.into(),
        raw: raw.to_string(),
    }
}

/// Parse completion text into report content for `kind`.
///
/// Missing or null required keys give [`ReportError::IncompleteReport`];
/// anything else that does not fit the schema gives
/// [`ReportError::MalformedReport`]. Both carry the raw text.
pub fn parse_report(kind: ReportKind, raw: &str) -> Result<ReportContent, ReportError> {
    let json = extract_json(raw).ok_or_else(|| malformed("no JSON object found", raw))?;

    let value: Value =
        serde_json::from_str(json).map_err(|e| malformed(format!("invalid JSON: {e}"), raw))?;
    let Value::Object(map) = &value else {
        return Err(malformed("top-level JSON value is not an object", raw));
    };

    let missing: Vec<&'static str> = kind
        .required_keys()
        .iter()
        .copied()
        .filter(|key| map.get(*key).map_or(true, Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(ReportError::IncompleteReport {
            kind,
            missing,
            raw: raw.to_string(),
        });
    }

    let content: ReportContent = serde_json::from_value(value)
        .map_err(|e| malformed(format!("does not match the {kind} schema: {e}"), raw))?;

    if let Some(item) = content
        .compliance_calendar
        .iter()
        .find(|item| !(1..=12).contains(&item.month))
    {
        return Err(malformed(
            format!("compliance item '{}' has month {}", item.title, item.month),
            raw,
        ));
    }

    check_allocation(kind, &content);
    Ok(content)
}

fn check_allocation(kind: ReportKind, content: &ReportContent) {
    let Some(summary) = &content.net_worth_summary else {
        return;
    };
    if summary.asset_allocation.is_empty() {
        return;
    }
    let total: f64 = summary.asset_allocation.values().sum();
    if (total - 100.0).abs() > ALLOCATION_TOLERANCE {
        tracing::warn!(kind = %kind, total, "asset allocation does not sum to 100");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_tagged_fence() {
        let raw = "Here you go:\n```json\n{\"a\": 1}\n```\nThanks";
        assert_eq!(extract_json(raw), Some("{\"a\": 1}"));
    }

    #[test]
    fn extracts_from_untagged_fence() {
        let raw = "```\n{\"a\": {\"b\": 2}}\n```";
        assert_eq!(extract_json(raw), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn first_fence_wins() {
        let raw = "```json\n{\"first\": true}\n```\n```json\n{\"second\": true}\n```";
        assert_eq!(extract_json(raw), Some("{\"first\": true}"));
    }

    #[test]
    fn unfenced_braces_span() {
        let raw = "Sure! {\"a\": 1} hope that helps }";
        assert_eq!(extract_json(raw), Some("{\"a\": 1} hope that helps }"));
        assert_eq!(extract_json("no json here"), None);
        assert_eq!(extract_json("} backwards {"), None);
    }

    #[test]
    fn lone_brace_is_malformed() {
        let err = parse_report(ReportKind::WealthAudit, "{").unwrap_err();
        assert!(matches!(err, ReportError::MalformedReport { .. }));
    }

    #[test]
    fn null_required_key_counts_as_missing() {
        let raw = r#"{"executiveSummary": "ok", "advisorActions": null, "recommendations": []}"#;
        match parse_report(ReportKind::AdvisorCoordination, raw) {
            Err(ReportError::IncompleteReport { missing, .. }) => {
                assert_eq!(missing, vec!["advisorActions"]);
            }
            other => panic!("expected IncompleteReport, got {other:?}"),
        }
    }

    #[test]
    fn month_out_of_range_is_malformed() {
        let raw = r#"{
            "executiveSummary": "ok",
            "complianceCalendar": [
                {"month": 13, "title": "Smarch filing", "category": "tax"}
            ],
            "recommendations": []
        }"#;
        let err = parse_report(ReportKind::ComplianceCalendar, raw).unwrap_err();
        assert!(matches!(err, ReportError::MalformedReport { ref reason, .. } if reason.contains("month 13")));
    }
}
