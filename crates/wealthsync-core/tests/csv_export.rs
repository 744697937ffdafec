//! Integration tests for CSV exports.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use wealthsync_core::export::{advisors_csv, deadlines_csv, wealth_summary_csv};
use wealthsync_core::{Advisor, AdvisorSpecialty, ClientProfile, Deadline};

#[test]
fn deadlines_export_formats_dates_and_labels() {
    let deadlines: Vec<Deadline> = serde_json::from_value(serde_json::json!([
        {"id": "d-1", "title": "Q4 estimated tax", "dueDate": "2027-01-15", "category": "tax",
         "status": "due_soon", "recurrence": "quarterly", "notes": "Form 1040-ES"},
        {"id": "d-2", "title": "Policy \"umbrella\" renewal", "dueDate": "sometime", "category": "insurance",
         "status": "upcoming"}
    ]))
    .unwrap();

    let csv = deadlines_csv(&deadlines).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "\"Title\",\"Category\",\"Due Date\",\"Status\",\"Recurrence\",\"Notes\""
    );
    assert_eq!(
        lines[1],
        "\"Q4 estimated tax\",\"Tax\",\"Jan 15, 2027\",\"Due soon\",\"Quarterly\",\"Form 1040-ES\""
    );
    assert_eq!(
        lines[2],
        "\"Policy \"\"umbrella\"\" renewal\",\"Insurance\",\"sometime\",\"Upcoming\",\"One-time\",\"\""
    );
}

#[test]
fn advisors_export_marks_never_contacted() {
    let advisors = vec![Advisor {
        id: "adv-1".into(),
        name: "Dana Whitfield".into(),
        firm: "Whitfield & Co".into(),
        email: "dana@whitfield.example".into(),
        phone: "555-0100".into(),
        specialty: AdvisorSpecialty::EstateAttorney,
        notes: String::new(),
        is_primary: true,
        last_contact_date: None,
    }];
    let csv = advisors_csv(&advisors).unwrap();
    assert!(csv.ends_with("\"Estate Attorney\",\"Never\""));

    let mut contacted = advisors;
    contacted[0].last_contact_date = NaiveDate::from_ymd_opt(2026, 9, 2);
    assert!(advisors_csv(&contacted).unwrap().ends_with("\"Sep 2, 2026\""));
}

#[test]
fn wealth_summary_has_total_row() {
    let profile: ClientProfile = serde_json::from_value(serde_json::json!({
        "id": "c-1",
        "clientName": "Reyes",
        "entities": [
            {"id": "e-1", "name": "Reyes LLC", "type": "llc"},
            {"id": "e-2", "name": "Personal", "type": "personal"}
        ],
        "assets": [
            {"id": "a-1", "name": "Office building", "category": "real_estate", "value": 1500000.0, "entityId": "e-1"},
            {"id": "a-2", "name": "Savings", "category": "cash", "value": 250000.0, "entityId": "e-2"}
        ],
        "liabilities": [
            {"id": "l-1", "name": "Commercial loan", "category": "loan", "balance": 500000.0, "entityId": "e-1"}
        ]
    }))
    .unwrap();

    let csv = wealth_summary_csv(&profile).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[1],
        "\"Reyes LLC\",\"LLC\",\"$1,500,000\",\"$500,000\",\"$1,000,000\""
    );
    assert_eq!(
        lines[3],
        "\"TOTAL\",\"\",\"$1,750,000\",\"$500,000\",\"$1,250,000\""
    );
}
