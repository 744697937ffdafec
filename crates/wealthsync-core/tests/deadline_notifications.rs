//! Integration tests for deriving notifications from deadlines.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use wealthsync_core::{
    derive_notifications, Deadline, DeadlineCategory, DeadlineStatus, NotificationFeed,
    NotificationKind, Priority, Recurrence,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
}

fn due_in(days: i64) -> String {
    (now().date_naive() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

fn deadline(id: &str, title: &str, due_date: String) -> Deadline {
    Deadline {
        id: id.to_string(),
        title: title.to_string(),
        due_date,
        category: DeadlineCategory::Tax,
        status: DeadlineStatus::Upcoming,
        recurrence: Recurrence::OneTime,
        advisor_id: None,
        notes: String::new(),
        reminders: vec![],
        completed_at: None,
        created_at: None,
    }
}

#[rstest]
#[case(-10, NotificationKind::Deadline, Priority::Urgent, "Overdue Deadline", "\"Filing\" was due 10 days ago")]
#[case(-1, NotificationKind::Deadline, Priority::Urgent, "Overdue Deadline", "\"Filing\" was due 1 day ago")]
#[case(0, NotificationKind::Deadline, Priority::Urgent, "Due Today", "\"Filing\" is due today")]
#[case(1, NotificationKind::Deadline, Priority::High, "Due Tomorrow", "\"Filing\" is due tomorrow")]
#[case(2, NotificationKind::Reminder, Priority::High, "Deadline Approaching", "\"Filing\" is due in 2 days")]
#[case(3, NotificationKind::Reminder, Priority::High, "Deadline Approaching", "\"Filing\" is due in 3 days")]
#[case(4, NotificationKind::Reminder, Priority::Medium, "Upcoming Deadline", "\"Filing\" is due in 4 days")]
#[case(5, NotificationKind::Reminder, Priority::Medium, "Upcoming Deadline", "\"Filing\" is due in 5 days")]
#[case(7, NotificationKind::Reminder, Priority::Medium, "Upcoming Deadline", "\"Filing\" is due in 7 days")]
fn mapping_table(
    #[case] days: i64,
    #[case] kind: NotificationKind,
    #[case] priority: Priority,
    #[case] title: &str,
    #[case] message: &str,
) {
    let out = derive_notifications(now(), &[deadline("d-1", "Filing", due_in(days))]);
    assert_eq!(out.len(), 1);
    let n = &out[0];
    assert_eq!(n.kind, kind);
    assert_eq!(n.priority, priority);
    assert_eq!(n.title, title);
    assert_eq!(n.message, message);
    assert_eq!(n.linked_deadline_id.as_deref(), Some("d-1"));
    assert_eq!(n.created_at, now());
    assert!(!n.read);
}

#[rstest]
#[case(8)]
#[case(30)]
#[case(365)]
fn nothing_beyond_a_week(#[case] days: i64) {
    assert!(derive_notifications(now(), &[deadline("d", "Later", due_in(days))]).is_empty());
}

#[test]
fn completed_deadlines_never_notify() {
    let mut overdue = deadline("d", "Done", due_in(-3));
    overdue.status = DeadlineStatus::Completed;
    let mut today = deadline("e", "Also done", due_in(0));
    today.status = DeadlineStatus::Completed;
    assert!(derive_notifications(now(), &[overdue, today]).is_empty());
}

#[test]
fn uses_calendar_days_not_elapsed_hours() {
    // Late evening: a deadline due "tomorrow" is only a few hours away.
    let late = Utc.with_ymd_and_hms(2026, 10, 19, 23, 59, 0).unwrap();
    let out = derive_notifications(late, &[deadline("d", "Wire", "2026-10-20".into())]);
    assert_eq!(out[0].title, "Due Tomorrow");

    // Early morning: due earlier today still counts as today.
    let early = Utc.with_ymd_and_hms(2026, 10, 19, 0, 1, 0).unwrap();
    let out = derive_notifications(early, &[deadline("d", "Wire", "2026-10-19T00:00:00Z".into())]);
    assert_eq!(out[0].title, "Due Today");
}

#[test]
fn invalid_due_dates_are_skipped_not_fatal() {
    let list = vec![
        deadline("bad-1", "Unknown", "next tuesday".into()),
        deadline("ok", "Premium", due_in(2)),
        deadline("bad-2", "Blank", String::new()),
    ];
    let out = derive_notifications(now(), &list);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].linked_deadline_id.as_deref(), Some("ok"));
}

#[test]
fn sorted_by_priority_and_stable_within_priority() {
    let list = vec![
        deadline("m1", "Medium one", due_in(6)),
        deadline("h1", "High one", due_in(2)),
        deadline("u1", "Urgent one", due_in(-2)),
        deadline("m2", "Medium two", due_in(4)),
        deadline("u2", "Urgent two", due_in(0)),
        deadline("h2", "High two", due_in(1)),
    ];
    let out = derive_notifications(now(), &list);
    let ids: Vec<&str> = out
        .iter()
        .map(|n| n.linked_deadline_id.as_deref().unwrap())
        .collect();
    assert_eq!(ids, vec!["u1", "u2", "h1", "h2", "m1", "m2"]);
    assert!(out.windows(2).all(|w| w[0].priority <= w[1].priority));
}

#[test]
fn every_notification_gets_a_fresh_id() {
    let list = vec![
        deadline("a", "A", due_in(1)),
        deadline("b", "B", due_in(1)),
    ];
    let first = derive_notifications(now(), &list);
    let second = derive_notifications(now(), &list);
    assert_ne!(first[0].id, first[1].id);
    assert_ne!(first[0].id, second[0].id);
}

#[test]
fn feed_refresh_replaces_contents() {
    let mut feed = NotificationFeed::with_capacity(2);
    feed.add(NotificationKind::Info, Priority::Low, "Welcome", "hello", now());
    let list = vec![
        deadline("a", "A", due_in(5)),
        deadline("b", "B", due_in(-1)),
        deadline("c", "C", due_in(1)),
    ];
    feed.refresh_from_deadlines(now(), &list);
    let ids: Vec<&str> = feed
        .notifications()
        .iter()
        .map(|n| n.linked_deadline_id.as_deref().unwrap())
        .collect();
    assert_eq!(ids, vec!["b", "c"]);
    assert_eq!(feed.unread_count(), 2);
}

