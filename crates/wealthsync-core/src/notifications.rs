//! Deadline notifications.
//!
//! [`derive_notifications`] turns the current deadline list into prioritized
//! notices. It holds no state: every call recomputes from scratch, and the
//! caller decides where the result lives. [`NotificationFeed`] is the
//! session-owned holder for that result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deadlines::days_until;
use crate::format::pluralize;
use crate::{Deadline, DeadlineStatus};

/// Deadlines further out than this produce no notification.
pub const LOOKAHEAD_DAYS: i64 = 7;

/// Default number of notifications a feed keeps.
pub const DEFAULT_FEED_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Deadline,
    Reminder,
    Alert,
    Info,
}

/// Ordered most to least pressing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_deadline_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

/// Kind, priority, title and message for a deadline `days` away, or `None`
/// when it is too far out to mention.
fn classify(title: &str, days: i64) -> Option<(NotificationKind, Priority, &'static str, String)> {
    use NotificationKind::{Deadline, Reminder};

    let rule = match days {
        d if d < 0 => {
            let ago = d.unsigned_abs();
            (
                Deadline,
                Priority::Urgent,
                "Overdue Deadline",
                format!("\"{title}\" was due {ago} {} ago", pluralize(ago, "day", "days")),
            )
        }
        0 => (
            Deadline,
            Priority::Urgent,
            "Due Today",
            format!("\"{title}\" is due today"),
        ),
        1 => (
            Deadline,
            Priority::High,
            "Due Tomorrow",
            format!("\"{title}\" is due tomorrow"),
        ),
        2..=3 => (
            Reminder,
            Priority::High,
            "Deadline Approaching",
            format!("\"{title}\" is due in {days} days"),
        ),
        4..=LOOKAHEAD_DAYS => (
            Reminder,
            Priority::Medium,
            "Upcoming Deadline",
            format!("\"{title}\" is due in {days} days"),
        ),
        _ => return None,
    };
    Some(rule)
}

/// Derive notifications for every open deadline due within the lookahead
/// window (and every overdue one), most urgent first.
///
/// Equal priorities keep their input order. Deadlines whose due date cannot
/// be read are skipped with a warning rather than failing the batch.
pub fn derive_notifications(now: DateTime<Utc>, deadlines: &[Deadline]) -> Vec<Notification> {
    let today = now.date_naive();
    let mut out = Vec::new();

    for deadline in deadlines {
        if deadline.status == DeadlineStatus::Completed {
            continue;
        }
        let days = match days_until(deadline, today) {
            Ok(days) => days,
            Err(e) => {
                tracing::warn!(error = %e, "skipping deadline");
                continue;
            }
        };
        let Some((kind, priority, title, message)) = classify(&deadline.title, days) else {
            continue;
        };
        out.push(Notification {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            title: title.to_string(),
            message,
            priority,
            linked_deadline_id: Some(deadline.id.clone()),
            created_at: now,
            read: false,
        });
    }

    // sort_by_key is stable
    out.sort_by_key(|n| n.priority);
    out
}

/// Notifications held for one session, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFeed {
    notifications: Vec<Notification>,
    last_checked: Option<DateTime<Utc>>,
    capacity: usize,
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_FEED_CAPACITY)
    }
}

impl NotificationFeed {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            notifications: Vec::new(),
            last_checked: None,
            capacity: capacity.max(1),
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.last_checked
    }

    /// Push a new unread notification to the front and return its id.
    /// The oldest entries fall off once the feed is full.
    pub fn add(
        &mut self,
        kind: NotificationKind,
        priority: Priority,
        title: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.notifications.insert(
            0,
            Notification {
                id: id.clone(),
                kind,
                title: title.into(),
                message: message.into(),
                priority,
                linked_deadline_id: None,
                created_at: now,
                read: false,
            },
        );
        self.notifications.truncate(self.capacity);
        id
    }

    /// Returns false when no notification has this id.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self, now: DateTime<Utc>) {
        for n in &mut self.notifications {
            n.read = true;
        }
        self.last_checked = Some(now);
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.notifications.clear();
        self.last_checked = Some(now);
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    /// Unread notifications at urgent or high priority.
    pub fn urgent(&self) -> impl Iterator<Item = &Notification> {
        self.notifications
            .iter()
            .filter(|n| !n.read && n.priority <= Priority::High)
    }

    /// Replace the feed contents with notifications derived from `deadlines`.
    pub fn refresh_from_deadlines(&mut self, now: DateTime<Utc>, deadlines: &[Deadline]) {
        let mut fresh = derive_notifications(now, deadlines);
        fresh.truncate(self.capacity);
        self.notifications = fresh;
    }
}
