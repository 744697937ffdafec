//! Deadline dates, status upkeep and recurrence.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};

use crate::{CoreError, Deadline, DeadlineStatus, Recurrence};

/// Deadlines due within this many days are "due soon".
pub const DUE_SOON_DAYS: i64 = 7;

/// Parse a stored due date.
///
/// Accepts a plain `YYYY-MM-DD` date or an RFC 3339 timestamp, which is
/// reduced to its UTC calendar date.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc).date_naive())
}

/// Whole calendar days from `today` until the deadline is due. Negative when past due.
pub fn days_until(deadline: &Deadline, today: NaiveDate) -> Result<i64, CoreError> {
    let due = parse_due_date(&deadline.due_date).ok_or_else(|| CoreError::InvalidDueDate {
        id: deadline.id.clone(),
        raw: deadline.due_date.clone(),
    })?;
    Ok((due - today).num_days())
}

fn status_for(days: i64) -> DeadlineStatus {
    if days < 0 {
        DeadlineStatus::Overdue
    } else if days <= DUE_SOON_DAYS {
        DeadlineStatus::DueSoon
    } else {
        DeadlineStatus::Upcoming
    }
}

/// Recompute the status of an open deadline. Completed deadlines and
/// deadlines with unreadable dates are left alone.
pub fn refresh_status(deadline: &mut Deadline, today: NaiveDate) {
    if deadline.status == DeadlineStatus::Completed {
        return;
    }
    match days_until(deadline, today) {
        Ok(days) => deadline.status = status_for(days),
        Err(e) => tracing::warn!(error = %e, "leaving deadline status unchanged"),
    }
}

/// Add whole months, clamping to the last day of shorter months.
fn advance(date: NaiveDate, recurrence: Recurrence) -> Option<NaiveDate> {
    let months = match recurrence {
        Recurrence::OneTime => return None,
        Recurrence::Monthly => 1,
        Recurrence::Quarterly => 3,
        Recurrence::Annual => 12,
    };
    date.checked_add_months(Months::new(months))
}

/// Mark a deadline completed.
///
/// Returns the next occurrence for recurring deadlines. The follow-up gets a
/// fresh id, keeps the title, category and reminders, and its status is
/// recomputed against `now`.
pub fn complete(deadline: &mut Deadline, now: DateTime<Utc>) -> Result<Option<Deadline>, CoreError> {
    let due = parse_due_date(&deadline.due_date).ok_or_else(|| CoreError::InvalidDueDate {
        id: deadline.id.clone(),
        raw: deadline.due_date.clone(),
    })?;

    deadline.status = DeadlineStatus::Completed;
    deadline.completed_at = Some(now);

    let Some(next_due) = advance(due, deadline.recurrence) else {
        return Ok(None);
    };

    let mut next = Deadline {
        id: uuid::Uuid::new_v4().to_string(),
        due_date: next_due.format("%Y-%m-%d").to_string(),
        status: DeadlineStatus::Upcoming,
        completed_at: None,
        created_at: Some(now),
        ..deadline.clone()
    };
    refresh_status(&mut next, now.date_naive());
    tracing::debug!(
        completed = %deadline.id,
        next = %next.id,
        due = %next.due_date,
        "scheduled next occurrence"
    );
    Ok(Some(next))
}

/// Open deadlines ordered by due date, at most `count` of them.
/// Deadlines with unreadable dates sort after all dated ones.
pub fn upcoming(deadlines: &[Deadline], count: usize) -> Vec<&Deadline> {
    let mut open: Vec<(Option<NaiveDate>, &Deadline)> = deadlines
        .iter()
        .filter(|d| d.status != DeadlineStatus::Completed)
        .map(|d| (parse_due_date(&d.due_date), d))
        .collect();
    open.sort_by_key(|(due, _)| (due.is_none(), *due));
    open.into_iter().take(count).map(|(_, d)| d).collect()
}

/// The quarter (1-4) a date falls in.
pub fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeadlineCategory;
    use chrono::TimeZone;

    fn deadline(id: &str, due: &str, recurrence: Recurrence) -> Deadline {
        Deadline {
            id: id.into(),
            title: format!("Deadline {id}"),
            due_date: due.into(),
            category: DeadlineCategory::Tax,
            status: DeadlineStatus::Upcoming,
            recurrence,
            advisor_id: None,
            notes: String::new(),
            reminders: vec![7, 1],
            completed_at: None,
            created_at: None,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_dates_and_timestamps() {
        assert_eq!(parse_due_date("2026-04-15"), Some(day(2026, 4, 15)));
        assert_eq!(
            parse_due_date("2026-04-15T23:30:00-05:00"),
            Some(day(2026, 4, 16))
        );
        assert_eq!(parse_due_date("April 15th"), None);
        assert_eq!(parse_due_date(""), None);
    }

    #[test]
    fn refresh_status_buckets() {
        let today = day(2026, 3, 1);
        let mut d = deadline("a", "2026-02-27", Recurrence::OneTime);
        refresh_status(&mut d, today);
        assert_eq!(d.status, DeadlineStatus::Overdue);

        let mut d = deadline("b", "2026-03-08", Recurrence::OneTime);
        refresh_status(&mut d, today);
        assert_eq!(d.status, DeadlineStatus::DueSoon);

        let mut d = deadline("c", "2026-03-09", Recurrence::OneTime);
        refresh_status(&mut d, today);
        assert_eq!(d.status, DeadlineStatus::Upcoming);

        let mut d = deadline("d", "garbage", Recurrence::OneTime);
        d.status = DeadlineStatus::DueSoon;
        refresh_status(&mut d, today);
        assert_eq!(d.status, DeadlineStatus::DueSoon);
    }

    #[test]
    fn completing_one_time_deadline_has_no_successor() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut d = deadline("a", "2026-03-01", Recurrence::OneTime);
        assert!(complete(&mut d, now).unwrap().is_none());
        assert_eq!(d.status, DeadlineStatus::Completed);
        assert_eq!(d.completed_at, Some(now));
    }

    #[test]
    fn monthly_recurrence_clamps_to_month_end() {
        let now = Utc.with_ymd_and_hms(2026, 1, 31, 9, 0, 0).unwrap();
        let mut d = deadline("a", "2026-01-31", Recurrence::Monthly);
        let next = complete(&mut d, now).unwrap().unwrap();
        assert_eq!(next.due_date, "2026-02-28");
        assert_eq!(next.status, DeadlineStatus::Upcoming);
        assert_ne!(next.id, d.id);
        assert_eq!(next.reminders, vec![7, 1]);
        assert!(next.completed_at.is_none());
    }

    #[test]
    fn quarterly_and_annual_recurrence() {
        let now = Utc.with_ymd_and_hms(2026, 4, 10, 9, 0, 0).unwrap();
        let mut q = deadline("q", "2026-04-15", Recurrence::Quarterly);
        assert_eq!(complete(&mut q, now).unwrap().unwrap().due_date, "2026-07-15");

        let mut a = deadline("y", "2028-02-29", Recurrence::Annual);
        assert_eq!(complete(&mut a, now).unwrap().unwrap().due_date, "2029-02-28");
    }

    #[test]
    fn completing_with_bad_date_is_an_error() {
        let mut d = deadline("bad", "soon", Recurrence::Monthly);
        let err = complete(&mut d, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDueDate { .. }));
        assert_eq!(d.status, DeadlineStatus::Upcoming);
    }

    #[test]
    fn upcoming_orders_by_due_date_and_limits() {
        let mut done = deadline("done", "2026-01-01", Recurrence::OneTime);
        done.status = DeadlineStatus::Completed;
        let list = vec![
            deadline("late", "2026-09-01", Recurrence::OneTime),
            deadline("bad", "n/a", Recurrence::OneTime),
            done,
            deadline("soon", "2026-02-01", Recurrence::OneTime),
            deadline("mid", "2026-05-01", Recurrence::OneTime),
        ];
        let ids: Vec<&str> = upcoming(&list, 3).iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["soon", "mid", "late"]);

        let all: Vec<&str> = upcoming(&list, 10).iter().map(|d| d.id.as_str()).collect();
        assert_eq!(all.last(), Some(&"bad"));
    }

    #[test]
    fn quarters() {
        assert_eq!(quarter_of(day(2026, 1, 1)), 1);
        assert_eq!(quarter_of(day(2026, 6, 30)), 2);
        assert_eq!(quarter_of(day(2026, 10, 19)), 4);
    }
}
