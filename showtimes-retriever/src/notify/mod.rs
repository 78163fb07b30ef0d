//! Digest notification
//!
//! Builds the schedule digest for one or more theaters: a date-only text
//! summary and an iCalendar file per theater, attached to a single mail.

pub mod calendar;
pub mod mail;

pub use calendar::{calendar_events, render_ics, CalendarEvent};
pub use mail::{Address, Attachment, Mail, MailError, MailtrapClient};

use chrono::{DateTime, Utc};
use showtimes_common::time::DateRange;
use showtimes_common::FullSchedule;
use std::collections::BTreeMap;

const DIGEST_BODY: &str = "Schedules attached";

/// `Movie Schedules <start>[ to <end>]`
pub fn digest_subject(range: DateRange) -> String {
    let mut subject = format!("Movie Schedules {}", range.start);
    if !range.is_single_day() {
        subject.push_str(&format!(" to {}", range.end));
    }
    subject
}

/// Text attachments for every theater, then calendar attachments
pub fn digest_attachments(
    schedules: &BTreeMap<String, FullSchedule>,
    stamp: DateTime<Utc>,
) -> Vec<Attachment> {
    let text = schedules.iter().map(|(theater, schedule)| {
        Attachment::new(
            format!("{}.txt", theater),
            "text/plain",
            schedule.output(false, true).as_bytes(),
        )
    });
    let calendars = schedules.iter().map(|(theater, schedule)| {
        let ics = render_ics(&calendar_events(schedule), stamp);
        Attachment::new(format!("{}.ics", theater), "text/calendar", ics.as_bytes())
    });
    text.chain(calendars).collect()
}

/// Assemble the digest mail
pub fn build_digest(
    schedules: &BTreeMap<String, FullSchedule>,
    range: DateRange,
    from: Address,
    to: Address,
    stamp: DateTime<Utc>,
) -> Mail {
    Mail {
        from,
        to: vec![to],
        subject: digest_subject(range),
        text: DIGEST_BODY.to_string(),
        attachments: digest_attachments(schedules, stamp),
    }
}
