//! Calendar events and iCalendar rendering

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use ical::generator::{Emitter, IcalCalendarBuilder};
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use showtimes_common::FullSchedule;

/// Length given to showings whose runtime is unknown
const PLACEHOLDER_MINUTES: i64 = 5;

const LOCAL_STAMP_FMT: &str = "%Y%m%dT%H%M%S";
const UTC_STAMP_FMT: &str = "%Y%m%dT%H%M%SZ";
const PRODID: &str = "-//showtimes//showtimes//EN";

/// One showing as a calendar entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Every showing of `schedule`, movies in name order
pub fn calendar_events(schedule: &FullSchedule) -> Vec<CalendarEvent> {
    schedule
        .movies()
        .flat_map(|movie| {
            movie.showings().iter().map(move |showing| {
                let end = if showing.end() > showing.start() {
                    showing.end()
                } else {
                    showing.start() + Duration::minutes(PLACEHOLDER_MINUTES)
                };
                CalendarEvent {
                    title: movie.name().to_string(),
                    start: showing.start(),
                    end,
                }
            })
        })
        .collect()
}

/// Render `events` as an iCalendar document
///
/// Start and end are floating local times; `stamp` becomes every DTSTAMP.
pub fn render_ics(events: &[CalendarEvent], stamp: DateTime<Utc>) -> String {
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(PRODID)
        .build();

    let dtstamp = stamp.format(UTC_STAMP_FMT).to_string();
    calendar.events = events
        .iter()
        .enumerate()
        .map(|(index, event)| to_ical_event(index, event, &dtstamp))
        .collect();

    calendar.generate()
}

fn to_ical_event(index: usize, event: &CalendarEvent, dtstamp: &str) -> IcalEvent {
    let start = event.start.format(LOCAL_STAMP_FMT).to_string();

    let mut ical_event = IcalEvent::new();
    ical_event.properties = vec![
        property("UID", format!("{}-{}@showtimes", start, index)),
        property("DTSTAMP", dtstamp.to_string()),
        property("DTSTART", start),
        property("DTEND", event.end.format(LOCAL_STAMP_FMT).to_string()),
        property("SUMMARY", event.title.clone()),
    ];
    ical_event
}

fn property(name: &str, value: String) -> Property {
    Property {
        name: name.to_string(),
        params: None,
        value: Some(value),
    }
}
