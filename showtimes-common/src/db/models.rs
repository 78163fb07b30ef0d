//! Database models

use crate::schedule::FullSchedule;
use chrono::NaiveDateTime;

/// Identity of a stored showing
///
/// Two records with equal keys are the same showing, whatever their end or
/// creation timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShowingKey {
    pub theater: String,
    pub title: String,
    pub format: String,
    pub is_open_caption: bool,
    pub no_pass: bool,
    pub start: NaiveDateTime,
}

/// A showing flattened for storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowtimeRecord {
    pub theater: String,
    pub title: String,
    pub format: String,
    pub is_open_caption: bool,
    pub no_pass: bool,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ShowtimeRecord {
    pub fn key(&self) -> ShowingKey {
        ShowingKey {
            theater: self.theater.clone(),
            title: self.title.clone(),
            format: self.format.clone(),
            is_open_caption: self.is_open_caption,
            no_pass: self.no_pass,
            start: self.start,
        }
    }

    /// Flatten every showing of `schedule` for `theater`
    pub fn from_schedule(theater: &str, schedule: &FullSchedule) -> Vec<ShowtimeRecord> {
        schedule
            .movies()
            .flat_map(|movie| {
                movie.showings().iter().map(move |showing| ShowtimeRecord {
                    theater: theater.to_string(),
                    title: movie.name().to_string(),
                    format: showing.format().to_string(),
                    is_open_caption: showing.is_open_caption(),
                    no_pass: showing.no_pass(),
                    start: showing.start(),
                    end: showing.end(),
                })
            })
            .collect()
    }
}

/// A row of the `showtimes` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedShowing {
    pub id: i64,
    pub record: ShowtimeRecord,
    /// Unix seconds
    pub created_at: i64,
}

impl PersistedShowing {
    pub fn key(&self) -> ShowingKey {
        self.record.key()
    }
}

/// Outcome of upserting one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedRecord {
    pub record: ShowtimeRecord,
    /// False when the identity key was already stored
    pub inserted: bool,
}

/// A row of the `deleted_showtimes` audit table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedShowing {
    pub record: ShowtimeRecord,
    pub created_at: i64,
    pub deleted_at: i64,
}
