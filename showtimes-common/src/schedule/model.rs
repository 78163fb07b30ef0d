//! Schedule entity model
//!
//! `Showing` -> `Movie` -> `DaySchedule` -> `FullSchedule`. A `Movie` owns its
//! showings outright; merging moves showings into a new concatenated sequence
//! instead of sharing a list between days, so each day can be built on its
//! own before the single-threaded merge.

use crate::schedule::filter::Filter;
use crate::schedule::normalize::{normalize_attributes, strip_release_year};
use crate::schedule::runtime::RawRuntime;
use crate::time::parse_showtime;
use crate::{Error, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::debug;

/// One scheduled screening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Showing {
    format: String,
    languages: Vec<String>,
    is_open_caption: bool,
    no_pass: bool,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Showing {
    /// Build a showing from a listing group's attributes
    ///
    /// `end` is `start + runtime_min`, so it equals `start` for unknown
    /// runtimes.
    pub fn create<S: AsRef<str>>(
        attributes: &[S],
        raw_start_time: &str,
        runtime_min: u32,
        day: NaiveDate,
    ) -> Result<Self> {
        let attrs = normalize_attributes(attributes);
        let start = day.and_time(parse_showtime(raw_start_time)?);
        let end = start + Duration::minutes(i64::from(runtime_min));

        Ok(Self {
            format: attrs.format,
            languages: attrs.languages,
            is_open_caption: attrs.is_open_caption,
            no_pass: attrs.no_pass,
            start,
            end,
        })
    }

    /// Construct from already-normalized values
    ///
    /// `end` earlier than `start` is clamped to `start`.
    pub fn new(
        format: impl Into<String>,
        languages: Vec<String>,
        is_open_caption: bool,
        no_pass: bool,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            format: format.into(),
            languages,
            is_open_caption,
            no_pass,
            start,
            end: end.max(start),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn is_open_caption(&self) -> bool {
        self.is_open_caption
    }

    pub fn no_pass(&self) -> bool {
        self.no_pass
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn passes(&self, filter: &Filter) -> bool {
        filter.accepts_start(self.start.time())
    }
}

/// A title and its showings within a day or a range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    name: String,
    runtime_min: u32,
    showings: Vec<Showing>,
}

impl Movie {
    pub fn new(name: impl Into<String>, runtime_min: u32) -> Self {
        Self {
            name: name.into(),
            runtime_min,
            showings: Vec::new(),
        }
    }

    /// Create a movie from a raw listing title and runtime
    pub fn from_listing(title: &str, runtime: &RawRuntime) -> Self {
        Self::new(strip_release_year(title), runtime.minutes())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn runtime_min(&self) -> u32 {
        self.runtime_min
    }

    pub fn showings(&self) -> &[Showing] {
        &self.showings
    }

    pub fn len(&self) -> usize {
        self.showings.len()
    }

    /// A movie without showings is droppable
    pub fn is_empty(&self) -> bool {
        self.showings.is_empty()
    }

    /// Add one showing at `raw_start_time` on `day`
    pub fn add_showing<S: AsRef<str>>(
        &mut self,
        attributes: &[S],
        raw_start_time: &str,
        day: NaiveDate,
    ) -> Result<()> {
        let showing = Showing::create(attributes, raw_start_time, self.runtime_min, day)?;
        self.showings.push(showing);
        Ok(())
    }

    /// Add every start time of one listing group
    pub fn add_showings<S: AsRef<str>, T: AsRef<str>>(
        &mut self,
        attributes: &[S],
        raw_start_times: &[T],
        day: NaiveDate,
    ) -> Result<()> {
        for raw in raw_start_times {
            self.add_showing(attributes, raw.as_ref(), day)?;
        }
        Ok(())
    }

    /// Earliest showing start
    pub fn first(&self) -> Option<NaiveDateTime> {
        self.showings.iter().map(Showing::start).min()
    }

    /// Latest showing start
    pub fn last(&self) -> Option<NaiveDateTime> {
        self.showings.iter().map(Showing::start).max()
    }

    /// Copy of this movie restricted by `filter`
    ///
    /// The result is empty when the name is rejected or no showing starts
    /// inside the time window.
    pub fn filter(&self, filter: &Filter) -> Movie {
        let mut filtered = Movie::new(self.name.clone(), self.runtime_min);
        if !filter.accepts_movie(&self.name) {
            return filtered;
        }

        filtered.showings = self
            .showings
            .iter()
            .filter(|showing| showing.passes(filter))
            .cloned()
            .collect();
        filtered
    }

    /// Concatenate `other`'s showings after this movie's, keeping arrival order
    pub fn merge(mut self, other: Movie) -> Movie {
        if other.runtime_min != self.runtime_min {
            debug!(
                movie = %self.name,
                kept = self.runtime_min,
                dropped = other.runtime_min,
                "Runtime differs between days; keeping first observed"
            );
        }
        self.showings.extend(other.showings);
        self
    }
}

/// All movies observed for one calendar day at one theater
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    day: NaiveDate,
    movies: Vec<Movie>,
}

impl DaySchedule {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day,
            movies: Vec::new(),
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Register a movie from its raw listing title and runtime
    ///
    /// Titles are year-trimmed first; a name already present for this day
    /// returns the existing entry so names stay unique.
    pub fn add_raw_movie(&mut self, title: &str, runtime: &RawRuntime) -> &mut Movie {
        let movie = Movie::from_listing(title, runtime);
        let index = match self.movies.iter().position(|m| m.name == movie.name) {
            Some(index) => index,
            None => {
                self.movies.push(movie);
                self.movies.len() - 1
            }
        };
        &mut self.movies[index]
    }

    /// Add an already-built movie, merging with a same-named entry
    pub fn push_movie(&mut self, movie: Movie) {
        match self.movies.iter().position(|m| m.name == movie.name) {
            Some(index) => {
                let existing = self.movies.remove(index);
                self.movies.insert(index, existing.merge(movie));
            }
            None => self.movies.push(movie),
        }
    }

    /// Restrict to movies and showings accepted by `filter`
    ///
    /// Movies left without showings are dropped.
    pub fn filter(&self, filter: &Filter) -> DaySchedule {
        DaySchedule {
            day: self.day,
            movies: self
                .movies
                .iter()
                .map(|movie| movie.filter(filter))
                .filter(|movie| !movie.is_empty())
                .collect(),
        }
    }

    /// Total number of showings
    pub fn len(&self) -> usize {
        self.movies.iter().map(Movie::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Merged view across one or more days
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullSchedule {
    start: NaiveDate,
    end: NaiveDate,
    movies: BTreeMap<String, Movie>,
}

impl FullSchedule {
    /// Merge per-day schedules into one range
    ///
    /// Showings of same-named movies are appended in input order. The range
    /// spans the earliest to the latest input day whatever the input order.
    pub fn create(days: Vec<DaySchedule>) -> Result<FullSchedule> {
        let mut days = days.into_iter();
        let first = days.next().ok_or(Error::EmptyInput)?;

        let mut schedule = FullSchedule {
            start: first.day,
            end: first.day,
            movies: BTreeMap::new(),
        };
        schedule.absorb(first);
        for day in days {
            schedule.absorb(day);
        }

        debug!(
            start = %schedule.start,
            end = %schedule.end,
            movies = schedule.movies.len(),
            showings = schedule.len(),
            "Aggregated schedule"
        );
        Ok(schedule)
    }

    /// Combine two merged schedules
    pub fn merge(mut self, other: FullSchedule) -> FullSchedule {
        self.start = self.start.min(other.start);
        self.end = self.end.max(other.end);
        for (_, movie) in other.movies {
            self.insert_movie(movie);
        }
        self
    }

    fn absorb(&mut self, day: DaySchedule) {
        self.start = self.start.min(day.day);
        self.end = self.end.max(day.day);
        for movie in day.movies {
            self.insert_movie(movie);
        }
    }

    fn insert_movie(&mut self, movie: Movie) {
        match self.movies.remove(&movie.name) {
            Some(existing) => {
                let merged = existing.merge(movie);
                self.movies.insert(merged.name.clone(), merged);
            }
            None => {
                self.movies.insert(movie.name.clone(), movie);
            }
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_multi_day(&self) -> bool {
        self.start != self.end
    }

    /// Movies in name order
    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.values()
    }

    pub fn movie(&self, name: &str) -> Option<&Movie> {
        self.movies.get(name)
    }

    /// Total number of showings
    pub fn len(&self) -> usize {
        self.movies.values().map(Movie::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
