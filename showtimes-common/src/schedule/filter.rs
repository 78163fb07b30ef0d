//! Schedule filter predicate

use chrono::NaiveTime;

/// Inclusion/exclusion rule applied to each day's schedule
///
/// Movie names match case-insensitively. When both an allow-list and a
/// deny-list of names are present the allow-list wins. Start-time bounds are
/// inclusive and only compare the time of day.
///
/// `formats` / `exclude_formats` are accepted and carried but no filtering
/// path consults them yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub earliest_start: Option<NaiveTime>,
    pub latest_start: Option<NaiveTime>,
    movies: Vec<String>,
    exclude_movies: Vec<String>,
    pub formats: Vec<String>,
    pub exclude_formats: Vec<String>,
}

impl Filter {
    pub fn new(
        earliest_start: Option<NaiveTime>,
        latest_start: Option<NaiveTime>,
        movies: Vec<String>,
        exclude_movies: Vec<String>,
        formats: Vec<String>,
        exclude_formats: Vec<String>,
    ) -> Self {
        Self {
            earliest_start,
            latest_start,
            movies: movies.iter().map(|m| m.to_lowercase()).collect(),
            exclude_movies: exclude_movies.iter().map(|m| m.to_lowercase()).collect(),
            formats,
            exclude_formats,
        }
    }

    /// Filter that accepts everything
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lowercased allow-list of movie names
    pub fn movies(&self) -> &[String] {
        &self.movies
    }

    /// Lowercased deny-list of movie names
    pub fn exclude_movies(&self) -> &[String] {
        &self.exclude_movies
    }

    pub fn accepts_movie(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        if !self.movies.is_empty() {
            self.movies.contains(&name)
        } else if !self.exclude_movies.is_empty() {
            !self.exclude_movies.contains(&name)
        } else {
            true
        }
    }

    pub fn accepts_start(&self, start: NaiveTime) -> bool {
        if self.earliest_start.is_some_and(|earliest| start < earliest) {
            return false;
        }
        if self.latest_start.is_some_and(|latest| start > latest) {
            return false;
        }
        true
    }
}
