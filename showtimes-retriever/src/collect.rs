//! Per-day collection and aggregation

use crate::client::{ListingSource, RetrievalError};
use showtimes_common::theaters::Theater;
use showtimes_common::time::DateRange;
use showtimes_common::{DaySchedule, Error, Filter, FullSchedule};
use tracing::{debug, info, warn};

/// Fetch every day of `range` in order, filtering each day as it arrives
///
/// Days the source has no data for are skipped.
pub async fn load_schedules_by_day<S: ListingSource + ?Sized>(
    source: &S,
    theater: &Theater,
    range: DateRange,
    filter: &Filter,
) -> Result<Vec<DaySchedule>, RetrievalError> {
    let mut schedules = Vec::new();

    for day in range.days() {
        let response = source.listing(theater, day).await?;
        match response.into_day_schedule()? {
            Some(schedule) => {
                let filtered = schedule.filter(filter);
                debug!(
                    theater = %theater.name,
                    %day,
                    showings = filtered.len(),
                    "Loaded day schedule"
                );
                schedules.push(filtered);
            }
            None => warn!(theater = %theater.name, %day, "No listing data"),
        }
    }

    Ok(schedules)
}

/// Fetch and merge `range` into one schedule
///
/// Fails with [`Error::EmptyInput`] when no day produced any data.
pub async fn collect_schedule<S: ListingSource + ?Sized>(
    source: &S,
    theater: &Theater,
    range: DateRange,
    filter: &Filter,
) -> Result<FullSchedule, RetrievalError> {
    let days = load_schedules_by_day(source, theater, range, filter).await?;
    let schedule = FullSchedule::create(days)?;

    info!(
        theater = %theater.name,
        start = %schedule.start(),
        end = %schedule.end(),
        showings = schedule.len(),
        "Collected schedule"
    );

    Ok(schedule)
}

/// True when `err` only means there was nothing to collect
pub fn is_empty_input(err: &RetrievalError) -> bool {
    matches!(err, RetrievalError::Schedule(Error::EmptyInput))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ListingResponse;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned documents by day and records what was requested
    struct CannedSource {
        documents: HashMap<NaiveDate, String>,
        requested: Mutex<Vec<NaiveDate>>,
    }

    impl CannedSource {
        fn new(documents: &[(NaiveDate, &str)]) -> Self {
            Self {
                documents: documents
                    .iter()
                    .map(|(day, text)| (*day, text.to_string()))
                    .collect(),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ListingSource for CannedSource {
        async fn listing(
            &self,
            _theater: &Theater,
            day: NaiveDate,
        ) -> Result<ListingResponse, RetrievalError> {
            self.requested.lock().unwrap().push(day);
            let text = self.documents.get(&day).map(String::as_str).unwrap_or("{}");
            ListingResponse::from_json(text).map_err(|e| RetrievalError::Parse(e.to_string()))
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn theater() -> Theater {
        Theater::new("AMC Methuen", "aaoze", "amc-methuen-20-aaoze")
    }

    fn document(date: &str, title: &str, starts: &[&str]) -> String {
        let showtimes: Vec<String> = starts
            .iter()
            .map(|s| format!(r#"{{"date": "{}"}}"#, s))
            .collect();
        format!(
            r#"{{"viewModel": {{"date": "{}", "movies": [{{
                "title": "{}",
                "runtime": 100,
                "variants": [{{"amenityGroups": [{{"amenities": [], "showtimes": [{}]}}]}}]
            }}]}}}}"#,
            date,
            title,
            showtimes.join(", ")
        )
    }

    #[tokio::test]
    async fn test_days_requested_in_order() {
        let fifth = document("2024-01-05", "Wonka", &["1:00p"]);
        let sixth = document("2024-01-06", "Wonka", &["2:00p"]);
        let source = CannedSource::new(&[(d(5), &fifth), (d(6), &sixth)]);

        let range = DateRange::new(d(5), d(7)).unwrap();
        let days = load_schedules_by_day(&source, &theater(), range, &Filter::empty())
            .await
            .unwrap();

        assert_eq!(*source.requested.lock().unwrap(), vec![d(5), d(6), d(7)]);
        assert_eq!(days.len(), 2, "day without data is skipped");
        assert_eq!(days[0].day(), d(5));
        assert_eq!(days[1].day(), d(6));
    }

    #[tokio::test]
    async fn test_filter_applied_per_day() {
        let fifth = document("2024-01-05", "Wonka", &["1:00p", "9:00p"]);
        let source = CannedSource::new(&[(d(5), &fifth)]);
        let filter = Filter::new(
            Some(NaiveTime::from_hms_opt(18, 0, 0).unwrap()),
            None,
            vec![],
            vec![],
            vec![],
            vec![],
        );

        let schedule = collect_schedule(&source, &theater(), DateRange::single(d(5)), &filter)
            .await
            .unwrap();

        assert_eq!(schedule.len(), 1);
    }

    #[tokio::test]
    async fn test_no_data_is_empty_input() {
        let source = CannedSource::new(&[]);
        let err = collect_schedule(
            &source,
            &theater(),
            DateRange::new(d(5), d(6)).unwrap(),
            &Filter::empty(),
        )
        .await
        .unwrap_err();

        assert!(is_empty_input(&err));
    }

    #[tokio::test]
    async fn test_filtered_to_nothing_is_not_empty_input() {
        let fifth = document("2024-01-05", "Wonka", &["1:00p"]);
        let source = CannedSource::new(&[(d(5), &fifth)]);
        let filter = Filter::new(None, None, vec!["Aquaman".to_string()], vec![], vec![], vec![]);

        let schedule = collect_schedule(&source, &theater(), DateRange::single(d(5)), &filter)
            .await
            .unwrap();

        assert!(schedule.is_empty());
    }
}
