//! Listing JSON decoding
//!
//! The listing source returns one document per theater and day. Only the
//! fields needed to build a [`DaySchedule`] are decoded; everything else is
//! ignored.

use chrono::NaiveDate;
use serde::Deserialize;
use showtimes_common::schedule::RawRuntime;
use showtimes_common::DaySchedule;

/// Top-level listing document
#[derive(Debug, Clone, Deserialize)]
pub struct ListingResponse {
    /// Absent when the source has nothing published for the day
    #[serde(rename = "viewModel", default)]
    pub view_model: Option<ViewModel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewModel {
    pub date: NaiveDate,
    #[serde(default)]
    pub movies: Vec<ListingMovie>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingMovie {
    pub title: String,
    #[serde(default)]
    pub runtime: Option<RawRuntime>,
    #[serde(default)]
    pub variants: Vec<ListingVariant>,
}

/// One presentation variant; its groups share a set of amenities
#[derive(Debug, Clone, Deserialize)]
pub struct ListingVariant {
    #[serde(rename = "amenityGroups", default)]
    pub amenity_groups: Vec<AmenityGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmenityGroup {
    #[serde(default)]
    pub amenities: Vec<Amenity>,
    #[serde(default)]
    pub showtimes: Vec<ListingShowtime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Amenity {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingShowtime {
    /// Raw start time such as `7:00p`
    pub date: String,
}

impl ListingResponse {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Build the day's schedule, `None` when the document carries no data
    pub fn into_day_schedule(self) -> showtimes_common::Result<Option<DaySchedule>> {
        let Some(view_model) = self.view_model else {
            return Ok(None);
        };

        let mut schedule = DaySchedule::new(view_model.date);
        for listing in view_model.movies {
            let runtime = listing.runtime.unwrap_or_default();
            let movie = schedule.add_raw_movie(&listing.title, &runtime);

            for group in listing.variants.iter().flat_map(|v| &v.amenity_groups) {
                let attributes: Vec<&str> =
                    group.amenities.iter().map(|a| a.name.as_str()).collect();
                let starts: Vec<&str> = group.showtimes.iter().map(|s| s.date.as_str()).collect();
                movie.add_showings(&attributes, &starts, view_model.date)?;
            }
        }

        Ok(Some(schedule))
    }
}
