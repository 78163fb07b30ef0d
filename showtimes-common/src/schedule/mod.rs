//! Schedule aggregation
//!
//! Raw per-day listings are normalized into `DaySchedule`s, filtered, and
//! merged into a `FullSchedule` covering the requested range.

pub mod filter;
pub mod model;
pub mod normalize;
pub mod render;
pub mod runtime;

pub use filter::Filter;
pub use model::{DaySchedule, FullSchedule, Movie, Showing};
pub use normalize::{normalize_attributes, simplify_format, strip_release_year, ShowingAttributes};
pub use runtime::{parse_runtime, RawRuntime};
