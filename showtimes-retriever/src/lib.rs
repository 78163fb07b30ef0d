//! showtimes-retriever library
//!
//! Fetches per-day theater listings, aggregates them into schedules and
//! hands them to the plaintext, mail and SQLite outputs.

pub mod cli;
pub mod client;
pub mod collect;
pub mod listing;
pub mod notify;

pub use client::{FileListing, ListingClient, ListingSource, RetrievalError};
pub use collect::{collect_schedule, is_empty_input, load_schedules_by_day};

/// Shown when no day in the requested range had any data
pub const NO_DATA_MESSAGE: &str = "Could not find any data for the requested date(s).";
