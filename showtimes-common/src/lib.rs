//! # Showtimes Common Library
//!
//! Shared code for the showtimes tools including:
//! - Schedule entity model, filtering, merging and rendering
//! - Reconciliation of detected showings against stored state
//! - SQLite persistence with an audit trail of removed showings
//! - Configuration loading and theater registry
//! - Date and time parsing utilities

pub mod config;
pub mod db;
pub mod error;
pub mod reconcile;
pub mod schedule;
pub mod theaters;
pub mod time;

pub use error::{Error, Result};
pub use schedule::{DaySchedule, Filter, FullSchedule, Movie, Showing};
