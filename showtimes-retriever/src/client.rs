//! Listing retrieval
//!
//! [`ListingClient`] fetches one listing document per theater and day over
//! HTTP. [`FileListing`] serves a saved document instead, for offline use.

use crate::listing::ListingResponse;
use async_trait::async_trait;
use chrono::NaiveDate;
use showtimes_common::theaters::Theater;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const LISTING_BASE_URL: &str = "https://www.fandango.com";
const USER_AGENT: &str = concat!("showtimes/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Retrieval errors
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Listing API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Schedule(#[from] showtimes_common::Error),
}

/// Source of per-day listing documents
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn listing(&self, theater: &Theater, day: NaiveDate)
        -> Result<ListingResponse, RetrievalError>;
}

/// HTTP client for the listing API
pub struct ListingClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ListingClient {
    pub fn new() -> Result<Self, RetrievalError> {
        Self::with_base_url(LISTING_BASE_URL)
    }

    /// Client against an alternate host
    pub fn with_base_url(base_url: &str) -> Result<Self, RetrievalError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn listing_url(&self, theater: &Theater, day: NaiveDate) -> String {
        format!(
            "{}/napi/theaterMovieShowtimes/{}?startDate={}",
            self.base_url, theater.code, day
        )
    }

    /// Theater page the API expects as referer
    pub fn referer_url(&self, theater: &Theater, day: NaiveDate) -> String {
        format!(
            "{}/{}/theater-page?format=all&date={}",
            self.base_url, theater.slug, day
        )
    }
}

#[async_trait]
impl ListingSource for ListingClient {
    async fn listing(
        &self,
        theater: &Theater,
        day: NaiveDate,
    ) -> Result<ListingResponse, RetrievalError> {
        let url = self.listing_url(theater, day);
        tracing::debug!(theater = %theater.name, %day, url = %url, "Requesting listing");

        let response = self
            .http_client
            .get(&url)
            .header(reqwest::header::REFERER, self.referer_url(theater, day))
            .send()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| RetrievalError::Parse(e.to_string()))
    }
}

/// A saved listing document; serves the same document for every day
pub struct FileListing {
    path: PathBuf,
}

impl FileListing {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ListingSource for FileListing {
    async fn listing(
        &self,
        _theater: &Theater,
        _day: NaiveDate,
    ) -> Result<ListingResponse, RetrievalError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        ListingResponse::from_json(&text)
            .map_err(|e| RetrievalError::Parse(format!("{}: {}", self.path.display(), e)))
    }
}
