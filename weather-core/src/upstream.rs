use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::SearchError,
    model::{AdviceResult, ForecastDay, TrendingCity, WeatherSnapshot},
};

pub mod http;

pub use http::HttpWeatherSource;

/// Current weather plus advice for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub snapshot: WeatherSnapshot,
    pub advice: AdviceResult,
}

/// Result of a successful weather lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherLookup {
    pub report: WeatherReport,
    /// As reported upstream; never computed locally.
    pub is_from_cache: bool,
}

/// The three upstream endpoints a search talks to.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_weather(&self, city: &str) -> Result<WeatherLookup, SearchError>;

    /// Daily forecast in upstream order.
    async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastDay>, SearchError>;

    /// Recently searched cities in upstream order.
    async fn fetch_trending(&self) -> Result<Vec<TrendingCity>, SearchError>;
}

/// Map an upstream failure message to `NotFound` or `Upstream`.
pub fn classify_failure(status: Option<u16>, message: &str) -> SearchError {
    if status == Some(404) || message.to_lowercase().contains("not found") {
        SearchError::NotFound(message.to_string())
    } else {
        SearchError::Upstream(message.to_string())
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
