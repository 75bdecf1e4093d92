//! Client-side search flow: weather, then forecast, then trending.
//!
//! Weather and forecast are the critical path: either failing fails the
//! search with one error panel. Trending runs afterwards and its failure only
//! degrades the trending section.
//!
//! Concurrent searches are not coordinated. Each call borrows its view for
//! the duration of the search, and a stale search is never cancelled.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use crate::{
    error::SearchError,
    model::{ForecastDay, TrendingCity},
    present::{ForecastStrip, WeatherCard, upcoming_days},
    trending::{TrendingTags, city_from_tag},
    upstream::{WeatherReport, WeatherSource},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Searching,
    Success,
    Failed,
}

/// Render targets and controls the orchestrator drives.
pub trait SearchView {
    /// Called on every phase change.
    fn transition(&mut self, _from: SearchPhase, _to: SearchPhase) {}

    /// Replace the search input text.
    fn set_query(&mut self, city: &str);

    fn set_loading(&mut self, visible: bool);

    fn set_trigger_enabled(&mut self, enabled: bool);

    fn set_results_visible(&mut self, visible: bool);

    fn show_weather(&mut self, card: &WeatherCard);

    fn show_forecast(&mut self, strip: &ForecastStrip);

    fn show_trending(&mut self, tags: &TrendingTags);

    /// The single error panel for a failed search.
    fn show_error(&mut self, message: &str);

    /// Pre-flight problems with the input, shown without touching results.
    fn show_notice(&mut self, message: &str);
}

/// Everything a successful search produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub weather: WeatherReport,
    pub is_from_cache: bool,
    /// Upcoming days as displayed: today removed, at most five.
    pub forecast: Vec<ForecastDay>,
    pub trending: Result<Vec<TrendingCity>, SearchError>,
}

pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

#[derive(Clone)]
pub struct SearchOrchestrator {
    source: Arc<dyn WeatherSource>,
    today: Clock,
}

impl std::fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator").field("source", &self.source).finish_non_exhaustive()
    }
}

impl SearchOrchestrator {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source, today: Arc::new(|| Utc::now().date_naive()) }
    }

    /// Use `today` to decide which forecast day is the current one.
    pub fn with_clock(mut self, today: Clock) -> Self {
        self.today = today;
        self
    }

    /// Run one search for the text in the input field.
    pub async fn search<V: SearchView + ?Sized>(
        &self,
        input: &str,
        view: &mut V,
    ) -> Result<SearchReport, SearchError> {
        view.transition(SearchPhase::Idle, SearchPhase::Searching);

        let city = input.trim();
        if city.is_empty() {
            let err = SearchError::Validation("Please enter a city name".to_string());
            view.show_notice(&err.to_string());
            Self::settle(view, SearchPhase::Failed);
            return Err(err);
        }

        view.set_results_visible(false);
        view.set_loading(true);
        view.set_trigger_enabled(false);

        let outcome = self.run(city, view).await;

        // Runs on every branch.
        view.set_loading(false);
        view.set_trigger_enabled(true);

        match outcome {
            Ok(report) => {
                view.set_results_visible(true);
                tracing::info!(city, from_cache = report.is_from_cache, "search succeeded");
                Self::settle(view, SearchPhase::Success);
                Ok(report)
            }
            Err(err) => {
                tracing::warn!(city, error = %err, "search failed");
                view.show_error(&err.to_string());
                Self::settle(view, SearchPhase::Failed);
                Err(err)
            }
        }
    }

    /// Selecting a trending tag: fill the input with its city and search.
    pub async fn select_trending<V: SearchView + ?Sized>(
        &self,
        label: &str,
        view: &mut V,
    ) -> Result<SearchReport, SearchError> {
        let city = city_from_tag(label);
        view.set_query(city);
        self.search(city, view).await
    }

    /// Fetch and show trending cities. Never fails the caller.
    pub async fn refresh_trending<V: SearchView + ?Sized>(
        &self,
        view: &mut V,
    ) -> Result<Vec<TrendingCity>, SearchError> {
        // Trending errors must never read as critical.
        let result = self.source.fetch_trending().await.map_err(|e| {
            if e.is_critical() { SearchError::TrendingUnavailable(e.to_string()) } else { e }
        });

        if let Err(e) = &result {
            tracing::warn!(error = %e, "trending unavailable");
        }

        view.show_trending(&TrendingTags::new(&result));
        result
    }

    async fn run<V: SearchView + ?Sized>(
        &self,
        city: &str,
        view: &mut V,
    ) -> Result<SearchReport, SearchError> {
        let lookup = self.source.fetch_weather(city).await?;
        view.show_weather(&WeatherCard::new(&lookup.report, lookup.is_from_cache));

        let forecast = self.source.fetch_forecast(city).await?;
        let forecast = upcoming_days(forecast, (self.today)());
        view.show_forecast(&ForecastStrip::new(&forecast));

        let trending = self.refresh_trending(view).await;

        Ok(SearchReport {
            weather: lookup.report,
            is_from_cache: lookup.is_from_cache,
            forecast,
            trending,
        })
    }

    fn settle<V: SearchView + ?Sized>(view: &mut V, terminal: SearchPhase) {
        view.transition(SearchPhase::Searching, terminal);
        view.transition(terminal, SearchPhase::Idle);
    }
}
