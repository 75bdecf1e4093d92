//! Core library for the weather advisory service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Shared domain models (snapshots, advice, forecast, trending)
//! - Advice generation with a rule-based fallback, and text normalization
//! - The proxy step that attaches advice to weather payloads
//! - The client-side search orchestration and its presenters
//!
//! It is used by `weather-cli` and `weather-proxy`.

pub mod advice;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod present;
pub mod proxy;
pub mod trending;
pub mod upstream;

pub use advice::{AdviceGenerator, TextGenerator, gemini::GeminiGenerator};
pub use config::Config;
pub use error::{ErrorKind, ProxyError, SearchError};
pub use model::{
    AdviceResult, ForecastDay, ProxyRequest, ResponseEnvelope, TrendingCity, WeatherSnapshot,
};
pub use normalize::normalize;
pub use orchestrator::{SearchOrchestrator, SearchPhase, SearchReport, SearchView};
pub use proxy::WeatherProxyHandler;
pub use upstream::{HttpWeatherSource, WeatherLookup, WeatherReport, WeatherSource};
