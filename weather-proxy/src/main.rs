//! Advice proxy server.
//!
//! Receives weather payloads on `POST /weather`, attaches an activity
//! suggestion and returns the enriched envelope.

use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weather_core::{AdviceGenerator, Config, GeminiGenerator, WeatherProxyHandler};

mod error;
mod routes;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<WeatherProxyHandler>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_proxy=info,weather_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::load()?.with_env_overrides()?;

    let advice = match GeminiGenerator::from_config(&config.advice) {
        Some(generator) => {
            tracing::info!(model = %config.advice.model, "advice generation enabled");
            AdviceGenerator::new(Arc::new(generator), config.advice.language.clone())
        }
        None => {
            tracing::warn!("no GEMINI_API_KEY configured, advice will come from the rule table");
            AdviceGenerator::rules_only()
        }
    };

    let state = AppState { handler: Arc::new(WeatherProxyHandler::new(advice)) };
    let app = routes::create_app(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.server.host, config.server.port))?;
    tracing::info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
