use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use std::{process::ExitCode, sync::Arc};
use weather_core::{
    Config, HttpWeatherSource, SearchError, SearchOrchestrator, SearchReport, SearchView,
};

use crate::view::TerminalView;

const SEARCH_ANOTHER: &str = "Search another city";
const QUIT: &str = "Quit";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather, forecast and activity tips for a city")]
pub struct Cli {
    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the weather API and the advice service.
    Configure,

    /// Show current weather, a 5-day forecast and trending cities.
    Search {
        /// City name; prompted for when absent.
        city: Option<String>,

        /// Keep going: offer trending cities and new searches after each result.
        #[arg(short, long)]
        interactive: bool,
    },

    /// Show recently searched cities.
    Trending,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Search { city, interactive } => {
                let orchestrator = orchestrator_from_config()?;
                let mut view = TerminalView::default();

                if interactive {
                    interactive_loop(&orchestrator, &mut view, city).await?;
                    return Ok(ExitCode::SUCCESS);
                }

                let city = match city {
                    Some(city) => city,
                    None => prompt_city()?,
                };
                let outcome = search_once(&orchestrator, &mut view, &city).await;
                Ok(if outcome.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            }
            Command::Trending => {
                let orchestrator = orchestrator_from_config()?;
                let mut view = TerminalView::default();
                let outcome = orchestrator.refresh_trending(&mut view).await;
                Ok(if outcome.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            }
        }
    }
}

fn orchestrator_from_config() -> anyhow::Result<SearchOrchestrator> {
    let config = Config::load()?.with_env_overrides()?;
    let source =
        HttpWeatherSource::new(config.upstream_base_url()?).with_proxy(config.proxy_url()?);
    Ok(SearchOrchestrator::new(Arc::new(source)))
}

fn prompt_city() -> anyhow::Result<String> {
    Text::new("City:").prompt().context("Failed to read city name")
}

/// Start-up trending, then one search.
async fn search_once<V: SearchView>(
    orchestrator: &SearchOrchestrator,
    view: &mut V,
    city: &str,
) -> Result<SearchReport, SearchError> {
    let _ = orchestrator.refresh_trending(view).await;
    view.set_query(city);
    orchestrator.search(city, view).await
}

/// Trending first, then search / pick a tag until the user quits.
async fn interactive_loop(
    orchestrator: &SearchOrchestrator,
    view: &mut TerminalView,
    first: Option<String>,
) -> anyhow::Result<()> {
    let _ = orchestrator.refresh_trending(view).await;

    if let Some(city) = first {
        view.set_query(&city);
        let _ = orchestrator.search(&city, view).await;
    }

    loop {
        let mut options: Vec<String> = view.tags().to_vec();
        options.push(SEARCH_ANOTHER.to_string());
        options.push(QUIT.to_string());

        let choice = Select::new("Next:", options).prompt().context("Failed to read selection")?;

        match choice.as_str() {
            QUIT => return Ok(()),
            SEARCH_ANOTHER => {
                let city = prompt_city()?;
                view.set_query(&city);
                let _ = orchestrator.search(&city, view).await;
            }
            tag => {
                let _ = orchestrator.select_trending(tag, view).await;
            }
        }
    }
}

/// Interactive configuration, saved to the platform config dir.
fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let current_url = config.upstream.base_url.clone().unwrap_or_default();
    let base_url = Text::new("Weather API base URL:")
        .with_initial_value(&current_url)
        .with_help_message("Endpoints /weather, /forecast and /trending live under this URL")
        .prompt()
        .context("Failed to read base URL")?;
    let base_url = base_url.trim().trim_end_matches('/');
    if !base_url.is_empty() {
        config.upstream.base_url = Some(base_url.to_string());
    }

    let proxy_url = Text::new("Advice proxy URL:")
        .with_initial_value(&config.proxy.url)
        .prompt()
        .context("Failed to read proxy URL")?;
    let proxy_url = proxy_url.trim().trim_end_matches('/');
    if !proxy_url.is_empty() {
        config.proxy.url = proxy_url.to_string();
    }

    let api_key = Password::new("Gemini API key (empty keeps the current one):")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.advice.api_key = Some(api_key.trim().to_string());
    }

    let language = Text::new("Advice language:")
        .with_initial_value(&config.advice.language)
        .prompt()
        .context("Failed to read language")?;
    if !language.trim().is_empty() {
        config.advice.language = language.trim().to_string();
    }

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());

    Ok(())
}
