//! Terminal rendering of a search.

use chrono::Local;
use weather_core::{
    SearchPhase, SearchView,
    normalize::anchors_to_plain,
    present::{DataSource, ForecastStrip, WeatherCard},
    trending::TrendingTags,
};

/// Prints results to stdout once a search completes; errors go out immediately.
///
/// While a search runs the results section is hidden, so rendered sections
/// are buffered and only flushed when the results become visible.
#[derive(Debug, Default)]
pub struct TerminalView {
    query: String,
    searching: bool,
    pending: Vec<String>,
    tags: Vec<String>,
}

impl TerminalView {
    /// Labels of the trending tags currently on screen.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    fn emit(&mut self, lines: Vec<String>) {
        if self.searching {
            self.pending.extend(lines);
        } else {
            for line in lines {
                println!("{line}");
            }
        }
    }
}

fn weather_lines(card: &WeatherCard) -> Vec<String> {
    let source = match card.source {
        DataSource::Cache => "(cached data)",
        DataSource::Fresh => "(fresh data)",
    };

    let mut lines = vec![
        String::new(),
        format!("{}  {}", card.title, source),
        format!("  {}  {}", card.temperature, card.description),
        format!("  Feels like {}", card.feels_like),
        format!("  Humidity {}   Wind {}", card.humidity, card.wind),
    ];
    if !card.icon_url.is_empty() {
        lines.push(format!("  Icon {}", card.icon_url));
    }
    lines.push(String::new());
    lines.push(format!("Tip: {}", anchors_to_plain(&card.advice.tip_text)));

    if card.advice.has_place() && !card.advice.tip_text.contains("<a ") {
        match &card.advice.place_link {
            Some(link) => lines.push(format!("  Place: {} ({link})", card.advice.place_label)),
            None => lines.push(format!("  Place: {}", card.advice.place_label)),
        }
    }

    lines
}

fn forecast_lines(strip: &ForecastStrip) -> Vec<String> {
    match strip {
        ForecastStrip::Empty => vec![String::new(), "No upcoming forecast available.".to_string()],
        ForecastStrip::Days(tiles) => {
            let mut lines = vec![String::new(), format!("Next {} days", tiles.len())];
            lines.extend(tiles.iter().map(|t| {
                format!("  {:<10} {:>5} / {:<5} {}", t.day_name, t.high, t.low, t.description)
            }));
            lines
        }
    }
}

fn trending_lines(tags: &TrendingTags) -> Vec<String> {
    match tags {
        TrendingTags::Unavailable => {
            vec![String::new(), "Trending cities are unavailable right now.".to_string()]
        }
        TrendingTags::NoSearchesYet => vec![String::new(), "No searches yet.".to_string()],
        TrendingTags::Tags(labels) => {
            vec![String::new(), format!("Trending: {}", labels.join("  "))]
        }
    }
}

impl SearchView for TerminalView {
    fn transition(&mut self, _from: SearchPhase, to: SearchPhase) {
        tracing::debug!(phase = ?to, "search phase");
        self.searching = to == SearchPhase::Searching;
    }

    fn set_query(&mut self, city: &str) {
        self.query = city.to_string();
    }

    fn set_loading(&mut self, visible: bool) {
        if visible {
            eprintln!("Searching for {}...", self.query);
        }
    }

    fn set_trigger_enabled(&mut self, enabled: bool) {
        tracing::trace!(enabled, "search trigger");
    }

    fn set_results_visible(&mut self, visible: bool) {
        if visible {
            for line in self.pending.drain(..) {
                println!("{line}");
            }
        } else {
            self.pending.clear();
        }
    }

    fn show_weather(&mut self, card: &WeatherCard) {
        let mut lines = weather_lines(card);
        lines.insert(2, format!("  Updated {}", Local::now().format("%H:%M")));
        self.emit(lines);
    }

    fn show_forecast(&mut self, strip: &ForecastStrip) {
        self.emit(forecast_lines(strip));
    }

    fn show_trending(&mut self, tags: &TrendingTags) {
        self.tags = tags.labels().to_vec();
        self.emit(trending_lines(tags));
    }

    fn show_error(&mut self, message: &str) {
        eprintln!();
        eprintln!("Error! {message}");
    }

    fn show_notice(&mut self, message: &str) {
        eprintln!("{message}");
    }
}
