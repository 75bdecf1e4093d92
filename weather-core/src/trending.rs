use regex::Regex;
use std::sync::LazyLock;

use crate::{error::SearchError, model::TrendingCity};

static COUNT_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\(\d+\)\s*$").unwrap());

/// What the trending section shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrendingTags {
    Tags(Vec<String>),
    /// Upstream answered with an empty list.
    NoSearchesYet,
    /// Upstream failed; only this section degrades.
    Unavailable,
}

impl TrendingTags {
    pub fn new(result: &Result<Vec<TrendingCity>, SearchError>) -> Self {
        match result {
            Err(_) => TrendingTags::Unavailable,
            Ok(cities) if cities.is_empty() => TrendingTags::NoSearchesYet,
            Ok(cities) => TrendingTags::Tags(cities.iter().map(tag_label).collect()),
        }
    }

    pub fn labels(&self) -> &[String] {
        match self {
            TrendingTags::Tags(labels) => labels,
            _ => &[],
        }
    }
}

/// `"Tokyo (42)"`, or `"Tokyo"` when no count is known.
pub fn tag_label(city: &TrendingCity) -> String {
    match city.search_count {
        Some(count) => format!("{} ({count})", city.city_name),
        None => city.city_name.clone(),
    }
}

/// City name behind a tag label, without any trailing `(count)`.
pub fn city_from_tag(label: &str) -> &str {
    let label = label.trim();
    match COUNT_SUFFIX.find(label) {
        Some(m) => label[..m.start()].trim_end(),
        None => label,
    }
}
