//! Display models built from pipeline data. Rendering them is up to the view.

use chrono::NaiveDate;

use crate::{
    model::{AdviceResult, ForecastDay},
    upstream::WeatherReport,
};

/// Number of upcoming days shown in the forecast strip.
pub const FORECAST_DAYS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Cache,
    Fresh,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherCard {
    pub title: String,
    pub temperature: String,
    pub description: String,
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
    pub icon_url: String,
    pub source: DataSource,
    pub advice: AdviceResult,
}

impl WeatherCard {
    pub fn new(report: &WeatherReport, is_from_cache: bool) -> Self {
        let s = &report.snapshot;
        let title = if s.country_code.is_empty() {
            s.city_name.clone()
        } else {
            format!("{}, {}", s.city_name, s.country_code)
        };

        Self {
            title,
            temperature: format!("{}°C", s.temp_c.round()),
            description: s.condition_description.clone(),
            feels_like: format!("{}°C", s.feels_like_c.round()),
            humidity: format!("{}%", s.humidity_pct),
            wind: format!("{} m/s", s.wind_speed_ms),
            icon_url: icon_url(&s.icon_code, 4),
            source: if is_from_cache { DataSource::Cache } else { DataSource::Fresh },
            advice: report.advice.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTile {
    pub day_name: String,
    pub icon_url: String,
    pub description: String,
    pub high: String,
    pub low: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForecastStrip {
    Days(Vec<ForecastTile>),
    /// Nothing left after dropping today.
    Empty,
}

impl ForecastStrip {
    pub fn new(days: &[ForecastDay]) -> Self {
        if days.is_empty() {
            return ForecastStrip::Empty;
        }
        ForecastStrip::Days(
            days.iter()
                .map(|d| ForecastTile {
                    day_name: d.day_name.clone(),
                    icon_url: icon_url(&d.weather_icon, 2),
                    description: d.description.clone(),
                    high: format!("{}°", d.temp_max_c.round()),
                    low: format!("{}°", d.temp_min_c.round()),
                })
                .collect(),
        )
    }
}

/// Drop `today`, keep upstream order, and cap at [`FORECAST_DAYS`].
pub fn upcoming_days(days: Vec<ForecastDay>, today: NaiveDate) -> Vec<ForecastDay> {
    let today = today.format("%Y-%m-%d").to_string();
    days.into_iter().filter(|d| d.iso_date != today).take(FORECAST_DAYS).collect()
}

pub fn icon_url(code: &str, scale: u8) -> String {
    format!("https://openweathermap.org/img/wn/{code}@{scale}x.png")
}
