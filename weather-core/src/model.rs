use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single weather reading for one city, as used across the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city_name: String,
    pub country_code: String,
    pub condition_main: String,
    pub condition_description: String,
    pub icon_code: String,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_ms: f64,
}

/// Activity suggestion attached to a successful weather lookup.
///
/// On the wire the tip travels as `advice`; the place fields are only
/// emitted when the generation path suggested one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceResult {
    #[serde(rename = "advice", alias = "recommendation")]
    pub tip_text: String,
    #[serde(rename = "place", default, skip_serializing_if = "String::is_empty")]
    pub place_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_link: Option<String>,
}

impl AdviceResult {
    pub fn tip(text: impl Into<String>) -> Self {
        Self { tip_text: text.into(), place_label: String::new(), place_link: None }
    }

    pub fn has_place(&self) -> bool {
        !self.place_label.is_empty() || self.place_link.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    #[serde(rename = "date")]
    pub iso_date: String,
    pub day_name: String,
    #[serde(rename = "temp_max")]
    pub temp_max_c: f64,
    #[serde(rename = "temp_min")]
    pub temp_min_c: f64,
    pub weather_icon: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingCity {
    pub city_name: String,
    #[serde(default)]
    pub search_count: Option<u64>,
}

/// Body accepted by the advice proxy: `{ data: { city?, weather }, city?, is_from_cache? }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyRequest {
    #[serde(default)]
    pub data: Option<ProxyRequestData>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub is_from_cache: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyRequestData {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub weather: Option<Value>,
}

/// Weather data plus advice, as returned by the proxy and read back by the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisedWeather {
    pub city: String,
    /// Upstream weather object, echoed back untouched.
    pub weather: Value,
    #[serde(flatten)]
    pub advice: AdviceResult,
    #[serde(skip)]
    pub snapshot: WeatherSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub data: AdvisedWeather,
    pub is_from_cache: bool,
}

/// `{ data: T }` wrapper used by the forecast and trending endpoints.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Raw OpenWeather-style current-weather object.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWeather {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sys: Option<RawSys>,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
    pub main: RawMain,
    pub wind: RawWind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSys {
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCondition {
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMain {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    /// Percent; some providers report fractions.
    pub humidity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawWind {
    pub speed: f64,
}

impl RawWeather {
    /// Flatten into a snapshot. `fallback_city` is used when the object carries no name.
    pub fn into_snapshot(self, fallback_city: &str) -> WeatherSnapshot {
        let condition = self.weather.into_iter().next();
        let (condition_main, condition_description, icon_code) = match condition {
            Some(c) => (c.main, c.description, c.icon),
            None => (String::new(), "Unknown".to_string(), String::new()),
        };

        let city_name =
            if self.name.trim().is_empty() { fallback_city.to_string() } else { self.name };

        WeatherSnapshot {
            city_name,
            country_code: self.sys.map(|s| s.country).unwrap_or_default(),
            condition_main,
            condition_description,
            icon_code,
            temp_c: self.main.temp,
            feels_like_c: self.main.feels_like.unwrap_or(self.main.temp),
            humidity_pct: self.main.humidity.round().clamp(0.0, 100.0) as u8,
            wind_speed_ms: self.wind.speed,
        }
    }
}
