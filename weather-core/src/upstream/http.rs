use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    advice::rules,
    error::SearchError,
    model::{AdviceResult, DataEnvelope, ForecastDay, RawWeather, TrendingCity},
};

use super::{WeatherLookup, WeatherReport, WeatherSource, classify_failure, truncate_body};

/// [`WeatherSource`] over the HTTP API (`POST /weather`, `GET /forecast`, `GET /trending`).
///
/// With a proxy configured, the upstream weather body is posted to the advice
/// proxy's `/weather` and the enriched answer is what gets decoded. Without
/// one, or when the answer carries no advice, the tip comes from the rule table.
#[derive(Debug, Clone)]
pub struct HttpWeatherSource {
    base_url: String,
    proxy_url: Option<String>,
    http: Client,
}

impl HttpWeatherSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            proxy_url: None,
            http: Client::new(),
        }
    }

    /// Route weather lookups through the advice proxy at `proxy_url`.
    pub fn with_proxy(mut self, proxy_url: &str) -> Self {
        self.proxy_url = Some(proxy_url.trim_end_matches('/').to_string());
        self
    }

    async fn read(res: Response, what: &str) -> Result<(StatusCode, String), SearchError> {
        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| SearchError::Upstream(format!("Failed to read {what} response body: {e}")))?;
        Ok((status, body))
    }

    /// Post the upstream weather body to the proxy and read back the advised envelope.
    async fn advise(&self, proxy_url: &str, upstream: &Value) -> Result<WeatherEnvelope, SearchError> {
        let url = format!("{proxy_url}/weather");
        tracing::debug!(%url, "requesting advice from proxy");

        let res = self
            .http
            .post(&url)
            .json(upstream)
            .send()
            .await
            .map_err(|e| SearchError::Upstream(format!("Failed to reach advice proxy: {e}")))?;

        let (status, body) = Self::read(res, "advice proxy").await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| truncate_body(&body));
            return Err(SearchError::Upstream(format!(
                "Advice proxy failed with status {status}: {detail}"
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| SearchError::Upstream(format!("Malformed advice proxy response: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct WeatherEnvelope {
    #[serde(default)]
    data: Value,
    #[serde(default)]
    is_from_cache: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct WeatherData {
    #[serde(default)]
    city: Option<String>,
    weather: RawWeather,
    #[serde(default, alias = "recommendation")]
    advice: Option<String>,
    #[serde(default)]
    place: String,
    #[serde(default)]
    place_link: Option<String>,
}

/// `data` string of an error body, or `fallback`.
fn error_message(body: &str, fallback: impl FnOnce() -> String) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("data").and_then(Value::as_str).map(str::to_string))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(fallback)
}

fn into_lookup(envelope: WeatherEnvelope, city: &str) -> Result<WeatherLookup, SearchError> {
    let data: WeatherData = serde_json::from_value(envelope.data)
        .map_err(|e| SearchError::Upstream(format!("Malformed weather data: {e}")))?;

    let fallback_city = data.city.as_deref().filter(|c| !c.trim().is_empty()).unwrap_or(city);
    let snapshot = data.weather.into_snapshot(fallback_city);

    let advice = match data.advice.filter(|a| !a.trim().is_empty()) {
        Some(tip_text) => {
            AdviceResult { tip_text, place_label: data.place, place_link: data.place_link }
        }
        None => {
            tracing::debug!(city, "weather data carried no advice, deriving from rule table");
            rules::fallback_advice(&snapshot)
        }
    };

    Ok(WeatherLookup {
        report: WeatherReport { snapshot, advice },
        is_from_cache: envelope.is_from_cache.unwrap_or(false),
    })
}

#[async_trait]
impl WeatherSource for HttpWeatherSource {
    async fn fetch_weather(&self, city: &str) -> Result<WeatherLookup, SearchError> {
        let url = format!("{}/weather", self.base_url);
        tracing::debug!(%url, city, "fetching current weather");

        let res = self
            .http
            .post(&url)
            .json(&json!({ "city": city }))
            .send()
            .await
            .map_err(|e| SearchError::Upstream(format!("Failed to reach weather service: {e}")))?;

        let (status, body) = Self::read(res, "weather").await?;

        if !status.is_success() {
            let message = error_message(&body, || {
                format!("Weather request failed with status {status}: {}", truncate_body(&body))
            });
            return Err(classify_failure(Some(status.as_u16()), &message));
        }

        let upstream: Value = serde_json::from_str(&body)
            .map_err(|e| SearchError::Upstream(format!("Malformed weather response: {e}")))?;

        // A 2xx body can still carry an error string such as "city not found".
        if let Some(message) = upstream.get("data").and_then(Value::as_str) {
            return Err(classify_failure(None, message));
        }

        let envelope = match &self.proxy_url {
            Some(proxy_url) => self.advise(proxy_url, &upstream).await?,
            None => serde_json::from_value(upstream)
                .map_err(|e| SearchError::Upstream(format!("Malformed weather response: {e}")))?,
        };

        into_lookup(envelope, city)
    }

    async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastDay>, SearchError> {
        let url = format!("{}/forecast", self.base_url);
        tracing::debug!(%url, city, "fetching forecast");

        let res = self
            .http
            .get(&url)
            .query(&[("city", city)])
            .send()
            .await
            .map_err(|e| SearchError::Upstream(format!("Failed to reach forecast service: {e}")))?;

        let (status, body) = Self::read(res, "forecast").await?;

        if !status.is_success() {
            let message = error_message(&body, || {
                format!("Forecast request failed with status {status}: {}", truncate_body(&body))
            });
            return Err(classify_failure(Some(status.as_u16()), &message));
        }

        let parsed: DataEnvelope<Vec<ForecastDay>> = serde_json::from_str(&body)
            .map_err(|e| SearchError::Upstream(format!("Malformed forecast response: {e}")))?;

        Ok(parsed.data)
    }

    async fn fetch_trending(&self) -> Result<Vec<TrendingCity>, SearchError> {
        let url = format!("{}/trending", self.base_url);
        tracing::debug!(%url, "fetching trending cities");

        let res = self.http.get(&url).send().await.map_err(|e| {
            SearchError::TrendingUnavailable(format!("Failed to reach trending service: {e}"))
        })?;

        let (status, body) = Self::read(res, "trending")
            .await
            .map_err(|e| SearchError::TrendingUnavailable(e.to_string()))?;

        if !status.is_success() {
            let message = error_message(&body, || {
                format!("Trending request failed with status {status}: {}", truncate_body(&body))
            });
            return Err(SearchError::TrendingUnavailable(message));
        }

        let parsed: DataEnvelope<Option<Vec<TrendingCity>>> = serde_json::from_str(&body)
            .map_err(|e| SearchError::TrendingUnavailable(format!("Malformed trending response: {e}")))?;

        Ok(parsed.data.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn weather_object() -> Value {
        json!({
            "name": "Bangkok",
            "sys": { "country": "TH" },
            "weather": [{ "main": "Clear", "description": "clear sky", "icon": "01d" }],
            "main": { "temp": 32.0, "feels_like": 38.0, "humidity": 60 },
            "wind": { "speed": 3.0 }
        })
    }

    #[tokio::test]
    async fn weather_lookup_reads_advice_and_cache_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/weather"))
            .and(body_json(json!({ "city": "Bangkok" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "city": "Bangkok",
                    "weather": weather_object(),
                    "recommendation": "Stay hydrated."
                },
                "is_from_cache": true
            })))
            .mount(&server)
            .await;

        let lookup = HttpWeatherSource::new(&server.uri())
            .fetch_weather("Bangkok")
            .await
            .expect("weather lookup");

        assert!(lookup.is_from_cache);
        assert_eq!(lookup.report.snapshot.city_name, "Bangkok");
        assert_eq!(lookup.report.snapshot.temp_c, 32.0);
        assert_eq!(lookup.report.advice.tip_text, "Stay hydrated.");
    }

    #[tokio::test]
    async fn weather_is_sent_through_the_advice_proxy() {
        let upstream = MockServer::start().await;
        let proxy = MockServer::start().await;
        let upstream_body = json!({
            "data": { "city": "Bangkok", "weather": weather_object() },
            "is_from_cache": true
        });

        Mock::given(method("POST"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body.clone()))
            .expect(1)
            .mount(&upstream)
            .await;
        Mock::given(method("POST"))
            .and(path("/weather"))
            .and(body_json(upstream_body))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "city": "Bangkok",
                    "weather": weather_object(),
                    "advice": "Cool off at Lumphini Park.",
                    "place": "Lumphini Park",
                    "place_link": "https://example.com/lumphini"
                },
                "is_from_cache": true
            })))
            .expect(1)
            .mount(&proxy)
            .await;

        let lookup = HttpWeatherSource::new(&upstream.uri())
            .with_proxy(&format!("{}/", proxy.uri()))
            .fetch_weather("Bangkok")
            .await
            .expect("weather lookup");

        assert!(lookup.is_from_cache);
        assert_eq!(lookup.report.advice.tip_text, "Cool off at Lumphini Park.");
        assert_eq!(lookup.report.advice.place_label, "Lumphini Park");
        assert_eq!(lookup.report.advice.place_link.as_deref(), Some("https://example.com/lumphini"));

        upstream.verify().await;
        proxy.verify().await;
    }

    #[tokio::test]
    async fn proxy_failure_is_upstream_error() {
        let upstream = MockServer::start().await;
        let proxy = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "weather": weather_object() }
            })))
            .mount(&upstream)
            .await;
        Mock::given(method("POST"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "message": "Server error",
                "error": "boom"
            })))
            .mount(&proxy)
            .await;

        let err = HttpWeatherSource::new(&upstream.uri())
            .with_proxy(&proxy.uri())
            .fetch_weather("Bangkok")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("Server error"));
    }

    #[tokio::test]
    async fn unreachable_proxy_is_upstream_error() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "weather": weather_object() }
            })))
            .mount(&upstream)
            .await;

        let err = HttpWeatherSource::new(&upstream.uri())
            .with_proxy("http://127.0.0.1:1")
            .fetch_weather("Bangkok")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.to_string().contains("advice proxy"));
    }

    #[tokio::test]
    async fn not_found_sentinel_is_not_forwarded_to_proxy() {
        let upstream = MockServer::start().await;
        let proxy = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/weather"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": "city not found" })),
            )
            .mount(&upstream)
            .await;
        Mock::given(method("POST"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&proxy)
            .await;

        let err = HttpWeatherSource::new(&upstream.uri())
            .with_proxy(&proxy.uri())
            .fetch_weather("Atlantis")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        proxy.verify().await;
    }

    #[tokio::test]
    async fn weather_without_proxy_or_advice_uses_rule_table() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "weather": weather_object() }
            })))
            .mount(&server)
            .await;

        let lookup = HttpWeatherSource::new(&server.uri())
            .fetch_weather("Bangkok")
            .await
            .expect("weather lookup");

        assert!(!lookup.is_from_cache);
        assert_eq!(lookup.report.advice.tip_text, rules::Bucket::Clear.tip());
    }

    #[tokio::test]
    async fn not_found_sentinel_in_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/weather"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": "city not found" })),
            )
            .mount(&server)
            .await;

        let err = HttpWeatherSource::new(&server.uri()).fetch_weather("Atlantis").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn error_status_uses_body_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/weather"))
            .respond_with(
                ResponseTemplate::new(502).set_body_json(json!({ "data": "Bad gateway upstream" })),
            )
            .mount(&server)
            .await;

        let err = HttpWeatherSource::new(&server.uri()).fetch_weather("Paris").await.unwrap_err();
        assert_eq!(err, SearchError::Upstream("Bad gateway upstream".into()));
    }

    #[tokio::test]
    async fn forecast_passes_encoded_city() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("city", "Rio de Janeiro"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "date": "2026-10-20", "day_name": "Tue", "temp_max": 29.4,
                      "temp_min": 22.1, "weather_icon": "02d", "description": "few clouds" }
                ]
            })))
            .mount(&server)
            .await;

        let days = HttpWeatherSource::new(&server.uri())
            .fetch_forecast("Rio de Janeiro")
            .await
            .expect("forecast");

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].iso_date, "2026-10-20");
        assert_eq!(days[0].temp_max_c, 29.4);
    }

    #[tokio::test]
    async fn forecast_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let err = HttpWeatherSource::new(&server.uri()).fetch_forecast("Paris").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn trending_keeps_upstream_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trending"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "city_name": "Tokyo", "search_count": 42 },
                    { "city_name": "Bangkok", "search_count": 50 },
                    { "city_name": "Oslo" }
                ]
            })))
            .mount(&server)
            .await;

        let cities = HttpWeatherSource::new(&server.uri()).fetch_trending().await.expect("trending");
        let names: Vec<_> = cities.iter().map(|c| c.city_name.as_str()).collect();
        assert_eq!(names, ["Tokyo", "Bangkok", "Oslo"]);
        assert_eq!(cities[2].search_count, None);
    }

    #[tokio::test]
    async fn trending_failure_is_its_own_kind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trending"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "data": "db down" })))
            .mount(&server)
            .await;

        let err = HttpWeatherSource::new(&server.uri()).fetch_trending().await.unwrap_err();
        assert_eq!(err, SearchError::TrendingUnavailable("db down".into()));
    }

    #[tokio::test]
    async fn null_trending_data_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trending"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
            .mount(&server)
            .await;

        let cities = HttpWeatherSource::new(&server.uri()).fetch_trending().await.expect("trending");
        assert!(cities.is_empty());
    }
}
