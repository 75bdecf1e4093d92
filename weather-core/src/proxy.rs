//! Server-side step that attaches advice to a weather payload.

use crate::{
    advice::{AdviceGenerator, rules::DEFAULT_TIP},
    error::ProxyError,
    model::{AdviceResult, AdvisedWeather, ProxyRequest, RawWeather, ResponseEnvelope},
    normalize::normalize,
};

/// City name used when the request carries none at all.
pub const UNKNOWN_CITY: &str = "Unknown city";

#[derive(Debug, Clone, Default)]
pub struct WeatherProxyHandler {
    advice: AdviceGenerator,
}

impl WeatherProxyHandler {
    pub fn new(advice: AdviceGenerator) -> Self {
        Self { advice }
    }

    /// Validate the payload, generate and normalize advice, and build the envelope.
    ///
    /// A payload without `data.weather` is rejected before any advice work.
    pub async fn handle(&self, request: ProxyRequest) -> Result<ResponseEnvelope, ProxyError> {
        let ProxyRequest { data, city: request_city, is_from_cache } = request;
        let data = data.unwrap_or_default();

        let weather = match data.weather {
            Some(weather) if !weather.is_null() => weather,
            _ => {
                return Err(ProxyError::MalformedInput(
                    "No weather data found in request body".to_string(),
                ));
            }
        };

        let raw: RawWeather = serde_json::from_value(weather.clone()).map_err(|e| {
            ProxyError::Unexpected(format!("Weather object is missing required fields: {e}"))
        })?;

        let city = resolve_city(data.city.as_deref(), request_city.as_deref(), &raw.name);
        let snapshot = raw.into_snapshot(&city);

        tracing::info!(
            city = %city,
            condition = %snapshot.condition_description,
            temp_c = snapshot.temp_c,
            "generating advice"
        );

        let generated = self.advice.generate(&city, &snapshot).await;
        let advice = self.finish(generated, || self.advice.fallback(&snapshot));

        Ok(ResponseEnvelope {
            data: AdvisedWeather { city, weather, advice, snapshot },
            is_from_cache: is_from_cache.unwrap_or(false),
        })
    }

    /// Normalize the tip; an empty result is replaced so advice is never blank.
    fn finish(
        &self,
        mut advice: AdviceResult,
        fallback: impl FnOnce() -> AdviceResult,
    ) -> AdviceResult {
        advice.tip_text = normalize(&advice.tip_text);
        if !advice.tip_text.is_empty() {
            return advice;
        }

        tracing::warn!("advice normalized to empty text, using rule table");
        let mut advice = fallback();
        advice.tip_text = normalize(&advice.tip_text);
        if advice.tip_text.is_empty() {
            advice.tip_text = DEFAULT_TIP.to_string();
        }
        advice
    }
}

/// Display city: request `data.city`, then top-level `city`, then the weather
/// object's name, then [`UNKNOWN_CITY`]. Blank values count as absent.
pub fn resolve_city(data_city: Option<&str>, request_city: Option<&str>, weather_name: &str) -> String {
    [data_city, request_city, Some(weather_name)]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|c| !c.is_empty())
        .unwrap_or(UNKNOWN_CITY)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{
        GenerationFailure,
        rules::Bucket,
        tests::StubGenerator,
    };
    use crate::model::ProxyRequestData;
    use serde_json::{Value, json};

    fn weather_object(description: &str, temp: f64) -> Value {
        json!({
            "name": "Bangkok",
            "sys": { "country": "TH" },
            "weather": [{ "main": "Clear", "description": description, "icon": "01d" }],
            "main": { "temp": temp, "feels_like": temp, "humidity": 60 },
            "wind": { "speed": 3.0 }
        })
    }

    fn request(weather: Option<Value>) -> ProxyRequest {
        ProxyRequest {
            data: Some(ProxyRequestData { city: None, weather }),
            city: None,
            is_from_cache: None,
        }
    }

    #[tokio::test]
    async fn missing_weather_is_rejected_before_generation() {
        let stub = StubGenerator::answering(Ok("unused".into()));
        let handler = WeatherProxyHandler::new(AdviceGenerator::new(stub.clone(), "English"));

        let err = handler.handle(request(None)).await.unwrap_err();
        assert!(matches!(err, ProxyError::MalformedInput(_)));

        let err = handler.handle(ProxyRequest::default()).await.unwrap_err();
        assert!(matches!(err, ProxyError::MalformedInput(_)));

        let err = handler.handle(request(Some(Value::Null))).await.unwrap_err();
        assert!(matches!(err, ProxyError::MalformedInput(_)));

        assert!(stub.prompts.lock().expect("prompt log").is_empty());
    }

    #[tokio::test]
    async fn incomplete_weather_object_is_unexpected() {
        let handler = WeatherProxyHandler::default();
        let err = handler.handle(request(Some(json!({ "name": "Paris" })))).await.unwrap_err();
        assert!(matches!(err, ProxyError::Unexpected(_)));
    }

    #[tokio::test]
    async fn fractional_humidity_is_accepted() {
        let mut weather = weather_object("clear sky", 28.0);
        weather["main"]["humidity"] = json!(60.5);

        let envelope =
            WeatherProxyHandler::default().handle(request(Some(weather))).await.expect("envelope");
        assert_eq!(envelope.data.snapshot.humidity_pct, 61);
    }

    #[tokio::test]
    async fn rules_only_envelope_uses_fallback_tip() {
        let handler = WeatherProxyHandler::default();
        let envelope = handler
            .handle(request(Some(weather_object("clear sky", 32.0))))
            .await
            .expect("envelope");

        assert_eq!(envelope.data.city, "Bangkok");
        assert_eq!(envelope.data.advice.tip_text, Bucket::Clear.tip());
        assert!(!envelope.data.advice.has_place());
        assert!(!envelope.is_from_cache);
        assert_eq!(envelope.data.weather, weather_object("clear sky", 32.0));
    }

    #[tokio::test]
    async fn cache_flag_is_threaded_through() {
        let handler = WeatherProxyHandler::default();
        let mut req = request(Some(weather_object("haze", 25.0)));
        req.is_from_cache = Some(true);

        let envelope = handler.handle(req).await.expect("envelope");
        assert!(envelope.is_from_cache);
    }

    #[tokio::test]
    async fn generated_text_is_normalized() {
        let stub = StubGenerator::answering(Ok(
            "**Hot** and sunny.\n* Try [Chatuchak](https://example.com/jj)\n* Drink water".into(),
        ));
        let handler = WeatherProxyHandler::new(AdviceGenerator::new(stub, "English"));

        let envelope = handler
            .handle(request(Some(weather_object("clear sky", 34.0))))
            .await
            .expect("envelope");

        let advice = &envelope.data.advice;
        assert_eq!(
            advice.tip_text,
            r#"Hot and sunny. • Try <a href="https://example.com/jj" target="_blank" class="text-blue-600 underline">Chatuchak</a> • Drink water"#
        );
        assert_eq!(advice.place_label, "Chatuchak");
        assert_eq!(advice.place_link.as_deref(), Some("https://example.com/jj"));
    }

    #[tokio::test]
    async fn marker_only_completion_still_yields_advice() {
        let stub = StubGenerator::answering(Ok("***".into()));
        let handler = WeatherProxyHandler::new(AdviceGenerator::new(stub, "English"));

        let envelope = handler
            .handle(request(Some(weather_object("light rain", 24.0))))
            .await
            .expect("envelope");

        assert_eq!(envelope.data.advice.tip_text, Bucket::Rain.tip());
    }

    #[tokio::test]
    async fn generation_failure_is_absorbed() {
        let stub = StubGenerator::answering(Err(GenerationFailure::Status(500, "down".into())));
        let handler = WeatherProxyHandler::new(AdviceGenerator::new(stub, "English"));

        let envelope = handler
            .handle(request(Some(weather_object("snow", 2.0))))
            .await
            .expect("envelope");
        assert_eq!(envelope.data.advice.tip_text, Bucket::Cold.tip());
    }

    #[test]
    fn finish_never_returns_blank_advice() {
        let handler = WeatherProxyHandler::default();
        let advice = handler.finish(AdviceResult::tip("  "), || AdviceResult::tip("*"));
        assert_eq!(advice.tip_text, DEFAULT_TIP);
    }

    #[test]
    fn city_precedence() {
        assert_eq!(resolve_city(Some("Phuket"), Some("Krabi"), "Bangkok"), "Phuket");
        assert_eq!(resolve_city(None, Some("Krabi"), "Bangkok"), "Krabi");
        assert_eq!(resolve_city(Some(""), Some("  "), "Bangkok"), "Bangkok");
        assert_eq!(resolve_city(None, None, ""), UNKNOWN_CITY);
    }
}
