//! Activity advice for a weather snapshot.
//!
//! A generative text service is asked first; any failure or empty answer
//! falls through to the deterministic rule table in [`rules`].

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;

use crate::{
    model::{AdviceResult, WeatherSnapshot},
    normalize::first_link,
};

pub mod gemini;
pub mod rules;

/// Word budget the generated answer is asked to stay under.
pub const WORD_BUDGET: usize = 50;

/// Soft failure of the generative path. Never leaves [`AdviceGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationFailure {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("service returned status {0}: {1}")]
    Status(u16, String),

    #[error("could not decode completion: {0}")]
    Decode(String),
}

/// Single-prompt text completion.
#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    /// Complete `prompt`. An absent completion is `Ok("")`, not an error.
    async fn complete(&self, prompt: &str) -> Result<String, GenerationFailure>;
}

#[derive(Debug, Clone)]
pub struct AdviceGenerator {
    generator: Option<Arc<dyn TextGenerator>>,
    language: String,
}

impl Default for AdviceGenerator {
    fn default() -> Self {
        Self::rules_only()
    }
}

impl AdviceGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, language: impl Into<String>) -> Self {
        Self { generator: Some(generator), language: language.into() }
    }

    /// A generator with no generative service; always uses the rule table.
    pub fn rules_only() -> Self {
        Self { generator: None, language: crate::config::DEFAULT_LANGUAGE.to_string() }
    }

    pub fn has_text_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Produce advice for `snapshot`. Never fails.
    ///
    /// `city` is the display name resolved by the caller and is what the
    /// prompt mentions.
    pub async fn generate(&self, city: &str, snapshot: &WeatherSnapshot) -> AdviceResult {
        if let Some(generator) = &self.generator {
            let prompt = build_prompt(city, snapshot, &self.language);
            match generator.complete(&prompt).await {
                Ok(text) if !text.trim().is_empty() => return from_completion(text.trim()),
                Ok(_) => tracing::warn!(city, "empty advice completion, using rule table"),
                Err(e) => tracing::warn!(city, error = %e, "advice generation failed, using rule table"),
            }
        }

        self.fallback(snapshot)
    }

    pub fn fallback(&self, snapshot: &WeatherSnapshot) -> AdviceResult {
        rules::fallback_advice(snapshot)
    }
}

/// Prompt sent to the text generator.
pub fn build_prompt(city: &str, snapshot: &WeatherSnapshot, language: &str) -> String {
    format!(
        "City: {city}\n\
         Weather: {condition}\n\
         Temperature: {temp}°C\n\
         Humidity: {humidity}%\n\
         Wind speed: {wind} m/s\n\
         Suggest activities, places to visit or how to prepare for this weather \
         in no more than {WORD_BUDGET} words.\n\
         If there is a recommended place nearby, append a link to it; if not, skip the link.\n\
         Answer in {language}.",
        condition = snapshot.condition_description,
        temp = snapshot.temp_c,
        humidity = snapshot.humidity_pct,
        wind = snapshot.wind_speed_ms,
    )
}

fn from_completion(text: &str) -> AdviceResult {
    let mut advice = AdviceResult::tip(text);
    if let Some((label, link)) = first_link(text) {
        advice.place_label = label;
        advice.place_link = Some(link);
    }
    advice
}
