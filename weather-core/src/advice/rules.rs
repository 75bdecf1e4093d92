use crate::model::{AdviceResult, WeatherSnapshot};

/// Above this temperature the "hot" tip applies.
pub const HOT_THRESHOLD_C: f64 = 30.0;
/// Below this temperature the "cold" tip applies.
pub const COLD_THRESHOLD_C: f64 = 20.0;

/// Used only if every other path produced nothing.
pub const DEFAULT_TIP: &str = "Have a great day, whatever the weather!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Rain,
    Cloud,
    Clear,
    Hot,
    Cold,
    Normal,
}

impl Bucket {
    pub const fn all() -> &'static [Bucket] {
        &[Bucket::Rain, Bucket::Cloud, Bucket::Clear, Bucket::Hot, Bucket::Cold, Bucket::Normal]
    }

    pub fn tip(&self) -> &'static str {
        match self {
            Bucket::Rain => {
                "Rainy today: a good day for indoor activities. Don't forget an umbrella before heading out."
            }
            Bucket::Cloud => "Overcast skies. If you go out, keep an umbrella handy just in case.",
            Bucket::Clear => "Clear skies: great for a walk, taking photos or enjoying the view outdoors.",
            Bucket::Hot => {
                "It's hot out. Try an air-conditioned mall or cafe, and grab something cold to drink."
            }
            Bucket::Cold => {
                "Cool weather: nice for a trip to the hills or a cosy coffee shop. Keep yourself warm."
            }
            Bucket::Normal => "Pleasant weather today. Have a great day!",
        }
    }
}

/// Pick the bucket for a condition and temperature.
///
/// Keyword buckets win over temperature buckets, which win over the default.
pub fn classify(condition: &str, temp_c: f64) -> Bucket {
    let lower = condition.to_lowercase();

    if condition.contains("ฝน") || lower.contains("rain") {
        Bucket::Rain
    } else if condition.contains("เมฆ") || lower.contains("cloud") {
        Bucket::Cloud
    } else if lower.contains("clear") {
        Bucket::Clear
    } else if temp_c > HOT_THRESHOLD_C {
        Bucket::Hot
    } else if temp_c < COLD_THRESHOLD_C {
        Bucket::Cold
    } else {
        Bucket::Normal
    }
}

/// Deterministic advice for a snapshot: tip text only, no place.
pub fn fallback_advice(snapshot: &WeatherSnapshot) -> AdviceResult {
    AdviceResult::tip(classify(&snapshot.condition_description, snapshot.temp_c).tip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_match_case_insensitively() {
        assert_eq!(classify("Light RAIN", 25.0), Bucket::Rain);
        assert_eq!(classify("broken clouds", 25.0), Bucket::Cloud);
        assert_eq!(classify("Clear sky", 25.0), Bucket::Clear);
    }

    #[test]
    fn thai_keywords_match() {
        assert_eq!(classify("ฝนตกเล็กน้อย", 25.0), Bucket::Rain);
        assert_eq!(classify("เมฆเป็นบางส่วน", 25.0), Bucket::Cloud);
    }

    #[test]
    fn keyword_wins_over_temperature() {
        assert_eq!(classify("scattered clouds", 35.0), Bucket::Cloud);
        assert_eq!(classify("clear sky", 5.0), Bucket::Clear);
        assert_eq!(classify("moderate rain", 40.0), Bucket::Rain);
    }

    #[test]
    fn rain_is_checked_before_cloud() {
        assert_eq!(classify("rain clouds", 25.0), Bucket::Rain);
    }

    #[test]
    fn temperature_thresholds_are_strict() {
        assert_eq!(classify("haze", 30.5), Bucket::Hot);
        assert_eq!(classify("haze", 30.0), Bucket::Normal);
        assert_eq!(classify("mist", 19.9), Bucket::Cold);
        assert_eq!(classify("mist", 20.0), Bucket::Normal);
    }

    #[test]
    fn every_bucket_has_a_tip() {
        for bucket in Bucket::all() {
            assert!(!bucket.tip().trim().is_empty());
        }
        assert!(!DEFAULT_TIP.is_empty());
    }
}
