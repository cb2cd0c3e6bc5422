use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Air quality index category, as reported by OpenWeather (1..=5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AqiLevel {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
}

impl AqiLevel {
    /// Map the upstream 1-based index to a level. Returns `None` outside 1..=5.
    pub fn from_index(aqi: u8) -> Option<Self> {
        match aqi {
            1 => Some(AqiLevel::Good),
            2 => Some(AqiLevel::Fair),
            3 => Some(AqiLevel::Moderate),
            4 => Some(AqiLevel::Poor),
            5 => Some(AqiLevel::VeryPoor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AqiLevel::Good => "Good",
            AqiLevel::Fair => "Fair",
            AqiLevel::Moderate => "Moderate",
            AqiLevel::Poor => "Poor",
            AqiLevel::VeryPoor => "Very Poor",
        }
    }
}

impl std::fmt::Display for AqiLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hourly forecast sample. Invariant: `aqi` is always in 1..=5,
/// enforced when the upstream response is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub aqi: u8,
}

impl ForecastPoint {
    /// The qualitative level is derived from `aqi`, never stored separately.
    pub fn level(&self) -> AqiLevel {
        // Safe by the parse-time invariant.
        AqiLevel::from_index(self.aqi).unwrap_or(AqiLevel::VeryPoor)
    }

    /// True when the hour is safe for outdoor activity (Good or Fair).
    pub fn is_safe(&self) -> bool {
        self.aqi <= 2
    }
}

/// Hourly pollution forecast, chronological, at most the next 24 samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The place a forecast is requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub city: String,
    /// Optional ISO country qualifier, empty when not given.
    pub country: String,
}

impl Place {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self { city: city.into(), country: country.into() }
    }

    /// Query string for the geocoding call, e.g. "London,GB" or just "London".
    pub fn query(&self) -> String {
        if self.country.is_empty() {
            self.city.clone()
        } else {
            format!("{},{}", self.city, self.country)
        }
    }
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.country.is_empty() {
            f.write_str(&self.city)
        } else {
            write!(f, "{}, {}", self.city, self.country)
        }
    }
}

/// A user-supplied activity with its derived outdoor/indoor classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub label: String,
    pub outdoor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationStatus {
    /// Outdoor activity with at least one safe hour.
    HasSafeWindow,
    /// Outdoor activity, but no forecast hour is Good or Fair.
    NoSafeWindow,
    /// Indoor activity, air quality does not constrain it.
    NotApplicableIndoor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub activity: Activity,
    /// Safe hours drawn from the forecast, in forecast order. Always empty
    /// for indoor activities.
    pub best_times: Vec<DateTime<Utc>>,
    pub status: RecommendationStatus,
}

impl Recommendation {
    /// Human-readable "best time" column, matching the planner's display
    /// convention: a comma-joined hour list, "No safe time", or "Any time".
    pub fn best_times_text(&self) -> String {
        match self.status {
            RecommendationStatus::NotApplicableIndoor => "Any time".to_string(),
            RecommendationStatus::NoSafeWindow => "No safe time".to_string(),
            RecommendationStatus::HasSafeWindow => self
                .best_times
                .iter()
                .map(|ts| format_hour(*ts))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// A computed plan: location, activities and their recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub city: String,
    pub country: String,
    pub activities: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub created_at: DateTime<Utc>,
}

/// Listing row for a stored plan, without the full recommendation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub id: i64,
    pub city: String,
    pub country: String,
    pub activities: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Render an hour as "9 AM" / "11 PM", without a leading zero.
pub fn format_hour(ts: DateTime<Utc>) -> String {
    let s = ts.format("%I %p").to_string();
    s.trim_start_matches('0').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn level_mapping_is_total_over_valid_range() {
        let expected = [
            (1, AqiLevel::Good),
            (2, AqiLevel::Fair),
            (3, AqiLevel::Moderate),
            (4, AqiLevel::Poor),
            (5, AqiLevel::VeryPoor),
        ];
        for (aqi, level) in expected {
            assert_eq!(AqiLevel::from_index(aqi), Some(level));
        }
        assert_eq!(AqiLevel::from_index(0), None);
        assert_eq!(AqiLevel::from_index(6), None);
    }

    #[test]
    fn level_display_names() {
        assert_eq!(AqiLevel::Good.to_string(), "Good");
        assert_eq!(AqiLevel::VeryPoor.to_string(), "Very Poor");
    }

    #[test]
    fn safe_threshold_is_fair_or_better() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        assert!(ForecastPoint { timestamp: ts, aqi: 1 }.is_safe());
        assert!(ForecastPoint { timestamp: ts, aqi: 2 }.is_safe());
        assert!(!ForecastPoint { timestamp: ts, aqi: 3 }.is_safe());
    }

    #[test]
    fn place_query_includes_country_only_when_present() {
        assert_eq!(Place::new("London", "GB").query(), "London,GB");
        assert_eq!(Place::new("London", "").query(), "London");
    }

    #[test]
    fn hour_formatting_strips_leading_zero() {
        let nine = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let noon = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let eleven_pm = Utc.with_ymd_and_hms(2024, 6, 1, 23, 0, 0).unwrap();
        assert_eq!(format_hour(nine), "9 AM");
        assert_eq!(format_hour(noon), "12 PM");
        assert_eq!(format_hour(eleven_pm), "11 PM");
    }
}
