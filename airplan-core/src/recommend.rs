use crate::model::{Activity, Forecast, Recommendation, RecommendationStatus};

/// Fixed vocabulary for the outdoor classifier. Matching is substring based,
/// not token bounded: "cycle" matches "bicycle". That false-positive behavior
/// is deliberate and must stay as-is.
const OUTDOOR_KEYWORDS: &[&str] = &[
    "outdoor", "run", "jog", "cycle", "bike", "picnic", "hike", "walk", "garden", "sport",
];

/// Classify a raw activity label as outdoor or indoor.
/// Case-insensitive, deterministic.
pub fn classify(label: &str) -> Activity {
    let lowered = label.to_lowercase();
    let outdoor = OUTDOOR_KEYWORDS.iter().any(|kw| lowered.contains(kw));

    Activity { label: label.to_string(), outdoor }
}

/// Produce one recommendation per activity, preserving input order.
///
/// Outdoor activities get the forecast hours with AQI <= 2 (Good or Fair) as
/// their best times; indoor activities are unconstrained.
pub fn recommend(forecast: &Forecast, activities: &[String]) -> Vec<Recommendation> {
    activities
        .iter()
        .map(|label| {
            let activity = classify(label);

            if activity.outdoor {
                let best_times: Vec<_> = forecast
                    .points
                    .iter()
                    .filter(|p| p.is_safe())
                    .map(|p| p.timestamp)
                    .collect();

                let status = if best_times.is_empty() {
                    RecommendationStatus::NoSafeWindow
                } else {
                    RecommendationStatus::HasSafeWindow
                };

                Recommendation { activity, best_times, status }
            } else {
                Recommendation {
                    activity,
                    best_times: Vec::new(),
                    status: RecommendationStatus::NotApplicableIndoor,
                }
            }
        })
        .collect()
}
