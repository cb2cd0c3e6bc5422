use chrono::Utc;
use tracing::debug;

use crate::{
    cache::ForecastCache,
    error::{Error, Result},
    model::{Forecast, Place, Plan},
    provider::AirQualityProvider,
    recommend::recommend,
};

/// Drives the linear fetch -> classify -> assemble pipeline for one request.
///
/// Owns the provider and the time-boxed forecast cache; persistence is the
/// caller's concern. A failed fetch aborts the whole request before any
/// recommendation is computed.
pub struct Planner {
    provider: Box<dyn AirQualityProvider>,
    cache: ForecastCache,
}

impl Planner {
    pub fn new(provider: Box<dyn AirQualityProvider>) -> Self {
        Self { provider, cache: ForecastCache::new() }
    }

    /// Compute a plan for `place`. Blank activity labels are dropped; an
    /// effectively empty list is rejected before any network call.
    pub async fn plan(&mut self, place: &Place, activities: &[String]) -> Result<Plan> {
        let activities: Vec<String> =
            activities.iter().map(|a| a.trim().to_string()).filter(|a| !a.is_empty()).collect();

        if activities.is_empty() {
            return Err(Error::EmptyActivities);
        }

        let forecast = self.forecast_for(place).await?;
        let recommendations = recommend(&forecast, &activities);

        Ok(Plan {
            city: place.city.clone(),
            country: place.country.clone(),
            activities,
            recommendations,
            created_at: Utc::now(),
        })
    }

    /// Cache-or-fetch. Repeated requests within the TTL skip the network.
    pub async fn forecast_for(&mut self, place: &Place) -> Result<Forecast> {
        let now = Utc::now();

        if let Some(cached) = self.cache.get(place, now) {
            return Ok(cached);
        }

        debug!(place = %place, "fetching forecast from provider");
        let forecast = self.provider.forecast(place).await?;
        self.cache.insert(place, forecast.clone(), now);

        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForecastPoint, RecommendationStatus};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct FakeProvider {
        forecast: Forecast,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AirQualityProvider for FakeProvider {
        async fn forecast(&self, _place: &Place) -> Result<Forecast> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.forecast.clone())
        }
    }

    #[derive(Debug)]
    struct FailingProvider;

    #[async_trait]
    impl AirQualityProvider for FailingProvider {
        async fn forecast(&self, place: &Place) -> Result<Forecast> {
            Err(Error::PlaceNotFound(place.city.clone()))
        }
    }

    fn sample_forecast() -> Forecast {
        let points = [(9, 1), (10, 3), (11, 2)]
            .iter()
            .map(|&(h, aqi)| ForecastPoint {
                timestamp: Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap(),
                aqi,
            })
            .collect();
        Forecast { points }
    }

    fn planner_with_counter() -> (Planner, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = FakeProvider { forecast: sample_forecast(), calls: calls.clone() };
        (Planner::new(Box::new(provider)), calls)
    }

    #[tokio::test]
    async fn empty_activity_list_is_rejected_before_fetch() {
        let (mut planner, calls) = planner_with_counter();
        let place = Place::new("London", "GB");

        let err = planner.plan(&place, &[]).await.unwrap_err();
        assert!(matches!(err, Error::EmptyActivities));

        // Whitespace-only lines count as empty too.
        let err = planner.plan(&place, &["  ".to_string(), "\t".to_string()]).await.unwrap_err();
        assert!(matches!(err, Error::EmptyActivities));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn repeated_requests_hit_the_cache() {
        let (mut planner, calls) = planner_with_counter();
        let place = Place::new("London", "GB");
        let acts = vec!["Running outdoors".to_string()];

        let first = planner.plan(&place, &acts).await.unwrap();
        let second = planner.plan(&place, &acts).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.recommendations, second.recommendations);
    }

    #[tokio::test]
    async fn failed_fetch_aborts_before_recommendation() {
        let mut planner = Planner::new(Box::new(FailingProvider));
        let place = Place::new("Nowhereville", "");

        let err = planner.plan(&place, &["Running".to_string()]).await.unwrap_err();
        assert!(matches!(err, Error::PlaceNotFound(_)));
    }

    #[tokio::test]
    async fn plan_carries_place_and_ordered_recommendations() {
        let (mut planner, _calls) = planner_with_counter();
        let place = Place::new("London", "GB");
        let acts = vec!["Running outdoors".to_string(), "Indoor yoga".to_string()];

        let plan = planner.plan(&place, &acts).await.unwrap();

        assert_eq!(plan.city, "London");
        assert_eq!(plan.country, "GB");
        assert_eq!(plan.activities, acts);
        assert_eq!(plan.recommendations.len(), 2);
        assert_eq!(plan.recommendations[0].status, RecommendationStatus::HasSafeWindow);
        assert_eq!(plan.recommendations[1].status, RecommendationStatus::NotApplicableIndoor);
    }
}
