//! Core library for the `airplan` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The air quality forecast provider (OpenWeather geocoding + pollution)
//! - The time-boxed forecast cache
//! - Activity classification and time-window recommendation
//! - The local SQLite plan store and CSV export
//!
//! It is used by `airplan-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod planner;
pub mod provider;
pub mod recommend;
pub mod store;

pub use cache::ForecastCache;
pub use config::Config;
pub use error::{Error, Result};
pub use model::{
    Activity, AqiLevel, Forecast, ForecastPoint, Place, Plan, PlanSummary, Recommendation,
    RecommendationStatus,
};
pub use planner::Planner;
pub use provider::{AirQualityProvider, provider_from_config};
pub use recommend::{classify, recommend};
pub use store::PlanStore;
