use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::{
    error::{Error, Result},
    model::{Plan, PlanSummary, Recommendation},
};

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS plans (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    city        TEXT NOT NULL,
    country     TEXT NOT NULL,
    activities  TEXT NOT NULL,
    result      TEXT NOT NULL,
    created_at  TEXT NOT NULL
)";

/// Local SQLite store of persisted plans. Single interactive user,
/// single writer; stored plans are immutable snapshots.
#[derive(Debug, Clone)]
pub struct PlanStore {
    pool: SqlitePool,
}

impl PlanStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
        }

        let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        Self::init(pool).await
    }

    /// In-memory database, used by tests.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // One long-lived connection; a fresh connection would see an empty db.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::init(pool).await
    }

    async fn init(pool: SqlitePool) -> Result<Self> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Persist a plan and return its opaque id.
    pub async fn save(&self, plan: &Plan) -> Result<i64> {
        let activities =
            serde_json::to_string(&plan.activities).context("Failed to serialize activities")?;
        let result = serde_json::to_string(&plan.recommendations)
            .context("Failed to serialize recommendations")?;

        let res = sqlx::query(
            "INSERT INTO plans (city, country, activities, result, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&plan.city)
        .bind(&plan.country)
        .bind(activities)
        .bind(result)
        .bind(plan.created_at)
        .execute(&self.pool)
        .await?;

        let id = res.last_insert_rowid();
        debug!(id, city = %plan.city, "plan saved");

        Ok(id)
    }

    /// Stored plan summaries, newest first.
    pub async fn list(&self) -> Result<Vec<PlanSummary>> {
        let rows = sqlx::query(
            "SELECT id, city, country, activities, created_at \
             FROM plans ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(summary_from_row).collect()
    }

    /// Full stored plan, or `PlanNotFound` for an unknown id.
    pub async fn get(&self, id: i64) -> Result<Plan> {
        let row = sqlx::query(
            "SELECT city, country, activities, result, created_at FROM plans WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::PlanNotFound(id))?;

        plan_from_row(&row)
    }
}

fn summary_from_row(row: SqliteRow) -> Result<PlanSummary> {
    let activities: Vec<String> = serde_json::from_str(row.try_get("activities")?)
        .context("Failed to parse stored activities")?;

    Ok(PlanSummary {
        id: row.try_get("id")?,
        city: row.try_get("city")?,
        country: row.try_get("country")?,
        activities,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn plan_from_row(row: &SqliteRow) -> Result<Plan> {
    let activities: Vec<String> = serde_json::from_str(row.try_get("activities")?)
        .context("Failed to parse stored activities")?;
    let recommendations: Vec<Recommendation> = serde_json::from_str(row.try_get("result")?)
        .context("Failed to parse stored recommendations")?;

    Ok(Plan {
        city: row.try_get("city")?,
        country: row.try_get("country")?,
        activities,
        recommendations,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Forecast, ForecastPoint, Place};
    use crate::recommend::recommend;
    use chrono::TimeZone;

    fn sample_plan(city: &str, created_at: DateTime<Utc>) -> Plan {
        let forecast = Forecast {
            points: vec![
                ForecastPoint {
                    timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
                    aqi: 1,
                },
                ForecastPoint {
                    timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
                    aqi: 4,
                },
            ],
        };
        let activities = vec!["Running outdoors".to_string(), "Indoor yoga".to_string()];
        let recommendations = recommend(&forecast, &activities);
        let place = Place::new(city, "GB");

        Plan {
            city: place.city,
            country: place.country,
            activities,
            recommendations,
            created_at,
        }
    }

    #[tokio::test]
    async fn save_then_get_roundtrips() {
        let store = PlanStore::open_in_memory().await.unwrap();
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        let plan = sample_plan("London", created);

        let id = store.save(&plan).await.unwrap();
        let loaded = store.get(id).await.unwrap();

        assert_eq!(loaded.city, plan.city);
        assert_eq!(loaded.country, plan.country);
        assert_eq!(loaded.activities, plan.activities);
        assert_eq!(loaded.recommendations, plan.recommendations);
        assert_eq!(loaded.created_at, plan.created_at);
    }

    #[tokio::test]
    async fn list_is_reverse_chronological() {
        let store = PlanStore::open_in_memory().await.unwrap();

        let older = sample_plan("London", Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
        let newer = sample_plan("Paris", Utc.with_ymd_and_hms(2024, 6, 2, 8, 0, 0).unwrap());

        store.save(&older).await.unwrap();
        store.save(&newer).await.unwrap();

        let summaries = store.list().await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].city, "Paris");
        assert_eq!(summaries[1].city, "London");
        assert_eq!(summaries[1].activities, older.activities);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = PlanStore::open_in_memory().await.unwrap();
        let err = store.get(42).await.unwrap_err();
        assert!(matches!(err, Error::PlanNotFound(42)));
    }
}
