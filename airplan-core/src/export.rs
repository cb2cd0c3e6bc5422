use anyhow::Context;

use crate::{error::Result, model::Recommendation};

/// Render recommendations as two-column CSV ("Activity", "Best Time"),
/// suitable for download or piping into a spreadsheet.
pub fn recommendations_csv(recommendations: &[Recommendation]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["Activity", "Best Time"])
        .context("Failed to write CSV header")?;

    for rec in recommendations {
        writer
            .write_record([rec.activity.label.as_str(), rec.best_times_text().as_str()])
            .context("Failed to write CSV row")?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {e}"))?;
    let text = String::from_utf8(bytes).context("CSV output was not valid UTF-8")?;

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Forecast, ForecastPoint};
    use crate::recommend::recommend;
    use chrono::{TimeZone, Utc};

    #[test]
    fn csv_has_header_and_one_row_per_activity() {
        let forecast = Forecast {
            points: vec![
                ForecastPoint {
                    timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
                    aqi: 1,
                },
                ForecastPoint {
                    timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 11, 0, 0).unwrap(),
                    aqi: 2,
                },
            ],
        };
        let activities = vec!["Running outdoors".to_string(), "Indoor yoga".to_string()];
        let recs = recommend(&forecast, &activities);

        let csv = recommendations_csv(&recs).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Activity,Best Time");
        // The hour list contains a comma, so the field must be quoted.
        assert_eq!(lines[1], "Running outdoors,\"9 AM, 11 AM\"");
        assert_eq!(lines[2], "Indoor yoga,Any time");
    }

    #[test]
    fn empty_recommendations_yield_header_only() {
        let csv = recommendations_csv(&[]).unwrap();
        assert_eq!(csv.trim_end(), "Activity,Best Time");
    }
}
