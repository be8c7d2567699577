use anyhow::{Context, Result, anyhow};
use reqwest::{Client, header};
use serde::Deserialize;
use std::time::Duration;

const METERS_PER_MILE: f64 = 1609.34;

/// Convert meters to miles, rounded to two decimals.
pub fn meters_to_miles(meters: f64) -> f64 {
    (meters / METERS_PER_MILE * 100.0).round() / 100.0
}

/// Year-to-date totals reported by the activity API, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityTotals {
    pub run_meters: f64,
    pub ride_meters: f64,
}

impl ActivityTotals {
    pub fn run_miles(&self) -> f64 {
        meters_to_miles(self.run_meters)
    }

    pub fn ride_miles(&self) -> f64 {
        meters_to_miles(self.ride_meters)
    }
}

/// Client for a Strava-style athlete-stats endpoint.
#[derive(Debug, Clone)]
pub struct StravaClient {
    stats_url: String,
    http: Client,
}

impl StravaClient {
    pub fn new(stats_url: String, api_key: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();

        let mut auth_value = header::HeaderValue::from_str(&format!("Bearer {api_key}"))
            .context("Activity API key is not a valid header value")?;
        auth_value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_value);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client for the activity API")?;

        Ok(Self { stats_url, http })
    }

    /// Fetch year-to-date run and ride distances.
    pub async fn ytd_totals(&self) -> Result<ActivityTotals> {
        let res = self
            .http
            .get(&self.stats_url)
            .send()
            .await
            .context("Failed to send request to the activity API")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read activity API response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Activity API request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: AthleteStats =
            serde_json::from_str(&body).context("Failed to parse athlete stats JSON")?;

        Ok(ActivityTotals {
            run_meters: parsed.ytd_run_totals.distance,
            ride_meters: parsed.ytd_ride_totals.distance,
        })
    }
}

#[derive(Debug, Deserialize)]
struct StatsTotal {
    distance: f64,
}

#[derive(Debug, Deserialize)]
struct AthleteStats {
    ytd_run_totals: StatsTotal,
    ytd_ride_totals: StatsTotal,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_mile_in_meters_converts_to_one() {
        assert_eq!(meters_to_miles(1609.34), 1.0);
    }

    #[test]
    fn conversion_rounds_to_two_decimals() {
        // 500 km = 310.685... miles
        assert_eq!(meters_to_miles(500_000.0), 310.69);
        assert_eq!(meters_to_miles(0.0), 0.0);
    }

    #[test]
    fn totals_expose_miles() {
        let totals = ActivityTotals { run_meters: 1609.34, ride_meters: 3218.68 };

        assert_eq!(totals.run_miles(), 1.0);
        assert_eq!(totals.ride_miles(), 2.0);
    }

    #[test]
    fn athlete_stats_parse_ytd_totals() {
        let json = r#"{
            "recent_run_totals": {"distance": 12000.5},
            "ytd_run_totals": {"count": 31, "distance": 402335.0},
            "ytd_ride_totals": {"count": 12, "distance": 160934.0}
        }"#;

        let parsed: AthleteStats = serde_json::from_str(json).expect("stats must parse");

        assert_eq!(parsed.ytd_run_totals.distance, 402335.0);
        assert_eq!(parsed.ytd_ride_totals.distance, 160934.0);
    }
}
