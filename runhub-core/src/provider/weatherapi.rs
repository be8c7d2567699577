use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::model::{ForecastDay, ForecastSnapshot, HourSample, LOCAL_TIME_FORMAT};

use super::ForecastProvider;

const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";

#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: String,
    query: String,
    base_url: String,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(api_key: String, query: String, base_url: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client for WeatherAPI.com")?;

        Ok(Self {
            api_key,
            query,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            http,
        })
    }
}

#[async_trait]
impl ForecastProvider for WeatherApiClient {
    async fn forecast(&self, days: u8) -> Result<ForecastSnapshot> {
        let url = format!("{}/forecast.json", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", self.query.as_str()),
                ("days", &days.to_string()),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (forecast)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read WeatherAPI forecast response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "WeatherAPI forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: WaForecastResponse =
            serde_json::from_str(&body).context("Failed to parse WeatherAPI forecast JSON")?;

        snapshot_from_wire(parsed)
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct WaAstro {
    sunrise: String,
    sunset: String,
}

#[derive(Debug, Deserialize)]
struct WaHour {
    time: String,
    temp_f: f64,
    will_it_rain: i64,
    will_it_snow: i64,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    astro: Option<WaAstro>,
    hour: Vec<WaHour>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    forecast: WaForecast,
}

fn snapshot_from_wire(res: WaForecastResponse) -> Result<ForecastSnapshot> {
    let local_time = NaiveDateTime::parse_from_str(&res.location.localtime, LOCAL_TIME_FORMAT)
        .with_context(|| {
            format!("WeatherAPI reported an unexpected localtime: {}", res.location.localtime)
        })?;

    let days = res
        .forecast
        .forecastday
        .into_iter()
        .map(|day| {
            let date = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d").with_context(|| {
                format!("WeatherAPI reported an unexpected forecast date: {}", day.date)
            })?;

            let hours = day
                .hour
                .into_iter()
                .map(|hour| {
                    let time = NaiveDateTime::parse_from_str(&hour.time, LOCAL_TIME_FORMAT)
                        .with_context(|| {
                            format!("WeatherAPI reported an unexpected hour time: {}", hour.time)
                        })?;

                    Ok(HourSample {
                        time,
                        temp_f: hour.temp_f,
                        will_rain: hour.will_it_rain == 1,
                        will_snow: hour.will_it_snow == 1,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(ForecastDay {
                date,
                sunrise: day.astro.as_ref().and_then(|astro| parse_astro_time(&astro.sunrise)),
                sunset: day.astro.as_ref().and_then(|astro| parse_astro_time(&astro.sunset)),
                hours,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ForecastSnapshot { local_time, days })
}

/// Astro times come as 12-hour strings like "07:21 AM". Polar locations get
/// values like "No sunrise", which degrade to `None` rather than an error.
fn parse_astro_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%I:%M %p").ok()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}
