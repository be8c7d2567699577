use crate::{config::WeatherConfig, model::ForecastSnapshot, provider::weatherapi::WeatherApiClient};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod weatherapi;

/// A source of hourly forecasts.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn forecast(&self, days: u8) -> anyhow::Result<ForecastSnapshot>;
}

/// Construct the forecast provider described by the configuration.
pub fn provider_from_config(config: &WeatherConfig) -> anyhow::Result<Box<dyn ForecastProvider>> {
    config.require_credentials()?;

    let client = WeatherApiClient::new(
        config.api_key.clone(),
        config.query.clone(),
        config.base_url.clone(),
    )?;

    Ok(Box::new(client))
}
