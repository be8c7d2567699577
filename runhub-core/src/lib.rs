//! Core library for the `runhub` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider abstraction and WeatherAPI.com client
//! - The activity-stats client (year-to-date distances)
//! - The home-automation hub state publisher
//! - The runnability decision logic (target times, forecast lookup, rule)
//!
//! It is used by `runhub-cli`, but can also be reused by other binaries or
//! scheduled jobs.

pub mod activity;
pub mod config;
pub mod hub;
pub mod model;
pub mod provider;
pub mod runnable;

pub use activity::{ActivityTotals, StravaClient, meters_to_miles};
pub use config::{ActivityConfig, Config, EntityIds, HubConfig, WeatherConfig};
pub use hub::{EntityUpdate, HubClient, HubError, PublishError, PublishReport};
pub use model::{ForecastDay, ForecastSnapshot, HourSample};
pub use provider::{ForecastProvider, provider_from_config};
pub use runnable::{RunnabilityRule, Slot, TargetAssessment, TargetTimes, Verdict};
