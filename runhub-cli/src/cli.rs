use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Confirm, Password, Text};

use runhub_core::{
    Config, EntityUpdate, HubClient, HubConfig, PublishError, PublishReport, RunnabilityRule, Slot,
    StravaClient, provider_from_config, runnable,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "runhub", version, about = "Fitness & runnability publisher for a home-automation hub")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for the weather, activity and hub APIs.
    Configure,

    /// Push year-to-date distances to the hub's numeric entities.
    Distance {
        /// Which distances to update.
        #[arg(long, value_enum, default_value = "all")]
        sport: Sport,

        /// Print the planned updates instead of posting them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Evaluate whether the next 5 PM and 6 AM are runnable and push the
    /// verdicts to the hub.
    Runnable {
        /// Print the planned updates instead of posting them.
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Sport {
    Run,
    Ride,
    All,
}

impl Sport {
    fn includes_run(self) -> bool {
        matches!(self, Sport::Run | Sport::All)
    }

    fn includes_ride(self) -> bool {
        matches!(self, Sport::Ride | Sport::All)
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => run_configure(),
            Command::Distance { sport, dry_run } => run_distance(sport, dry_run).await,
            Command::Runnable { dry_run } => run_runnable(dry_run).await,
        }
    }
}

async fn run_distance(sport: Sport, dry_run: bool) -> Result<()> {
    let config = Config::load()?;
    config.activity.require_credentials()?;

    let client = StravaClient::new(config.activity.stats_url.clone(), &config.activity.api_key)?;

    tracing::info!("Fetching year-to-date totals from the activity API...");
    let totals = client.ytd_totals().await?;

    let entities = &config.hub.entities;
    let mut report = PublishReport::default();
    let mut updates = Vec::new();

    if sport.includes_run() {
        let miles = totals.run_miles();
        tracing::info!("Running distance: {miles} mi");

        if miles == 0.0 {
            report.record_failure(
                &entities.running_distance,
                PublishError::MissingData("year-to-date run distance is zero".to_string()),
            );
        } else {
            updates.push(EntityUpdate::numeric(
                &entities.running_distance,
                miles,
                "YTD Running Distance",
            ));
        }
    }

    if sport.includes_ride() {
        let miles = totals.ride_miles();
        tracing::info!("Biking distance: {miles} mi");

        if miles == 0.0 {
            report.record_failure(
                &entities.biking_distance,
                PublishError::MissingData("year-to-date ride distance is zero".to_string()),
            );
        } else {
            updates.push(EntityUpdate::numeric(
                &entities.biking_distance,
                miles,
                "YTD Biking Distance",
            ));
        }
    }

    publish_or_preview(&config.hub, &updates, &mut report, dry_run).await?;
    finish(report)
}

async fn run_runnable(dry_run: bool) -> Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config.weather)?;

    tracing::info!("Fetching forecast from the weather API...");
    let snapshot = provider.forecast(config.weather.forecast_days).await?;

    let rule = RunnabilityRule {
        require_daylight: config.weather.require_daylight,
        ..Default::default()
    };
    let assessments = runnable::assess(&snapshot, &rule);

    let entities = &config.hub.entities;
    let mut report = PublishReport::default();
    let mut updates = Vec::new();

    for assessment in &assessments {
        let (runnable_id, reason_id) = match assessment.slot {
            Slot::Evening => (&entities.runnable_evening, &entities.reason_evening),
            Slot::Morning => (&entities.runnable_morning, &entities.reason_morning),
        };
        let label = assessment.slot.label();

        match &assessment.verdict {
            Some(verdict) => {
                tracing::info!(
                    "{} ({}): {}",
                    label,
                    assessment.target,
                    if verdict.is_runnable { "runnable" } else { "not runnable" }
                );

                updates.push(EntityUpdate::boolean(
                    runnable_id,
                    verdict.is_runnable,
                    format!("Runnable {label}"),
                ));
                updates.push(EntityUpdate::text(
                    reason_id,
                    verdict.reason.clone(),
                    format!("Reason {label}"),
                ));
            }
            None => {
                tracing::error!("No forecast entry for {} ({})", assessment.target, label);
                report.record_failure(
                    runnable_id,
                    PublishError::MissingData(format!(
                        "no forecast entry for {}",
                        assessment.target
                    )),
                );
            }
        }
    }

    publish_or_preview(&config.hub, &updates, &mut report, dry_run).await?;
    finish(report)
}

/// Post the updates, or print them when `--dry-run` is set. Credentials for
/// the hub are only required when actually posting.
async fn publish_or_preview(
    hub: &HubConfig,
    updates: &[EntityUpdate],
    report: &mut PublishReport,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        for update in updates {
            println!("[dry-run] {} <- {:?} ({})", update.entity_id, update.state, update.friendly_name);
        }
        return Ok(());
    }

    hub.require_credentials()?;
    let client = HubClient::new(&hub.base_url, &hub.token)?;
    client.publish_all(updates, report).await;

    Ok(())
}

/// Collapse the per-entity outcomes into the process exit signal.
fn finish(report: PublishReport) -> Result<()> {
    if report.is_clean() {
        Ok(())
    } else {
        bail!("{}", report.failure_summary());
    }
}

fn run_configure() -> Result<()> {
    let mut config = Config::load()?;

    println!("Weather provider (WeatherAPI.com)");
    config.weather.api_key = prompt_secret("API key", &config.weather.api_key)?;
    config.weather.query = Text::new("Location query (zip code or lat,lon):")
        .with_initial_value(&config.weather.query)
        .prompt()?;
    config.weather.require_daylight = Confirm::new("Require daylight for a run?")
        .with_default(config.weather.require_daylight)
        .prompt()?;

    println!("Activity API");
    config.activity.stats_url = Text::new("Athlete-stats URL:")
        .with_initial_value(&config.activity.stats_url)
        .prompt()?;
    config.activity.api_key = prompt_secret("Access token", &config.activity.api_key)?;

    println!("Home-automation hub");
    config.hub.base_url = Text::new("Hub API base URL (including /api):")
        .with_initial_value(&config.hub.base_url)
        .prompt()?;
    config.hub.token = prompt_secret("Long-lived access token", &config.hub.token)?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

fn prompt_secret(label: &str, current: &str) -> Result<String> {
    let message = if current.is_empty() {
        format!("{label}:")
    } else {
        format!("{label} (leave empty to keep the current value):")
    };

    let entered = Password::new(&message).without_confirmation().prompt()?;

    Ok(if entered.is_empty() { current.to_string() } else { entered })
}
