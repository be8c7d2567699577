use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, header};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Failure while talking to the hub's entity-state API.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("failed to reach the hub for {entity_id}: {source}")]
    Transport {
        entity_id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("hub rejected the update for {entity_id} with status {status}: {body}")]
    Rejected { entity_id: String, status: StatusCode, body: String },
}

/// Failure recorded for one planned entity update, including updates that
/// never reached the hub because their input data was missing.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("{0}")]
    MissingData(String),

    #[error(transparent)]
    Hub(#[from] HubError),
}

/// One entity-state update: boolean entities take "on"/"off", numeric
/// entities a decimal string, text entities free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityUpdate {
    pub entity_id: String,
    pub state: String,
    pub friendly_name: String,
}

impl EntityUpdate {
    pub fn boolean(entity_id: impl Into<String>, on: bool, friendly_name: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: if on { "on" } else { "off" }.to_string(),
            friendly_name: friendly_name.into(),
        }
    }

    pub fn numeric(entity_id: impl Into<String>, value: f64, friendly_name: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: format!("{value}"),
            friendly_name: friendly_name.into(),
        }
    }

    pub fn text(
        entity_id: impl Into<String>,
        state: impl Into<String>,
        friendly_name: impl Into<String>,
    ) -> Self {
        Self { entity_id: entity_id.into(), state: state.into(), friendly_name: friendly_name.into() }
    }
}

#[derive(Debug, Serialize)]
struct StatePayload<'a> {
    state: &'a str,
    attributes: StateAttributes<'a>,
}

#[derive(Debug, Serialize)]
struct StateAttributes<'a> {
    friendly_name: &'a str,
}

/// REST client for the hub's entity-state API.
#[derive(Debug, Clone)]
pub struct HubClient {
    base_url: String,
    http: Client,
}

impl HubClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();

        let mut auth_value = header::HeaderValue::from_str(&format!("Bearer {token}"))
            .context("Hub token is not a valid header value")?;
        auth_value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_value);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client for the hub")?;

        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), http })
    }

    /// Post one entity-state update. Last write wins on the hub side.
    pub async fn set_state(&self, update: &EntityUpdate) -> Result<(), HubError> {
        let url = format!("{}/states/{}", self.base_url, update.entity_id);
        let payload = StatePayload {
            state: &update.state,
            attributes: StateAttributes { friendly_name: &update.friendly_name },
        };

        let res = self.http.post(&url).json(&payload).send().await.map_err(|source| {
            HubError::Transport { entity_id: update.entity_id.clone(), source }
        })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(HubError::Rejected {
                entity_id: update.entity_id.clone(),
                status,
                body: truncate_body(&body),
            });
        }

        Ok(())
    }

    /// Post every update, best-effort: a failure is logged and recorded but
    /// never blocks the remaining updates.
    pub async fn publish_all(&self, updates: &[EntityUpdate], report: &mut PublishReport) {
        for update in updates {
            tracing::info!("Updating {}...", update.entity_id);

            match self.set_state(update).await {
                Ok(()) => {
                    tracing::info!("{} updated", update.entity_id);
                    report.record_ok(&update.entity_id);
                }
                Err(err) => {
                    tracing::error!("Error updating {}: {err}", update.entity_id);
                    report.record_failure(&update.entity_id, err.into());
                }
            }
        }
    }
}

/// Per-entity outcomes for one scheduled run, aggregated into a single
/// pass/fail signal for the process exit code.
#[derive(Debug, Default)]
pub struct PublishReport {
    results: Vec<(String, Result<(), PublishError>)>,
}

impl PublishReport {
    pub fn record_ok(&mut self, label: &str) {
        self.results.push((label.to_string(), Ok(())));
    }

    pub fn record_failure(&mut self, label: &str, error: PublishError) {
        self.results.push((label.to_string(), Err(error)));
    }

    pub fn is_clean(&self) -> bool {
        self.results.iter().all(|(_, outcome)| outcome.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &PublishError)> {
        self.results.iter().filter_map(|(label, outcome)| match outcome {
            Ok(()) => None,
            Err(err) => Some((label.as_str(), err)),
        })
    }

    /// One line per failure, for the final error message.
    pub fn failure_summary(&self) -> String {
        let lines: Vec<String> =
            self.failures().map(|(label, err)| format!("{label}: {err}")).collect();

        format!("{} of {} updates failed:\n{}", lines.len(), self.results.len(), lines.join("\n"))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_updates_map_to_on_off() {
        let on = EntityUpdate::boolean("input_boolean.runnable_5pm", true, "Runnable 5 PM");
        let off = EntityUpdate::boolean("input_boolean.runnable_5pm", false, "Runnable 5 PM");

        assert_eq!(on.state, "on");
        assert_eq!(off.state, "off");
    }

    #[test]
    fn numeric_updates_render_the_value_as_string() {
        let update =
            EntityUpdate::numeric("input_number.ytd_running_distance", 310.69, "YTD Running");

        assert_eq!(update.state, "310.69");
    }

    #[test]
    fn payload_matches_the_hub_wire_format() {
        let update = EntityUpdate::text("input_text.reason_5pm", "- It will rain.", "Reason 5 PM");
        let payload = StatePayload {
            state: &update.state,
            attributes: StateAttributes { friendly_name: &update.friendly_name },
        };

        let value = serde_json::to_value(&payload).expect("payload must serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "state": "- It will rain.",
                "attributes": {"friendly_name": "Reason 5 PM"}
            })
        );
    }

    #[test]
    fn report_is_clean_only_without_failures() {
        let mut report = PublishReport::default();
        report.record_ok("input_boolean.runnable_5pm");
        assert!(report.is_clean());

        report.record_failure(
            "input_text.reason_5pm",
            PublishError::MissingData("no forecast entry for 2024-01-02 17:00".to_string()),
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn failure_summary_names_each_failed_entity() {
        let mut report = PublishReport::default();
        report.record_ok("input_boolean.runnable_6am");
        report.record_failure(
            "input_text.reason_5pm",
            PublishError::MissingData("no forecast entry for 2024-01-02 17:00".to_string()),
        );

        let summary = report.failure_summary();
        assert!(summary.starts_with("1 of 2 updates failed"));
        assert!(summary.contains("input_text.reason_5pm"));
        assert!(summary.contains("no forecast entry"));
    }
}
