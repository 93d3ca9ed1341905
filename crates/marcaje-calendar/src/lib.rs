//! # marcaje-calendar
//!
//! The calendar gate: is today a non-working day? Asks the remote holiday
//! API first, falls back to the bundled table, and when both are silent the
//! `fail_open` knob decides between "prefer to run" and "prefer to skip".

pub mod table;

use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

use marcaje_core::config::CalendarConfig;
use marcaje_core::{MarcajeError, Result};

pub use table::{CHILE_HOLIDAYS_2025, Holiday};

/// Where a holiday hit came from, for the notification body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidaySource {
    Api,
    LocalTable,
}

impl std::fmt::Display for HolidaySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HolidaySource::Api => write!(f, "API en línea"),
            HolidaySource::LocalTable => write!(f, "Lista local (API no disponible)"),
        }
    }
}

/// Outcome of one calendar check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    WorkingDay,
    Holiday {
        holiday: Holiday,
        source: HolidaySource,
    },
    /// The API failed and the local table has no entry for the date.
    Unknown,
}

/// Remote API response shape: `{"status": "success", "data": [...]}`.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    data: Vec<ApiHoliday>,
}

#[derive(Debug, Deserialize)]
struct ApiHoliday {
    date: String,
    title: String,
    #[serde(rename = "type", default)]
    kind: String,
}

/// Holiday calendar gate.
pub struct CalendarGate {
    client: reqwest::Client,
    api_url: String,
    timeout: Duration,
    fail_open: bool,
}

impl CalendarGate {
    pub fn new(config: &CalendarConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            fail_open: config.fail_open,
        }
    }

    /// Decide whether `date` is a holiday, preferring the remote API.
    pub async fn holiday_on(&self, date: NaiveDate) -> GateDecision {
        match self.fetch_remote(date).await {
            Ok(Some(holiday)) => {
                tracing::info!("🎉 Holiday today ({}): {}", holiday.date, holiday.title);
                return GateDecision::Holiday {
                    holiday,
                    source: HolidaySource::Api,
                };
            }
            Ok(None) => {
                tracing::info!("📅 {date} is not a holiday (per API)");
                return GateDecision::WorkingDay;
            }
            Err(e) => {
                tracing::warn!("⚠️ Holiday API unavailable: {e}, checking local table");
            }
        }

        match table::lookup(date) {
            Some(holiday) => {
                tracing::info!("🎉 Holiday today (local table): {}", holiday.title);
                GateDecision::Holiday {
                    holiday,
                    source: HolidaySource::LocalTable,
                }
            }
            None => GateDecision::Unknown,
        }
    }

    /// Reduce the decision to the gate's yes/no. `Unknown` resolves through
    /// the fail-open knob: open means "treat as working day, run anyway".
    pub async fn is_non_working_day(&self, date: NaiveDate) -> bool {
        match self.holiday_on(date).await {
            GateDecision::Holiday { .. } => true,
            GateDecision::WorkingDay => false,
            GateDecision::Unknown => {
                if self.fail_open {
                    tracing::warn!("⚠️ No calendar source available, failing open (run proceeds)");
                    false
                } else {
                    tracing::warn!("⚠️ No calendar source available, failing closed (run skipped)");
                    true
                }
            }
        }
    }

    async fn fetch_remote(&self, date: NaiveDate) -> Result<Option<Holiday>> {
        let resp = self
            .client
            .get(&self.api_url)
            .header("accept", "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| MarcajeError::Calendar(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(MarcajeError::Calendar(format!(
                "API returned status {}",
                resp.status()
            )));
        }

        let body: ApiResponse = resp
            .json()
            .await
            .map_err(|e| MarcajeError::Calendar(format!("invalid response body: {e}")))?;

        if body.status != "success" {
            return Err(MarcajeError::Calendar(format!(
                "API returned non-success status: {}",
                body.status
            )));
        }

        let wanted = date.format("%Y-%m-%d").to_string();
        Ok(body.data.into_iter().find(|h| h.date == wanted).map(|h| Holiday {
            date,
            title: h.title,
            kind: h.kind,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn gate_for(uri: &str, fail_open: bool) -> CalendarGate {
        CalendarGate::new(&CalendarConfig {
            api_url: format!("{uri}/holidays.json"),
            timeout_secs: 2,
            fail_open,
        })
    }

    /// A gate whose API endpoint does not exist, forcing the local table.
    fn offline_gate(fail_open: bool) -> CalendarGate {
        gate_for("http://127.0.0.1:1", fail_open)
    }

    #[tokio::test]
    async fn test_local_table_independence_day() {
        assert!(offline_gate(true).is_non_working_day(date("2025-09-18")).await);
    }

    #[tokio::test]
    async fn test_local_table_ordinary_day() {
        // API down + no table entry + fail_open => working day
        assert!(!offline_gate(true).is_non_working_day(date("2025-09-17")).await);
    }

    #[tokio::test]
    async fn test_fail_closed_skips_unknown_day() {
        assert!(offline_gate(false).is_non_working_day(date("2025-09-17")).await);
    }

    #[tokio::test]
    async fn test_api_served_holiday() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/holidays.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": [
                    { "date": "2025-06-20", "title": "Día Nacional de los Pueblos Indígenas", "type": "Civil" }
                ]
            })))
            .mount(&server)
            .await;

        let gate = gate_for(&server.uri(), true);
        let decision = gate.holiday_on(date("2025-06-20")).await;
        assert!(matches!(
            decision,
            GateDecision::Holiday { source: HolidaySource::Api, .. }
        ));
    }

    #[tokio::test]
    async fn test_api_working_day_skips_local_table() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/holidays.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": []
            })))
            .mount(&server)
            .await;

        // 2025-09-18 is in the local table, but a healthy API saying
        // "no holiday" wins.
        let gate = gate_for(&server.uri(), true);
        assert_eq!(gate.holiday_on(date("2025-09-18")).await, GateDecision::WorkingDay);
    }

    #[tokio::test]
    async fn test_non_success_status_falls_back_to_table() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/holidays.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "data": []
            })))
            .mount(&server)
            .await;

        let gate = gate_for(&server.uri(), true);
        let decision = gate.holiday_on(date("2025-09-18")).await;
        assert!(matches!(
            decision,
            GateDecision::Holiday { source: HolidaySource::LocalTable, .. }
        ));
    }
}
