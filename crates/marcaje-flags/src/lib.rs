//! # marcaje-flags
//!
//! The run's [`IdentifierSource`]: a thin HTTP client against the flag
//! backend's server-side evaluation endpoint. Flags whose keys parse as
//! valid RUTs and whose values are truthy become work items; everything
//! else (meta keys, the kill switch, malformed keys, off flags) is skipped.
//!
//! The backend is an enablement list, nothing more — no streaming, no
//! events, no experimentation surface.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use marcaje_core::config::FlagsConfig;
use marcaje_core::{IdentifierSource, MarcajeError, Result, Rut, WorkItem};

/// HTTP client for the flag backend.
pub struct FlagBackend {
    client: reqwest::Client,
    base_url: String,
    sdk_key: String,
    kill_switch_key: String,
    timeout: Duration,
}

impl FlagBackend {
    pub fn new(config: &FlagsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            sdk_key: config.sdk_key.clone(),
            kill_switch_key: config.kill_switch_key.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Fetch the full flag state and reduce each flag to on/off.
    ///
    /// BTreeMap so downstream iteration order is stable: two calls against
    /// unchanged remote state yield the same work-item set in the same order.
    pub async fn all_flags(&self) -> Result<BTreeMap<String, bool>> {
        let url = format!("{}/sdk/latest-all", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", &self.sdk_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| MarcajeError::Flags(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(MarcajeError::Flags(format!(
                "backend returned status {}",
                resp.status()
            )));
        }

        let payload: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| MarcajeError::Flags(format!("invalid response body: {e}")))?;

        let flags = payload
            .get("flags")
            .and_then(|f| f.as_object())
            .ok_or_else(|| MarcajeError::Flags("response has no 'flags' object".into()))?;

        let mut state = BTreeMap::new();
        for (key, flag) in flags {
            state.insert(key.clone(), flag_is_on(flag));
        }
        Ok(state)
    }
}

/// Reduce one flag object to a boolean. The backend serves `on` plus
/// variation metadata; a bare boolean value is accepted too.
fn flag_is_on(flag: &serde_json::Value) -> bool {
    match flag {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Object(obj) => obj.get("on").and_then(|v| v.as_bool()).unwrap_or(false),
        _ => false,
    }
}

#[async_trait]
impl IdentifierSource for FlagBackend {
    /// Backend failures yield an empty list and a logged error — "nothing to
    /// do", never fatal.
    async fn list_enabled(&self) -> Vec<WorkItem> {
        let flags = match self.all_flags().await {
            Ok(flags) => flags,
            Err(e) => {
                tracing::error!("❌ Could not fetch flag state: {e}");
                return Vec::new();
            }
        };
        tracing::info!("🏳️ Flag backend returned {} flag(s)", flags.len());

        let mut items = Vec::new();
        for (key, on) in flags {
            if key.starts_with('$') || key == self.kill_switch_key {
                continue;
            }
            let Ok(rut) = Rut::parse(&key) else {
                tracing::debug!("Skipping non-RUT flag key: {key}");
                continue;
            };
            if !on {
                tracing::debug!("RUT {rut} is disabled");
                continue;
            }
            tracing::info!("✅ Enabled RUT: {rut}");
            items.push(WorkItem::new(rut));
        }

        tracing::info!("📋 {} enabled work item(s)", items.len());
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> FlagBackend {
        let config = FlagsConfig {
            sdk_key: "sdk-test".into(),
            base_url: server.uri(),
            ..FlagsConfig::default()
        };
        FlagBackend::new(&config)
    }

    fn flag_payload() -> serde_json::Value {
        serde_json::json!({
            "flags": {
                "12345678": { "on": true, "version": 7 },
                "87654321": { "on": false, "version": 3 },
                "1234567k": { "on": true, "version": 1 },
                "CLOCK_IN_ACTIVE": { "on": true, "version": 2 },
                "$valid": { "on": true },
                "not-a-rut": { "on": true }
            }
        })
    }

    #[tokio::test]
    async fn test_filters_to_enabled_valid_ruts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sdk/latest-all"))
            .and(header("Authorization", "sdk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(flag_payload()))
            .mount(&server)
            .await;

        let items = backend_for(&server).list_enabled().await;
        let ruts: Vec<&str> = items.iter().map(|i| i.rut.as_str()).collect();
        assert_eq!(ruts, vec!["12345678", "1234567k"]);
    }

    #[tokio::test]
    async fn test_unchanged_state_is_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sdk/latest-all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(flag_payload()))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let first = backend.list_enabled().await;
        let second = backend.list_enabled().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_auth_error_yields_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sdk/latest-all"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        assert!(backend_for(&server).list_enabled().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_yields_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sdk/latest-all"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        assert!(backend_for(&server).list_enabled().await.is_empty());
    }

    #[tokio::test]
    async fn test_all_flags_surfaces_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sdk/latest-all"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = backend_for(&server).all_flags().await.unwrap_err();
        assert!(matches!(err, MarcajeError::Flags(_)));
    }

    #[test]
    fn test_flag_is_on_accepts_bare_booleans() {
        assert!(flag_is_on(&serde_json::json!(true)));
        assert!(!flag_is_on(&serde_json::json!(false)));
        assert!(!flag_is_on(&serde_json::json!("yes")));
    }
}
