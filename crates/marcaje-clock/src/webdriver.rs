//! WebDriver-backed form automation (fantoccini).
//!
//! The target page exposes no ids or names, so every control is located by
//! scanning candidate elements for a visible-text match, the same way a
//! human reads the dial.

use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};

use marcaje_core::{MarcajeError, Result};

use crate::automation::{FormAutomation, FormDriver};

/// Candidate selector for action controls.
const ACTION_CANDIDATES: &str = "button, div, span, li";
/// Keypad keys.
const KEYPAD_KEYS: &str = "li.digits";
/// Submit control candidates and label.
const SUBMIT_CANDIDATES: &str = "li.pad-action.digits";
const SUBMIT_LABEL: &str = "ENVIAR";

/// Pause between keypad clicks; the dial animates and drops fast input.
const KEY_PAUSE: Duration = Duration::from_millis(300);
/// Settle time after navigation and after switching form panels.
const PANEL_PAUSE: Duration = Duration::from_secs(2);

/// Factory for WebDriver sessions against a chromedriver endpoint.
pub struct WebDriver {
    webdriver_url: String,
}

impl WebDriver {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
        }
    }

    fn capabilities() -> serde_json::Map<String, serde_json::Value> {
        let mut caps = serde_json::Map::new();
        caps.insert(
            "goog:chromeOptions".into(),
            serde_json::json!({
                "args": [
                    "--headless=new",
                    "--no-sandbox",
                    "--disable-dev-shm-usage",
                    "--disable-gpu",
                    "--window-size=1920,1080",
                    "--disable-geolocation",
                ],
                "prefs": {
                    "profile.default_content_setting_values.geolocation": 2,
                    "profile.managed_default_content_settings.geolocation": 2
                }
            }),
        );
        caps
    }
}

#[async_trait]
impl FormDriver for WebDriver {
    async fn open(&self, url: &str) -> Result<Box<dyn FormAutomation>> {
        let client = ClientBuilder::native()
            .capabilities(Self::capabilities())
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| MarcajeError::Automation(format!("WebDriver connect: {e}")))?;

        tracing::info!("🌐 Loading form page");
        client
            .goto(url)
            .await
            .map_err(|e| MarcajeError::Automation(format!("page load: {e}")))?;
        tokio::time::sleep(PANEL_PAUSE).await;

        Ok(Box::new(WebDriverForm { client }))
    }
}

/// One live browser session on the form page.
pub struct WebDriverForm {
    client: Client,
}

impl WebDriverForm {
    /// Find the first element under `selector` whose trimmed visible text
    /// equals `label` (case-insensitive) and click it.
    async fn click_by_text(&mut self, selector: &str, label: &str) -> Result<bool> {
        let candidates = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| MarcajeError::Automation(format!("element scan: {e}")))?;

        for element in candidates {
            let text = element.text().await.unwrap_or_default();
            if text.trim().eq_ignore_ascii_case(label) {
                element
                    .click()
                    .await
                    .map_err(|e| MarcajeError::Automation(format!("click '{label}': {e}")))?;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[async_trait]
impl FormAutomation for WebDriverForm {
    async fn click_control_labeled(&mut self, label: &str) -> Result<()> {
        tracing::info!("🔘 Looking for control '{label}'");
        if !self.click_by_text(ACTION_CANDIDATES, label).await? {
            return Err(MarcajeError::Automation(format!(
                "control labeled '{label}' not found"
            )));
        }
        tokio::time::sleep(PANEL_PAUSE).await;
        Ok(())
    }

    async fn enter_character_sequence(&mut self, seq: &str) -> Result<()> {
        tracing::info!("🔢 Entering {} keypad character(s)", seq.len());
        for ch in seq.chars() {
            let key = ch.to_string();
            if !self.click_by_text(KEYPAD_KEYS, &key).await? {
                return Err(MarcajeError::Automation(format!(
                    "keypad key '{ch}' not found"
                )));
            }
            tokio::time::sleep(KEY_PAUSE).await;
        }
        Ok(())
    }

    async fn submit(&mut self) -> Result<()> {
        tracing::info!("📤 Submitting form");
        if !self.click_by_text(SUBMIT_CANDIDATES, SUBMIT_LABEL).await? {
            return Err(MarcajeError::Automation("submit control not found".into()));
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.client
            .close()
            .await
            .map_err(|e| MarcajeError::Automation(format!("session close: {e}")))?;
        tracing::info!("🌐 Browser session closed");
        Ok(())
    }
}
