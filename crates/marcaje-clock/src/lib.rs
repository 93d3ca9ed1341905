//! # marcaje-clock
//!
//! One sign-in/out interaction against the time-clock form: derive the
//! action from local civil time, open a fresh browser session, click the
//! action control, key in the RUT, submit. The outcome contract is the
//! crate's real surface — all automation failures come back as `Err` with an
//! opaque human-readable reason.

pub mod automation;
pub mod webdriver;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};

use marcaje_core::config::ClockConfig;
use marcaje_core::{ActionKind, ClockReceipt, ClockService, Result, WorkItem};

pub use automation::{FormAutomation, FormDriver};
pub use webdriver::WebDriver;

/// Derive the action purely from civil time: hour-of-day inside the
/// configured window means clock-in, anything else clock-out. No state is
/// kept between invocations.
pub fn action_kind_at(now: DateTime<FixedOffset>, config: &ClockConfig) -> ActionKind {
    let hour = now.hour();
    if (config.clock_in_start_hour..config.clock_in_end_hour).contains(&hour) {
        ActionKind::ClockIn
    } else {
        ActionKind::ClockOut
    }
}

/// Civil-time offset of the target site.
pub fn site_offset(config: &ClockConfig) -> FixedOffset {
    let secs = config.utc_offset_hours.clamp(-14, 14) * 3600;
    FixedOffset::east_opt(secs).unwrap_or_else(|| Utc.fix())
}

/// The production [`ClockService`].
pub struct ClockAction {
    driver: Arc<dyn FormDriver>,
    config: ClockConfig,
    /// Simulate instead of driving the real form. Fixed at construction so
    /// a run can never mix simulated and real actions.
    simulate: bool,
}

impl ClockAction {
    pub fn new(driver: Arc<dyn FormDriver>, config: ClockConfig, simulate: bool) -> Self {
        Self {
            driver,
            config,
            simulate,
        }
    }
}

#[async_trait]
impl ClockService for ClockAction {
    async fn execute(&self, item: &WorkItem) -> Result<ClockReceipt> {
        let now = Utc::now().with_timezone(&site_offset(&self.config));
        let action = action_kind_at(now, &self.config);
        tracing::info!(
            "🕐 {} at {} for RUT {}",
            action,
            now.format("%H:%M:%S"),
            item.rut
        );

        if self.simulate {
            tracing::info!("🧪 Debug mode: simulating {action} for RUT {}", item.rut);
            return Ok(ClockReceipt {
                action,
                timestamp: now,
                simulated: true,
            });
        }

        let mut session = self.driver.open(&self.config.form_url).await?;

        let result = async {
            session.click_control_labeled(action.form_label()).await?;
            session.enter_character_sequence(item.rut.as_str()).await?;
            session.submit().await
        }
        .await;

        // Close regardless of how the interaction went; a close failure on
        // an already-failed item must not mask the original reason.
        let close_result = session.close().await;
        result?;
        if let Err(e) = close_result {
            tracing::warn!("⚠️ Session close failed after successful submit: {e}");
        }

        tracing::info!("✅ {action} completed for RUT {}", item.rut);
        Ok(ClockReceipt {
            action,
            timestamp: now,
            simulated: false,
        })
    }
}

/// Convenience constructor wiring the WebDriver endpoint from config.
pub fn webdriver_clock(config: &ClockConfig, simulate: bool) -> ClockAction {
    let driver = Arc::new(WebDriver::new(config.webdriver_url.clone()));
    ClockAction::new(driver, config.clone(), simulate)
}
