//! Form automation seam.
//!
//! The time-clock page is a label-driven dial: one control per action
//! (ENTRADA/SALIDA), a numeric keypad, and a submit key. These traits
//! capture exactly that capability surface; the WebDriver client in
//! [`crate::webdriver`] is the production implementation and tests
//! substitute scripted fakes.

use async_trait::async_trait;

use marcaje_core::Result;

/// One open form session.
#[async_trait]
pub trait FormAutomation: Send {
    /// Click the control whose visible text matches `label`.
    async fn click_control_labeled(&mut self, label: &str) -> Result<()>;

    /// Click the keypad key for each character of `seq`, in order.
    async fn enter_character_sequence(&mut self, seq: &str) -> Result<()>;

    /// Click the submit control.
    async fn submit(&mut self) -> Result<()>;

    /// Tear the session down. Best-effort; errors are the caller's to log.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens a fresh form session. One session per work item — sessions are
/// never shared across workers.
#[async_trait]
pub trait FormDriver: Send + Sync {
    async fn open(&self, url: &str) -> Result<Box<dyn FormAutomation>>;
}
