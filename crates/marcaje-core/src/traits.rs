//! Service traits — the seams between the run flow and its collaborators.
//!
//! Each trait has one production implementation elsewhere in the workspace
//! and is substitutable with a fake in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ClockReceipt, WorkItem};

/// Resolves the set of work items enabled for this run.
///
/// Backed by the remote flag backend. A backend failure is "nothing to do",
/// never fatal: implementations log the error and return an empty list.
#[async_trait]
pub trait IdentifierSource: Send + Sync {
    async fn list_enabled(&self) -> Vec<WorkItem>;
}

/// Performs one sign-in/out interaction against the time-clock form.
///
/// The single Result-returning action: all automation failures (missing
/// control, dead session, network) surface as `Err` for the dispatcher to
/// fold into a per-item failure outcome.
#[async_trait]
pub trait ClockService: Send + Sync {
    async fn execute(&self, item: &WorkItem) -> Result<ClockReceipt>;
}

/// Sends an outcome notification to the operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<()>;
}
