//! Run data model — work items, per-item outcomes, and the run summary.
//!
//! Everything here lives and dies within a single run invocation; nothing is
//! persisted across runs.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::rut::Rut;

/// One unit of work: sign one identifier in or out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// The identifier to enter on the time-clock keypad.
    pub rut: Rut,
    /// Optional locale/location metadata carried from the flag backend.
    pub location_hint: Option<String>,
}

impl WorkItem {
    pub fn new(rut: Rut) -> Self {
        Self {
            rut,
            location_hint: None,
        }
    }

    pub fn with_location(rut: Rut, hint: impl Into<String>) -> Self {
        Self {
            rut,
            location_hint: Some(hint.into()),
        }
    }
}

/// Which of the two mutually exclusive form actions applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    ClockIn,
    ClockOut,
}

impl ActionKind {
    /// Visible label of the form control for this action.
    pub fn form_label(&self) -> &'static str {
        match self {
            ActionKind::ClockIn => "ENTRADA",
            ActionKind::ClockOut => "SALIDA",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.form_label())
    }
}

/// Proof of one completed clock action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReceipt {
    pub action: ActionKind,
    /// Civil time at the target site when the action completed.
    pub timestamp: DateTime<FixedOffset>,
    /// True when debug mode skipped the real form and simulated the action.
    pub simulated: bool,
}

/// Terminal result of one work item. Produced exactly once per item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Success(ClockReceipt),
    Failure { reason: String },
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success(_))
    }
}

/// Aggregated counters for one run. Mutated only by the dispatcher's
/// completion handler, finalized once every item has an outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Delay draws that collided after the attempt cap was exhausted.
    pub collisions: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn start(total: usize) -> Self {
        Self {
            total,
            succeeded: 0,
            failed: 0,
            collisions: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Fold one outcome into the counters.
    pub fn record(&mut self, outcome: &ActionOutcome) {
        match outcome {
            ActionOutcome::Success(_) => self.succeeded += 1,
            ActionOutcome::Failure { .. } => self.failed += 1,
        }
    }

    /// All submitted items have produced an outcome.
    pub fn is_drained(&self) -> bool {
        self.succeeded + self.failed == self.total
    }
}
