//! # marcaje-core
//!
//! Shared foundation for the marcaje workspace: the typed RUT identifier,
//! the run data model (work items, outcomes, summary), the TOML/env
//! configuration system, the error type, and the service traits the other
//! crates implement or consume.

pub mod config;
pub mod error;
pub mod rut;
pub mod traits;
pub mod types;

pub use config::MarcajeConfig;
pub use error::{MarcajeError, Result};
pub use rut::Rut;
pub use traits::{ClockService, IdentifierSource, Notifier};
pub use types::{ActionKind, ActionOutcome, ClockReceipt, RunSummary, WorkItem};
