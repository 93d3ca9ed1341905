//! # marcaje-dispatch
//!
//! The run engine: fans one clock action per work item out over a bounded
//! set of tokio workers, each preceded by its own randomized delay, and
//! folds every outcome into a single run summary.
//!
//! ```text
//! items ──▶ WorkDispatcher (semaphore, max_workers)
//!             ├── task: DelayAllocator → sleep → ClockService → Notifier
//!             ├── task: ...
//!             └── drain barrier → RunSummary
//! ```

pub mod delay;
pub mod dispatcher;
pub mod report;

pub use delay::{DelayAllocator, DelayAssignment};
pub use dispatcher::WorkDispatcher;
