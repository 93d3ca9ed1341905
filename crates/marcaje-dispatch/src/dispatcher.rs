//! Bounded fan-out/fan-in executor.
//!
//! One task per work item: wait the allocated delay, run the clock action,
//! email the outcome, fold the result into the shared summary. A failing
//! item never touches its siblings; `run` returns only after every item has
//! produced an outcome.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use marcaje_core::config::DispatchConfig;
use marcaje_core::{ActionOutcome, ClockService, Notifier, RunSummary, WorkItem};

use crate::delay::DelayAllocator;
use crate::report;

pub struct WorkDispatcher {
    config: DispatchConfig,
    allocator: Arc<DelayAllocator>,
    clock: Arc<dyn ClockService>,
    notifier: Arc<dyn Notifier>,
}

impl WorkDispatcher {
    pub fn new(
        config: DispatchConfig,
        clock: Arc<dyn ClockService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let allocator = Arc::new(DelayAllocator::new(
            config.delay_min_minutes,
            config.delay_max_minutes,
            config.collision_attempts,
        ));
        Self {
            config,
            allocator,
            clock,
            notifier,
        }
    }

    /// Execute every item and block until the full work set has drained.
    pub async fn run(&self, items: Vec<WorkItem>) -> RunSummary {
        let total = items.len();
        let summary = Arc::new(Mutex::new(RunSummary::start(total)));
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));

        tracing::info!(
            "👥 Dispatching {total} item(s), up to {} concurrent",
            self.config.max_workers.min(total.max(1))
        );

        let mut workers = JoinSet::new();
        for item in items {
            let semaphore = semaphore.clone();
            let allocator = self.allocator.clone();
            let clock = self.clock.clone();
            let notifier = self.notifier.clone();
            let summary = summary.clone();
            let fast_path = self.config.debug_mode;

            workers.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return, // semaphore is never closed while running
                };

                if fast_path {
                    tracing::info!("🔄 Debug mode: no delay for RUT {}", item.rut);
                } else {
                    let minutes = allocator.allocate(&item);
                    tokio::time::sleep(Duration::from_secs(u64::from(minutes) * 60)).await;
                }

                let outcome = match clock.execute(&item).await {
                    Ok(receipt) => ActionOutcome::Success(receipt),
                    Err(e) => {
                        tracing::error!("❌ Item failed for RUT {}: {e}", item.rut);
                        ActionOutcome::Failure {
                            reason: e.to_string(),
                        }
                    }
                };

                // Notification failures are logged and swallowed; they never
                // change the outcome counters.
                let (subject, body) = report::notification_for(&item, &outcome);
                if let Err(e) = notifier.send(&subject, &body).await {
                    tracing::error!("📧 Could not send outcome email for RUT {}: {e}", item.rut);
                }

                let mut summary = summary
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                summary.record(&outcome);
                tracing::info!(
                    "🏁 RUT {} done ({}/{} outcomes in)",
                    item.rut,
                    summary.succeeded + summary.failed,
                    summary.total
                );
            });
        }

        // Full drain: no partial-results return, no cross-item cancellation.
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("❌ Worker task aborted: {e}");
                let mut summary = summary
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                summary.record(&ActionOutcome::Failure {
                    reason: format!("worker task aborted: {e}"),
                });
            }
        }

        let mut finished = summary
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        finished.collisions = self.allocator.collisions();
        finished.finished_at = Some(chrono::Utc::now());
        tracing::info!("🎉 Run complete: {}", report::summary_line(&finished));
        finished
    }
}
