//! Job runner — the per-firing procedure.
//!
//! query → filter pipeline → fail accounting or diff → persist → notify.
//! Query and filter failures are recovered locally; differ and notifier
//! errors propagate to the schedule boundary, where they are logged without
//! unscheduling the job.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use vigil_core::error::Result;
use vigil_core::state::State;

use crate::job::Job;
use crate::store::{Slot, StateStore};

/// What one firing did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Whether the differ detected notable change.
    pub triggered: bool,
    /// Filters whose effect was discarded during this run.
    pub transform_failures: u32,
}

/// Executes one job. Owned by the job's schedule task; the scheduler
/// guarantees firings of the same job never overlap.
pub struct JobRunner {
    job: Job,
    store: Arc<StateStore>,
    transform_failures_total: AtomicU64,
}

impl JobRunner {
    pub fn new(job: Job, store: Arc<StateStore>) -> Self {
        Self {
            job,
            store,
            transform_failures_total: AtomicU64::new(0),
        }
    }

    pub fn job_name(&self) -> &str {
        &self.job.name
    }

    /// Filters whose effect was discarded over the lifetime of this runner.
    pub fn transform_failures_total(&self) -> u64 {
        self.transform_failures_total.load(Ordering::Relaxed)
    }

    /// Run one firing to completion.
    pub async fn run_once(&self) -> Result<RunReport> {
        let name = &self.job.name;
        tracing::debug!("Running query for job '{}'", name);
        let mut state = match self.job.query.query().await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("⚠️ Query for job '{}' failed: {e}", name);
                State::failed(e)
            }
        };

        let mut transform_failures = 0u32;
        for filter in &self.job.filters {
            if !state.success {
                break;
            }
            match filter.filter(&state) {
                Ok(next) => state = next,
                Err(e) => {
                    // Discard this filter's effect, keep the pipeline going.
                    transform_failures += 1;
                    tracing::warn!("⚠️ Filter failed for job '{}': {e}", name);
                }
            }
        }
        if transform_failures > 0 {
            self.transform_failures_total
                .fetch_add(u64::from(transform_failures), Ordering::Relaxed);
        }

        if !state.success {
            let previous_failures = self
                .store
                .load(name, Slot::LastAttempt)
                .map(|p| p.fail_count)
                .unwrap_or(0);
            state.fail_count = previous_failures + 1;
            tracing::info!(
                "Job '{}' failed ({} consecutive failure(s))",
                name,
                state.fail_count
            );
            self.persist(&state);
            return Ok(RunReport {
                triggered: false,
                transform_failures,
            });
        }

        let Some(previous) = self.store.load(name, Slot::LastSuccess) else {
            // First-ever success: nothing to diff against, so no notification.
            tracing::info!("First successful poll for job '{}'", name);
            self.persist(&state);
            return Ok(RunReport {
                triggered: false,
                transform_failures,
            });
        };

        let outcome = self.job.differ.merge(name, &previous, &state)?;
        self.persist(&outcome.state);
        if outcome.triggered {
            tracing::info!("🔔 Job '{}' triggered, notifying", name);
            if let Some(notification) = &outcome.notification {
                self.job.notifier.notify(name, notification).await?;
            }
        }
        Ok(RunReport {
            triggered: outcome.triggered,
            transform_failures,
        })
    }

    /// Persistence failures never interrupt the flow; the prior on-disk
    /// record stays intact.
    fn persist(&self, state: &State) {
        if let Err(e) = self.store.save(&self.job.name, state) {
            tracing::warn!("⚠️ Failed to save state for job '{}': {e}", self.job.name);
        }
    }
}
