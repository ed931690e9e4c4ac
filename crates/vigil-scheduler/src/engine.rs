//! Scheduler engine — one independently timed, fixed-delay schedule per job.
//!
//! Each registered job gets its own tokio task: sleep, run, sleep again. The
//! delay is measured from end-of-execution to next-start, so a slow poll
//! pushes its own next firing back and firings of the same job never
//! overlap. Different jobs run fully in parallel; the only shared mutable
//! resource is the state store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Notify;

use crate::job::Job;
use crate::runner::JobRunner;
use crate::store::{Slot, StateStore};

struct ScheduleHandle {
    cancelled: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

/// The scheduler engine — owns one schedule per registered job.
pub struct Engine {
    store: Arc<StateStore>,
    schedules: Mutex<HashMap<String, ScheduleHandle>>,
}

impl Engine {
    pub fn new(store: Arc<StateStore>) -> Self {
        Self {
            store,
            schedules: Mutex::new(HashMap::new()),
        }
    }

    /// Schedule a job. The first firing realigns to the persisted cadence:
    /// `max(0, last_attempt + interval - now)`, so a fresh job fires
    /// immediately and a restarted process does not wait a full extra
    /// interval. Re-registering a name replaces the old schedule.
    pub fn register(&self, job: Job) {
        let last_attempt = self
            .store
            .load(&job.name, Slot::LastAttempt)
            .map(|state| state.timestamp);
        let initial = initial_delay(last_attempt, job.interval, Utc::now());
        let interval = job.interval;
        tracing::info!(
            "📅 Job registered: '{}' (first firing in {}s, then every {}s)",
            job.name,
            initial.as_secs(),
            interval.as_secs()
        );

        let cancelled = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());
        let name = job.name.clone();
        let runner = JobRunner::new(job, self.store.clone());

        // Displace any existing schedule and install the new handle under one
        // lock, so no concurrent register/deregister can observe the map
        // between the two steps and strand a live handle.
        {
            let mut schedules = self.schedules.lock().unwrap();
            let displaced = schedules.insert(
                name,
                ScheduleHandle {
                    cancelled: cancelled.clone(),
                    wake: wake.clone(),
                },
            );
            if let Some(old) = displaced {
                old.cancelled.store(true, Ordering::SeqCst);
                old.wake.notify_waiters();
            }
        }

        let task_cancelled = cancelled;
        let task_wake = wake;
        tokio::spawn(async move {
            let mut delay = initial;
            loop {
                // Displacement can happen before this task first awaits.
                if task_cancelled.load(Ordering::SeqCst) {
                    break;
                }
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = task_wake.notified() => {}
                }
                if task_cancelled.load(Ordering::SeqCst) {
                    break;
                }
                // Differ/notifier errors surface here; the schedule survives
                // them, that firing's notification is lost.
                if let Err(e) = runner.run_once().await {
                    tracing::warn!("⚠️ Job '{}' run failed: {e}", runner.job_name());
                }
                if task_cancelled.load(Ordering::SeqCst) {
                    break;
                }
                delay = interval;
            }
            tracing::debug!("Schedule for job '{}' ended", runner.job_name());
        });
    }

    /// Cancel a job's schedule. Future firings stop; an in-flight execution
    /// finishes uninterrupted. Returns whether a schedule existed.
    pub fn deregister(&self, name: &str) -> bool {
        let handle = self.schedules.lock().unwrap().remove(name);
        match handle {
            Some(handle) => {
                handle.cancelled.store(true, Ordering::SeqCst);
                handle.wake.notify_waiters();
                tracing::info!("Job deregistered: '{name}'");
                true
            }
            None => false,
        }
    }
}

/// Delay until a job's first firing, realigned to its persisted cadence.
/// Without a last attempt the job is immediately due.
pub fn initial_delay(
    last_attempt: Option<DateTime<Utc>>,
    interval: Duration,
    now: DateTime<Utc>,
) -> Duration {
    let last_millis = last_attempt.map(|t| t.timestamp_millis()).unwrap_or(0);
    let interval_millis = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);
    let due = last_millis.saturating_add(interval_millis);
    let wait = due - now.timestamp_millis();
    if wait <= 0 {
        Duration::ZERO
    } else {
        Duration::from_millis(wait as u64)
    }
}
