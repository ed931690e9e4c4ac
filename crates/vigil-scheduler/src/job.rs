//! Job — one configured monitoring task.

use std::time::Duration;

use vigil_core::traits::{Differ, Filter, Notifier, Query};

/// Smallest allowed poll interval. Definitions below it are clamped at load.
pub const MINIMUM_INTERVAL: Duration = Duration::from_secs(60);

/// A source, its transform pipeline, a change policy, and a delivery
/// channel, polled at a fixed delay. Immutable: changing a job means
/// re-registering a replacement under the same name.
pub struct Job {
    /// Unique within one engine.
    pub name: String,
    /// Fixed delay between the end of one firing and the start of the next.
    pub interval: Duration,
    pub query: Box<dyn Query>,
    pub filters: Vec<Box<dyn Filter>>,
    pub differ: Box<dyn Differ>,
    pub notifier: Box<dyn Notifier>,
}

impl Job {
    pub fn new(
        name: impl Into<String>,
        interval: Duration,
        query: Box<dyn Query>,
        differ: Box<dyn Differ>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            name: name.into(),
            interval,
            query,
            filters: Vec::new(),
            differ,
            notifier,
        }
    }

    pub fn with_filter(mut self, filter: Box<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("filters", &self.filters.len())
            .finish_non_exhaustive()
    }
}
