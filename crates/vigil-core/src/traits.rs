//! Component seams: sources, transforms, differs, and notifiers.
//!
//! A job binds one Query, an ordered Filter pipeline, one Differ, and one
//! Notifier. The runner owns the error discipline: Query and Filter errors
//! are recovered locally, Differ and Notifier errors propagate to the
//! schedule boundary.

use async_trait::async_trait;

use crate::error::Result;
use crate::notification::Notification;
use crate::state::State;

/// A source adapter: produces a fresh observation from no mutable context.
#[async_trait]
pub trait Query: Send + Sync {
    async fn query(&self) -> Result<State>;
}

/// One best-effort content-shaping step, applied after retrieval. Filters
/// only ever see successful states.
pub trait Filter: Send + Sync {
    fn filter(&self, state: &State) -> Result<State>;
}

/// The result of merging the previous successful observation with the
/// current one. `state` is the union of knowledge (everything ever seen, not
/// just the latest page); `triggered` reflects only this merge; the
/// notification, present iff triggered, describes the new or changed portion
/// only.
#[derive(Debug)]
pub struct MergeOutcome {
    pub state: State,
    pub triggered: bool,
    pub notification: Option<Notification>,
}

impl MergeOutcome {
    /// A merge that found nothing new.
    pub fn unchanged(state: State) -> Self {
        Self {
            state,
            triggered: false,
            notification: None,
        }
    }

    /// A merge that detected notable change.
    pub fn triggered(state: State, notification: Notification) -> Self {
        Self {
            state,
            triggered: true,
            notification: Some(notification),
        }
    }
}

/// Compares two successful observations and decides whether notable change
/// occurred. Both inputs are guaranteed successful by the runner. Everything
/// is returned in one call so no hidden instance state survives between
/// polls.
pub trait Differ: Send + Sync {
    fn merge(&self, job_name: &str, previous: &State, current: &State) -> Result<MergeOutcome>;
}

/// Delivers a notification. Implementations bound their own I/O; the core
/// imposes no timeout.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, job_name: &str, notification: &Notification) -> Result<()>;
}
