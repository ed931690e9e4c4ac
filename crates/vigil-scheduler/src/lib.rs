//! # Vigil Scheduler
//!
//! Runs configured jobs on independent fixed-delay schedules: the engine
//! owns one tokio task per job, the runner executes a single firing
//! (query → filters → diff → persist → notify), and the store keeps one
//! pair of JSON records per job so cadence and diff baselines survive
//! restarts. Job definitions are JSON files resolved through an explicit
//! component registry and kept in sync by a directory watcher.

pub mod engine;
pub mod job;
pub mod loader;
pub mod runner;
pub mod store;
pub mod watcher;

pub use engine::{Engine, initial_delay};
pub use job::{Job, MINIMUM_INTERVAL};
pub use loader::{
    ComponentDescriptor, JobDefinition, Parameter, Parameters, Registry, load_definition,
};
pub use runner::{JobRunner, RunReport};
pub use store::{Slot, StateStore};
pub use watcher::JobDirectoryWatcher;
