//! # Vigil Core
//!
//! Data model and component seams for the Vigil change monitor.
//!
//! ## Architecture
//! ```text
//! Query (source adapter)
//!   └── State { timestamp, success, empty, fail_count, payload }
//!         └── Filter pipeline (best-effort State → State)
//!               └── Differ.merge(previous success, current)
//!                     ├── merged State (union of knowledge)
//!                     ├── triggered?
//!                     └── Notification { summary, content-type → body }
//!                           └── Notifier
//! ```
//!
//! The scheduling engine, runner, and durable store live in
//! `vigil-scheduler`; concrete adapters and channels live in `vigil-sources`
//! and `vigil-channels`.

pub mod config;
pub mod differs;
pub mod error;
pub mod notification;
pub mod state;
pub mod traits;

pub use config::{EmailConfig, VigilConfig};
pub use differs::{AlwaysDiffer, GroupedItemsDiffer, NewItemsDiffer, ScalarChangeDiffer};
pub use error::{Result, VigilError};
pub use notification::Notification;
pub use state::{Group, Item, Payload, State};
pub use traits::{Differ, Filter, MergeOutcome, Notifier, Query};
