//! # Vigil Sources
//!
//! Built-in source adapters (HTTP, local file) and content transforms
//! (JSON items, regex items, episode grouping). Each adapter implements
//! `vigil_core::Query`; each transform implements `vigil_core::Filter`.

pub mod file;
pub mod filters;
pub mod http;

pub use file::FileQuery;
pub use filters::{EpisodesFilter, JsonItemsFilter, RegexItemsFilter};
pub use http::HttpQuery;
