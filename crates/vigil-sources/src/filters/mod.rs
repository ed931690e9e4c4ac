//! Content transforms: each takes an observed State and reshapes its payload.

pub mod episodes;
pub mod json_items;
pub mod regex_items;

pub use episodes::EpisodesFilter;
pub use json_items::JsonItemsFilter;
pub use regex_items::RegexItemsFilter;
