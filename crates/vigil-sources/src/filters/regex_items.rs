//! Transform: regex with named captures over a resource body → items.

use regex::Regex;

use vigil_core::error::{Result, VigilError};
use vigil_core::state::{Item, Payload, State};
use vigil_core::traits::Filter;

/// Runs a regex over a fetched resource body, one item per match. The
/// pattern must define a `name` capture group; `uri` and `link` groups are
/// picked up when present.
pub struct RegexItemsFilter {
    pattern: Regex,
}

impl RegexItemsFilter {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| VigilError::filter(format!("Invalid pattern: {e}")))?;
        if !pattern.capture_names().flatten().any(|n| n == "name") {
            return Err(VigilError::filter(
                "Pattern must define a 'name' capture group",
            ));
        }
        Ok(Self { pattern })
    }
}

impl Filter for RegexItemsFilter {
    fn filter(&self, state: &State) -> Result<State> {
        let Payload::Resource { body, .. } = &state.payload else {
            return Err(VigilError::FilterPayload {
                expected: "resource",
                actual: state.payload.kind(),
            });
        };
        let items = self
            .pattern
            .captures_iter(body)
            .filter_map(|caps| {
                let mut item = Item::new(caps.name("name")?.as_str());
                if let Some(uri) = caps.name("uri") {
                    item = item.with_uri(uri.as_str());
                }
                if let Some(link) = caps.name("link") {
                    item = item.with_link(link.as_str());
                }
                Some(item)
            })
            .collect();
        Ok(State::ok(Payload::Items { items }))
    }
}
