//! Transform: flat item collection → items grouped by a key in their names.

use regex::Regex;

use vigil_core::error::{Result, VigilError};
use vigil_core::state::{Group, Payload, State};
use vigil_core::traits::Filter;

/// Groups items by a key extracted from each item name with a regex — the
/// first capture group if the pattern has one, otherwise the whole match
/// (e.g. `S\d{2}E\d{2}` for episode numbering). Items whose names do not
/// match are dropped with a warning. Groups keep first-seen order.
pub struct EpisodesFilter {
    key_pattern: Regex,
}

impl EpisodesFilter {
    pub fn new(key_pattern: &str) -> Result<Self> {
        let key_pattern = Regex::new(key_pattern)
            .map_err(|e| VigilError::filter(format!("Invalid key pattern: {e}")))?;
        Ok(Self { key_pattern })
    }

    fn key_of(&self, name: &str) -> Option<String> {
        let caps = self.key_pattern.captures(name)?;
        let m = caps.get(1).or_else(|| caps.get(0))?;
        Some(m.as_str().to_string())
    }
}

impl Filter for EpisodesFilter {
    fn filter(&self, state: &State) -> Result<State> {
        let Payload::Items { items } = &state.payload else {
            return Err(VigilError::FilterPayload {
                expected: "items",
                actual: state.payload.kind(),
            });
        };
        let mut groups: Vec<Group> = Vec::new();
        for item in items {
            let Some(key) = self.key_of(&item.name) else {
                tracing::warn!("⚠️ No grouping key in '{}', dropping it", item.name);
                continue;
            };
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => group.items.push(item.clone()),
                None => {
                    let mut group = Group::new(key);
                    group.items.push(item.clone());
                    groups.push(group);
                }
            }
        }
        Ok(State::ok(Payload::Groups { groups }))
    }
}
