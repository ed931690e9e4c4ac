//! A differ for items grouped by a secondary key.

use std::collections::HashSet;

use crate::error::{Result, VigilError};
use crate::notification::Notification;
use crate::state::{Group, Payload, State};
use crate::traits::{Differ, MergeOutcome};

use super::always::escape_html;

/// Unions group membership keyed by the group key. Tracks brand-new groups
/// and existing groups that gained members; triggers iff either is
/// non-empty. The notification separates the two.
pub struct GroupedItemsDiffer;

impl Differ for GroupedItemsDiffer {
    fn merge(&self, job_name: &str, previous: &State, current: &State) -> Result<MergeOutcome> {
        let previous_groups = groups(previous)?;
        let current_groups = groups(current)?;

        let mut all: Vec<Group> = previous_groups.to_vec();
        let mut new_groups: Vec<String> = Vec::new();
        let mut changed_groups: Vec<String> = Vec::new();

        for group in current_groups {
            match all.iter_mut().find(|g| g.key == group.key) {
                Some(existing) => {
                    let known: HashSet<String> = existing
                        .items
                        .iter()
                        .map(|i| i.identity().to_string())
                        .collect();
                    let mut gained = false;
                    for item in &group.items {
                        if !known.contains(item.identity()) {
                            existing.items.push(item.clone());
                            gained = true;
                        }
                    }
                    if gained {
                        changed_groups.push(group.key.clone());
                    }
                }
                None => {
                    all.push(group.clone());
                    new_groups.push(group.key.clone());
                }
            }
        }

        let merged = State::ok(Payload::Groups { groups: all });
        if new_groups.is_empty() && changed_groups.is_empty() {
            return Ok(MergeOutcome::unchanged(merged));
        }

        let notification = render(job_name, &new_groups, &changed_groups);
        Ok(MergeOutcome::triggered(merged, notification))
    }
}

fn groups(state: &State) -> Result<&[Group]> {
    match &state.payload {
        Payload::Groups { groups } => Ok(groups),
        other => Err(VigilError::DifferPayload {
            expected: "groups",
            actual: other.kind(),
        }),
    }
}

fn render(job_name: &str, new_groups: &[String], changed_groups: &[String]) -> Notification {
    let mut plain = String::new();
    if !new_groups.is_empty() {
        plain.push_str("New:\n");
        for key in new_groups {
            plain.push_str(&format!("\t{key}\n"));
        }
    }
    if !changed_groups.is_empty() {
        plain.push_str("Changed:\n");
        for key in changed_groups {
            plain.push_str(&format!("\t{key}\n"));
        }
    }

    let mut html = String::from("<html><body>\n");
    for (heading, keys) in [("New", new_groups), ("Changed", changed_groups)] {
        if keys.is_empty() {
            continue;
        }
        html.push_str(&format!("<h1>{heading}</h1>\n<ul>\n"));
        for key in keys {
            html.push_str(&format!("<li>{}</li>\n", escape_html(key)));
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</body></html>\n");

    Notification::new(format!(
        "Found {} new and {} changed group(s) for “{}”",
        new_groups.len(),
        changed_groups.len(),
        job_name
    ))
    .with_body("text/plain", plain)
    .with_body("text/html", html)
}
