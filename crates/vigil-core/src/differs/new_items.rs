//! A differ that unions identifiable items and reports additions.

use std::collections::HashSet;

use crate::error::{Result, VigilError};
use crate::notification::Notification;
use crate::state::{Item, Payload, State};
use crate::traits::{Differ, MergeOutcome};

use super::always::escape_html;

/// Set union keyed by derived item identity. The merged state contains every
/// item ever seen (previous order preserved, additions appended); it triggers
/// iff the union strictly grew, and the notification lists exactly the added
/// items.
pub struct NewItemsDiffer;

impl Differ for NewItemsDiffer {
    fn merge(&self, job_name: &str, previous: &State, current: &State) -> Result<MergeOutcome> {
        let previous_items = items(previous)?;
        let current_items = items(current)?;

        let mut all: Vec<Item> = previous_items.to_vec();
        let mut seen: HashSet<String> = all.iter().map(|i| i.identity().to_string()).collect();
        let mut added: Vec<Item> = Vec::new();
        for item in current_items {
            if seen.insert(item.identity().to_string()) {
                all.push(item.clone());
                added.push(item.clone());
            }
        }

        let merged = State::ok(Payload::Items { items: all });
        if added.is_empty() {
            return Ok(MergeOutcome::unchanged(merged));
        }

        let notification = render(job_name, &added);
        Ok(MergeOutcome::triggered(merged, notification))
    }
}

fn items(state: &State) -> Result<&[Item]> {
    match &state.payload {
        Payload::Items { items } => Ok(items),
        other => Err(VigilError::DifferPayload {
            expected: "items",
            actual: other.kind(),
        }),
    }
}

fn render(job_name: &str, added: &[Item]) -> Notification {
    let mut plain = String::from("New items:\n\n");
    for item in added {
        plain.push_str(&item.name);
        plain.push('\n');
        for (name, value) in &item.details {
            plain.push_str(&format!("\t{name}: {value}\n"));
        }
        if let Some(uri) = &item.uri {
            plain.push_str(&format!("\t{uri}\n"));
        }
        if let Some(link) = &item.link {
            plain.push_str(&format!("\t{link}\n"));
        }
        plain.push('\n');
    }

    let mut html = String::from("<html><body>\n<ul>\n");
    for item in added {
        html.push_str("<li>");
        match item.link.as_ref().or(item.uri.as_ref()) {
            Some(target) => html.push_str(&format!(
                "<a href=\"{}\">{}</a>",
                escape_html(target),
                escape_html(&item.name)
            )),
            None => html.push_str(&escape_html(&item.name)),
        }
        html.push_str("</li>\n");
    }
    html.push_str("</ul>\n</body></html>\n");

    Notification::new(format!(
        "Found {} new item(s) for “{}”",
        added.len(),
        job_name
    ))
    .with_body("text/plain", plain)
    .with_body("text/html", html)
}
