//! A differ that fires on every successful poll.

use crate::error::Result;
use crate::notification::Notification;
use crate::state::{Payload, State};
use crate::traits::{Differ, MergeOutcome};

/// Keeps only the current observation and always triggers. Useful for
/// sources where every successful poll is worth reporting.
pub struct AlwaysDiffer;

impl Differ for AlwaysDiffer {
    fn merge(&self, job_name: &str, _previous: &State, current: &State) -> Result<MergeOutcome> {
        let body = match &current.payload {
            Payload::Text { content } => content.clone(),
            Payload::Resource { url, .. } => format!("Fetched {url}."),
            other => format!("Observed a {} payload.", other.kind()),
        };
        let notification = Notification::new(format!("“{job_name}” was polled"))
            .with_body("text/plain", body.clone())
            .with_body("text/html", format!("<div>{}</div>", escape_html(&body)));
        Ok(MergeOutcome::triggered(current.clone(), notification))
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
