//! Notification — the renderable outcome of a detected change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A notification to deliver: a one-line summary plus one body per content
/// type. "text/plain" is always populated; richer channels may prefer
/// "text/html" when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub summary: String,
    pub bodies: BTreeMap<String, String>,
}

impl Notification {
    /// Create a notification. The summary doubles as the initial plain-text
    /// body so the "text/plain" guarantee holds even for minimal differs.
    pub fn new(summary: impl Into<String>) -> Self {
        let summary = summary.into();
        let mut bodies = BTreeMap::new();
        bodies.insert("text/plain".to_string(), summary.clone());
        Self { summary, bodies }
    }

    pub fn with_body(mut self, content_type: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(content_type.into(), body.into());
        self
    }

    pub fn plain_text(&self) -> &str {
        self.bodies
            .get("text/plain")
            .map(String::as_str)
            .unwrap_or(&self.summary)
    }

    pub fn html(&self) -> Option<&str> {
        self.bodies.get("text/html").map(String::as_str)
    }
}
