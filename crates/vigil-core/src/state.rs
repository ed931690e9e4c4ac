//! State — one timestamped observation of a monitored source.
//!
//! A State is immutable once built. The payload is a closed tagged union so
//! differs can pattern-match exhaustively; the serde tag doubles as the type
//! discriminator in the persisted record.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation: successful or failed, possibly empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    /// When this observation was made.
    pub timestamp: DateTime<Utc>,
    /// Whether the poll succeeded.
    pub success: bool,
    /// Whether the payload carries no content.
    pub empty: bool,
    /// Consecutive unsuccessful polls up to and including this one.
    /// Only meaningful when `success` is false; the job runner sets it.
    pub fail_count: u32,
    /// Failure cause, when `success` is false.
    #[serde(default)]
    pub error: Option<String>,
    /// The observed content.
    pub payload: Payload,
}

impl State {
    /// A successful observation. Emptiness is derived from the payload.
    pub fn ok(payload: Payload) -> Self {
        Self {
            timestamp: Utc::now(),
            success: true,
            empty: payload.is_empty(),
            fail_count: 0,
            error: None,
            payload,
        }
    }

    /// A failed observation carrying its cause. Failed states hold no
    /// trustworthy payload.
    pub fn failed(cause: impl std::fmt::Display) -> Self {
        Self {
            timestamp: Utc::now(),
            success: false,
            empty: true,
            fail_count: 0,
            error: Some(cause.to_string()),
            payload: Payload::None,
        }
    }

    pub fn with_fail_count(mut self, fail_count: u32) -> Self {
        self.fail_count = fail_count;
        self
    }
}

/// The observed content of a State — a closed set of payload shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// No content (failed states).
    None,
    /// Plain text.
    Text { content: String },
    /// A raw fetched resource, before any transform runs.
    Resource {
        url: String,
        content_type: String,
        body: String,
    },
    /// Scalar facts about a local file.
    FileInfo {
        exists: bool,
        size: u64,
        modified_secs: i64,
    },
    /// A collection of identifiable items.
    Items { items: Vec<Item> },
    /// Items grouped by a secondary key.
    Groups { groups: Vec<Group> },
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::None => true,
            Payload::Text { content } => content.is_empty(),
            Payload::Resource { body, .. } => body.is_empty(),
            Payload::FileInfo { .. } => false,
            Payload::Items { items } => items.is_empty(),
            Payload::Groups { groups } => groups.is_empty(),
        }
    }

    /// Variant name, for diagnostics and payload-shape errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::None => "none",
            Payload::Text { .. } => "text",
            Payload::Resource { .. } => "resource",
            Payload::FileInfo { .. } => "file_info",
            Payload::Items { .. } => "items",
            Payload::Groups { .. } => "groups",
        }
    }
}

/// One identifiable item in an `Items` payload.
///
/// Equality and hashing use only the derived identity, so two observations of
/// the same item that differ in incidental details (counters, timestamps) are
/// recognized as the same item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// Canonical locator (e.g. a magnet-style URI).
    #[serde(default)]
    pub uri: Option<String>,
    /// Secondary locator (e.g. a download page).
    #[serde(default)]
    pub link: Option<String>,
    /// Incidental attributes — never part of the identity.
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: None,
            link: None,
            details: BTreeMap::new(),
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_detail(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(name.into(), value.into());
        self
    }

    /// Derived stable identity: the exact-target parameter of a magnet-style
    /// URI if one can be extracted, else the raw URI, else the link, else the
    /// name.
    pub fn identity(&self) -> &str {
        if let Some(uri) = &self.uri {
            return extract_exact_target(uri).unwrap_or(uri);
        }
        self.link.as_deref().unwrap_or(&self.name)
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

/// Items sharing a secondary grouping key (e.g. one episode).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub key: String,
    pub items: Vec<Item>,
}

impl Group {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            items: Vec::new(),
        }
    }
}

/// Extract the "xt" (exact target) parameter of a magnet URI. Items listed on
/// different pages often carry cosmetic URI differences; the exact target is
/// the stable part.
fn extract_exact_target(uri: &str) -> Option<&str> {
    let query = uri.strip_prefix("magnet:?")?;
    query
        .split('&')
        .find_map(|param| param.strip_prefix("xt="))
        .filter(|xt| !xt.is_empty())
}
