//! Job definitions — the on-disk JSON format and the component registry.
//!
//! A definition names its components by registered kind string and hands
//! each a flat parameter list. Resolution is explicit: every kind must be
//! registered up front, and an unknown kind or missing parameter is a
//! definition error reported at load time, not a panic at first firing.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use vigil_core::error::{Result, VigilError};
use vigil_core::traits::{Differ, Filter, Notifier, Query};

use crate::job::{Job, MINIMUM_INTERVAL};

/// One job as written in its `<name>.json` file. Comparable so a directory
/// watcher can tell edits from no-ops.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobDefinition {
    pub name: String,
    /// Seconds between firings (fixed delay).
    pub interval: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub query: ComponentDescriptor,
    #[serde(default)]
    pub filters: Vec<ComponentDescriptor>,
    pub differ: ComponentDescriptor,
    pub notifier: ComponentDescriptor,
}

fn default_enabled() -> bool {
    true
}

/// A component reference: a registered kind plus its parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComponentDescriptor {
    pub kind: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: serde_json::Value,
}

/// Read-only view over a descriptor's parameters, handed to factories.
pub struct Parameters<'a>(&'a [Parameter]);

impl<'a> Parameters<'a> {
    pub fn get(&self, name: &str) -> Option<&'a serde_json::Value> {
        self.0.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    pub fn get_str(&self, name: &str) -> Result<Option<&'a str>> {
        match self.get(name) {
            None => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(VigilError::InvalidParameter {
                name: name.into(),
                reason: "expected a string".into(),
            }),
        }
    }

    pub fn require_str(&self, name: &str) -> Result<&'a str> {
        self.get_str(name)?
            .ok_or_else(|| VigilError::MissingParameter(name.into()))
    }

    pub fn get_u64(&self, name: &str) -> Result<Option<u64>> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| VigilError::InvalidParameter {
                    name: name.into(),
                    reason: "expected a non-negative integer".into(),
                }),
        }
    }
}

type QueryFactory = Box<dyn Fn(&Parameters) -> Result<Box<dyn Query>> + Send + Sync>;
type FilterFactory = Box<dyn Fn(&Parameters) -> Result<Box<dyn Filter>> + Send + Sync>;
type DifferFactory = Box<dyn Fn(&Parameters) -> Result<Box<dyn Differ>> + Send + Sync>;
type NotifierFactory = Box<dyn Fn(&Parameters) -> Result<Box<dyn Notifier>> + Send + Sync>;

/// Maps kind strings to component factories. The built-in differs are always
/// available; sources and channels register themselves at startup.
#[derive(Default)]
pub struct Registry {
    queries: HashMap<String, QueryFactory>,
    filters: HashMap<String, FilterFactory>,
    differs: HashMap<String, DifferFactory>,
    notifiers: HashMap<String, NotifierFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the payload-shape differs.
    pub fn with_built_in_differs() -> Self {
        let mut registry = Self::new();
        registry.register_differ("always", |_| {
            Ok(Box::new(vigil_core::differs::AlwaysDiffer))
        });
        registry.register_differ("scalar-change", |_| {
            Ok(Box::new(vigil_core::differs::ScalarChangeDiffer))
        });
        registry.register_differ("new-items", |_| {
            Ok(Box::new(vigil_core::differs::NewItemsDiffer))
        });
        registry.register_differ("grouped-items", |_| {
            Ok(Box::new(vigil_core::differs::GroupedItemsDiffer))
        });
        registry
    }

    pub fn register_query<F>(&mut self, kind: &str, factory: F)
    where
        F: Fn(&Parameters) -> Result<Box<dyn Query>> + Send + Sync + 'static,
    {
        self.queries.insert(kind.to_string(), Box::new(factory));
    }

    pub fn register_filter<F>(&mut self, kind: &str, factory: F)
    where
        F: Fn(&Parameters) -> Result<Box<dyn Filter>> + Send + Sync + 'static,
    {
        self.filters.insert(kind.to_string(), Box::new(factory));
    }

    pub fn register_differ<F>(&mut self, kind: &str, factory: F)
    where
        F: Fn(&Parameters) -> Result<Box<dyn Differ>> + Send + Sync + 'static,
    {
        self.differs.insert(kind.to_string(), Box::new(factory));
    }

    pub fn register_notifier<F>(&mut self, kind: &str, factory: F)
    where
        F: Fn(&Parameters) -> Result<Box<dyn Notifier>> + Send + Sync + 'static,
    {
        self.notifiers.insert(kind.to_string(), Box::new(factory));
    }

    /// Build a runnable job from a definition. Intervals below the minimum
    /// are clamped, with a warning, rather than rejected.
    pub fn resolve(&self, definition: &JobDefinition) -> Result<Job> {
        // The name becomes part of the state record filenames, so it must
        // not be able to point outside the states directory.
        if definition.name.is_empty()
            || definition.name.contains(['/', '\\'])
            || definition.name == "."
            || definition.name == ".."
        {
            return Err(VigilError::Definition(format!(
                "Job name '{}' is not a valid file name component",
                definition.name
            )));
        }

        let mut interval = Duration::from_secs(definition.interval);
        if interval < MINIMUM_INTERVAL {
            tracing::warn!(
                "⚠️ Job '{}' asked for a {}s interval, clamping to {}s",
                definition.name,
                interval.as_secs(),
                MINIMUM_INTERVAL.as_secs()
            );
            interval = MINIMUM_INTERVAL;
        }

        let query = self.build(&self.queries, "query", &definition.query)?;
        let differ = self.build(&self.differs, "differ", &definition.differ)?;
        let notifier = self.build(&self.notifiers, "notifier", &definition.notifier)?;
        let mut job = Job::new(definition.name.clone(), interval, query, differ, notifier);
        for descriptor in &definition.filters {
            job = job.with_filter(self.build(&self.filters, "filter", descriptor)?);
        }
        Ok(job)
    }

    fn build<T: ?Sized>(
        &self,
        factories: &HashMap<String, Box<dyn Fn(&Parameters) -> Result<Box<T>> + Send + Sync>>,
        component: &'static str,
        descriptor: &ComponentDescriptor,
    ) -> Result<Box<T>> {
        let factory = factories
            .get(&descriptor.kind)
            .ok_or_else(|| VigilError::UnknownKind {
                component,
                kind: descriptor.kind.clone(),
            })?;
        factory(&Parameters(&descriptor.parameters))
    }
}

/// Parse one definition file.
pub fn load_definition(path: &Path) -> Result<JobDefinition> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| VigilError::Definition(format!("Read {}: {e}", path.display())))?;
    serde_json::from_str(&json)
        .map_err(|e| VigilError::Definition(format!("Parse {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use vigil_core::notification::Notification;
    use vigil_core::state::{Payload, State};

    struct StaticQuery(String);

    #[async_trait]
    impl Query for StaticQuery {
        async fn query(&self) -> Result<State> {
            Ok(State::ok(Payload::Text {
                content: self.0.clone(),
            }))
        }
    }

    struct SilentNotifier;

    #[async_trait]
    impl Notifier for SilentNotifier {
        async fn notify(&self, _job_name: &str, _notification: &Notification) -> Result<()> {
            Ok(())
        }
    }

    fn test_registry() -> Registry {
        let mut registry = Registry::with_built_in_differs();
        registry.register_query("static", |params| {
            let content = params.require_str("content")?;
            Ok(Box::new(StaticQuery(content.to_string())))
        });
        registry.register_notifier("silent", |_| Ok(Box::new(SilentNotifier)));
        registry
    }

    fn parse(json: &str) -> JobDefinition {
        serde_json::from_str(json).unwrap()
    }

    const COMPLETE: &str = r#"{
        "name": "watch-feed",
        "interval": 900,
        "query": {
            "kind": "static",
            "parameters": [{"name": "content", "value": "hello"}]
        },
        "differ": {"kind": "new-items"},
        "notifier": {"kind": "silent"}
    }"#;

    #[test]
    fn definitions_parse_with_defaults() {
        let definition = parse(COMPLETE);
        assert_eq!(definition.name, "watch-feed");
        assert_eq!(definition.interval, 900);
        assert!(definition.enabled);
        assert!(definition.filters.is_empty());
        assert_eq!(definition.differ.kind, "new-items");
    }

    #[test]
    fn equality_detects_edits() {
        let a = parse(COMPLETE);
        let b = parse(&COMPLETE.replace("900", "1800"));
        assert_ne!(a, b);
        assert_eq!(a, parse(COMPLETE));
    }

    #[test]
    fn resolving_a_complete_definition_builds_a_job() {
        let job = test_registry().resolve(&parse(COMPLETE)).unwrap();
        assert_eq!(job.name, "watch-feed");
        assert_eq!(job.interval, Duration::from_secs(900));
    }

    #[test]
    fn unknown_kind_is_a_definition_error() {
        let definition = parse(&COMPLETE.replace("\"static\"", "\"nonexistent\""));
        let err = test_registry().resolve(&definition).unwrap_err();
        match err {
            VigilError::UnknownKind { component, kind } => {
                assert_eq!(component, "query");
                assert_eq!(kind, "nonexistent");
            }
            other => panic!("wrong error: {other}"),
        }
    }

    #[test]
    fn missing_parameter_is_a_definition_error() {
        let definition = parse(&COMPLETE.replace("content", "wrong-name"));
        let err = test_registry().resolve(&definition).unwrap_err();
        match err {
            VigilError::MissingParameter(name) => assert_eq!(name, "content"),
            other => panic!("wrong error: {other}"),
        }
    }

    #[test]
    fn wrongly_typed_parameter_is_rejected() {
        let definition = parse(&COMPLETE.replace("\"hello\"", "42"));
        let err = test_registry().resolve(&definition).unwrap_err();
        match err {
            VigilError::InvalidParameter { name, .. } => assert_eq!(name, "content"),
            other => panic!("wrong error: {other}"),
        }
    }

    #[test]
    fn names_with_path_separators_are_rejected() {
        // `a\\b` is the JSON escape for a literal backslash in the name.
        for name in ["../escape", "a/b", r"a\\b", "", ".", ".."] {
            let definition = parse(&COMPLETE.replace("watch-feed", name));
            assert!(
                matches!(
                    test_registry().resolve(&definition),
                    Err(VigilError::Definition(_))
                ),
                "name {name:?} must be rejected"
            );
        }
        // Dots inside a name stay legal.
        let definition = parse(&COMPLETE.replace("watch-feed", "feed.v2"));
        assert!(test_registry().resolve(&definition).is_ok());
    }

    #[test]
    fn short_intervals_are_clamped_to_the_minimum() {
        let definition = parse(&COMPLETE.replace("900", "5"));
        let job = test_registry().resolve(&definition).unwrap();
        assert_eq!(job.interval, MINIMUM_INTERVAL);
    }

    #[test]
    fn definition_files_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("vigil-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("watch-feed.json");
        std::fs::write(&path, COMPLETE).unwrap();

        let definition = load_definition(&path).unwrap();
        assert_eq!(definition.name, "watch-feed");

        std::fs::write(&path, "{truncated").unwrap();
        assert!(matches!(
            load_definition(&path).unwrap_err(),
            VigilError::Definition(_)
        ));
        std::fs::remove_dir_all(&dir).ok();
    }
}
