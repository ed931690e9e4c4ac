//! Job directory watcher — keeps the engine in sync with `*.json` files.
//!
//! The directory is the source of truth: on each rescan, new and edited
//! enabled definitions are (re-)registered, removed or disabled ones are
//! deregistered. A file that fails to parse or resolve is skipped with a
//! warning and does not disturb the jobs already running.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::Engine;
use crate::loader::{JobDefinition, Registry, load_definition};

pub struct JobDirectoryWatcher {
    engine: Arc<Engine>,
    registry: Registry,
    jobs_dir: PathBuf,
    rescan_interval: Duration,
    known: HashMap<String, JobDefinition>,
}

impl JobDirectoryWatcher {
    pub fn new(
        engine: Arc<Engine>,
        registry: Registry,
        jobs_dir: impl Into<PathBuf>,
        rescan_interval: Duration,
    ) -> Self {
        Self {
            engine,
            registry,
            jobs_dir: jobs_dir.into(),
            rescan_interval,
            known: HashMap::new(),
        }
    }

    /// Rescan forever at the configured interval.
    pub async fn run(mut self) {
        tracing::info!(
            "Watching {} for job definitions (rescan every {}s)",
            self.jobs_dir.display(),
            self.rescan_interval.as_secs()
        );
        loop {
            self.rescan();
            tokio::time::sleep(self.rescan_interval).await;
        }
    }

    /// One pass: diff the directory against the known definitions and apply
    /// the difference to the engine.
    pub fn rescan(&mut self) {
        let current = self.read_definitions();

        let removed: Vec<String> = self
            .known
            .keys()
            .filter(|name| !current.contains_key(*name))
            .cloned()
            .collect();
        for name in removed {
            self.known.remove(&name);
            self.engine.deregister(&name);
        }

        for (name, definition) in current {
            if self.known.get(&name) == Some(&definition) {
                continue;
            }
            if !definition.enabled {
                if self.known.remove(&name).is_some() {
                    self.engine.deregister(&name);
                }
                continue;
            }
            match self.registry.resolve(&definition) {
                Ok(job) => {
                    self.engine.register(job);
                    self.known.insert(name, definition);
                }
                Err(e) => {
                    tracing::warn!("⚠️ Skipping job '{name}': {e}");
                }
            }
        }
    }

    fn read_definitions(&self) -> HashMap<String, JobDefinition> {
        let mut definitions = HashMap::new();
        let entries = match std::fs::read_dir(&self.jobs_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("⚠️ Cannot read {}: {e}", self.jobs_dir.display());
                return definitions;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match load_definition(&path) {
                Ok(definition) => {
                    if let Some(shadowed) =
                        definitions.insert(definition.name.clone(), definition)
                    {
                        tracing::warn!(
                            "⚠️ Duplicate job name '{}' in {}, keeping the later file",
                            shadowed.name,
                            self.jobs_dir.display()
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!("⚠️ Skipping {}: {e}", path.display());
                }
            }
        }
        definitions
    }

    /// Whether the watcher currently tracks a job under this name.
    pub fn is_tracking(&self, name: &str) -> bool {
        self.known.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use vigil_core::error::Result;
    use vigil_core::notification::Notification;
    use vigil_core::state::{Payload, State};
    use vigil_core::traits::{Notifier, Query};

    use crate::store::StateStore;

    struct StaticQuery;

    #[async_trait]
    impl Query for StaticQuery {
        async fn query(&self) -> Result<State> {
            Ok(State::ok(Payload::Text { content: "x".into() }))
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
        registry.register_query("static", |_| Ok(Box::new(StaticQuery)));
        registry.register_notifier("silent", |_| Ok(Box::new(SilentNotifier)));
        registry
    }

    fn setup(tag: &str) -> (JobDirectoryWatcher, Arc<Engine>, PathBuf) {
        let base = std::env::temp_dir().join(format!("vigil-watch-{tag}-{}", std::process::id()));
        std::fs::remove_dir_all(&base).ok();
        let jobs = base.join("jobs");
        std::fs::create_dir_all(&jobs).unwrap();
        let engine = Arc::new(Engine::new(Arc::new(StateStore::new(&base.join("states")))));
        let watcher = JobDirectoryWatcher::new(
            engine.clone(),
            test_registry(),
            &jobs,
            Duration::from_secs(60),
        );
        (watcher, engine, base)
    }

    fn definition_json(name: &str, interval: u64, enabled: bool) -> String {
        format!(
            r#"{{
                "name": "{name}",
                "interval": {interval},
                "enabled": {enabled},
                "query": {{"kind": "static"}},
                "differ": {{"kind": "always"}},
                "notifier": {{"kind": "silent"}}
            }}"#
        )
    }

    #[tokio::test]
    async fn new_files_register_and_removed_files_deregister() {
        let (mut watcher, engine, base) = setup("lifecycle");
        let file = base.join("jobs/feed.json");
        std::fs::write(&file, definition_json("feed", 600, true)).unwrap();

        watcher.rescan();
        assert!(watcher.is_tracking("feed"));

        std::fs::remove_file(&file).unwrap();
        watcher.rescan();
        assert!(!watcher.is_tracking("feed"));
        // Already deregistered by the watcher.
        assert!(!engine.deregister("feed"));
        std::fs::remove_dir_all(&base).ok();
    }

    #[tokio::test]
    async fn disabled_definitions_are_not_registered() {
        let (mut watcher, engine, base) = setup("disabled");
        let file = base.join("jobs/feed.json");
        std::fs::write(&file, definition_json("feed", 600, true)).unwrap();
        watcher.rescan();
        assert!(engine.deregister("feed"));
        // The engine entry is gone but the watcher still tracks the file;
        // flipping enabled off must not re-register it.
        std::fs::write(&file, definition_json("feed", 600, false)).unwrap();
        watcher.rescan();
        assert!(!watcher.is_tracking("feed"));
        assert!(!engine.deregister("feed"));
        std::fs::remove_dir_all(&base).ok();
    }

    #[tokio::test]
    async fn unchanged_definitions_are_left_alone() {
        let (mut watcher, engine, base) = setup("unchanged");
        std::fs::write(
            base.join("jobs/feed.json"),
            definition_json("feed", 600, true),
        )
        .unwrap();
        watcher.rescan();
        assert!(engine.deregister("feed"));

        // Same content on the next pass: the watcher must not re-register
        // the job it believes is already running.
        watcher.rescan();
        assert!(!engine.deregister("feed"));
        std::fs::remove_dir_all(&base).ok();
    }

    #[tokio::test]
    async fn edited_definitions_are_reregistered() {
        let (mut watcher, engine, base) = setup("edited");
        let file = base.join("jobs/feed.json");
        std::fs::write(&file, definition_json("feed", 600, true)).unwrap();
        watcher.rescan();
        assert!(engine.deregister("feed"));

        std::fs::write(&file, definition_json("feed", 1200, true)).unwrap();
        watcher.rescan();
        assert!(engine.deregister("feed"));
        std::fs::remove_dir_all(&base).ok();
    }

    #[tokio::test]
    async fn malformed_files_are_skipped_without_disturbing_others() {
        let (mut watcher, _engine, base) = setup("malformed");
        std::fs::write(
            base.join("jobs/good.json"),
            definition_json("good", 600, true),
        )
        .unwrap();
        std::fs::write(base.join("jobs/bad.json"), "{not json").unwrap();
        std::fs::write(base.join("jobs/notes.txt"), "ignored").unwrap();

        watcher.rescan();
        assert!(watcher.is_tracking("good"));
        assert!(!watcher.is_tracking("bad"));
        std::fs::remove_dir_all(&base).ok();
    }

    #[tokio::test]
    async fn unresolvable_definitions_are_skipped() {
        let (mut watcher, _engine, base) = setup("unresolvable");
        std::fs::write(
            base.join("jobs/feed.json"),
            definition_json("feed", 600, true).replace("static", "nonexistent"),
        )
        .unwrap();
        watcher.rescan();
        assert!(!watcher.is_tracking("feed"));
        std::fs::remove_dir_all(&base).ok();
    }
}
