//! Local-file source adapter — observes scalar facts about one path.

use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;

use vigil_core::error::{Result, VigilError};
use vigil_core::state::{Payload, State};
use vigil_core::traits::Query;

/// Observes existence, size, and mtime of a path. A missing file is a
/// successful observation with `exists: false` — paired with the
/// scalar-change differ, appearing or disappearing is itself the signal.
pub struct FileQuery {
    path: PathBuf,
}

impl FileQuery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Query for FileQuery {
    async fn query(&self) -> Result<State> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => {
                let modified_secs = meta
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs() as i64)
                    .unwrap_or(0);
                Ok(State::ok(Payload::FileInfo {
                    exists: true,
                    size: meta.len(),
                    modified_secs,
                }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(State::ok(Payload::FileInfo {
                exists: false,
                size: 0,
                modified_secs: 0,
            })),
            Err(e) => Err(VigilError::query(format!(
                "Stat {}: {e}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vigil-file-{tag}-{}", std::process::id()))
    }

    #[tokio::test]
    async fn existing_file_reports_its_facts() {
        let path = temp_path("exists");
        std::fs::write(&path, "twelve bytes").unwrap();

        let state = FileQuery::new(&path).query().await.unwrap();
        match state.payload {
            Payload::FileInfo {
                exists,
                size,
                modified_secs,
            } => {
                assert!(exists);
                assert_eq!(size, 12);
                assert!(modified_secs > 0);
            }
            other => panic!("wrong payload: {}", other.kind()),
        }
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn missing_file_is_a_successful_observation() {
        let path = temp_path("missing");
        std::fs::remove_file(&path).ok();

        let state = FileQuery::new(&path).query().await.unwrap();
        assert!(state.success);
        match state.payload {
            Payload::FileInfo { exists, size, .. } => {
                assert!(!exists);
                assert_eq!(size, 0);
            }
            other => panic!("wrong payload: {}", other.kind()),
        }
    }
}
