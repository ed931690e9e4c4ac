//! Durable per-job state store — one JSON document per (job, slot).
//!
//! Records are human-readable files named `<job>.last.json` (every attempt)
//! and `<job>.success.json` (successful attempts only). Writes go through a
//! temp file + rename so a failed save leaves the prior record untouched: an
//! unmodified-but-valid record is always preferred over a corrupt one.

use std::path::{Path, PathBuf};

use vigil_core::error::{Result, VigilError};
use vigil_core::state::State;

/// The two persisted records per job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The most recent poll, successful or not.
    LastAttempt,
    /// The most recent successful poll.
    LastSuccess,
}

impl Slot {
    fn suffix(self) -> &'static str {
        match self {
            Slot::LastAttempt => "last",
            Slot::LastSuccess => "success",
        }
    }
}

/// File-based state store, shared across all jobs. Job names are unique
/// within one engine, so concurrent jobs never touch the same files; the
/// store itself does not detect collisions.
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Create a store in the given directory, creating it if needed.
    pub fn new(dir: &Path) -> Self {
        std::fs::create_dir_all(dir).ok();
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Load the record for (job, slot). Never errors: a missing record and a
    /// malformed one both come back as `None`, logged distinctly.
    pub fn load(&self, job_name: &str, slot: Slot) -> Option<State> {
        let file = self.state_file(job_name, slot);
        if !file.exists() {
            tracing::debug!("No {} record for job '{}'", slot.suffix(), job_name);
            return None;
        }
        match std::fs::read_to_string(&file) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(state) => Some(state),
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Malformed {} record for job '{}': {e}",
                        slot.suffix(),
                        job_name
                    );
                    None
                }
            },
            Err(e) => {
                tracing::warn!(
                    "⚠️ Unreadable {} record for job '{}': {e}",
                    slot.suffix(),
                    job_name
                );
                None
            }
        }
    }

    /// Persist a state: always to last-attempt, and additionally to
    /// last-success iff the state is successful.
    pub fn save(&self, job_name: &str, state: &State) -> Result<()> {
        self.write_slot(job_name, Slot::LastAttempt, state)?;
        if state.success {
            self.write_slot(job_name, Slot::LastSuccess, state)?;
        }
        Ok(())
    }

    fn write_slot(&self, job_name: &str, slot: Slot, state: &State) -> Result<()> {
        let file = self.state_file(job_name, slot);
        let tmp = file.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| VigilError::Store(format!("Serialize state: {e}")))?;
        if let Err(e) = std::fs::write(&tmp, &json) {
            std::fs::remove_file(&tmp).ok();
            return Err(VigilError::Store(format!(
                "Write {} record for '{job_name}': {e}",
                slot.suffix()
            )));
        }
        if let Err(e) = std::fs::rename(&tmp, &file) {
            std::fs::remove_file(&tmp).ok();
            return Err(VigilError::Store(format!(
                "Replace {} record for '{job_name}': {e}",
                slot.suffix()
            )));
        }
        tracing::debug!("💾 Saved {} record for job '{}'", slot.suffix(), job_name);
        Ok(())
    }

    fn state_file(&self, job_name: &str, slot: Slot) -> PathBuf {
        self.dir.join(format!("{job_name}.{}.json", slot.suffix()))
    }
}
