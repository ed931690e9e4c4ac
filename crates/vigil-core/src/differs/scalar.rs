//! A differ comparing the fixed scalar fields of a file observation.

use crate::error::{Result, VigilError};
use crate::notification::Notification;
use crate::state::{Payload, State};
use crate::traits::{Differ, MergeOutcome};

/// Triggers when any scalar field of a `FileInfo` payload changed between
/// the previous and current observation. The merged state is simply the
/// current one — scalar facts carry no history worth unioning.
pub struct ScalarChangeDiffer;

impl Differ for ScalarChangeDiffer {
    fn merge(&self, job_name: &str, previous: &State, current: &State) -> Result<MergeOutcome> {
        let (prev_exists, prev_size, prev_modified) = file_info(previous)?;
        let (cur_exists, cur_size, cur_modified) = file_info(current)?;

        let mut changes = Vec::new();
        if prev_exists != cur_exists {
            changes.push(format!(
                "existence: {} → {}",
                describe_exists(prev_exists),
                describe_exists(cur_exists)
            ));
        }
        if prev_size != cur_size {
            changes.push(format!("size: {prev_size} → {cur_size} bytes"));
        }
        if prev_modified != cur_modified {
            changes.push(format!(
                "modification time: {prev_modified} → {cur_modified}"
            ));
        }

        if changes.is_empty() {
            return Ok(MergeOutcome::unchanged(current.clone()));
        }

        let body = changes.join("\n");
        let notification = Notification::new(format!("“{job_name}” changed"))
            .with_body("text/plain", body.clone())
            .with_body(
                "text/html",
                format!(
                    "<ul>{}</ul>",
                    changes
                        .iter()
                        .map(|c| format!("<li>{}</li>", super::always::escape_html(c)))
                        .collect::<String>()
                ),
            );
        Ok(MergeOutcome::triggered(current.clone(), notification))
    }
}

fn file_info(state: &State) -> Result<(bool, u64, i64)> {
    match &state.payload {
        Payload::FileInfo {
            exists,
            size,
            modified_secs,
        } => Ok((*exists, *size, *modified_secs)),
        other => Err(VigilError::DifferPayload {
            expected: "file_info",
            actual: other.kind(),
        }),
    }
}

fn describe_exists(exists: bool) -> &'static str {
    if exists { "present" } else { "absent" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_state(exists: bool, size: u64, modified_secs: i64) -> State {
        State::ok(Payload::FileInfo {
            exists,
            size,
            modified_secs,
        })
    }

    #[test]
    fn identical_fields_do_not_trigger() {
        let a = file_state(true, 100, 1_700_000_000);
        let outcome = ScalarChangeDiffer.merge("f", &a, &a.clone()).unwrap();
        assert!(!outcome.triggered);
        assert!(outcome.notification.is_none());
    }

    #[test]
    fn any_changed_field_triggers() {
        let previous = file_state(true, 100, 1_700_000_000);
        let grown = file_state(true, 250, 1_700_000_000);
        let outcome = ScalarChangeDiffer.merge("f", &previous, &grown).unwrap();
        assert!(outcome.triggered);
        let notification = outcome.notification.unwrap();
        assert!(notification.plain_text().contains("100 → 250"));
    }

    #[test]
    fn disappearance_is_reported() {
        let previous = file_state(true, 100, 1_700_000_000);
        let gone = file_state(false, 0, 0);
        let outcome = ScalarChangeDiffer.merge("f", &previous, &gone).unwrap();
        assert!(outcome.triggered);
        assert!(
            outcome
                .notification
                .unwrap()
                .plain_text()
                .contains("present → absent")
        );
    }

    #[test]
    fn wrong_payload_is_an_error() {
        let previous = file_state(true, 1, 1);
        let wrong = State::ok(Payload::Text { content: "x".into() });
        let err = ScalarChangeDiffer.merge("f", &previous, &wrong).unwrap_err();
        assert!(matches!(err, VigilError::DifferPayload { .. }));
    }
}
