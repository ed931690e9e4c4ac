//! Stdout channel — prints notifications to the terminal.

use async_trait::async_trait;

use vigil_core::error::Result;
use vigil_core::notification::Notification;
use vigil_core::traits::Notifier;

/// Prints the summary and plain-text body. Mostly for trying out job
/// definitions before wiring a real channel.
pub struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn notify(&self, job_name: &str, notification: &Notification) -> Result<()> {
        println!("🔔 [{job_name}] {}", notification.summary);
        let body = notification.plain_text();
        if body != notification.summary {
            println!("{body}");
        }
        Ok(())
    }
}
