//! Webhook channel — POSTs notifications as JSON to a fixed URL.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use vigil_core::error::{Result, VigilError};
use vigil_core::notification::Notification;
use vigil_core::traits::Notifier;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct WebhookPayload<'a> {
    job: &'a str,
    summary: &'a str,
    bodies: &'a std::collections::BTreeMap<String, String>,
    timestamp: chrono::DateTime<chrono::Utc>,
}

/// Delivers each notification as one JSON POST. Transport errors and
/// non-success statuses are notify errors, surfaced at the schedule
/// boundary without unscheduling the job.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .map_err(|e| VigilError::notify(format!("Build HTTP client: {e}")))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, job_name: &str, notification: &Notification) -> Result<()> {
        let payload = WebhookPayload {
            job: job_name,
            summary: &notification.summary,
            bodies: &notification.bodies,
            timestamp: chrono::Utc::now(),
        };
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| VigilError::notify(format!("POST {}: {e}", self.url)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(VigilError::notify(format!(
                "POST {}: HTTP {status}",
                self.url
            )));
        }
        tracing::debug!("Delivered webhook for job '{job_name}'");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;

    // One-shot HTTP server capturing the request it receives.
    fn capture_once(status_line: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 8192];
            let n = stream.read(&mut buf).unwrap();
            tx.send(String::from_utf8_lossy(&buf[..n]).into_owned()).unwrap();
            let response = format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            stream.write_all(response.as_bytes()).unwrap();
        });
        (format!("http://{addr}/hook"), rx)
    }

    #[tokio::test]
    async fn delivers_job_name_summary_and_bodies() {
        let (url, rx) = capture_once("HTTP/1.1 200 OK");
        let notifier = WebhookNotifier::new(&url).unwrap();
        let notification = Notification::new("1 new item for “feed”")
            .with_body("text/plain", "New: Alpha");

        notifier.notify("feed", &notification).await.unwrap();

        let request = rx.recv().unwrap();
        assert!(request.starts_with("POST /hook"));
        assert!(request.contains("\"job\":\"feed\""));
        assert!(request.contains("New: Alpha"));
    }

    #[tokio::test]
    async fn non_success_status_is_a_notify_error() {
        let (url, _rx) = capture_once("HTTP/1.1 500 Internal Server Error");
        let notifier = WebhookNotifier::new(&url).unwrap();

        let err = notifier
            .notify("feed", &Notification::new("changed"))
            .await
            .unwrap_err();
        assert!(matches!(err, VigilError::Notify(_)));
        assert!(err.to_string().contains("500"));
    }
}
