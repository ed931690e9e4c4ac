//! # Vigil Channels
//!
//! Built-in notification channels: stdout, webhook, and email. Each
//! implements `vigil_core::Notifier` and is wired to job definitions
//! through the component registry.

pub mod email;
pub mod stdout;
pub mod webhook;

pub use email::EmailNotifier;
pub use stdout::StdoutNotifier;
pub use webhook::WebhookNotifier;
