//! Notification sink seam and the console fallback.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Endpoint rejected message: {status_code} - {body}")]
    Rejected { status_code: u16, body: String },
}

/// Delivers one human-readable alert. Best-effort: callers log failures
/// and move on, nothing is retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Writes alerts to the log stream. Used when no messaging endpoint is
/// configured.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        info!(alert = %text, "ALERT");
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
