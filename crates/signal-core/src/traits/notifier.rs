//! Notifier trait definitions.

use crate::error::NotifyError;
use async_trait::async_trait;

/// A single delivery destination for formatted alert text.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message.
    async fn deliver(&self, text: &str) -> Result<(), NotifyError>;

    /// Get the name of the destination, used in delivery reports.
    fn name(&self) -> &str;
}
