//! Notifier that writes alerts to the log.

use async_trait::async_trait;
use signal_core::error::NotifyError;
use signal_core::traits::Notifier;
use tracing::info;

/// Dry-run destination: every message goes to the log at `info`.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    name: String,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self {
            name: "log".to_string(),
        }
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, text: &str) -> Result<(), NotifyError> {
        info!(destination = %self.name, "Alert (dry run)\n{}", text);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
