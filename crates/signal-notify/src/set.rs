//! Fan-out over every destination.

use futures::future::join_all;
use signal_core::error::NotifyError;
use signal_core::traits::Notifier;
use tracing::{error, info};

/// Outcome of one delivery attempt.
#[derive(Debug)]
pub struct DeliveryReport {
    pub destination: String,
    pub result: Result<(), NotifyError>,
}

impl DeliveryReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// All configured destinations.
#[derive(Default)]
pub struct NotifierSet {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notifier: impl Notifier + 'static) {
        self.notifiers.push(Box::new(notifier));
    }

    pub fn with(mut self, notifier: impl Notifier + 'static) -> Self {
        self.push(notifier);
        self
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    /// Send `text` to every destination.
    ///
    /// One destination failing does not stop the others. Reports come back
    /// in destination order.
    pub async fn deliver(&self, text: &str) -> Vec<DeliveryReport> {
        let attempts = self.notifiers.iter().map(|notifier| async move {
            let result = notifier.deliver(text).await;
            match &result {
                Ok(()) => info!(destination = notifier.name(), "Alert delivered"),
                Err(e) => error!(destination = notifier.name(), error = %e, "Alert delivery failed"),
            }
            DeliveryReport {
                destination: notifier.name().to_string(),
                result,
            }
        });
        join_all(attempts).await
    }
}

impl<N: Notifier + 'static> FromIterator<N> for NotifierSet {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        let mut set = Self::new();
        for notifier in iter {
            set.push(notifier);
        }
        set
    }
}
