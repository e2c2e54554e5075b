//! Fan a message out to every recipient, one send each.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    error::{DispatchError, SendError},
    messenger::Messenger,
};

/// Result of sending to one recipient.
#[derive(Debug)]
pub struct Delivery {
    /// Normalized destination, e.g. `+14025551234`.
    pub to: String,
    pub result: Result<(), DispatchError>,
}

/// Per-recipient results, in recipient order.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub deliveries: Vec<Delivery>,
}

impl DeliveryReport {
    pub fn succeeded(&self) -> usize {
        self.deliveries.iter().filter(|d| d.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.deliveries.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DispatchError> {
        self.deliveries.iter().filter_map(|d| d.result.as_ref().err())
    }

    pub fn all_delivered(&self) -> bool {
        self.failed() == 0
    }
}

#[derive(Debug)]
pub enum DispatchOutcome {
    /// Nothing configured to send to; no sends were made.
    NoRecipients,
    Attempted(DeliveryReport),
}

#[derive(Debug)]
pub struct Dispatcher {
    messenger: Box<dyn Messenger>,
    country_code: String,
}

impl Dispatcher {
    pub fn new(messenger: Box<dyn Messenger>, country_code: impl Into<String>) -> Self {
        Self { messenger, country_code: country_code.into() }
    }

    /// Prefix the country code unless the number is already international.
    pub fn normalize(&self, number: &str) -> String {
        if number.starts_with('+') {
            number.to_string()
        } else {
            format!("{}{}", self.country_code, number)
        }
    }

    /// Send `message` to each recipient exactly once. A failed send is recorded
    /// and the remaining recipients are still attempted. Once `cancel` fires the
    /// in-flight send is dropped and the rest are marked cancelled without sending.
    pub async fn dispatch(
        &self,
        recipients: &[String],
        message: &str,
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        if recipients.is_empty() {
            return DispatchOutcome::NoRecipients;
        }

        let mut report = DeliveryReport::default();

        for number in recipients {
            let to = self.normalize(number);

            let result = if cancel.is_cancelled() {
                Err(SendError::Cancelled)
            } else {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(SendError::Cancelled),
                    res = self.messenger.send_message(&to, message) => res,
                }
            };

            match &result {
                Ok(()) => info!(%to, "Message delivered"),
                Err(e) => warn!(%to, error = %e, "Error sending message"),
            }

            report.deliveries.push(Delivery {
                result: result.map_err(|source| DispatchError { recipient: to.clone(), source }),
                to,
            });
        }

        DispatchOutcome::Attempted(report)
    }
}
