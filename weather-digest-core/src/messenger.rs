use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::SendError;

pub mod log;
pub mod twilio;

pub use log::LogMessenger;
pub use twilio::TwilioMessenger;

/// Outbound text message capability.
#[async_trait]
pub trait Messenger: Send + Sync + Debug {
    /// Send `body` to a full international number such as `+14025551234`.
    async fn send_message(&self, to: &str, body: &str) -> Result<(), SendError>;
}
