use async_trait::async_trait;
use tracing::info;

use crate::error::SendError;

use super::Messenger;

/// Writes messages to the log instead of sending them. Used for dry runs.
#[derive(Debug, Clone, Default)]
pub struct LogMessenger;

#[async_trait]
impl Messenger for LogMessenger {
    async fn send_message(&self, to: &str, body: &str) -> Result<(), SendError> {
        info!(%to, message = %body, "Dry run, message not sent");
        Ok(())
    }
}
