use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::{error::SendError, messenger::Messenger};

/// Records every send; can fail or hang on a chosen call (1-based).
#[derive(Debug, Clone, Default)]
pub struct RecordingMessenger {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail_on: Option<usize>,
    hang_on: Option<usize>,
}

impl RecordingMessenger {
    pub fn failing_on(call: usize) -> Self {
        Self { fail_on: Some(call), ..Self::default() }
    }

    pub fn hanging_on(call: usize) -> Self {
        Self { hang_on: Some(call), ..Self::default() }
    }

    /// Every attempted send, including failed ones.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, to: &str, body: &str) -> Result<(), SendError> {
        let call = {
            let mut sent = self.sent.lock().unwrap();
            sent.push((to.to_string(), body.to_string()));
            sent.len()
        };

        if self.hang_on == Some(call) {
            std::future::pending::<()>().await;
        }

        if self.fail_on == Some(call) {
            return Err(SendError::Rejected {
                status: reqwest::StatusCode::BAD_REQUEST,
                message: format!("refused {to}"),
            });
        }

        Ok(())
    }
}
