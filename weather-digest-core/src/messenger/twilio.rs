//! Twilio Programmable Messaging transport.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use crate::{
    config::Config,
    error::{Error, Result, SendError, truncate_body},
};

use super::Messenger;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct TwilioMessenger {
    http: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    messaging_service_sid: String,
}

impl TwilioMessenger {
    pub fn new(config: &Config) -> Result<Self> {
        let (account_sid, auth_token, messaging_service_sid) = config.twilio_credentials()?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.twilio.base_url.trim_end_matches('/').to_string(),
            account_sid: account_sid.to_owned(),
            auth_token: auth_token.to_owned(),
            messaging_service_sid: messaging_service_sid.to_owned(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/2010-04-01/Accounts/{}/Messages.json", self.base_url, self.account_sid)
    }
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[async_trait]
impl Messenger for TwilioMessenger {
    async fn send_message(&self, to: &str, body: &str) -> Result<(), SendError> {
        info!(%to, "Sending message");

        let res = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", to),
                ("MessagingServiceSid", self.messaging_service_sid.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&text)
                .map(|e| e.message)
                .unwrap_or_else(|_| truncate_body(&text));
            return Err(SendError::Rejected { status, message });
        }

        match serde_json::from_str::<MessageResource>(&text) {
            Ok(msg) => info!(%to, sid = %msg.sid, status = %msg.status, "Message accepted"),
            Err(_) => info!(%to, "Message accepted"),
        }

        Ok(())
    }
}
