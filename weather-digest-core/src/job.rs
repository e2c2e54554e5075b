//! The daily digest run: fetch, format, resolve recipients, dispatch.

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    config::Config,
    dispatch::{DeliveryReport, DispatchOutcome, Dispatcher},
    error::{FetchError, Result},
    format::format_message,
    messenger::{LogMessenger, Messenger, TwilioMessenger},
    model::WeatherSummary,
    provider::{SynopticProvider, WeatherProvider},
};

/// How a run that got past the fetch ended.
#[derive(Debug)]
pub enum JobOutcome {
    /// Nobody to notify; the summary was computed but nothing was sent.
    NoRecipients { summary: WeatherSummary, message: String },
    Dispatched { summary: WeatherSummary, message: String, report: DeliveryReport },
}

impl JobOutcome {
    pub fn message(&self) -> &str {
        match self {
            Self::NoRecipients { message, .. } | Self::Dispatched { message, .. } => message,
        }
    }
}

#[derive(Debug)]
pub struct DailyDigestJob {
    weather: Box<dyn WeatherProvider>,
    dispatcher: Dispatcher,
    recipients: Vec<String>,
}

impl DailyDigestJob {
    pub fn new(
        weather: Box<dyn WeatherProvider>,
        dispatcher: Dispatcher,
        recipients: Vec<String>,
    ) -> Self {
        Self { weather, dispatcher, recipients }
    }

    /// Wire the Synoptic provider with Twilio, or with the log-only messenger
    /// when `dry_run` is set (no Twilio credentials needed then).
    pub fn from_config(config: &Config, dry_run: bool) -> Result<Self> {
        let weather = Box::new(SynopticProvider::new(config)?);

        let messenger: Box<dyn Messenger> = if dry_run {
            Box::new(LogMessenger)
        } else {
            Box::new(TwilioMessenger::new(config)?)
        };

        Ok(Self::new(
            weather,
            Dispatcher::new(messenger, config.country_code.clone()),
            config.recipients.clone(),
        ))
    }

    /// Previous day's summary relative to `now`, abandoned if `cancel` fires.
    pub async fn fetch(
        &self,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<WeatherSummary> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled.into()),
            res = self.weather.previous_day_weather(now) => res,
        }
    }

    pub async fn run(&self, now: DateTime<Utc>, cancel: &CancellationToken) -> Result<JobOutcome> {
        let summary = self.fetch(now, cancel).await.inspect_err(|e| {
            error!(error = %e, "Failed to fetch weather, nothing will be sent");
        })?;

        info!(
            date = %summary.date,
            high = summary.high,
            low = summary.low,
            average = summary.average,
            "Weather summary ready"
        );

        let message = format_message(&summary);

        match self.dispatcher.dispatch(&self.recipients, &message, cancel).await {
            DispatchOutcome::NoRecipients => {
                info!("No recipients configured, nothing to send");
                Ok(JobOutcome::NoRecipients { summary, message })
            }
            DispatchOutcome::Attempted(report) => {
                if report.all_delivered() {
                    info!(sent = report.succeeded(), "Digest delivered");
                } else {
                    warn!(
                        sent = report.succeeded(),
                        failed = report.failed(),
                        "Digest delivered with failures"
                    );
                }
                Ok(JobOutcome::Dispatched { summary, message, report })
            }
        }
    }
}
