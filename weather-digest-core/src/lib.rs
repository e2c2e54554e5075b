//! Core library for the daily temperature digest.
//!
//! This crate defines:
//! - Configuration loading (file + environment)
//! - The previous-day window and temperature aggregation
//! - Weather provider and messenger abstractions with their HTTP implementations
//! - The job that ties them together
//!
//! It is used by `weather-digest-cli`, but can be driven from any scheduler.

pub mod aggregate;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod job;
pub mod messenger;
pub mod model;
pub mod provider;
pub mod window;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use dispatch::{DeliveryReport, DispatchOutcome, Dispatcher};
pub use error::{DispatchError, Error, FetchError, NoDataError, Result, SendError};
pub use job::{DailyDigestJob, JobOutcome};
pub use messenger::Messenger;
pub use model::{TemperatureSample, WeatherSummary};
pub use provider::WeatherProvider;
pub use window::DateWindow;
