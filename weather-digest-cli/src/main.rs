//! Binary crate for the `weather-digest` job.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Log output setup
//! - Wiring cancellation (Ctrl-C, deadline) into a single run

use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("weather_digest_core=info,weather_digest=info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // DIGEST_LOG_FORMAT=json for log collectors, human-readable otherwise.
    match std::env::var("DIGEST_LOG_FORMAT").as_deref() {
        Ok("json") => registry.with(fmt::layer().json()).init(),
        _ => registry.with(fmt::layer()).init(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let cmd = cli::Cli::parse();
    match cmd.run().await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Digest run failed");
            ExitCode::FAILURE
        }
    }
}
