use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::{process::ExitCode, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use weather_digest_core::{Config, DailyDigestJob, JobOutcome, format::format_message};

/// Top-level CLI struct. With no subcommand the digest is fetched and sent once.
#[derive(Debug, Parser)]
#[command(name = "weather-digest", version, about = "Text yesterday's temperatures")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Log the message instead of sending it.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Reference instant (RFC 3339); defaults to now.
    #[arg(long, global = true)]
    pub at: Option<DateTime<Utc>>,

    /// Cancel the run after this many seconds. Overrides DIGEST_DEADLINE_SECS.
    #[arg(long, global = true)]
    pub deadline_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Command {
    /// Fetch, format and send the digest.
    Run,

    /// Fetch and print the digest without sending anything.
    Preview,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let config = Config::load()?;

        let now = self.at.unwrap_or_else(Utc::now);
        let deadline = self.deadline_secs.map(Duration::from_secs).or(config.deadline());

        let cancel = CancellationToken::new();
        spawn_cancel_triggers(&cancel, deadline);

        match self.command.unwrap_or(Command::Run) {
            Command::Preview => {
                let job = DailyDigestJob::from_config(&config, true)?;
                let summary = job.fetch(now, &cancel).await?;
                println!("{}", format_message(&summary));
                Ok(ExitCode::SUCCESS)
            }
            Command::Run => {
                let job = DailyDigestJob::from_config(&config, self.dry_run)?;

                match job.run(now, &cancel).await? {
                    JobOutcome::NoRecipients { .. } => Ok(ExitCode::SUCCESS),
                    JobOutcome::Dispatched { report, .. } => {
                        for failure in report.failures() {
                            warn!(recipient = %failure.recipient, error = %failure.source, "Delivery failed");
                        }
                        Ok(if report.all_delivered() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
                    }
                }
            }
        }
    }
}

/// Cancel on Ctrl-C, and after `deadline` when one is set.
fn spawn_cancel_triggers(cancel: &CancellationToken, deadline: Option<Duration>) {
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling run");
            token.cancel();
        }
    });

    if let Some(limit) = deadline {
        info!(?limit, "Run deadline set");
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            warn!(?limit, "Deadline reached, cancelling run");
            token.cancel();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_means_run() {
        let cli = Cli::try_parse_from(["weather-digest"]).unwrap();

        assert!(cli.command.is_none());
        assert!(!cli.dry_run);
        assert!(cli.at.is_none());
    }

    #[test]
    fn parses_reference_instant_and_flags() {
        let cli = Cli::try_parse_from([
            "weather-digest",
            "preview",
            "--at",
            "2023-01-11T12:00:00Z",
            "--deadline-secs",
            "30",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Command::Preview)));
        assert_eq!(cli.at.unwrap().to_rfc3339(), "2023-01-11T12:00:00+00:00");
        assert_eq!(cli.deadline_secs, Some(30));
    }

    #[test]
    fn rejects_malformed_instant() {
        assert!(Cli::try_parse_from(["weather-digest", "--at", "yesterday"]).is_err());
    }
}
