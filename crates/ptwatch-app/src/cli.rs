//! Argument parsing and command dispatch.
//!
//! `run` is the single entrypoint `main.rs` delegates to: build [`Services`]
//! once, then either loop the three scheduler jobs on fixed intervals or run
//! a single job and return.

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::error::AppResult;
use crate::{jobs, Services};

/// `ptwatch`: a scheduler for private-tracker RSS acquisition.
#[derive(Parser)]
#[command(name = "ptwatch", about = "Scheduler for private-tracker RSS acquisition")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three scheduler jobs forever, on their configured intervals.
    Run,
    /// Run a single `rssdownload` cycle and exit.
    RssOnce,
    /// Run a single `pt_transfer` cycle and exit.
    TransferOnce,
    /// Run a single `pt_removetorrents` cycle and exit.
    ReapOnce,
    /// Run a single on-demand retry pass and exit.
    RetryOnce,
}

/// Parse arguments from the process environment and dispatch to the
/// matching job, bootstrapping [`Services`] first.
///
/// # Errors
///
/// Returns an error if [`Services::bootstrap`] fails.
pub async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let services = Services::bootstrap().await?;

    match cli.command {
        Command::Run => run_forever(&services).await,
        Command::RssOnce => jobs::rssdownload(&services).await,
        Command::TransferOnce => jobs::pt_transfer(&services).await,
        Command::ReapOnce => jobs::pt_removetorrents(&services).await,
        Command::RetryOnce => jobs::retry(&services).await,
    }

    Ok(())
}

/// `rssdownload` cadence: how often feeds are re-polled.
const RSS_INTERVAL: Duration = Duration::from_secs(5 * 60);
/// `pt_transfer` cadence: how often completed torrents are swept for transfer.
const TRANSFER_INTERVAL: Duration = Duration::from_secs(10 * 60);
/// `pt_removetorrents` cadence: how often the seeding reaper runs.
const REAP_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Drive the three periodic jobs forever, each on its own interval, with
/// retry run once per `rssdownload` cycle rather than on its own clock.
async fn run_forever(services: &Services) -> ! {
    let mut rss_due = tokio::time::interval(RSS_INTERVAL);
    let mut transfer_due = tokio::time::interval(TRANSFER_INTERVAL);
    let mut reap_due = tokio::time::interval(REAP_INTERVAL);

    info!("scheduler started");
    loop {
        tokio::select! {
            _ = rss_due.tick() => {
                jobs::rssdownload(services).await;
                jobs::retry(services).await;
            }
            _ = transfer_due.tick() => jobs::pt_transfer(services).await,
            _ = reap_due.tick() => jobs::pt_removetorrents(services).await,
        }
    }
}
