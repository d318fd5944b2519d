//! The three scheduler jobs (`rssdownload`, `pt_transfer`,
//! `pt_removetorrents`) plus the on-demand retry path. Each job is a single
//! try/recover boundary: a failure anywhere inside degrades to a logged
//! warning, never a process exit, so one bad feed or one flaky client call
//! never blocks the next scheduled tick.

use ptwatch_core::GapMap;
use ptwatch_driver::{DownloadDriver, DriveOutcome};
use ptwatch_events::Event;
use ptwatch_lifecycle::{RssRetry, SeedingReaper, TransferWorker};
use ptwatch_planner::{plan, reconcile_candidate, ReconcileOutcome};
use ptwatch_rss::{ingest_site, FeedFetcher};
use tracing::{error, info, warn};

use crate::adapters::{StoreHistory, StoreSubscriptions};
use crate::Services;

/// Run one `rssdownload` cycle: ingest every enabled site, reconcile
/// candidates against subscriptions, plan downloads, and drive them through
/// the torrent client.
pub async fn rssdownload(services: &Services) {
    if let Err(error) = try_rssdownload(services).await {
        error!(%error, "rssdownload job failed");
    }
}

async fn try_rssdownload(services: &Services) -> anyhow::Result<()> {
    let history = StoreHistory::new(services.store.clone());
    let fetcher = FeedFetcher::new();
    let subscriptions = services.store.subscriptions().list_all().await?;
    let mut gap_map = GapMap::new();
    let mut accepted = Vec::new();

    let site_count = services.config.sites.len();
    for (index, site) in services.config.sites.iter().enumerate() {
        if !site.enabled {
            continue;
        }
        // Earlier-listed sites carry higher priority, per the config's documented ordering.
        let site_priority = i32::try_from(site_count - index).unwrap_or(i32::MAX);

        match ingest_site(&fetcher, site, site_priority, &services.config.rss_rule.note).await {
            Ok(candidates) => {
                for candidate in candidates {
                    let outcome = reconcile_candidate(
                        candidate,
                        &subscriptions,
                        &mut gap_map,
                        &history,
                        &services.resolver,
                        &services.probe,
                    )
                    .await;
                    match outcome {
                        ReconcileOutcome::Accepted(candidate) => accepted.push(candidate),
                        ReconcileOutcome::Retired(title_key) => {
                            retire_subscription(services, &title_key).await;
                        }
                        ReconcileOutcome::Dropped(_reason) => {}
                    }
                }
            }
            Err(error) => {
                warn!(site = %site.name, %error, "feed fetch or parse failed; skipping this site for the cycle");
                services.events.publish(Event::FeedSkipped {
                    site: site.name.clone(),
                    reason: error.to_string(),
                });
            }
        }
    }

    let planned = plan(accepted, &mut gap_map);
    let driver = DownloadDriver::new(&services.client, &services.config.pt.pt_tag);
    for item in planned {
        let title_key = item.candidate.media.title_key.clone();
        match driver.drive(item).await {
            Ok(DriveOutcome::Queued { handle, partial }) => {
                services.events.publish(Event::TorrentQueued {
                    handle: handle.to_string(),
                    title_key,
                    partial,
                });
            }
            Ok(DriveOutcome::Aborted { reason }) => {
                services.events.publish(Event::QueueAborted {
                    title_key,
                    reason: format!("{reason:?}"),
                });
            }
            Err(error) => {
                warn!(%error, "torrent-client call failed while driving a planned download");
            }
        }
    }

    Ok(())
}

async fn retire_subscription(services: &Services, title_key: &str) {
    if let Err(error) = services.store.subscriptions().remove(title_key).await {
        warn!(%error, "failed to remove a retired subscription");
    }
    if let Err(error) = services.store.rss_history().clear_for_title(title_key).await {
        warn!(%error, "failed to clear history for a retired subscription");
    }
    services.events.publish(Event::SubscriptionRetired {
        title_key: title_key.to_string(),
    });
}

/// Run one `pt_transfer` cycle: sweep completed, tagged torrents out to
/// external storage.
pub async fn pt_transfer(services: &Services) {
    if let Err(error) = try_pt_transfer(services).await {
        error!(%error, "pt_transfer job failed");
    }
}

async fn try_pt_transfer(services: &Services) -> anyhow::Result<()> {
    let tag = services
        .config
        .pt
        .pt_monitor_only
        .then(|| services.config.pt.pt_tag.clone());
    let worker = TransferWorker::new(&services.client, &services.transfer, tag);
    let attempted = worker.sweep().await?;
    info!(attempted, "transfer sweep complete");
    Ok(())
}

/// Run one `pt_removetorrents` cycle: delete torrents past their configured
/// seeding window.
pub async fn pt_removetorrents(services: &Services) {
    if let Err(error) = try_pt_removetorrents(services).await {
        error!(%error, "pt_removetorrents job failed");
    }
}

async fn try_pt_removetorrents(services: &Services) -> anyhow::Result<()> {
    let tag = services
        .config
        .pt
        .pt_monitor_only
        .then(|| services.config.pt.pt_tag.clone());
    let reaper = SeedingReaper::new(
        &services.client,
        Some(services.config.pt.seeding_time_secs()),
        tag,
    );
    let reaped = reaper.sweep().await?;
    info!(reaped, "seeding reaper sweep complete");
    Ok(())
}

/// Run one on-demand retry pass over every subscription pending research.
pub async fn retry(services: &Services) {
    let repository = StoreSubscriptions::new(services.store.clone());
    RssRetry::new(&repository, &services.searcher).run().await;
}
