//! Translates planned downloads into torrent-client calls.

use std::time::Duration;

use ptwatch_core::{ClientResult, MediaType, TorrentClient, TorrentHandle};
use ptwatch_planner::{DownloadDirective, PlannedItem};
use tracing::{info, warn};

use crate::episode_extractor::extract_episodes;

/// Legacy tag some torrents may still carry from a prior management tool.
const LEGACY_NASTOOL_TAG: &str = "NASTOOL";

/// Bound on the wait for qBittorrent-style handle resolution by tag.
const HANDLE_RESOLUTION_WAIT: Duration = Duration::from_secs(10);

/// Outcome of driving one planned item through the torrent client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveOutcome {
    /// The torrent was queued.
    Queued {
        /// Handle assigned by the backend.
        handle: TorrentHandle,
        /// Whether this was a partial (per-file) selection.
        partial: bool,
    },
    /// The item was abandoned; nothing was queued.
    Aborted {
        /// Why the item was abandoned.
        reason: AbortReason,
    },
}

/// Why a planned item was abandoned before or during driving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// The handle never resolved within the wait window.
    BackendInconsistency,
    /// File-level selection yielded zero files to download.
    PartialSelectionEmpty,
}

/// Drives planner output through a [`TorrentClient`].
pub struct DownloadDriver<'a, C: TorrentClient> {
    client: &'a C,
    pt_tag: &'a str,
}

impl<'a, C: TorrentClient> DownloadDriver<'a, C> {
    /// Construct a driver against a client and the tag used for full downloads.
    #[must_use]
    pub const fn new(client: &'a C, pt_tag: &'a str) -> Self {
        Self { client, pt_tag }
    }

    /// Drive a single planned item to completion (queued or aborted).
    ///
    /// # Errors
    ///
    /// Returns an error only for client calls that are not part of the
    /// documented abort paths (§7 `BackendInconsistency`/`PartialSelectionEmpty`
    /// are represented as `Aborted`, not `Err`).
    pub async fn drive(&self, item: PlannedItem) -> ClientResult<DriveOutcome> {
        match item.directive {
            DownloadDirective::FullDownload => self.drive_full(&item.candidate.enclosure, item.candidate.media.kind).await,
            DownloadDirective::PartialDownload { target } => {
                self.drive_partial(&item.candidate.enclosure, item.candidate.media.kind, &target)
                    .await
            }
        }
    }

    async fn drive_full(&self, url: &str, media_type: MediaType) -> ClientResult<DriveOutcome> {
        let handle = self
            .client
            .add(url, media_type, false, Some(self.pt_tag))
            .await?;
        match handle {
            Some(handle) => {
                info!(%handle, "queued full download");
                Ok(DriveOutcome::Queued {
                    handle,
                    partial: false,
                })
            }
            None => match self.client.resolve_by_tag(self.pt_tag).await? {
                Some(handle) => Ok(DriveOutcome::Queued {
                    handle,
                    partial: false,
                }),
                None => Ok(DriveOutcome::Aborted {
                    reason: AbortReason::BackendInconsistency,
                }),
            },
        }
    }

    async fn drive_partial(
        &self,
        url: &str,
        media_type: MediaType,
        target: &[u32],
    ) -> ClientResult<DriveOutcome> {
        let unique_tag = unique_tag();
        let handle = self.client.add(url, media_type, true, Some(&unique_tag)).await?;

        let handle = match handle {
            Some(handle) => handle,
            None => {
                tokio::time::sleep(HANDLE_RESOLUTION_WAIT).await;
                match self.client.resolve_by_tag(&unique_tag).await? {
                    Some(handle) => handle,
                    None => {
                        warn!(tag = %unique_tag, "handle never resolved; leaving the half-added torrent in place");
                        return Ok(DriveOutcome::Aborted {
                            reason: AbortReason::BackendInconsistency,
                        });
                    }
                }
            }
        };

        self.client.remove_tag(&handle, LEGACY_NASTOOL_TAG).await?;

        let files = self.client.list_files(&handle).await?;
        let mut selected = Vec::new();
        let mut unselected = Vec::new();
        for file in &files {
            let episodes = extract_episodes(&file.name);
            if !episodes.is_empty() && episodes.iter().all(|episode| target.contains(episode)) {
                selected.push(file.id);
            } else {
                unselected.push(file.id);
            }
        }

        if selected.is_empty() {
            self.client.delete(&handle, true).await?;
            return Ok(DriveOutcome::Aborted {
                reason: AbortReason::PartialSelectionEmpty,
            });
        }

        self.client
            .set_file_selection(&handle, &selected, &unselected)
            .await?;
        self.client.start(&handle).await?;

        Ok(DriveOutcome::Queued {
            handle,
            partial: true,
        })
    }
}

fn unique_tag() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|duration| duration.as_nanos())
        .unwrap_or_default();
    format!("ptwatch-{nanos}")
}
