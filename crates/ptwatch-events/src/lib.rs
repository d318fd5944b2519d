#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Domain event bus observing the three scheduler jobs (`rssdownload`,
//! `pt_transfer`, `pt_removetorrents`) and the RSS retry path.
//!
//! Built on `tokio::broadcast` with a bounded in-memory replay ring, the same
//! shape the teacher workspace uses for its own event bus: events are cheap
//! to drop under backpressure (the oldest are evicted first) because nothing
//! here is safety-critical, only observability.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::sync::broadcast::{Receiver, Sender};
use tracing::error;

/// Sequential identifier assigned to each published event.
pub type EventId = u64;

const DEFAULT_REPLAY_CAPACITY: usize = 512;

/// Domain events surfaced by the scheduler jobs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A torrent was queued with the torrent client.
    TorrentQueued {
        /// Handle assigned by the backend.
        handle: String,
        /// `title_key` of the media this torrent satisfies.
        title_key: String,
        /// Whether this was a full-season/movie download or a partial selection.
        partial: bool,
    },
    /// A download driver item was aborted (backend inconsistency or empty selection).
    QueueAborted {
        /// `title_key` of the media this torrent would have satisfied.
        title_key: String,
        /// Human-readable reason for the abort.
        reason: String,
    },
    /// A subscription's gap closed and the row was retired.
    SubscriptionRetired {
        /// `title_key` of the retired subscription.
        title_key: String,
    },
    /// A completed torrent was handed off to the external transfer step.
    Transferred {
        /// Handle of the transferred torrent.
        handle: String,
        /// Whether the external transfer call reported success.
        success: bool,
    },
    /// A torrent was deleted by the seeding-time reaper.
    Reaped {
        /// Handle of the reaped torrent.
        handle: String,
    },
    /// A subscription's retry search transitioned to a new state.
    RetryTransitioned {
        /// `title_key` of the subscription.
        title_key: String,
        /// New state, as its short code (`"R"`, `"D"`, `"S"`).
        state: &'static str,
    },
    /// An RSS feed fetch or parse failed and was skipped.
    FeedSkipped {
        /// Configured site name.
        site: String,
        /// Human-readable reason.
        reason: String,
    },
}

/// Metadata wrapper around a published event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EventEnvelope {
    /// Monotonic identifier assigned to the wrapped event.
    pub id: EventId,
    /// Timestamp recording when the envelope was produced.
    pub timestamp: DateTime<Utc>,
    /// Wrapped event payload.
    pub event: Event,
}

/// Shared event bus built on top of `tokio::broadcast`.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    buffer: Arc<Mutex<VecDeque<EventEnvelope>>>,
    next_id: Arc<std::sync::atomic::AtomicU64>,
    replay_capacity: usize,
}

impl EventBus {
    /// Construct a new bus with the provided broadcast/replay capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "event bus capacity must be positive");
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            next_id: Arc::new(std::sync::atomic::AtomicU64::new(1)),
            replay_capacity: capacity,
        }
    }

    /// Construct a bus with the default in-memory buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Publish a new event, assigning it a sequential identifier.
    ///
    /// # Panics
    ///
    /// Panics if the replay buffer mutex has been poisoned.
    pub fn publish(&self, event: Event) -> EventId {
        let id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };

        {
            let mut buffer = self.lock_buffer();
            if buffer.len() == self.replay_capacity {
                buffer.pop_front();
            }
            buffer.push_back(envelope.clone());
        }

        let _ = self.sender.send(envelope);
        id
    }

    /// Subscribe to the bus; no backlog is replayed (scheduler jobs only care
    /// about events published after they start observing).
    #[must_use]
    pub fn subscribe(&self) -> EventStream {
        EventStream {
            receiver: self.sender.subscribe(),
        }
    }

    fn lock_buffer(&self) -> MutexGuard<'_, VecDeque<EventEnvelope>> {
        match self.buffer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("event buffer mutex poisoned; continuing with recovered guard");
                poisoned.into_inner()
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream wrapper around the live broadcast channel.
pub struct EventStream {
    receiver: Receiver<EventEnvelope>,
}

impl EventStream {
    /// Receive the next event, tolerating lag by skipping to the latest available.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        match self.receiver.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(_)) => self.receiver.recv().await.ok(),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_assigns_sequential_ids() {
        let bus = EventBus::with_capacity(8);
        let first = bus.publish(Event::Reaped {
            handle: "h1".to_string(),
        });
        let second = bus.publish(Event::Reaped {
            handle: "h2".to_string(),
        });
        assert_eq!(second, first + 1);
    }

    #[tokio::test]
    async fn subscriber_receives_published_events() {
        let bus = EventBus::with_capacity(8);
        let mut stream = bus.subscribe();
        bus.publish(Event::SubscriptionRetired {
            title_key: "show::2020".to_string(),
        });
        let envelope = stream.next().await.expect("event delivered");
        assert_eq!(
            envelope.event,
            Event::SubscriptionRetired {
                title_key: "show::2020".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn stream_ends_after_bus_dropped() {
        let mut stream = {
            let bus = EventBus::with_capacity(1);
            let stream = bus.subscribe();
            drop(bus);
            stream
        };
        assert!(stream.next().await.is_none());
    }
}
