//! In-process broadcast hub for live new-product notifications.
//!
//! Each connected listener owns a bounded channel. Publishing never waits: a
//! listener whose channel is full or closed simply misses the event, so a
//! slow socket cannot hold up listing creation.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

use crate::domain::ports::{
    FeedSubscription, ListenerId, NotificationFeed, NotificationPublisher,
    NotificationPublisherError,
};
use crate::domain::{AffiliationGroup, NotificationEvent};

/// Events buffered per listener before new ones are dropped.
pub const LISTENER_BUFFER: usize = 32;

#[derive(Default)]
struct Registry {
    senders: HashMap<ListenerId, mpsc::Sender<Arc<NotificationEvent>>>,
    groups: HashMap<AffiliationGroup, BTreeSet<ListenerId>>,
}

impl Registry {
    fn remove(&mut self, listener: ListenerId) {
        self.senders.remove(&listener);
        self.groups.retain(|_, members| {
            members.remove(&listener);
            !members.is_empty()
        });
    }
}

/// Shared hub implementing both sides of the live channel.
#[derive(Clone, Default)]
pub struct BroadcastHub {
    registry: Arc<RwLock<Registry>>,
    next_id: Arc<AtomicU64>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of listeners currently in `group`.
    pub async fn group_size(&self, group: &AffiliationGroup) -> usize {
        self.registry
            .read()
            .await
            .groups
            .get(group)
            .map_or(0, BTreeSet::len)
    }
}

#[async_trait]
impl NotificationFeed for BroadcastHub {
    async fn connect(&self) -> FeedSubscription {
        let listener = ListenerId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, events) = mpsc::channel(LISTENER_BUFFER);
        self.registry.write().await.senders.insert(listener, sender);
        FeedSubscription { listener, events }
    }

    async fn join(&self, listener: ListenerId, group: AffiliationGroup) {
        let mut registry = self.registry.write().await;
        if !registry.senders.contains_key(&listener) {
            debug!(%listener, %group, "ignoring join from disconnected listener");
            return;
        }
        registry.groups.entry(group).or_default().insert(listener);
    }

    async fn disconnect(&self, listener: ListenerId) {
        self.registry.write().await.remove(listener);
    }
}

#[async_trait]
impl NotificationPublisher for BroadcastHub {
    async fn publish(
        &self,
        group: &AffiliationGroup,
        event: Arc<NotificationEvent>,
    ) -> Result<usize, NotificationPublisherError> {
        let registry = self.registry.read().await;
        let Some(members) = registry.groups.get(group) else {
            return Ok(0);
        };

        let mut delivered = 0;
        for listener in members {
            let Some(sender) = registry.senders.get(listener) else {
                continue;
            };
            match sender.try_send(Arc::clone(&event)) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(%listener, %group, "listener buffer full; dropping event");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(%listener, %group, "listener gone; dropping event");
                }
            }
        }
        Ok(delivered)
    }
}
