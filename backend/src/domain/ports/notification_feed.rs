//! Driving port for live notification listeners.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{AffiliationGroup, NotificationEvent};

/// Handle identifying one connected listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// A registered listener and the receiving end of its event channel.
#[derive(Debug)]
pub struct FeedSubscription {
    pub listener: ListenerId,
    pub events: mpsc::Receiver<Arc<NotificationEvent>>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationFeed: Send + Sync {
    /// Register a listener that is not yet in any group.
    async fn connect(&self) -> FeedSubscription;

    /// Add a listener to a group. Joining twice is a no-op.
    async fn join(&self, listener: ListenerId, group: AffiliationGroup);

    /// Remove a listener from every group.
    async fn disconnect(&self, listener: ListenerId);
}
