//! Port for the best-effort live notification side channel.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{AffiliationGroup, NotificationEvent};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification publishers.
    pub enum NotificationPublisherError {
        /// The broadcast transport is not accepting events.
        Unavailable { message: String } =>
            "notification channel unavailable: {message}",
    }
}

/// Fire-and-forget broadcast to an affiliation group.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Deliver `event` to current members of `group`.
    ///
    /// Returns how many listeners accepted the event. A group without
    /// listeners yields `Ok(0)`.
    async fn publish(
        &self,
        group: &AffiliationGroup,
        event: Arc<NotificationEvent>,
    ) -> Result<usize, NotificationPublisherError>;
}
