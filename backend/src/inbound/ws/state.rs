//! Shared WebSocket adapter state.
//!
//! The adapter depends on the [`NotificationFeed`] port rather than on the
//! broadcast hub directly, so sessions can be tested against a mock feed.

use std::sync::Arc;

use url::Url;

use crate::domain::ports::NotificationFeed;

/// Origins permitted to open the live notification socket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginPolicy {
    allowed: Vec<String>,
    allow_localhost: bool,
}

impl OriginPolicy {
    /// Build a policy from configured origins such as `https://campus.example`.
    ///
    /// Entries that do not parse as URLs are dropped. Only the scheme, host,
    /// and port of each entry take part in matching.
    pub fn new<I, S>(origins: I, allow_localhost: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = origins
            .into_iter()
            .filter_map(|origin| Url::parse(origin.as_ref()).ok())
            .map(|url| url.origin().ascii_serialization())
            .filter(|origin| origin != "null")
            .collect();
        Self {
            allowed,
            allow_localhost,
        }
    }

    /// Returns true when `origin` is on the allow-list.
    ///
    /// Plain HTTP from `localhost` with a non-zero explicit port is accepted
    /// when local development origins are enabled.
    pub fn permits(&self, origin: &Url) -> bool {
        let Some(host) = origin.host_str() else {
            return false;
        };
        if self.allow_localhost && origin.scheme() == "http" && host == "localhost" {
            return matches!(origin.port(), Some(port) if port != 0);
        }
        if !matches!(origin.scheme(), "http" | "https") {
            return false;
        }
        let serialized = origin.origin().ascii_serialization();
        self.allowed.iter().any(|allowed| *allowed == serialized)
    }
}

/// Dependency bundle for the WebSocket entry point and sessions.
#[derive(Clone)]
pub struct WsState {
    pub feed: Arc<dyn NotificationFeed>,
    pub origins: Arc<OriginPolicy>,
}

impl WsState {
    /// Construct state from explicit port implementations.
    pub fn new(feed: Arc<dyn NotificationFeed>, origins: OriginPolicy) -> Self {
        Self {
            feed,
            origins: Arc::new(origins),
        }
    }
}
