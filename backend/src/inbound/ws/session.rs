//! Per-connection WebSocket handler.
//!
//! A session registers with the notification feed on connect, joins college
//! groups on request, forwards broadcast events as `new-product` frames, and
//! deregisters on exit whatever the reason. The public contract pings every
//! 5s and drops a connection after 10s without client traffic. Tests shorten
//! both intervals.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, info, warn};

use crate::domain::ports::{FeedSubscription, ListenerId, NotificationFeed};
use crate::domain::{AffiliationGroup, NotificationEvent};
use crate::inbound::ws::messages::{ClientFrame, FrameError, JoinedRoom, ServerFrame};

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

const BLANK_COLLEGE_MESSAGE: &str = "College name is required";

pub(super) async fn handle_ws_session(
    feed: Arc<dyn NotificationFeed>,
    session: Session,
    stream: MessageStream,
) {
    let FeedSubscription { listener, events } = feed.connect().await;
    debug!(%listener, "notification listener connected");
    let reason = Listener {
        feed: Arc::clone(&feed),
        id: listener,
        session,
        last_seen: Instant::now(),
    }
    .serve(stream, events)
    .await;
    feed.disconnect(listener).await;
    debug!(%listener, reason, "notification listener disconnected");
}

/// Why a listener loop ended.
enum Shutdown {
    ClientClosed(Option<CloseReason>),
    StreamEnded,
    FeedClosed,
    Silent,
    Protocol(ProtocolError),
    MalformedFrame,
    SendFailed(Closed),
}

impl Shutdown {
    fn label(&self) -> &'static str {
        match self {
            Self::ClientClosed(_) => "client_closed",
            Self::StreamEnded => "stream_ended",
            Self::FeedClosed => "feed_closed",
            Self::Silent => "heartbeat_timeout",
            Self::Protocol(_) => "protocol_error",
            Self::MalformedFrame => "malformed_frame",
            Self::SendFailed(_) => "send_failed",
        }
    }

    /// Close frame to send, or `None` when the socket is already unusable.
    /// A client-initiated close is echoed back unchanged.
    fn close_reason(self) -> Option<Option<CloseReason>> {
        let reason = |code, description: &str| {
            Some(Some(CloseReason {
                code,
                description: Some(description.to_owned()),
            }))
        };
        match self {
            Self::Silent => reason(CloseCode::Normal, "heartbeat timeout"),
            Self::Protocol(_) => reason(CloseCode::Protocol, "protocol error"),
            Self::MalformedFrame => reason(CloseCode::Policy, "invalid payload"),
            Self::FeedClosed => reason(CloseCode::Away, "server shutting down"),
            Self::ClientClosed(echo) => Some(echo),
            Self::StreamEnded | Self::SendFailed(_) => None,
        }
    }
}

/// One connected client: its feed registration and socket.
struct Listener {
    feed: Arc<dyn NotificationFeed>,
    id: ListenerId,
    session: Session,
    last_seen: Instant,
}

impl Listener {
    async fn serve(
        mut self,
        mut stream: MessageStream,
        mut events: mpsc::Receiver<Arc<NotificationEvent>>,
    ) -> &'static str {
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        let shutdown = loop {
            let step = tokio::select! {
                _ = heartbeat.tick() => self.beat().await,
                message = stream.recv() => match message {
                    Some(Ok(message)) => self.receive(message).await,
                    Some(Err(error)) => Err(Shutdown::Protocol(error)),
                    None => Err(Shutdown::StreamEnded),
                },
                event = events.recv() => match event {
                    Some(event) => self
                        .send(&ServerFrame::NewProduct(&event))
                        .await
                        .map_err(Shutdown::SendFailed),
                    None => Err(Shutdown::FeedClosed),
                },
            };
            if let Err(shutdown) = step {
                break shutdown;
            }
        };

        match &shutdown {
            Shutdown::Silent => warn!(listener = %self.id, "heartbeat timeout; closing connection"),
            Shutdown::Protocol(error) => warn!(listener = %self.id, %error, "websocket protocol error"),
            Shutdown::SendFailed(error) => warn!(listener = %self.id, %error, "websocket send failed"),
            Shutdown::FeedClosed => info!(listener = %self.id, "notification feed closed"),
            Shutdown::MalformedFrame | Shutdown::ClientClosed(_) | Shutdown::StreamEnded => {}
        }
        let label = shutdown.label();
        if let Some(reason) = shutdown.close_reason() {
            if let Err(error) = self.session.close(reason).await {
                debug!(listener = %self.id, %error, reason = label, "close frame not sent");
            }
        }
        label
    }

    async fn beat(&mut self) -> Result<(), Shutdown> {
        if self.last_seen.elapsed() > CLIENT_TIMEOUT {
            return Err(Shutdown::Silent);
        }
        self.session.ping(b"").await.map_err(Shutdown::SendFailed)
    }

    async fn receive(&mut self, message: Message) -> Result<(), Shutdown> {
        if let Message::Close(reason) = message {
            return Err(Shutdown::ClientClosed(reason));
        }
        self.last_seen = Instant::now();
        match message {
            Message::Ping(payload) => self
                .session
                .pong(&payload)
                .await
                .map_err(Shutdown::SendFailed),
            Message::Text(text) => {
                let frame = serde_json::from_str::<ClientFrame>(&text).map_err(|error| {
                    warn!(listener = %self.id, %error, "rejected malformed client frame");
                    Shutdown::MalformedFrame
                })?;
                match frame {
                    ClientFrame::JoinCollege(college) => self.join_college(&college).await,
                }
                .map_err(Shutdown::SendFailed)
            }
            _ => Ok(()),
        }
    }

    async fn join_college(&mut self, college: &str) -> Result<(), Closed> {
        let Some(group) = AffiliationGroup::from_affiliation(college) else {
            return self
                .send(&ServerFrame::Error(FrameError {
                    message: BLANK_COLLEGE_MESSAGE,
                }))
                .await;
        };

        self.feed.join(self.id, group.clone()).await;
        info!(listener = %self.id, %group, "listener joined college group");
        self.send(&ServerFrame::Joined(JoinedRoom {
            room: group.as_str(),
        }))
        .await
    }

    async fn send(&mut self, frame: &ServerFrame<'_>) -> Result<(), Closed> {
        match serde_json::to_string(frame) {
            Ok(body) => self.session.text(body).await,
            Err(error) => {
                warn!(listener = %self.id, %error, "failed to serialise server frame");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
