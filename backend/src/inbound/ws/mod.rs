//! WebSocket inbound adapter for live new-product notifications.
//!
//! Responsibilities:
//! - validate upgrade requests against the configured origin allow-list
//! - spawn one session task per connection
//! - keep WebSocket-specific concerns at the edge of the system

use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderMap, ORIGIN};
use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, ResponseError, get, rt};
use tracing::{error, warn};
use url::Url;

mod session;

pub mod messages;
pub mod state;

use crate::domain::TraceId;
use state::{OriginPolicy, WsState};

/// Reasons an upgrade request is refused before the handshake.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
enum OriginRejection {
    #[error("Origin not allowed")]
    Missing,
    #[error("Invalid Origin header")]
    Repeated,
    #[error("Invalid Origin header")]
    Unreadable,
    #[error("Origin not allowed")]
    Disallowed(String),
}

impl ResponseError for OriginRejection {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Missing | Self::Disallowed(_) => StatusCode::FORBIDDEN,
            Self::Repeated | Self::Unreadable => StatusCode::BAD_REQUEST,
        }
    }
}

/// Accept exactly one `Origin` header naming a permitted origin.
fn check_origin(headers: &HeaderMap, policy: &OriginPolicy) -> Result<(), OriginRejection> {
    let mut values = headers.get_all(ORIGIN);
    let value = values.next().ok_or(OriginRejection::Missing)?;
    if values.next().is_some() {
        return Err(OriginRejection::Repeated);
    }
    let raw = value.to_str().map_err(|_| OriginRejection::Unreadable)?;
    let origin = Url::parse(raw).map_err(|_| OriginRejection::Unreadable)?;
    if policy.permits(&origin) {
        Ok(())
    } else {
        Err(OriginRejection::Disallowed(raw.to_owned()))
    }
}

/// Upgrade `/ws` to a live notification session.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    check_origin(req.headers(), &state.origins).inspect_err(|rejection| match rejection {
        OriginRejection::Disallowed(origin) => warn!(%origin, "websocket origin not allowed"),
        other => warn!(?other, "websocket upgrade without a usable Origin header"),
    })?;

    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(%error, "websocket upgrade failed");
        actix_web::error::ErrorBadRequest("WebSocket upgrade failed")
    })?;
    rt::spawn(TraceId::propagate(session::handle_ws_session(
        state.feed.clone(),
        session,
        messages,
    )));
    Ok(response)
}
