//! Bearer authentication extractor.
//!
//! Handlers that take [`Authenticated`] only run once the caller's identity
//! is resolved, which for uploads means before any part of the multipart
//! body is read or staged.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::domain::ports::IdentityError;
use crate::domain::{Error, SellerIdentity};

use super::state::HttpState;

const NO_TOKEN_MESSAGE: &str = "No token, authorization denied";

/// Verified identity of the calling seller.
#[derive(Debug, Clone)]
pub struct Authenticated(pub SellerIdentity);

impl Authenticated {
    pub fn into_inner(self) -> SellerIdentity {
        self.0
    }
}

/// Extract the credential from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_owned())
}

fn map_identity_error(error: IdentityError) -> Error {
    match error {
        IdentityError::Unavailable { message } => {
            warn!(%message, "identity lookup unavailable");
            Error::service_unavailable("Authentication is temporarily unavailable")
        }
        other => {
            debug!(reason = other.kind(), "bearer credential rejected");
            Error::unauthorized(other.to_string())
        }
    }
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req);
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let token = token.ok_or_else(|| Error::unauthorized(NO_TOKEN_MESSAGE))?;
            let identity = state
                .identity
                .resolve(&token)
                .await
                .map_err(map_identity_error)?;
            Ok(Authenticated(identity))
        })
    }
}
