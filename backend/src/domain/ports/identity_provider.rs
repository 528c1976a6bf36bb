//! Port resolving bearer credentials to seller identities.

use async_trait::async_trait;

use crate::domain::SellerIdentity;

use super::define_port_error;

define_port_error! {
    /// Reasons a bearer credential could not be resolved.
    pub enum IdentityError {
        /// Signature, format, or algorithm check failed.
        InvalidToken => "Invalid token",
        /// The credential is past its expiry.
        TokenExpired => "Token expired",
        /// The credential carries no usable seller id.
        InvalidPayload => "Invalid token payload",
        /// The credential names a seller that does not exist.
        UnknownSeller => "User not found",
        /// The seller lookup could not be completed.
        Unavailable { message: String } => "identity lookup failed: {message}",
    }
}

/// Verifies bearer credentials. Callers trust the returned identity fully.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<SellerIdentity, IdentityError>;
}
