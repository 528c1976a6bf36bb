//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{IdentityProvider, ListingCommand, ListingQuery, ListingSubmission};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityProvider>,
    pub submission: Arc<dyn ListingSubmission>,
    pub query: Arc<dyn ListingQuery>,
    pub command: Arc<dyn ListingCommand>,
}

impl HttpState {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        submission: Arc<dyn ListingSubmission>,
        query: Arc<dyn ListingQuery>,
        command: Arc<dyn ListingCommand>,
    ) -> Self {
        Self {
            identity,
            submission,
            query,
            command,
        }
    }
}
