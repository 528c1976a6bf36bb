//! Port for looking up sellers by id.

use async_trait::async_trait;

use crate::domain::{SellerId, SellerIdentity, SellerSummary};

use super::define_port_error;

define_port_error! {
    /// Errors raised by seller directory adapters.
    pub enum SellerDirectoryError {
        /// Directory connection could not be established.
        Connection { message: String } =>
            "seller directory connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "seller directory query failed: {message}",
    }
}

/// Read access to registered sellers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SellerDirectory: Send + Sync {
    /// Identity used for authorisation and notification routing.
    async fn find_identity(
        &self,
        id: &SellerId,
    ) -> Result<Option<SellerIdentity>, SellerDirectoryError>;

    /// Public summary attached to listing responses.
    async fn find_summary(
        &self,
        id: &SellerId,
    ) -> Result<Option<SellerSummary>, SellerDirectoryError>;
}
