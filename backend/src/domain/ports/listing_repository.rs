//! Port for durable listing storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Listing, ListingFilter, ListingId, ListingPage, ListingStatus, PopulatedListing,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by listing repository adapters.
    pub enum ListingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "listing repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "listing repository query failed: {message}",
    }
}

/// Port for creating, reading, and mutating listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Insert a new listing and return the stored record.
    async fn create(&self, listing: &Listing) -> Result<Listing, ListingRepositoryError>;

    /// Attach the seller summary fields to a stored listing.
    async fn populate(&self, listing: Listing) -> Result<PopulatedListing, ListingRepositoryError>;

    /// Find a listing by id.
    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, ListingRepositoryError>;

    /// Page through active listings, newest first.
    async fn list(&self, filter: &ListingFilter) -> Result<ListingPage, ListingRepositoryError>;

    /// Add one view and return the updated listing, or `None` when missing.
    async fn increment_views(
        &self,
        id: &ListingId,
    ) -> Result<Option<Listing>, ListingRepositoryError>;

    /// Move a listing from `expected` to `next`.
    ///
    /// Returns the updated listing, or `None` when the listing is missing or
    /// no longer in `expected`.
    async fn update_status(
        &self,
        id: &ListingId,
        expected: ListingStatus,
        next: ListingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Listing>, ListingRepositoryError>;

    /// Persist the descriptive fields and `updated_at` of `listing`.
    ///
    /// Status, seller, images, and views are never written. Returns the
    /// stored listing, or `None` when it no longer exists.
    async fn update_details(
        &self,
        listing: &Listing,
    ) -> Result<Option<Listing>, ListingRepositoryError>;

    /// Remove a listing. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &ListingId) -> Result<bool, ListingRepositoryError>;
}
