//! Driving port for owner-only listing mutations.

use async_trait::async_trait;

use crate::domain::{Error, ListingId, PopulatedListing, RawListingFields, SellerId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingCommand: Send + Sync {
    /// Edit the descriptive fields of a listing. Only supplied fields are
    /// validated and changed.
    async fn update(
        &self,
        caller: &SellerId,
        id: &ListingId,
        fields: RawListingFields,
    ) -> Result<PopulatedListing, Error>;

    /// Mark an active listing as sold.
    async fn mark_sold(&self, caller: &SellerId, id: &ListingId) -> Result<PopulatedListing, Error>;

    /// Delete a listing and its images.
    async fn remove(&self, caller: &SellerId, id: &ListingId) -> Result<(), Error>;
}
