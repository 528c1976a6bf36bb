//! Driving port for reading listings and their images.

use async_trait::async_trait;

use crate::domain::{AssetId, Error, ListingFilter, ListingId, ListingPage, PopulatedListing};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingQuery: Send + Sync {
    /// Fetch one listing, counting the read as a view.
    async fn get(&self, id: &ListingId) -> Result<PopulatedListing, Error>;

    /// Browse active listings.
    async fn list(&self, filter: ListingFilter) -> Result<ListingPage, Error>;

    /// Raw bytes of a stored image.
    async fn image(&self, asset: &AssetId) -> Result<Vec<u8>, Error>;
}
