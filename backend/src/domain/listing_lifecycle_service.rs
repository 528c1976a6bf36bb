//! Listing reads and owner-only mutations after creation.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AssetStore, ListingCommand, ListingQuery, ListingRepository, ListingRepositoryError,
};
use crate::domain::{
    AssetId, Error, Listing, ListingFilter, ListingId, ListingPage, ListingRules, ListingStatus,
    PopulatedListing, RawListingFields, SellerId, validate_changes,
};

fn map_repository_error(error: ListingRepositoryError) -> Error {
    match error {
        ListingRepositoryError::Connection { message } => {
            warn!(%message, "listing repository unavailable");
            Error::service_unavailable("Listing store is unavailable")
        }
        ListingRepositoryError::Query { message } => {
            warn!(%message, "listing repository query failed");
            Error::internal("Server error")
        }
    }
}

fn not_found() -> Error {
    Error::not_found("Product not found")
}

/// Domain service implementing [`ListingQuery`] and [`ListingCommand`].
#[derive(Clone)]
pub struct ListingLifecycleService<R, S> {
    listings: Arc<R>,
    assets: Arc<S>,
    clock: Arc<dyn Clock>,
    rules: ListingRules,
}

impl<R, S> ListingLifecycleService<R, S> {
    pub fn new(listings: Arc<R>, assets: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            listings,
            assets,
            clock,
            rules: ListingRules::default(),
        }
    }

    /// Validate owner edits against `rules` instead of the defaults.
    pub fn with_rules(mut self, rules: ListingRules) -> Self {
        self.rules = rules;
        self
    }
}

impl<R, S> ListingLifecycleService<R, S>
where
    R: ListingRepository,
    S: AssetStore,
{
    /// Load a listing the caller owns.
    async fn owned_listing(&self, caller: &SellerId, id: &ListingId) -> Result<Listing, Error> {
        let listing = self
            .listings
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(not_found)?;
        if !listing.is_owned_by(caller) {
            return Err(Error::forbidden("Not authorized"));
        }
        Ok(listing)
    }
}

#[async_trait]
impl<R, S> ListingQuery for ListingLifecycleService<R, S>
where
    R: ListingRepository,
    S: AssetStore,
{
    async fn get(&self, id: &ListingId) -> Result<PopulatedListing, Error> {
        let listing = self
            .listings
            .increment_views(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(not_found)?;
        self.listings
            .populate(listing)
            .await
            .map_err(map_repository_error)
    }

    async fn list(&self, filter: ListingFilter) -> Result<ListingPage, Error> {
        self.listings
            .list(&filter)
            .await
            .map_err(map_repository_error)
    }

    async fn image(&self, asset: &AssetId) -> Result<Vec<u8>, Error> {
        self.assets
            .read(asset)
            .await
            .map_err(|err| {
                warn!(%asset, error = %err, "failed to read image");
                Error::internal("Failed to read image")
            })?
            .ok_or_else(|| Error::not_found("Image not found"))
    }
}

#[async_trait]
impl<R, S> ListingCommand for ListingLifecycleService<R, S>
where
    R: ListingRepository,
    S: AssetStore,
{
    async fn update(
        &self,
        caller: &SellerId,
        id: &ListingId,
        fields: RawListingFields,
    ) -> Result<PopulatedListing, Error> {
        let changes = validate_changes(&fields, &self.rules).map_err(|violations| {
            info!(listing_id = %id, violations = violations.len(), "listing edit rejected");
            Error::validation(violations)
        })?;
        let mut listing = self.owned_listing(caller, id).await?;

        if listing.apply_changes(changes, self.clock.utc()) {
            listing = self
                .listings
                .update_details(&listing)
                .await
                .map_err(map_repository_error)?
                .ok_or_else(not_found)?;
            info!(listing_id = %id, "listing details updated");
        }

        self.listings
            .populate(listing)
            .await
            .map_err(map_repository_error)
    }

    async fn mark_sold(&self, caller: &SellerId, id: &ListingId) -> Result<PopulatedListing, Error> {
        let listing = self.owned_listing(caller, id).await?;
        let from = listing.status();
        from.transition_to(ListingStatus::Sold)
            .map_err(|err| Error::conflict(err.to_string()))?;

        let updated = self
            .listings
            .update_status(id, from, ListingStatus::Sold, self.clock.utc())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::conflict("Product is no longer active"))?;
        info!(listing_id = %id, "listing marked sold");

        self.listings
            .populate(updated)
            .await
            .map_err(map_repository_error)
    }

    async fn remove(&self, caller: &SellerId, id: &ListingId) -> Result<(), Error> {
        let listing = self.owned_listing(caller, id).await?;
        let deleted = self
            .listings
            .delete(id)
            .await
            .map_err(map_repository_error)?;
        if !deleted {
            return Err(not_found());
        }
        info!(listing_id = %id, "listing deleted");

        // The record is gone, so its files are orphans now; failures are logged only.
        for asset in listing.images.as_slice() {
            if let Err(err) = self.assets.delete(asset).await {
                warn!(listing_id = %id, %asset, error = %err, "failed to delete listing image");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "listing_lifecycle_service_tests.rs"]
mod tests;
