//! Listing ingest service.
//!
//! Coordinates the three side effects of creating a listing: staged image
//! files, the durable listing record, and the live notification. Staged files
//! stay a liability until a persisted listing references them, so every
//! failure before that point deletes them before returning.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use mockable::Clock;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    AssetStore, ListingRepository, ListingRepositoryError, ListingSubmission,
    NotificationPublisher, SubmitListingRequest,
};
use crate::domain::{
    AffiliationGroup, AssetId, Error, FieldViolation, ImageSet, Listing, ListingId,
    ListingRules, NotificationEvent, PopulatedListing, SellerSummary, UploadedImage,
    validate_submission,
};

/// Message returned for any persistence failure; internal detail is logged only.
pub const PERSISTENCE_FAILED_MESSAGE: &str = "Server error while creating product";
/// Build the caller-facing error for a rejected submission.
pub fn validation_failed(violations: &[FieldViolation]) -> Error {
    Error::validation(violations.to_vec())
}

/// Domain service implementing [`ListingSubmission`].
#[derive(Clone)]
pub struct ListingIngestService<R, S, P> {
    listings: Arc<R>,
    assets: Arc<S>,
    publisher: Arc<P>,
    clock: Arc<dyn Clock>,
    rules: ListingRules,
}

impl<R, S, P> ListingIngestService<R, S, P> {
    /// Create a new ingest service.
    pub fn new(
        listings: Arc<R>,
        assets: Arc<S>,
        publisher: Arc<P>,
        clock: Arc<dyn Clock>,
        rules: ListingRules,
    ) -> Self {
        Self {
            listings,
            assets,
            publisher,
            clock,
            rules,
        }
    }
}

impl<R, S, P> ListingIngestService<R, S, P>
where
    R: ListingRepository,
    S: AssetStore,
    P: NotificationPublisher,
{
    async fn cleanup(&self, staged: &[AssetId], reason: &'static str) {
        for asset in staged {
            match self.assets.delete(asset).await {
                Ok(()) => debug!(%asset, reason, "staged asset deleted"),
                Err(err) => error!(%asset, reason, error = %err, "failed to delete staged asset"),
            }
        }
        if !staged.is_empty() {
            info!(count = staged.len(), reason, "staged assets cleaned up");
        }
    }

    /// Attach the seller summary, falling back to the caller identity when
    /// the store cannot populate the record it just wrote.
    async fn populate_or_fallback(
        &self,
        listing: Listing,
        request: &SubmitListingRequest,
    ) -> PopulatedListing {
        match self.listings.populate(listing.clone()).await {
            Ok(populated) => populated,
            Err(err) => {
                warn!(
                    listing_id = %listing.id(),
                    error = %err,
                    "could not populate seller; using caller identity"
                );
                PopulatedListing {
                    listing,
                    seller: SellerSummary::from(&request.seller),
                }
            }
        }
    }

    /// Best-effort broadcast. Neither an error nor a panic from the
    /// publisher leaves this function.
    async fn notify(&self, populated: &PopulatedListing, affiliation: &str) {
        let listing_id = populated.listing.id();
        let Some(group) = AffiliationGroup::from_affiliation(affiliation) else {
            debug!(%listing_id, "seller has no affiliation; skipping notification");
            return;
        };
        let event = Arc::new(NotificationEvent::new_product(populated, self.clock.utc()));

        let outcome = AssertUnwindSafe(async { self.publisher.publish(&group, event).await })
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(delivered)) => info!(%listing_id, %group, delivered, "listing notified"),
            Ok(Err(err)) => {
                warn!(%listing_id, %group, kind = err.kind(), error = %err, "notification failed");
            }
            Err(_) => error!(%listing_id, %group, "notification publisher panicked"),
        }
    }
}

#[async_trait]
impl<R, S, P> ListingSubmission for ListingIngestService<R, S, P>
where
    R: ListingRepository,
    S: AssetStore,
    P: NotificationPublisher,
{
    async fn stage_image(&self, image: UploadedImage) -> Result<AssetId, Error> {
        let size = image.bytes.len();
        let asset = self.assets.stage(image).await.map_err(|err| {
            error!(error = %err, "failed to stage image");
            Error::internal("Failed to store uploaded image")
        })?;
        info!(%asset, size, "image staged");
        Ok(asset)
    }

    async fn discard_staged(&self, staged: Vec<AssetId>) {
        self.cleanup(&staged, "upload aborted").await;
    }

    async fn submit(&self, request: SubmitListingRequest) -> Result<PopulatedListing, Error> {
        let seller_id = request.seller.id;

        if request.staged.len() > self.rules.max_images {
            self.cleanup(&request.staged, "too many images").await;
            return Err(validation_failed(&[FieldViolation {
                field: "images".to_owned(),
                message: format!("At most {} images are allowed", self.rules.max_images),
                value: None,
            }]));
        }

        let draft = match validate_submission(&request.fields, &self.rules) {
            Ok(draft) => draft,
            Err(violations) => {
                info!(%seller_id, violations = violations.len(), "submission failed validation");
                self.cleanup(&request.staged, "validation failed").await;
                return Err(validation_failed(&violations));
            }
        };
        debug!(%seller_id, "submission validated");

        let images = match ImageSet::new(request.staged.clone()) {
            Ok(images) => images,
            Err(err) => {
                self.cleanup(&request.staged, "image set rejected").await;
                return Err(Error::invalid_request(err.to_string()));
            }
        };

        let listing = Listing::new(
            ListingId::random(),
            draft,
            images,
            seller_id,
            self.clock.utc(),
        );

        let stored = match self.listings.create(&listing).await {
            Ok(stored) => stored,
            Err(err) => {
                log_persistence_failure(&listing, &err);
                self.cleanup(&request.staged, "persistence failed").await;
                return Err(Error::internal(PERSISTENCE_FAILED_MESSAGE));
            }
        };
        info!(
            listing_id = %stored.id(),
            %seller_id,
            images = stored.images.len(),
            "listing persisted"
        );

        let populated = self.populate_or_fallback(stored, &request).await;
        self.notify(&populated, &request.seller.affiliation).await;
        Ok(populated)
    }
}

fn log_persistence_failure(listing: &Listing, err: &ListingRepositoryError) {
    error!(
        listing_id = %listing.id(),
        seller_id = %listing.seller(),
        kind = err.kind(),
        error = %err,
        "failed to persist listing"
    );
}

#[cfg(test)]
#[path = "listing_ingest_service_tests.rs"]
mod tests;
