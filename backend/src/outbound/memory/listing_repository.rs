//! Listing repository held in process memory.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::warn;

use crate::domain::ports::{ListingRepository, ListingRepositoryError, SellerDirectory};
use crate::domain::{
    Listing, ListingFilter, ListingId, ListingPage, ListingSort, ListingStatus, PopulatedListing,
};

/// Map-backed `ListingRepository`. Seller summaries come from `D`.
pub struct InMemoryListingRepository<D> {
    listings: Arc<RwLock<HashMap<ListingId, Listing>>>,
    sellers: Arc<D>,
}

impl<D> Clone for InMemoryListingRepository<D> {
    fn clone(&self) -> Self {
        Self {
            listings: Arc::clone(&self.listings),
            sellers: Arc::clone(&self.sellers),
        }
    }
}

impl<D: SellerDirectory> InMemoryListingRepository<D> {
    pub fn new(sellers: Arc<D>) -> Self {
        Self {
            listings: Arc::new(RwLock::new(HashMap::new())),
            sellers,
        }
    }

    /// Number of stored listings, whatever their status.
    pub async fn len(&self) -> usize {
        self.listings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.listings.read().await.is_empty()
    }
}

fn matches(listing: &Listing, filter: &ListingFilter) -> bool {
    let price = listing.price.amount();
    listing.status() == ListingStatus::Active
        && filter
            .category
            .as_deref()
            .is_none_or(|category| listing.category == category)
        && filter.min_price.is_none_or(|min| price >= min)
        && filter.max_price.is_none_or(|max| price <= max)
        && filter.matches_search(listing)
}

/// Descending order on the sort key, newest first on ties, then by id.
fn browse_order(sort: ListingSort, a: &Listing, b: &Listing) -> Ordering {
    let by_key = match sort {
        ListingSort::CreatedAt => Ordering::Equal,
        ListingSort::UpdatedAt => b.updated_at.cmp(&a.updated_at),
        ListingSort::Price => b.price.amount().total_cmp(&a.price.amount()),
        ListingSort::Views => b.views().cmp(&a.views()),
    };
    by_key
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id().as_uuid().cmp(b.id().as_uuid()))
}

#[async_trait]
impl<D: SellerDirectory + 'static> ListingRepository for InMemoryListingRepository<D> {
    async fn create(&self, listing: &Listing) -> Result<Listing, ListingRepositoryError> {
        let mut listings = self.listings.write().await;
        if listings.contains_key(&listing.id()) {
            return Err(ListingRepositoryError::query(format!(
                "listing {} already exists",
                listing.id()
            )));
        }
        listings.insert(listing.id(), listing.clone());
        Ok(listing.clone())
    }

    async fn populate(&self, listing: Listing) -> Result<PopulatedListing, ListingRepositoryError> {
        let seller = self
            .sellers
            .find_summary(&listing.seller())
            .await
            .map_err(|err| ListingRepositoryError::query(err.to_string()))?
            .ok_or_else(|| {
                ListingRepositoryError::query(format!("seller {} not found", listing.seller()))
            })?;
        Ok(PopulatedListing { listing, seller })
    }

    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, ListingRepositoryError> {
        Ok(self.listings.read().await.get(id).cloned())
    }

    async fn list(&self, filter: &ListingFilter) -> Result<ListingPage, ListingRepositoryError> {
        let mut matching: Vec<Listing> = self
            .listings
            .read()
            .await
            .values()
            .filter(|listing| matches(listing, filter))
            .cloned()
            .collect();
        matching.sort_by(|a, b| browse_order(filter.sort, a, b));

        let total = matching.len() as u64;
        let offset = usize::try_from(filter.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(filter.limit).unwrap_or(usize::MAX);
        let mut listings = Vec::new();
        for listing in matching.into_iter().skip(offset).take(limit) {
            let seller = self
                .sellers
                .find_summary(&listing.seller())
                .await
                .map_err(|err| ListingRepositoryError::query(err.to_string()))?;
            let Some(seller) = seller else {
                warn!(listing_id = %listing.id(), "skipping listing whose seller no longer exists");
                continue;
            };
            listings.push(PopulatedListing { listing, seller });
        }
        Ok(ListingPage { listings, total })
    }

    async fn increment_views(
        &self,
        id: &ListingId,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut listings = self.listings.write().await;
        Ok(listings.get_mut(id).map(|listing| {
            listing.record_view();
            listing.clone()
        }))
    }

    async fn update_status(
        &self,
        id: &ListingId,
        expected: ListingStatus,
        next: ListingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut listings = self.listings.write().await;
        let Some(listing) = listings.get_mut(id) else {
            return Ok(None);
        };
        if listing.status() != expected {
            return Ok(None);
        }
        listing
            .transition_status(next, updated_at)
            .map_err(|err| ListingRepositoryError::query(err.to_string()))?;
        Ok(Some(listing.clone()))
    }

    async fn update_details(
        &self,
        listing: &Listing,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut listings = self.listings.write().await;
        let Some(stored) = listings.get_mut(&listing.id()) else {
            return Ok(None);
        };
        stored.title.clone_from(&listing.title);
        stored.description.clone_from(&listing.description);
        stored.price = listing.price;
        stored.category.clone_from(&listing.category);
        stored.condition = listing.condition;
        stored.meetup_location.clone_from(&listing.meetup_location);
        stored.updated_at = listing.updated_at;
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: &ListingId) -> Result<bool, ListingRepositoryError> {
        Ok(self.listings.write().await.remove(id).is_some())
    }
}
