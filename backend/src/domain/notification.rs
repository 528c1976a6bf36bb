//! Live notification payloads. Events are never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AssetId, ListingId, PopulatedListing};

/// Kind tag carried in every notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    NewProduct,
}

/// Compact listing summary embedded in a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductSummary {
    #[schema(value_type = String, format = Uuid)]
    pub id: ListingId,
    pub title: String,
    pub price: f64,
    pub category: String,
    /// Seller display name.
    pub seller: String,
    pub college: String,
    /// First image of the listing, if any.
    #[schema(value_type = Option<String>)]
    pub image: Option<AssetId>,
}

/// A fan-out message broadcast to an affiliation group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NotificationEvent {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub product: ProductSummary,
    pub timestamp: DateTime<Utc>,
}

impl NotificationEvent {
    /// Announce a freshly persisted listing.
    pub fn new_product(populated: &PopulatedListing, now: DateTime<Utc>) -> Self {
        let PopulatedListing { listing, seller } = populated;
        Self {
            kind: NotificationKind::NewProduct,
            message: format!("New product listed: {}", listing.title),
            product: ProductSummary {
                id: listing.id(),
                title: listing.title.clone(),
                price: listing.price.amount(),
                category: listing.category.clone(),
                seller: seller.name.clone(),
                college: seller.college.clone(),
                image: listing.images.first().cloned(),
            },
            timestamp: now,
        }
    }
}
