//! Marketplace listing aggregate.
//!
//! A [`Listing`] is created once by the ingest service and afterwards only
//! changes through [`Listing::transition_status`], [`Listing::record_view`],
//! and [`Listing::apply_changes`]. The seller reference has no setter, and
//! owner edits never reach status or seller.

mod rules;
mod validation;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AssetId, SellerId, SellerSummary};

pub use rules::{ListingRules, MAX_LISTING_IMAGES};
pub use validation::{
    FieldViolation, ListingChanges, ListingDraft, RawListingFields, validate_changes,
    validate_submission,
};

/// Identifier of a persisted listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(Uuid);

impl ListingId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ListingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Errors raised by listing value constructors and state changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingError {
    #[error("price must be a finite, non-negative number")]
    InvalidPrice,
    #[error("a listing may carry at most {max} images, got {actual}")]
    TooManyImages { max: usize, actual: usize },
    #[error("cannot move a listing from {from} to {to}")]
    InvalidStatusTransition {
        from: ListingStatus,
        to: ListingStatus,
    },
    #[error("unknown {kind} value: {value}")]
    UnknownValue { kind: &'static str, value: String },
}

/// Asking price; finite and never negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    /// Validate a raw amount.
    pub fn new(amount: f64) -> Result<Self, ListingError> {
        if amount.is_finite() && amount >= 0.0 {
            Ok(Self(amount))
        } else {
            Err(ListingError::InvalidPrice)
        }
    }

    /// Raw amount.
    pub fn amount(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Price {
    type Error = ListingError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.0
    }
}

macro_rules! kebab_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant ),+
        }

        impl $name {
            /// Wire representation.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ListingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(Self::$variant), )+
                    other => Err(ListingError::UnknownValue {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

kebab_enum! {
    /// Physical condition declared by the seller.
    pub enum Condition: "condition" {
        New => "new",
        LikeNew => "like-new",
        Good => "good",
        Fair => "fair",
        Poor => "poor",
    }
}

kebab_enum! {
    /// Lifecycle state of a listing.
    pub enum ListingStatus: "status" {
        Active => "active",
        Sold => "sold",
        Expired => "expired",
    }
}

kebab_enum! {
    /// Browse ordering key. Every key sorts descending.
    pub enum ListingSort: "sort" {
        CreatedAt => "createdAt",
        UpdatedAt => "updatedAt",
        Price => "price",
        Views => "views",
    }
}

impl Default for ListingSort {
    fn default() -> Self {
        Self::CreatedAt
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::Good
    }
}

impl ListingStatus {
    /// Validate a status change. Only `active` may move, and only forward.
    ///
    /// # Examples
    /// ```
    /// use campus_trade::domain::ListingStatus;
    ///
    /// assert!(ListingStatus::Active.transition_to(ListingStatus::Sold).is_ok());
    /// assert!(ListingStatus::Sold.transition_to(ListingStatus::Active).is_err());
    /// ```
    pub fn transition_to(self, next: ListingStatus) -> Result<ListingStatus, ListingError> {
        match (self, next) {
            (Self::Active, Self::Sold | Self::Expired) => Ok(next),
            (from, to) => Err(ListingError::InvalidStatusTransition { from, to }),
        }
    }
}

/// Ordered image references, capped at [`MAX_LISTING_IMAGES`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AssetId>", into = "Vec<AssetId>")]
pub struct ImageSet(Vec<AssetId>);

impl ImageSet {
    /// Validate the image count.
    pub fn new(images: Vec<AssetId>) -> Result<Self, ListingError> {
        if images.len() > MAX_LISTING_IMAGES {
            return Err(ListingError::TooManyImages {
                max: MAX_LISTING_IMAGES,
                actual: images.len(),
            });
        }
        Ok(Self(images))
    }

    /// First image, used as the notification thumbnail.
    pub fn first(&self) -> Option<&AssetId> {
        self.0.first()
    }

    pub fn as_slice(&self) -> &[AssetId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<AssetId>> for ImageSet {
    type Error = ListingError;

    fn try_from(value: Vec<AssetId>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ImageSet> for Vec<AssetId> {
    fn from(value: ImageSet) -> Self {
        value.0
    }
}

/// A for-sale item.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    id: ListingId,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub condition: Condition,
    pub meetup_location: String,
    pub images: ImageSet,
    seller: SellerId,
    status: ListingStatus,
    views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Create a fresh, active listing from a validated draft.
    pub fn new(
        id: ListingId,
        draft: ListingDraft,
        images: ImageSet,
        seller: SellerId,
        now: DateTime<Utc>,
    ) -> Self {
        let ListingDraft {
            title,
            description,
            price,
            category,
            meetup_location,
            condition,
        } = draft;
        Self {
            id,
            title,
            description,
            price,
            category,
            condition,
            meetup_location,
            images,
            seller,
            status: ListingStatus::Active,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a listing from stored state.
    #[expect(clippy::too_many_arguments, reason = "mirrors the stored row")]
    pub fn restore(
        id: ListingId,
        draft: ListingDraft,
        images: ImageSet,
        seller: SellerId,
        status: ListingStatus,
        views: u64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let mut listing = Self::new(id, draft, images, seller, created_at);
        listing.status = status;
        listing.views = views;
        listing.updated_at = updated_at;
        listing
    }

    pub fn id(&self) -> ListingId {
        self.id
    }

    pub fn seller(&self) -> SellerId {
        self.seller
    }

    pub fn status(&self) -> ListingStatus {
        self.status
    }

    pub fn views(&self) -> u64 {
        self.views
    }

    /// Whether `seller` owns this listing.
    pub fn is_owned_by(&self, seller: &SellerId) -> bool {
        &self.seller == seller
    }

    /// Apply a status change, enforcing forward-only transitions.
    pub fn transition_status(
        &mut self,
        next: ListingStatus,
        now: DateTime<Utc>,
    ) -> Result<(), ListingError> {
        self.status = self.status.transition_to(next)?;
        self.updated_at = now;
        Ok(())
    }

    /// Count one more view.
    pub fn record_view(&mut self) {
        self.views = self.views.saturating_add(1);
    }

    /// Apply owner edits. Returns `false`, leaving `updated_at` alone, when
    /// `changes` is empty.
    pub fn apply_changes(&mut self, changes: ListingChanges, now: DateTime<Utc>) -> bool {
        if changes.is_empty() {
            return false;
        }
        let ListingChanges {
            title,
            description,
            price,
            category,
            meetup_location,
            condition,
        } = changes;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(location) = meetup_location {
            self.meetup_location = location;
        }
        if let Some(condition) = condition {
            self.condition = condition;
        }
        self.updated_at = now;
        true
    }
}

/// A listing joined with its seller summary, as returned to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedListing {
    pub listing: Listing,
    pub seller: SellerSummary,
}

/// Filters for browsing active listings.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFilter {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Case-insensitive phrase matched against title or description.
    pub search: Option<String>,
    pub sort: ListingSort,
    pub page: u32,
    pub limit: u32,
}

impl ListingFilter {
    /// Default page size.
    pub const DEFAULT_LIMIT: u32 = 12;
    /// Largest page a caller may request.
    pub const MAX_LIMIT: u32 = 50;

    /// Clamp paging inputs into a usable range.
    pub fn new(
        category: Option<String>,
        min_price: Option<f64>,
        max_price: Option<f64>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Self {
        Self {
            category,
            min_price,
            max_price,
            search: None,
            sort: ListingSort::default(),
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    /// Restrict to listings whose title or description contains `search`.
    /// Blank input clears the restriction.
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search
            .map(|raw| raw.trim().to_owned())
            .filter(|phrase| !phrase.is_empty());
        self
    }

    pub fn with_sort(mut self, sort: ListingSort) -> Self {
        self.sort = sort;
        self
    }

    /// Whether `listing` satisfies the search phrase, if one is set.
    pub fn matches_search(&self, listing: &Listing) -> bool {
        let Some(phrase) = self.search.as_deref() else {
            return true;
        };
        let phrase = phrase.to_lowercase();
        listing.title.to_lowercase().contains(&phrase)
            || listing.description.to_lowercase().contains(&phrase)
    }

    /// Number of rows to skip for the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self::new(None, None, None, None, None)
    }
}

/// One page of listings plus the total matching count.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub listings: Vec<PopulatedListing>,
    pub total: u64,
}

impl ListingPage {
    /// Total number of pages for `limit`-sized pages.
    pub fn pages(&self, limit: u32) -> u64 {
        self.total.div_ceil(u64::from(limit.max(1)))
    }
}
