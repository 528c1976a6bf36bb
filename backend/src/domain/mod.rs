//! Domain primitives, aggregates, ports, and services.
//!
//! Purpose: Define the transport-agnostic marketplace model used by the HTTP
//! and WebSocket adapters and by persistence. Types document their invariants
//! and serialisation contracts in Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: error payload and stable error identifier.
//! - Listing and its value types, plus `validate_submission` and
//!   `validate_changes`.
//! - SellerId / SellerIdentity / SellerSummary.
//! - AssetId / UploadedImage: stored image names and upload payloads.
//! - AffiliationGroup / NotificationEvent: live notification routing.
//! - ListingIngestService / ListingLifecycleService: driving port services.

pub mod affiliation;
pub mod asset;
pub mod error;
pub mod listing;
pub mod listing_ingest_service;
pub mod listing_lifecycle_service;
pub mod notification;
pub mod ports;
pub mod seller;
pub mod trace_id;

pub use self::affiliation::AffiliationGroup;
pub use self::asset::{AssetId, AssetIdValidationError, UploadedImage};
pub use self::error::{Error, ErrorCode, VALIDATION_FAILED_MESSAGE};
pub use self::listing::{
    Condition, FieldViolation, ImageSet, Listing, ListingChanges, ListingDraft, ListingError,
    ListingFilter, ListingId, ListingPage, ListingRules, ListingSort, ListingStatus,
    MAX_LISTING_IMAGES, PopulatedListing, Price, RawListingFields, validate_changes,
    validate_submission,
};
pub use self::listing_ingest_service::ListingIngestService;
pub use self::listing_lifecycle_service::ListingLifecycleService;
pub use self::notification::{NotificationEvent, NotificationKind, ProductSummary};
pub use self::seller::{SellerId, SellerIdentity, SellerSummary, SellerValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use campus_trade::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("Not authorized"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
