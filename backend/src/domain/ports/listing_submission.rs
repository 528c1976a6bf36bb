//! Driving port for creating listings from an upload.
//!
//! The upload layer stages each image part through [`ListingSubmission::stage_image`]
//! as it streams in, and hands the staged identifiers to
//! [`ListingSubmission::submit`] once the body is complete. If the upload is
//! aborted first, it calls [`ListingSubmission::discard_staged`] instead.

use async_trait::async_trait;

use crate::domain::{AssetId, Error, PopulatedListing, RawListingFields, SellerIdentity, UploadedImage};

/// A complete submission: caller, raw text fields, and staged images in
/// upload order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitListingRequest {
    pub seller: SellerIdentity,
    pub fields: RawListingFields,
    pub staged: Vec<AssetId>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingSubmission: Send + Sync {
    /// Stage one image and return its storage identifier.
    async fn stage_image(&self, image: UploadedImage) -> Result<AssetId, Error>;

    /// Delete staged files belonging to an abandoned submission.
    async fn discard_staged(&self, staged: Vec<AssetId>);

    /// Validate, persist, and announce a listing.
    ///
    /// On any error every staged file in `request` has been deleted before
    /// this returns.
    async fn submit(&self, request: SubmitListingRequest) -> Result<PopulatedListing, Error>;
}
