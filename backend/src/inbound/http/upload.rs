//! Multipart upload layer for listing submissions.
//!
//! Image parts are staged as they arrive. If the body is rejected part-way
//! (a non-image part, too many files, an oversized part, or a broken stream)
//! every file staged for this request is discarded before the error is
//! returned, so an aborted upload leaves nothing behind.

use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;
use tracing::{debug, info};

use crate::domain::ports::ListingSubmission;
use crate::domain::{AssetId, Error, MAX_LISTING_IMAGES, RawListingFields, UploadedImage};

/// Name of the repeated file part carrying listing images.
pub const IMAGES_FIELD: &str = "images";

/// Size and count limits enforced while reading the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_files: usize,
    pub max_file_bytes: usize,
    pub max_text_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: MAX_LISTING_IMAGES,
            max_file_bytes: 5 * 1024 * 1024,
            max_text_bytes: 64 * 1024,
        }
    }
}

/// Reasons the upload layer refuses a body before it reaches validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("Only image files are allowed")]
    NotAnImage,
    #[error("Too many files; at most {0} images are allowed")]
    TooManyFiles(usize),
    #[error("File too large")]
    FileTooLarge,
    #[error("Field value too large")]
    FieldTooLarge,
    #[error("Field {0} must be valid UTF-8")]
    InvalidText(String),
    #[error("Malformed multipart body")]
    Malformed,
}

impl From<UploadRejection> for Error {
    fn from(value: UploadRejection) -> Self {
        Error::invalid_request(value.to_string())
    }
}

/// Fields and staged images read from a complete multipart body.
#[derive(Debug, Default)]
pub struct ParsedUpload {
    pub fields: RawListingFields,
    pub staged: Vec<AssetId>,
}

/// Read a listing submission body, staging images through `submission`.
pub async fn read_listing_upload(
    mut payload: Multipart,
    submission: &dyn ListingSubmission,
    limits: UploadLimits,
) -> Result<ParsedUpload, Error> {
    let mut upload = ParsedUpload::default();
    match read_parts(&mut payload, submission, limits, &mut upload).await {
        Ok(()) => Ok(upload),
        Err(err) => {
            info!(
                staged = upload.staged.len(),
                reason = %err,
                "upload aborted"
            );
            submission.discard_staged(upload.staged).await;
            Err(err)
        }
    }
}

async fn read_parts(
    payload: &mut Multipart,
    submission: &dyn ListingSubmission,
    limits: UploadLimits,
    upload: &mut ParsedUpload,
) -> Result<(), Error> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|err| {
            debug!(error = %err, "multipart stream error");
            UploadRejection::Malformed
        })?;
        let name = field.name().unwrap_or_default().to_owned();

        if name == IMAGES_FIELD {
            if let Some(asset) = read_image(&mut field, submission, limits, upload.staged.len()).await? {
                upload.staged.push(asset);
            }
            continue;
        }

        let bytes = read_limited(&mut field, limits.max_text_bytes, UploadRejection::FieldTooLarge)
            .await?;
        let slot = match name.as_str() {
            "title" => &mut upload.fields.title,
            "description" => &mut upload.fields.description,
            "price" => &mut upload.fields.price,
            "category" => &mut upload.fields.category,
            "meetupLocation" => &mut upload.fields.meetup_location,
            "condition" => &mut upload.fields.condition,
            other => {
                debug!(field = other, "ignoring unknown multipart field");
                continue;
            }
        };
        let text = String::from_utf8(bytes).map_err(|_| UploadRejection::InvalidText(name))?;
        *slot = Some(text);
    }
    Ok(())
}

/// Stage one image part. Returns `None` for an empty file slot, which
/// browsers send when no file was chosen.
async fn read_image(
    field: &mut Field,
    submission: &dyn ListingSubmission,
    limits: UploadLimits,
    already_staged: usize,
) -> Result<Option<AssetId>, Error> {
    let original_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(str::to_owned);
    if original_name.as_deref() == Some("") {
        read_limited(field, limits.max_file_bytes, UploadRejection::FileTooLarge).await?;
        return Ok(None);
    }

    let content_type = field
        .content_type()
        .filter(|mime| is_raster_image(mime.type_().as_str(), mime.subtype().as_str()))
        .map(|mime| mime.essence_str().to_owned())
        .ok_or(UploadRejection::NotAnImage)?;
    if already_staged >= limits.max_files {
        return Err(UploadRejection::TooManyFiles(limits.max_files).into());
    }

    let bytes = read_limited(field, limits.max_file_bytes, UploadRejection::FileTooLarge).await?;
    let asset = submission
        .stage_image(UploadedImage {
            original_name,
            content_type,
            bytes,
        })
        .await?;
    Ok(Some(asset))
}

/// `image/*` excluding SVG, which is a script-capable document.
fn is_raster_image(kind: &str, subtype: &str) -> bool {
    kind.eq_ignore_ascii_case("image") && !subtype.eq_ignore_ascii_case("svg")
}

async fn read_limited(
    field: &mut Field,
    limit: usize,
    too_large: UploadRejection,
) -> Result<Vec<u8>, UploadRejection> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|err| {
            debug!(error = %err, "multipart field stream error");
            UploadRejection::Malformed
        })?;
        if buffer.len() + chunk.len() > limit {
            return Err(too_large);
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
