//! Stored image identifiers and the upload payload handed to asset storage.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix applied to every generated asset name.
const ASSET_PREFIX: &str = "product-";
/// Longest extension carried over from the client file name.
const MAX_EXTENSION_LEN: usize = 8;

/// Validation errors for [`AssetId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetIdValidationError {
    #[error("asset id must not be empty")]
    Empty,
    #[error("asset id must be a plain file name")]
    NotAFileName,
}

/// Storage identifier of a staged or owned image: a bare file name.
///
/// ## Invariants
/// - never empty
/// - contains no path separators, no `..`, and no leading dot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    /// Validate an existing stored file name.
    pub fn new(value: impl Into<String>) -> Result<Self, AssetIdValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(AssetIdValidationError::Empty);
        }
        let is_plain = !value.starts_with('.')
            && !value.contains("..")
            && !value.contains(['/', '\\', '\0']);
        if !is_plain {
            return Err(AssetIdValidationError::NotAFileName);
        }
        Ok(Self(value))
    }

    /// Generate a fresh name, keeping a sanitised extension from the client
    /// supplied file name when there is one.
    ///
    /// # Examples
    /// ```
    /// use campus_trade::domain::AssetId;
    ///
    /// let id = AssetId::generate(Some("photo.JPG"));
    /// assert!(id.as_ref().starts_with("product-"));
    /// assert!(id.as_ref().ends_with(".jpg"));
    /// ```
    pub fn generate(original_name: Option<&str>) -> Self {
        let extension = original_name.and_then(sanitised_extension);
        let stem = Uuid::new_v4().simple();
        match extension {
            Some(ext) => Self(format!("{ASSET_PREFIX}{stem}.{ext}")),
            None => Self(format!("{ASSET_PREFIX}{stem}")),
        }
    }

    /// Lowercase extension of the stored name, if any.
    pub fn extension(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(_, ext)| ext)
    }
}

fn sanitised_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let valid = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<AssetId> for String {
    fn from(value: AssetId) -> Self {
        value.0
    }
}

impl TryFrom<String> for AssetId {
    type Error = AssetIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// One image part received by the upload layer, fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub original_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
