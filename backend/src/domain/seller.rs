//! Seller identity and the summary attached to listing responses.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by seller constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SellerValidationError {
    #[error("seller id must not be empty")]
    EmptyId,
    #[error("seller id must be a valid UUID")]
    InvalidId,
    #[error("seller display name must not be empty")]
    EmptyDisplayName,
}

/// Stable seller identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SellerId(Uuid);

impl SellerId {
    /// Validate and construct a [`SellerId`] from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, SellerValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(SellerValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(SellerValidationError::InvalidId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| SellerValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`SellerId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SellerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SellerId> for String {
    fn from(value: SellerId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for SellerId {
    type Error = SellerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Verified caller identity supplied by the identity collaborator.
///
/// `affiliation` is the raw college name; it is normalised into an
/// [`AffiliationGroup`](crate::domain::AffiliationGroup) only when routing
/// notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerIdentity {
    pub id: SellerId,
    pub display_name: String,
    pub affiliation: String,
}

impl SellerIdentity {
    /// Build an identity, rejecting a blank display name.
    pub fn new(
        id: SellerId,
        display_name: impl Into<String>,
        affiliation: impl Into<String>,
    ) -> Result<Self, SellerValidationError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(SellerValidationError::EmptyDisplayName);
        }
        Ok(Self {
            id,
            display_name,
            affiliation: affiliation.into(),
        })
    }
}

/// Seller fields attached to a listing when it is populated for a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerSummary {
    pub id: SellerId,
    pub name: String,
    pub college: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<&SellerIdentity> for SellerSummary {
    fn from(identity: &SellerIdentity) -> Self {
        Self {
            id: identity.id,
            name: identity.display_name.clone(),
            college: identity.affiliation.clone(),
            rating: None,
            phone: None,
        }
    }
}
