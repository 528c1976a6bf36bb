//! Bearer-token identity provider for HS256 JWTs.
//!
//! Tokens carry the seller id in a `userId` claim and must carry `exp`. The
//! seller must still exist in the directory for the token to resolve.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{IdentityError, IdentityProvider, SellerDirectory};
use crate::domain::{SellerId, SellerIdentity};

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(rename = "userId")]
    user_id: String,
}

/// `IdentityProvider` verifying shared-secret JWTs.
pub struct JwtIdentityProvider<D> {
    key: DecodingKey,
    validation: Validation,
    directory: Arc<D>,
}

impl<D: SellerDirectory> JwtIdentityProvider<D> {
    /// Derive the decoding key from `secret`. The secret buffer is zeroised
    /// when it is dropped at the end of this call.
    pub fn new(secret: Zeroizing<Vec<u8>>, directory: Arc<D>) -> Self {
        let key = DecodingKey::from_secret(&secret);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Self {
            key,
            validation,
            directory,
        }
    }

    fn verify(&self, token: &str) -> Result<SellerId, IdentityError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            match err.kind() {
                ErrorKind::ExpiredSignature => IdentityError::token_expired(),
                ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
                    IdentityError::invalid_payload()
                }
                _ => IdentityError::invalid_token(),
            }
        })?;
        SellerId::new(&data.claims.user_id).map_err(|_| IdentityError::invalid_payload())
    }
}

#[async_trait]
impl<D: SellerDirectory + 'static> IdentityProvider for JwtIdentityProvider<D> {
    async fn resolve(&self, token: &str) -> Result<SellerIdentity, IdentityError> {
        let seller = self.verify(token)?;
        self.directory
            .find_identity(&seller)
            .await
            .map_err(|err| IdentityError::unavailable(err.to_string()))?
            .ok_or_else(IdentityError::unknown_seller)
    }
}
