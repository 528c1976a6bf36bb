//! PostgreSQL-backed `SellerDirectory` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{SellerDirectory, SellerDirectoryError};
use crate::domain::{SellerId, SellerIdentity, SellerSummary};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::SellerRow;
use super::pool::DbPool;
use super::schema::sellers;

/// Diesel-backed seller lookups.
#[derive(Clone)]
pub struct DieselSellerDirectory {
    pool: DbPool,
}

impl DieselSellerDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_row(&self, id: &SellerId) -> Result<Option<SellerRow>, SellerDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        sellers::table
            .find(id.as_uuid())
            .select(SellerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }
}

#[async_trait]
impl SellerDirectory for DieselSellerDirectory {
    async fn find_identity(
        &self,
        id: &SellerId,
    ) -> Result<Option<SellerIdentity>, SellerDirectoryError> {
        let Some(row) = self.find_row(id).await? else {
            return Ok(None);
        };
        SellerIdentity::new(*id, row.name, row.college)
            .map(Some)
            .map_err(|err| {
                warn!(seller_id = %id, error = %err, "stored seller violates domain invariants");
                SellerDirectoryError::query(format!("stored seller {id} is invalid"))
            })
    }

    async fn find_summary(
        &self,
        id: &SellerId,
    ) -> Result<Option<SellerSummary>, SellerDirectoryError> {
        Ok(self.find_row(id).await?.map(|row| SellerSummary {
            id: *id,
            name: row.name,
            college: row.college,
            rating: row.rating,
            phone: row.phone,
        }))
    }
}
