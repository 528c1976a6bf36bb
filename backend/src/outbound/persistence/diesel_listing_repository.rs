//! PostgreSQL-backed `ListingRepository` implementation using Diesel ORM.
//!
//! Rows are translated to domain listings on the way out; a stored row that
//! no longer satisfies the domain invariants is reported as a query failure
//! rather than silently repaired.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{ListingRepository, ListingRepositoryError};
use crate::domain::{
    AssetId, Condition, ImageSet, Listing, ListingDraft, ListingFilter, ListingId, ListingPage,
    ListingSort, ListingStatus, PopulatedListing, Price, SellerId, SellerSummary,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ListingRow, NewListingRow, SellerRow};
use super::pool::DbPool;
use super::schema::{listings, sellers};

/// Diesel-backed implementation of the `ListingRepository` port.
#[derive(Clone)]
pub struct DieselListingRepository {
    pool: DbPool,
}

impl DieselListingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn corrupt_row(id: Uuid, detail: impl std::fmt::Display) -> ListingRepositoryError {
    warn!(listing_id = %id, %detail, "stored listing violates domain invariants");
    ListingRepositoryError::query(format!("stored listing {id} is invalid"))
}

fn row_to_listing(row: ListingRow) -> Result<Listing, ListingRepositoryError> {
    let id = row.id;
    let price = Price::new(row.price).map_err(|err| corrupt_row(id, err))?;
    let condition = Condition::from_str(&row.condition).map_err(|err| corrupt_row(id, err))?;
    let status = ListingStatus::from_str(&row.status).map_err(|err| corrupt_row(id, err))?;
    let images = row
        .images
        .into_iter()
        .map(AssetId::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| corrupt_row(id, err))?;
    let images = ImageSet::new(images).map_err(|err| corrupt_row(id, err))?;
    let views = u64::try_from(row.views).map_err(|err| corrupt_row(id, err))?;

    let draft = ListingDraft {
        title: row.title,
        description: row.description,
        price,
        category: row.category,
        meetup_location: row.meetup_location,
        condition,
    };
    Ok(Listing::restore(
        ListingId::from_uuid(id),
        draft,
        images,
        SellerId::from_uuid(row.seller_id),
        status,
        views,
        row.created_at,
        row.updated_at,
    ))
}

fn row_to_summary(row: SellerRow) -> SellerSummary {
    SellerSummary {
        id: SellerId::from_uuid(row.id),
        name: row.name,
        college: row.college,
        rating: row.rating,
        phone: row.phone,
    }
}

fn new_row(listing: &Listing) -> NewListingRow<'_> {
    NewListingRow {
        id: *listing.id().as_uuid(),
        seller_id: *listing.seller().as_uuid(),
        title: &listing.title,
        description: &listing.description,
        price: listing.price.amount(),
        category: &listing.category,
        condition: listing.condition.as_str(),
        meetup_location: &listing.meetup_location,
        images: listing
            .images
            .as_slice()
            .iter()
            .map(|asset| asset.as_ref().to_owned())
            .collect(),
        status: listing.status().as_str(),
        views: i64::try_from(listing.views()).unwrap_or(i64::MAX),
        created_at: listing.created_at,
        updated_at: listing.updated_at,
    }
}

/// `ILIKE` pattern matching `phrase` anywhere, with wildcards escaped.
fn contains_pattern(phrase: &str) -> String {
    let mut pattern = String::with_capacity(phrase.len() + 2);
    pattern.push('%');
    for c in phrase.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Active listings matching `filter`, before ordering and paging.
fn filtered(filter: &ListingFilter) -> listings::BoxedQuery<'static, Pg> {
    let mut query = listings::table
        .filter(listings::status.eq(ListingStatus::Active.as_str()))
        .into_boxed();
    if let Some(category) = filter.category.clone() {
        query = query.filter(listings::category.eq(category));
    }
    if let Some(min) = filter.min_price {
        query = query.filter(listings::price.ge(min));
    }
    if let Some(max) = filter.max_price {
        query = query.filter(listings::price.le(max));
    }
    if let Some(phrase) = filter.search.as_deref() {
        let pattern = contains_pattern(phrase);
        query = query.filter(
            listings::title
                .ilike(pattern.clone())
                .or(listings::description.ilike(pattern)),
        );
    }
    query
}

/// Descending on the sort key, newest first on ties, then by id.
fn ordered(
    query: listings::BoxedQuery<'static, Pg>,
    sort: ListingSort,
) -> listings::BoxedQuery<'static, Pg> {
    let query = match sort {
        ListingSort::CreatedAt => query,
        ListingSort::UpdatedAt => query.order(listings::updated_at.desc()),
        ListingSort::Price => query.order(listings::price.desc()),
        ListingSort::Views => query.order(listings::views.desc()),
    };
    query
        .then_order_by(listings::created_at.desc())
        .then_order_by(listings::id.asc())
}

#[async_trait]
impl ListingRepository for DieselListingRepository {
    async fn create(&self, listing: &Listing) -> Result<Listing, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: ListingRow = diesel::insert_into(listings::table)
            .values(&new_row(listing))
            .returning(ListingRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_listing(row)
    }

    async fn populate(&self, listing: Listing) -> Result<PopulatedListing, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let seller: Option<SellerRow> = sellers::table
            .find(listing.seller().as_uuid())
            .select(SellerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let seller = seller.ok_or_else(|| {
            ListingRepositoryError::query(format!("seller {} not found", listing.seller()))
        })?;
        Ok(PopulatedListing {
            listing,
            seller: row_to_summary(seller),
        })
    }

    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ListingRow> = listings::table
            .find(id.as_uuid())
            .select(ListingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_listing).transpose()
    }

    async fn list(&self, filter: &ListingFilter) -> Result<ListingPage, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<ListingRow> = ordered(filtered(filter), filter.sort)
            .offset(i64::try_from(filter.offset()).unwrap_or(i64::MAX))
            .limit(i64::from(filter.limit))
            .select(ListingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let seller_ids: Vec<Uuid> = rows.iter().map(|row| row.seller_id).collect();
        let sellers: HashMap<Uuid, SellerSummary> = sellers::table
            .filter(sellers::id.eq_any(seller_ids))
            .select(SellerRow::as_select())
            .load::<SellerRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| (row.id, row_to_summary(row)))
            .collect();

        let mut listings = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(seller) = sellers.get(&row.seller_id).cloned() else {
                warn!(listing_id = %row.id, "skipping listing whose seller no longer exists");
                continue;
            };
            listings.push(PopulatedListing {
                listing: row_to_listing(row)?,
                seller,
            });
        }

        Ok(ListingPage {
            listings,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn increment_views(
        &self,
        id: &ListingId,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ListingRow> = diesel::update(listings::table.find(id.as_uuid()))
            .set(listings::views.eq(listings::views + 1))
            .returning(ListingRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_listing).transpose()
    }

    async fn update_status(
        &self,
        id: &ListingId,
        expected: ListingStatus,
        next: ListingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let target = listings::table
            .filter(listings::id.eq(id.as_uuid()))
            .filter(listings::status.eq(expected.as_str()));
        let row: Option<ListingRow> = diesel::update(target)
            .set((
                listings::status.eq(next.as_str()),
                listings::updated_at.eq(updated_at),
            ))
            .returning(ListingRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_listing).transpose()
    }

    async fn update_details(
        &self,
        listing: &Listing,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ListingRow> = diesel::update(listings::table.find(listing.id().as_uuid()))
            .set((
                listings::title.eq(&listing.title),
                listings::description.eq(&listing.description),
                listings::price.eq(listing.price.amount()),
                listings::category.eq(&listing.category),
                listings::condition.eq(listing.condition.as_str()),
                listings::meetup_location.eq(&listing.meetup_location),
                listings::updated_at.eq(listing.updated_at),
            ))
            .returning(ListingRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_listing).transpose()
    }

    async fn delete(&self, id: &ListingId) -> Result<bool, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(listings::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }
}
