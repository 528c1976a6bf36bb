//! Internal Diesel row structs. Never exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{listings, sellers};

/// Row struct for reading from the sellers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sellers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SellerRow {
    pub id: Uuid,
    pub name: String,
    pub college: String,
    pub phone: Option<String>,
    pub rating: Option<f64>,
}

/// Row struct for reading from the listings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ListingRow {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub condition: String,
    pub meetup_location: String,
    pub images: Vec<String>,
    pub status: String,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating listing records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = listings)]
pub(crate) struct NewListingRow<'a> {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub category: &'a str,
    pub condition: &'a str,
    pub meetup_location: &'a str,
    pub images: Vec<String>,
    pub status: &'a str,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
