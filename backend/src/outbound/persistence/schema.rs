//! Diesel table definitions for the marketplace schema.
//!
//! Must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Sellers known to the marketplace. Rows are written by the identity
    /// service; this crate only reads them.
    sellers (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        college -> Varchar,
        phone -> Nullable<Varchar>,
        rating -> Nullable<Float8>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Listings. `images` holds stored asset names in upload order.
    listings (id) {
        id -> Uuid,
        seller_id -> Uuid,
        title -> Varchar,
        description -> Text,
        price -> Float8,
        category -> Varchar,
        condition -> Varchar,
        meetup_location -> Varchar,
        images -> Array<Text>,
        status -> Varchar,
        views -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(listings -> sellers (seller_id));

diesel::allow_tables_to_appear_in_same_query!(listings, sellers);
