//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module. Connections come from a `bb8` pool through
//! `diesel-async`; migrations run over a short-lived blocking connection.
//!
//! # Example
//!
//! ```ignore
//! use campus_trade::outbound::persistence::{DbPool, DieselListingRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/campus")).await?;
//! let listings = DieselListingRepository::new(pool);
//! ```

mod diesel_listing_repository;
mod diesel_seller_directory;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_listing_repository::DieselListingRepository;
pub use diesel_seller_directory::DieselSellerDirectory;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
