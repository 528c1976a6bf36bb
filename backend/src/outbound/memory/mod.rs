//! In-process adapters used when no database is configured, and by tests.
//!
//! Both adapters keep state behind `tokio::sync::RwLock` and are cheap to
//! clone; clones share the same state.

mod listing_repository;
mod seller_directory;

pub use listing_repository::InMemoryListingRepository;
pub use seller_directory::{InMemorySellerDirectory, SellerSeed, SellerSeedError};
