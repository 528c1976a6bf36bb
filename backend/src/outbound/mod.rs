//! Outbound adapters implementing the driven domain ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: in-process repositories for database-less runs and tests
//! - **storage**: filesystem image store
//! - **identity**: JWT bearer-token verification
//! - **notifications**: in-process broadcast hub for the live channel
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business rules.

pub mod identity;
pub mod memory;
pub mod notifications;
pub mod persistence;
pub mod storage;
