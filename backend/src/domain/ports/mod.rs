//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod asset_store;
mod identity_provider;
mod listing_command;
mod listing_query;
mod listing_repository;
mod listing_submission;
mod notification_feed;
mod notification_publisher;
mod seller_directory;

#[cfg(test)]
pub use asset_store::MockAssetStore;
pub use asset_store::{AssetStore, AssetStoreError};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityError, IdentityProvider};
#[cfg(test)]
pub use listing_command::MockListingCommand;
pub use listing_command::ListingCommand;
#[cfg(test)]
pub use listing_query::MockListingQuery;
pub use listing_query::ListingQuery;
#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{ListingRepository, ListingRepositoryError};
#[cfg(test)]
pub use listing_submission::MockListingSubmission;
pub use listing_submission::{ListingSubmission, SubmitListingRequest};
#[cfg(test)]
pub use notification_feed::MockNotificationFeed;
pub use notification_feed::{FeedSubscription, ListenerId, NotificationFeed};
#[cfg(test)]
pub use notification_publisher::MockNotificationPublisher;
pub use notification_publisher::{NotificationPublisher, NotificationPublisherError};
#[cfg(test)]
pub use seller_directory::MockSellerDirectory;
pub use seller_directory::{SellerDirectory, SellerDirectoryError};
