//! Adapter wiring for HTTP and WebSocket state.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use campus_trade::domain::ports::{ListingRepository, SellerDirectory};
use campus_trade::domain::{ListingIngestService, ListingLifecycleService};
use campus_trade::inbound::http::state::HttpState;
use campus_trade::inbound::ws::state::WsState;
use campus_trade::outbound::identity::JwtIdentityProvider;
use campus_trade::outbound::memory::{InMemoryListingRepository, InMemorySellerDirectory};
use campus_trade::outbound::notifications::BroadcastHub;
use campus_trade::outbound::persistence::{DieselListingRepository, DieselSellerDirectory};
use campus_trade::outbound::storage::FsAssetStore;

use super::ServerConfig;

/// Shared state handed to every worker.
#[derive(Clone)]
pub(crate) struct AppStates {
    pub http: web::Data<HttpState>,
    pub ws: web::Data<WsState>,
}

fn wire<R, D>(
    config: &ServerConfig,
    listings: Arc<R>,
    directory: Arc<D>,
    assets: Arc<FsAssetStore>,
) -> AppStates
where
    R: ListingRepository + 'static,
    D: SellerDirectory + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hub = Arc::new(BroadcastHub::new());

    let identity = Arc::new(JwtIdentityProvider::new(config.jwt_secret.clone(), directory));
    let ingest = Arc::new(ListingIngestService::new(
        Arc::clone(&listings),
        Arc::clone(&assets),
        Arc::clone(&hub),
        Arc::clone(&clock),
        config.rules.clone(),
    ));
    let lifecycle = Arc::new(
        ListingLifecycleService::new(listings, assets, clock).with_rules(config.rules.clone()),
    );

    AppStates {
        http: web::Data::new(HttpState::new(
            identity,
            ingest,
            lifecycle.clone(),
            lifecycle,
        )),
        ws: web::Data::new(WsState::new(hub, config.origins.clone())),
    }
}

/// Build adapters and services, choosing PostgreSQL or in-memory storage.
///
/// # Errors
/// Returns [`io::Error`] when the upload directory or the seller seed file
/// cannot be opened.
pub(crate) async fn build_states(config: &ServerConfig) -> io::Result<AppStates> {
    let assets = Arc::new(FsAssetStore::open(&config.upload_dir)?);

    match &config.db_pool {
        Some(pool) => {
            info!(storage = "postgres", "wiring listing repositories");
            let listings = Arc::new(DieselListingRepository::new(pool.clone()));
            let directory = Arc::new(DieselSellerDirectory::new(pool.clone()));
            Ok(wire(config, listings, directory, assets))
        }
        None => {
            info!(storage = "memory", "wiring listing repositories");
            let directory = match &config.seller_seed_file {
                Some(path) => InMemorySellerDirectory::from_json_file(path)
                    .await
                    .map_err(io::Error::other)?,
                None => InMemorySellerDirectory::new(),
            };
            let directory = Arc::new(directory);
            let listings = Arc::new(InMemoryListingRepository::new(Arc::clone(&directory)));
            Ok(wire(config, listings, directory, assets))
        }
    }
}
