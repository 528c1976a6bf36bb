//! HTTP server configuration object.

use std::net::SocketAddr;
use std::path::PathBuf;

use zeroize::Zeroizing;

use campus_trade::domain::ListingRules;
use campus_trade::inbound::http::upload::UploadLimits;
use campus_trade::inbound::ws::state::OriginPolicy;
use campus_trade::outbound::persistence::DbPool;

/// Everything needed to wire adapters and bind the server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) upload_dir: PathBuf,
    pub(crate) jwt_secret: Zeroizing<Vec<u8>>,
    pub(crate) origins: OriginPolicy,
    pub(crate) rules: ListingRules,
    pub(crate) limits: UploadLimits,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) seller_seed_file: Option<PathBuf>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        upload_dir: PathBuf,
        jwt_secret: Zeroizing<Vec<u8>>,
        origins: OriginPolicy,
    ) -> Self {
        Self {
            bind_addr,
            upload_dir,
            jwt_secret,
            origins,
            rules: ListingRules::default(),
            limits: UploadLimits::default(),
            db_pool: None,
            seller_seed_file: None,
        }
    }

    /// Use database-backed repositories instead of in-memory ones.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: ListingRules) -> Self {
        self.rules = rules;
        self
    }

    /// Seed the in-memory seller directory. Ignored when a pool is set.
    #[must_use]
    pub fn with_seller_seed_file(mut self, path: Option<PathBuf>) -> Self {
        self.seller_seed_file = path;
        self
    }
}
