//! End-to-end wiring for marketplace tests: in-memory listings, a real
//! filesystem asset store in a temporary directory, real JWTs, and the
//! broadcast hub.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::web::Bytes;
use actix_web::{App, web};
use cap_std::{ambient_authority, fs::Dir};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use mockable::{Clock, DefaultClock};
use serde_json::json;
use tempfile::TempDir;
use zeroize::Zeroizing;

use campus_trade::Trace;
use campus_trade::domain::{
    ListingIngestService, ListingLifecycleService, ListingRules, SellerId, SellerIdentity,
};
use campus_trade::inbound::http::products::{configure_api, get_upload};
use campus_trade::inbound::http::state::HttpState;
use campus_trade::inbound::http::upload::UploadLimits;
use campus_trade::inbound::ws;
use campus_trade::inbound::ws::state::{OriginPolicy, WsState};
use campus_trade::outbound::identity::JwtIdentityProvider;
use campus_trade::outbound::memory::{InMemoryListingRepository, InMemorySellerDirectory};
use campus_trade::outbound::notifications::BroadcastHub;
use campus_trade::outbound::storage::FsAssetStore;

const SECRET: &[u8] = b"marketplace-integration-secret";
const BOUNDARY: &str = "marketplace-boundary";

pub type Listings = InMemoryListingRepository<InMemorySellerDirectory>;

/// Fully wired adapters backed by a scratch upload directory.
pub struct Marketplace {
    pub uploads: TempDir,
    pub seller: SellerIdentity,
    pub rival: SellerIdentity,
    pub hub: Arc<BroadcastHub>,
    pub listings: Arc<Listings>,
    pub http: web::Data<HttpState>,
    pub ws: web::Data<WsState>,
}

impl Marketplace {
    pub async fn new() -> Self {
        let uploads = tempfile::tempdir().expect("upload dir");
        let seller =
            SellerIdentity::new(SellerId::random(), "Asha", "IIT Delhi").expect("seller");
        let rival =
            SellerIdentity::new(SellerId::random(), "Vikram", "IIT Bombay").expect("rival");

        let directory = Arc::new(InMemorySellerDirectory::new());
        directory.insert(seller.clone()).await;
        directory.insert(rival.clone()).await;

        let listings = Arc::new(InMemoryListingRepository::new(Arc::clone(&directory)));
        let assets = Arc::new(FsAssetStore::open(uploads.path()).expect("asset store"));
        let hub = Arc::new(BroadcastHub::new());
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

        let identity = Arc::new(JwtIdentityProvider::new(
            Zeroizing::new(SECRET.to_vec()),
            directory,
        ));
        let ingest = Arc::new(ListingIngestService::new(
            Arc::clone(&listings),
            Arc::clone(&assets),
            Arc::clone(&hub),
            Arc::clone(&clock),
            ListingRules::default(),
        ));
        let lifecycle = Arc::new(ListingLifecycleService::new(
            Arc::clone(&listings),
            assets,
            clock,
        ));

        let http = web::Data::new(HttpState::new(
            identity,
            ingest,
            lifecycle.clone(),
            lifecycle,
        ));
        let ws = web::Data::new(WsState::new(
            hub.clone(),
            OriginPolicy::new(Vec::<String>::new(), true),
        ));

        Self {
            uploads,
            seller,
            rival,
            hub,
            listings,
            http,
            ws,
        }
    }

    /// Application with every route the server mounts.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        build_app(self.http.clone(), self.ws.clone())
    }

    /// Names of every file currently in the upload directory.
    pub fn stored_files(&self) -> Vec<String> {
        let dir = Dir::open_ambient_dir(self.uploads.path(), ambient_authority())
            .expect("open upload dir");
        let mut names: Vec<String> = dir
            .entries()
            .expect("list upload dir")
            .map(|entry| {
                entry
                    .expect("dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }
}

/// Mount the API, uploads, and live channel over the given state.
pub fn build_app(
    http: web::Data<HttpState>,
    ws: web::Data<WsState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(http)
        .app_data(ws)
        .app_data(web::Data::new(UploadLimits::default()))
        .wrap(Trace)
        .service(web::scope("/api").configure(configure_api))
        .service(get_upload)
        .service(ws::ws_entry)
}

/// `Authorization` header value for a signed, unexpired token.
pub fn bearer_for(seller: &SellerIdentity) -> String {
    let claims = json!({
        "userId": seller.id.to_string(),
        "exp": chrono::Utc::now().timestamp() + 3600,
    });
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET),
    )
    .expect("encode token");
    format!("Bearer {token}")
}

/// Incrementally built `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct Form {
    body: Vec<u8>,
}

impl Form {
    /// A form carrying the five required fields of a valid listing.
    pub fn valid_listing(title: &str) -> Self {
        Self::default()
            .text("title", title)
            .text("description", "Barely used, serviced last month")
            .text("price", "1500")
            .text("category", "cycles")
            .text("meetupLocation", "main-gate")
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn jpeg(self, filename: &str) -> Self {
        self.file(filename, "image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    pub fn finish(mut self) -> Bytes {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Bytes::from(self.body)
    }
}
