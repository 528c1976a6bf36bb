//! OpenAPI documentation for the REST API.
//!
//! Registers every HTTP endpoint of the inbound layer, the response envelopes
//! they return, and the bearer-token security scheme. The generated document
//! backs Swagger UI in debug builds.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{FieldViolation, NotificationEvent, NotificationKind, ProductSummary};
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::products::{
    MessageEnvelope, PaginationDto, PriceInput, ProductDto, ProductEnvelope, ProductListEnvelope,
    ProductUpdateBody, ProductUploadForm, SellerDto,
};

/// Adds the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_owned());
        bearer.description = Some("Token issued by the campus identity service.".to_owned());
        components.add_security_scheme("BearerToken", SecurityScheme::Http(bearer));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus Trade API",
        description = "Campus marketplace listings: create with images, browse, and manage."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::products::create_product,
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::update_product,
        crate::inbound::http::products::mark_product_sold,
        crate::inbound::http::products::delete_product,
        crate::inbound::http::products::get_upload,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorEnvelope,
        FieldViolation,
        ProductDto,
        SellerDto,
        ProductEnvelope,
        ProductListEnvelope,
        PaginationDto,
        MessageEnvelope,
        ProductUploadForm,
        ProductUpdateBody,
        PriceInput,
        NotificationEvent,
        NotificationKind,
        ProductSummary,
    )),
    tags(
        (name = "products", description = "Listing creation, browsing, and lifecycle"),
        (name = "uploads", description = "Stored listing images"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
