//! Product listing HTTP handlers.
//!
//! ```text
//! POST   /api/products
//! GET    /api/products
//! GET    /api/products/{id}
//! PUT    /api/products/{id}
//! PATCH  /api/products/{id}/sold
//! DELETE /api/products/{id}
//! GET    /uploads/{asset}
//! ```

use actix_multipart::Multipart;
use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::SubmitListingRequest;
use crate::domain::{
    AssetId, Error, ListingFilter, ListingId, ListingSort, PopulatedListing, RawListingFields,
    SellerSummary,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::upload::{UploadLimits, read_listing_upload};

/// Listing as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    #[schema(format = "uuid")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    #[schema(example = "good")]
    pub condition: String,
    pub meetup_location: String,
    /// Stored image names, servable under `/uploads/{name}`.
    pub images: Vec<String>,
    pub seller: SellerDto,
    #[schema(example = "active")]
    pub status: String,
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Seller fields attached to a listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerDto {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub college: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<SellerSummary> for SellerDto {
    fn from(value: SellerSummary) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            college: value.college,
            rating: value.rating,
            phone: value.phone,
        }
    }
}

impl From<PopulatedListing> for ProductDto {
    fn from(value: PopulatedListing) -> Self {
        let PopulatedListing { listing, seller } = value;
        Self {
            id: listing.id().to_string(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: listing.price.amount(),
            category: listing.category.clone(),
            condition: listing.condition.as_str().to_owned(),
            meetup_location: listing.meetup_location.clone(),
            images: listing
                .images
                .as_slice()
                .iter()
                .map(ToString::to_string)
                .collect(),
            seller: seller.into(),
            status: listing.status().as_str().to_owned(),
            views: listing.views(),
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

/// Body returned when a single listing is created, read, or updated.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub product: ProductDto,
}

/// Paging metadata for listing browse responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginationDto {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

/// Body returned by the browse endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductListEnvelope {
    pub success: bool,
    pub products: Vec<ProductDto>,
    pub pagination: PaginationDto,
}

/// Body returned by endpoints that only acknowledge.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageEnvelope {
    pub success: bool,
    pub message: String,
}

/// Form fields accepted by `POST /api/products`.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
#[schema(rename_all = "camelCase")]
pub struct ProductUploadForm {
    #[schema(min_length = 5)]
    title: String,
    #[schema(min_length = 10)]
    description: String,
    #[schema(minimum = 0)]
    price: f64,
    #[schema(example = "books")]
    category: String,
    #[schema(example = "library")]
    meetup_location: String,
    #[schema(example = "good")]
    condition: Option<String>,
    /// Up to five image files.
    #[schema(value_type = Vec<String>, format = Binary)]
    images: Vec<Vec<u8>>,
}

/// Query parameters accepted by the browse endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Phrase matched case-insensitively against title or description.
    pub search: Option<String>,
    /// Descending sort key: `createdAt` (default), `updatedAt`, `price`, or `views`.
    #[param(example = "createdAt")]
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl TryFrom<ListProductsQuery> for ListingFilter {
    type Error = Error;

    fn try_from(value: ListProductsQuery) -> Result<Self, Self::Error> {
        let sort = match value.sort.as_deref().map(str::trim) {
            None | Some("") => ListingSort::default(),
            Some(raw) => raw
                .parse::<ListingSort>()
                .map_err(|_| Error::invalid_request(format!("Unknown sort key: {raw}")))?,
        };
        Ok(ListingFilter::new(
            value.category.filter(|c| !c.trim().is_empty()),
            value.min_price,
            value.max_price,
            value.page,
            value.limit,
        )
        .with_search(value.search)
        .with_sort(sort))
    }
}

/// Price as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl From<PriceInput> for String {
    fn from(value: PriceInput) -> Self {
        match value {
            PriceInput::Number(amount) => amount.to_string(),
            PriceInput::Text(raw) => raw,
        }
    }
}

/// Body accepted by `PUT /api/products/{id}`. Every field is optional;
/// status and seller are not editable and are ignored if sent.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateBody {
    #[schema(min_length = 5)]
    pub title: Option<String>,
    #[schema(min_length = 10)]
    pub description: Option<String>,
    #[schema(value_type = Option<f64>, minimum = 0)]
    pub price: Option<PriceInput>,
    pub category: Option<String>,
    pub meetup_location: Option<String>,
    pub condition: Option<String>,
}

impl From<ProductUpdateBody> for RawListingFields {
    fn from(value: ProductUpdateBody) -> Self {
        Self {
            title: value.title,
            description: value.description,
            price: value.price.map(String::from),
            category: value.category,
            meetup_location: value.meetup_location,
            condition: value.condition,
        }
    }
}

fn parse_listing_id(raw: &str) -> Result<ListingId, Error> {
    raw.parse()
        .map_err(|_| Error::not_found("Product not found"))
}

/// Create a listing from a multipart upload.
#[utoipa::path(
    post,
    path = "/api/products",
    request_body(content = ProductUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Listing created", body = ProductEnvelope),
        (status = 400, description = "Validation failed or upload rejected", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorEnvelope),
        (status = 500, description = "Listing could not be stored", body = ErrorEnvelope)
    ),
    tags = ["products"],
    operation_id = "createProduct"
)]
#[post("/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    limits: web::Data<UploadLimits>,
    caller: Authenticated,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let seller = caller.into_inner();
    let upload =
        read_listing_upload(payload, state.submission.as_ref(), *limits.get_ref()).await?;
    let populated = state
        .submission
        .submit(SubmitListingRequest {
            seller,
            fields: upload.fields,
            staged: upload.staged,
        })
        .await?;

    Ok(HttpResponse::Created().json(ProductEnvelope {
        success: true,
        message: Some("Product created successfully".to_owned()),
        product: populated.into(),
    }))
}

/// Browse active listings.
#[utoipa::path(
    get,
    path = "/api/products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Active listings", body = ProductListEnvelope),
        (status = 400, description = "Malformed query or unknown sort key", body = ErrorEnvelope)
    ),
    tags = ["products"],
    security([]),
    operation_id = "listProducts"
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    query: web::Query<ListProductsQuery>,
) -> ApiResult<web::Json<ProductListEnvelope>> {
    let filter = ListingFilter::try_from(query.into_inner())?;
    let (page, limit) = (filter.page, filter.limit);
    let result = state.query.list(filter).await?;
    let pages = result.pages(limit);

    Ok(web::Json(ProductListEnvelope {
        success: true,
        products: result.listings.into_iter().map(Into::into).collect(),
        pagination: PaginationDto {
            page,
            limit,
            total: result.total,
            pages,
        },
    }))
}

/// Fetch one listing and count the view.
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing", body = ProductEnvelope),
        (status = 404, description = "Unknown listing", body = ErrorEnvelope)
    ),
    tags = ["products"],
    security([]),
    operation_id = "getProduct"
)]
#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProductEnvelope>> {
    let id = parse_listing_id(&path)?;
    let populated = state.query.get(&id).await?;
    Ok(web::Json(ProductEnvelope {
        success: true,
        message: None,
        product: populated.into(),
    }))
}

/// Edit a listing's descriptive fields. Owner only.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Listing id")),
    request_body = ProductUpdateBody,
    responses(
        (status = 200, description = "Listing updated", body = ProductEnvelope),
        (status = 400, description = "Validation failed", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorEnvelope),
        (status = 403, description = "Caller does not own the listing", body = ErrorEnvelope),
        (status = 404, description = "Unknown listing", body = ErrorEnvelope)
    ),
    tags = ["products"],
    operation_id = "updateProduct"
)]
#[put("/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    body: web::Json<ProductUpdateBody>,
) -> ApiResult<web::Json<ProductEnvelope>> {
    let id = parse_listing_id(&path)?;
    let populated = state
        .command
        .update(&caller.0.id, &id, body.into_inner().into())
        .await?;
    Ok(web::Json(ProductEnvelope {
        success: true,
        message: Some("Product updated successfully".to_owned()),
        product: populated.into(),
    }))
}

/// Mark a listing as sold. Owner only.
#[utoipa::path(
    patch,
    path = "/api/products/{id}/sold",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing marked sold", body = ProductEnvelope),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorEnvelope),
        (status = 403, description = "Caller does not own the listing", body = ErrorEnvelope),
        (status = 404, description = "Unknown listing", body = ErrorEnvelope),
        (status = 409, description = "Listing is no longer active", body = ErrorEnvelope)
    ),
    tags = ["products"],
    operation_id = "markProductSold"
)]
#[patch("/products/{id}/sold")]
pub async fn mark_product_sold(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProductEnvelope>> {
    let id = parse_listing_id(&path)?;
    let populated = state.command.mark_sold(&caller.0.id, &id).await?;
    Ok(web::Json(ProductEnvelope {
        success: true,
        message: Some("Product marked as sold".to_owned()),
        product: populated.into(),
    }))
}

/// Delete a listing and its images. Owner only.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing deleted", body = MessageEnvelope),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorEnvelope),
        (status = 403, description = "Caller does not own the listing", body = ErrorEnvelope),
        (status = 404, description = "Unknown listing", body = ErrorEnvelope)
    ),
    tags = ["products"],
    operation_id = "deleteProduct"
)]
#[delete("/products/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageEnvelope>> {
    let id = parse_listing_id(&path)?;
    state.command.remove(&caller.0.id, &id).await?;
    info!(listing_id = %id, "listing removed by owner");
    Ok(web::Json(MessageEnvelope {
        success: true,
        message: "Product deleted successfully".to_owned(),
    }))
}

fn content_type_for(asset: &AssetId) -> &'static str {
    match asset.extension().map(str::to_ascii_lowercase).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Serve a stored listing image.
#[utoipa::path(
    get,
    path = "/uploads/{asset}",
    params(("asset" = String, Path, description = "Stored image name")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 404, description = "Unknown image", body = ErrorEnvelope)
    ),
    tags = ["uploads"],
    security([]),
    operation_id = "getUpload"
)]
#[get("/uploads/{asset}")]
pub async fn get_upload(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let asset =
        AssetId::new(path.into_inner()).map_err(|_| Error::not_found("Image not found"))?;
    let bytes = state.query.image(&asset).await?;
    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, content_type_for(&asset)))
        .insert_header((X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .insert_header((CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}

/// Register listing routes under the `/api` scope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(create_product)
        .service(list_products)
        .service(mark_product_sold)
        .service(get_product)
        .service(update_product)
        .service(delete_product);
}

#[cfg(test)]
#[path = "products_tests.rs"]
mod tests;
