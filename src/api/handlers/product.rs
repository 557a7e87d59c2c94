//! Product handlers: owner catalogs with search, paging, and owner-checked
//! edits.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateProductRequest, CreateProductResponse, MessageResponse, OwnerQuery, ProductDto,
    ProductListQuery, ProductListResponse, ProductResponse, UpdateProductRequest,
    UpdateProductResponse,
};
use crate::app_state::AppState;
use crate::domain::{NewProduct, ProductId, ProductPatch, ProductQuery};
use crate::error::{ErrorResponse, PinpointError};

/// `POST /products`: Add a product to an owner's catalog.
///
/// # Errors
///
/// Returns [`PinpointError::InvalidArgument`] if `owner_uid` or `name` is
/// missing or the price is negative.
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "Products",
    summary = "Create a product",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = CreateProductResponse),
        (status = 400, description = "Invalid product data", body = ErrorResponse),
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, PinpointError> {
    let (Some(owner_uid), Some(name)) = (req.owner_uid, req.name) else {
        return Err(PinpointError::invalid("owner_uid and name are required"));
    };
    let product = state
        .products
        .create_product(NewProduct {
            owner_uid,
            name,
            description: req.description,
            price: req.price.unwrap_or(0.0),
            image_url: req.image_url,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateProductResponse {
            message: "Product created".to_string(),
            product: product.into(),
        }),
    ))
}

/// `GET /products?owner_uid=&q=&limit=&offset=`: Browse an owner's catalog.
///
/// # Errors
///
/// Returns [`PinpointError::InvalidArgument`] if `owner_uid` is missing or
/// the paging values are malformed.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "Products",
    summary = "List products",
    description = "One page of the owner's products, newest first. `count` is the number of matches across all pages.",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Catalog page", body = ProductListResponse),
        (status = 400, description = "Invalid query", body = ErrorResponse),
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListQuery>,
) -> Result<impl IntoResponse, PinpointError> {
    let query = ProductQuery::parse(
        params.owner_uid.as_deref(),
        params.q.as_deref(),
        params.limit.as_deref(),
        params.offset.as_deref(),
    )?;
    let page = state.products.list_products(&query).await?;

    Ok(Json(ProductListResponse {
        count: page.total,
        products: page.products.into_iter().map(ProductDto::from).collect(),
    }))
}

/// `GET /products/{id}`: Get a product.
///
/// # Errors
///
/// Returns [`PinpointError::ProductNotFound`] if the product does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    tag = "Products",
    summary = "Get a product",
    params(
        ("id" = i64, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Product details", body = ProductResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, PinpointError> {
    let product = state.products.get_product(ProductId::new(id)).await?;
    Ok(Json(ProductResponse {
        product: product.into(),
    }))
}

/// `PUT /products/{id}`: Update a product.
///
/// # Errors
///
/// Returns [`PinpointError::Forbidden`] on an owner mismatch,
/// [`PinpointError::ProductNotFound`] if the product does not exist, or
/// [`PinpointError::InvalidArgument`] for a negative price.
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    tag = "Products",
    summary = "Update a product",
    description = "Only the fields present in the body change. When `owner_uid` is sent it must own the product.",
    params(
        ("id" = i64, Path, description = "Product ID"),
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = UpdateProductResponse),
        (status = 400, description = "Invalid product data", body = ErrorResponse),
        (status = 403, description = "Owner mismatch", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, PinpointError> {
    apply_update(&state, id, req).await
}

/// `PATCH /products/{id}`: Same as `PUT`; both apply partial updates.
///
/// # Errors
///
/// Same as [`update_product`].
#[utoipa::path(
    patch,
    path = "/api/v1/products/{id}",
    tag = "Products",
    summary = "Patch a product",
    params(
        ("id" = i64, Path, description = "Product ID"),
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = UpdateProductResponse),
        (status = 400, description = "Invalid product data", body = ErrorResponse),
        (status = 403, description = "Owner mismatch", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
    )
)]
pub async fn patch_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, PinpointError> {
    apply_update(&state, id, req).await
}

/// `DELETE /products/{id}?owner_uid=`: Remove a product.
///
/// # Errors
///
/// Returns [`PinpointError::Forbidden`] on an owner mismatch or
/// [`PinpointError::ProductNotFound`] if the product does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    tag = "Products",
    summary = "Delete a product",
    params(
        ("id" = i64, Path, description = "Product ID"),
        OwnerQuery,
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 403, description = "Owner mismatch", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(owner): Query<OwnerQuery>,
) -> Result<impl IntoResponse, PinpointError> {
    state
        .products
        .delete_product(ProductId::new(id), owner.owner_uid.as_deref())
        .await?;
    Ok(Json(MessageResponse {
        message: "Product deleted".to_string(),
    }))
}

/// Product routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product).get(list_products))
        .route(
            "/products/{id}",
            get(get_product)
                .put(update_product)
                .patch(patch_product)
                .delete(delete_product),
        )
}

// ── Request Parsing Helpers ─────────────────────────────────────────────

async fn apply_update(
    state: &AppState,
    id: i64,
    req: UpdateProductRequest,
) -> Result<Json<UpdateProductResponse>, PinpointError> {
    let patch = ProductPatch {
        name: req.name,
        description: req.description,
        price: req.price,
        image_url: req.image_url,
    };
    let product = state
        .products
        .update_product(ProductId::new(id), req.owner_uid.as_deref(), patch)
        .await?;
    Ok(Json(UpdateProductResponse {
        message: "Product updated".to_string(),
        product: product.into(),
    }))
}
