use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::orders::VendorOrderList,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Product,
    response::ApiResponse,
    routes::params::{HistoryQuery, OrderListQuery},
    services::{
        fulfillment_service,
        inventory_service::{self, AdjustmentList, StockChange},
        product_service,
    },
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAdjustRequest {
    pub product_id: Uuid,
    pub adjustment: i32,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: i64,
    pub stock: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
}

#[derive(Debug, serde::Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductList {
    pub products: Vec<Product>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_vendor_orders))
        .route("/orders/{id}", patch(update_order_status))
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", patch(update_product))
        .route("/inventory/adjust", post(adjust_inventory))
        .route("/inventory/history", get(inventory_history))
}

#[utoipa::path(
    get,
    path = "/vendor/orders",
    params(
        ("status" = Option<String>, Query, description = "Filter by order status"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List the vendor's orders with items", body = ApiResponse<VendorOrderList>),
        (status = 400, description = "Unknown status filter"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn list_vendor_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<VendorOrderList>>> {
    let resp = fulfillment_service::list_vendor_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/vendor/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Transition the order; acceptance decrements stock, delivery completes payment", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Unknown status or illegal transition"),
        (status = 404, description = "Order not found or not owned"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = fulfillment_service::transition(&state, &user, id, &payload.status).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/vendor/inventory/adjust",
    request_body = InventoryAdjustRequest,
    responses(
        (status = 200, description = "Apply a signed stock delta, floored at zero", body = ApiResponse<StockChange>),
        (status = 400, description = "Zero adjustment"),
        (status = 404, description = "Product not found or not owned"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn adjust_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<InventoryAdjustRequest>,
) -> AppResult<Json<ApiResponse<StockChange>>> {
    let resp = inventory_service::adjust(
        &state.pool,
        &user,
        payload.product_id,
        payload.adjustment,
        payload.reason.as_deref(),
    )
    .await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/vendor/inventory/history",
    params(("limit" = Option<u64>, Query, description = "Max rows, default 50")),
    responses(
        (status = 200, description = "Stock adjustment log, most recent first", body = ApiResponse<AdjustmentList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn inventory_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<ApiResponse<AdjustmentList>>> {
    let resp = inventory_service::history(&state.orm, &user, query.limit).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/vendor/products",
    responses(
        (status = 200, description = "List the vendor's products", body = ApiResponse<ProductList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state.pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/vendor/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Create a product", body = ApiResponse<Product>),
        (status = 400, description = "Invalid name, price or stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::create_product(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/vendor/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Edit listing fields; stock moves only through the ledger", body = ApiResponse<Product>),
        (status = 404, description = "Product not found or not owned"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state.pool, &user, id, payload).await?;
    Ok(Json(resp))
}
