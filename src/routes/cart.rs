use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartLineAdded, CartList, UpdateCartLineRequest},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_student},
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart_list).post(add_to_cart).delete(clear_cart))
        .route("/{id}", delete(remove_cart_line).patch(update_cart_line))
}

#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "List cart lines for the current student", body = ApiResponse<CartList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartList>>> {
    ensure_student(&user)?;
    let resp = cart_service::list_cart(&state.pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add a product to the cart, accumulating quantity", body = ApiResponse<CartLineAdded>),
        (status = 400, description = "Missing productId or invalid quantity"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartLineAdded>>> {
    ensure_student(&user)?;
    let resp = cart_service::add_item(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/cart/{id}",
    params(("id" = Uuid, Path, description = "Cart line ID")),
    request_body = UpdateCartLineRequest,
    responses(
        (status = 200, description = "Replace the line quantity; 0 deletes the line", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Cart line not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_cart_line(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCartLineRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_student(&user)?;
    let resp = cart_service::set_quantity(&state.pool, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/cart/{id}",
    params(("id" = Uuid, Path, description = "Cart line ID")),
    responses(
        (status = 200, description = "Remove a cart line (idempotent)", body = ApiResponse<serde_json::Value>),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_cart_line(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_student(&user)?;
    let resp = cart_service::remove_item(&state.pool, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/cart",
    responses(
        (status = 200, description = "Clear the whole cart (idempotent)", body = ApiResponse<serde_json::Value>),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_student(&user)?;
    let resp = cart_service::clear(&state.pool, &user).await?;
    Ok(Json(resp))
}
