use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::cart::{AddToCartRequest, CartLineAdded, CartList, UpdateCartLineRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartLine, Product},
    response::ApiResponse,
};

pub async fn list_cart(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let items = sqlx::query_as::<_, CartLine>(
        "SELECT * FROM cart_items WHERE student_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;

    Ok(ApiResponse::success(CartList { items }))
}

pub async fn add_item(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartLineAdded>> {
    let product_id = payload
        .product_id
        .ok_or_else(|| AppError::Validation("productId is required".to_string()))?;
    let quantity = payload.quantity.unwrap_or(1);
    if quantity <= 0 {
        return Err(AppError::Validation(
            "quantity must be a positive integer".to_string(),
        ));
    }

    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;

    // One statement, so two concurrent adds for the same product both land:
    // the conflict arm increments in place instead of overwriting. Snapshot
    // fields keep the values captured at first add.
    let line = sqlx::query_as::<_, CartLine>(
        r#"
        INSERT INTO cart_items (id, student_id, product_id, vendor_id, product_name, unit_price, quantity)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (student_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(product.id)
    .bind(product.vendor_id)
    .bind(&product.name)
    .bind(product.price)
    .bind(quantity)
    .fetch_one(pool)
    .await?;

    tracing::debug!(student = %user.user_id, product = %product.id, quantity = line.quantity, "cart line upserted");

    Ok(ApiResponse::with_message(
        "Added to cart",
        CartLineAdded { item_id: line.id },
    ))
}

pub async fn set_quantity(
    pool: &DbPool,
    user: &AuthUser,
    line_id: Uuid,
    payload: UpdateCartLineRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let quantity = payload
        .quantity
        .ok_or_else(|| AppError::Validation("quantity is required".to_string()))?;
    if quantity < 0 {
        return Err(AppError::Validation(
            "quantity must not be negative".to_string(),
        ));
    }

    if quantity == 0 {
        sqlx::query("DELETE FROM cart_items WHERE id = $1 AND student_id = $2")
            .bind(line_id)
            .bind(user.user_id)
            .execute(pool)
            .await?;
        return Ok(ApiResponse::ok("Removed from cart"));
    }

    let result = sqlx::query(
        "UPDATE cart_items SET quantity = $3 WHERE id = $1 AND student_id = $2",
    )
    .bind(line_id)
    .bind(user.user_id)
    .bind(quantity)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("cart item not found".to_string()));
    }

    Ok(ApiResponse::ok("Cart updated"))
}

/// Idempotent: removing an already-removed line still succeeds.
pub async fn remove_item(
    pool: &DbPool,
    user: &AuthUser,
    line_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    sqlx::query("DELETE FROM cart_items WHERE id = $1 AND student_id = $2")
        .bind(line_id)
        .bind(user.user_id)
        .execute(pool)
        .await?;

    Ok(ApiResponse::ok("Removed from cart"))
}

pub async fn clear(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<serde_json::Value>> {
    sqlx::query("DELETE FROM cart_items WHERE student_id = $1")
        .bind(user.user_id)
        .execute(pool)
        .await?;

    Ok(ApiResponse::ok("Cart cleared"))
}
