use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_vendor},
    models::Product,
    response::ApiResponse,
    routes::vendor::{CreateProductRequest, ProductList, UpdateProductRequest},
};

pub async fn list_products(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<ProductList>> {
    ensure_vendor(user)?;
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE vendor_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;

    Ok(ApiResponse::success(ProductList { products }))
}

pub async fn create_product(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_vendor(user)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    if payload.price < 0 {
        return Err(AppError::Validation("price must not be negative".to_string()));
    }
    let stock = payload.stock.unwrap_or(0);
    if stock < 0 {
        return Err(AppError::Validation("stock must not be negative".to_string()));
    }

    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (id, vendor_id, name, description, category, price, stock)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.name.trim())
    .bind(payload.description.as_deref())
    .bind(payload.category.as_deref())
    .bind(payload.price)
    .bind(stock)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::with_message("Product created", product))
}

/// Edits the listing fields only. Stock is deliberately absent here: every
/// stock mutation goes through the inventory ledger.
pub async fn update_product(
    pool: &DbPool,
    user: &AuthUser,
    product_id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_vendor(user)?;

    let existing = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE id = $1 AND vendor_id = $2",
    )
    .bind(product_id)
    .bind(user.user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;

    let name = payload.name.unwrap_or(existing.name);
    if name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    let price = payload.price.unwrap_or(existing.price);
    if price < 0 {
        return Err(AppError::Validation("price must not be negative".to_string()));
    }
    let description = payload.description.or(existing.description);
    let category = payload.category.or(existing.category);

    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = $3, description = $4, category = $5, price = $6
        WHERE id = $1 AND vendor_id = $2
        RETURNING *
        "#,
    )
    .bind(product_id)
    .bind(user.user_id)
    .bind(name.trim())
    .bind(description.as_deref())
    .bind(category.as_deref())
    .bind(price)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::with_message("Product updated", product))
}
