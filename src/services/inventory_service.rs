use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use sqlx::PgExecutor;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::OrmConn,
    entity::inventory_adjustments::{
        Column as AdjCol, Entity as InventoryAdjustments, Model as AdjustmentModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_vendor, ensure_vendor_or_admin},
    models::InventoryAdjustment,
    response::ApiResponse,
};

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub product_id: Uuid,
    pub previous_stock: i32,
    pub new_stock: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentList {
    pub adjustments: Vec<InventoryAdjustment>,
}

// Locks the product row, applies the delta floored at zero, and appends the
// audit row in one statement. The audit delta is new - previous: when the
// clamp bites, the log records what actually came off the shelf, not what
// was asked for.
const APPLY_DELTA_SQL: &str = r#"
WITH target AS (
    SELECT id, vendor_id, stock
    FROM products
    WHERE id = $1 AND ($2::uuid IS NULL OR vendor_id = $2)
    FOR UPDATE
), updated AS (
    UPDATE products p
    SET stock = GREATEST(p.stock + $3, 0)
    FROM target t
    WHERE p.id = t.id
    RETURNING p.id, p.vendor_id, t.stock AS previous_stock, p.stock AS new_stock
)
INSERT INTO inventory_adjustments (id, product_id, vendor_id, previous_stock, delta, new_stock, reason)
SELECT $5, u.id, u.vendor_id, u.previous_stock, u.new_stock - u.previous_stock, u.new_stock, $4
FROM updated u
RETURNING product_id, previous_stock, new_stock
"#;

/// The only write path for stock. `vendor` scopes the mutation to the owning
/// vendor; `None` skips the ownership check (order acceptance, admin).
pub async fn apply_delta<'e, E>(
    executor: E,
    product_id: Uuid,
    vendor: Option<Uuid>,
    delta: i32,
    reason: &str,
) -> AppResult<StockChange>
where
    E: PgExecutor<'e>,
{
    let change = sqlx::query_as::<_, StockChange>(APPLY_DELTA_SQL)
        .bind(product_id)
        .bind(vendor)
        .bind(delta)
        .bind(reason)
        .bind(Uuid::new_v4())
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;

    Ok(change)
}

pub async fn decrement<'e, E>(
    executor: E,
    product_id: Uuid,
    quantity: i32,
    reason: &str,
) -> AppResult<StockChange>
where
    E: PgExecutor<'e>,
{
    if quantity <= 0 {
        return Err(AppError::Validation(
            "quantity must be a positive integer".to_string(),
        ));
    }
    apply_delta(executor, product_id, None, -quantity, reason).await
}

pub async fn adjust<'e, E>(
    executor: E,
    user: &AuthUser,
    product_id: Uuid,
    adjustment: i32,
    reason: Option<&str>,
) -> AppResult<ApiResponse<StockChange>>
where
    E: PgExecutor<'e>,
{
    ensure_vendor_or_admin(user)?;
    if adjustment == 0 {
        return Err(AppError::Validation(
            "adjustment must be a non-zero integer".to_string(),
        ));
    }

    let vendor = if user.role == "admin" {
        None
    } else {
        Some(user.user_id)
    };
    let change = apply_delta(
        executor,
        product_id,
        vendor,
        adjustment,
        reason.unwrap_or("manual adjustment"),
    )
    .await?;

    Ok(ApiResponse::with_message("Inventory adjusted", change))
}

pub async fn history(
    orm: &OrmConn,
    user: &AuthUser,
    limit: Option<u64>,
) -> AppResult<ApiResponse<AdjustmentList>> {
    ensure_vendor(user)?;
    let limit = limit.unwrap_or(50).clamp(1, 500);

    let adjustments = InventoryAdjustments::find()
        .filter(AdjCol::VendorId.eq(user.user_id))
        .order_by_desc(AdjCol::CreatedAt)
        .limit(limit)
        .all(orm)
        .await?
        .into_iter()
        .map(adjustment_from_entity)
        .collect();

    Ok(ApiResponse::success(AdjustmentList { adjustments }))
}

fn adjustment_from_entity(model: AdjustmentModel) -> InventoryAdjustment {
    InventoryAdjustment {
        id: model.id,
        product_id: model.product_id,
        vendor_id: model.vendor_id,
        previous_stock: model.previous_stock,
        delta: model.delta,
        new_stock: model.new_stock,
        reason: model.reason,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
