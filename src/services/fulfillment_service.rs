use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::{
    dto::orders::{VendorOrderDetail, VendorOrderList},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_vendor},
    models::{Order, OrderItem, OrderStatus, PaymentStatus},
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{
        inventory_service,
        order_service::{order_from_entity, order_item_from_entity},
    },
    state::AppState,
};

/// Move an order to `new_status`, applying the transition's side effects.
///
/// The order row is locked for the whole transaction, so a duplicate request
/// racing this one waits, re-reads the advanced status, and fails the
/// successor check instead of re-applying side effects. Acceptance
/// (pending → processing) is the only transition that touches inventory;
/// delivery completes the paired payment.
pub async fn transition(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    raw_status: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_vendor(user)?;

    let next = raw_status
        .parse::<OrderStatus>()
        .map_err(|_| AppError::Validation(format!("unknown order status: {raw_status}")))?;

    let mut tx = state.pool.begin().await?;

    let order = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE id = $1 AND vendor_id = $2 FOR UPDATE",
    )
    .bind(order_id)
    .bind(user.user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;

    let current = order.status.parse::<OrderStatus>().map_err(|_| {
        AppError::Internal(anyhow::anyhow!(
            "order {order_id} has unrecognized status {:?}",
            order.status
        ))
    })?;

    if !current.can_transition_to(next) {
        return Err(AppError::Validation(format!(
            "cannot move order from {current} to {next}"
        )));
    }

    sqlx::query("UPDATE orders SET status = $2, updated_at = now() WHERE id = $1")
        .bind(order_id)
        .bind(next.as_str())
        .execute(&mut *tx)
        .await?;

    if current == OrderStatus::Pending && next == OrderStatus::Processing {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        for item in &items {
            let change = inventory_service::decrement(
                &mut *tx,
                item.product_id,
                item.quantity,
                "order accepted",
            )
            .await?;
            tracing::debug!(
                order = %order_id,
                product = %item.product_id,
                previous = change.previous_stock,
                new = change.new_stock,
                "stock decremented"
            );
        }
    }

    if next == OrderStatus::Delivered {
        sqlx::query(
            "UPDATE payments SET status = $2, completed_at = now() WHERE order_id = $1",
        )
        .bind(order_id)
        .bind(PaymentStatus::Completed.as_str())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(order = %order_id, from = %current, to = %next, "order transitioned");

    Ok(ApiResponse::ok("Order updated"))
}

/// Orders owned by the calling vendor, optionally filtered by status.
pub async fn list_vendor_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<VendorOrderList>> {
    ensure_vendor(user)?;
    let (_, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all().add(OrderCol::VendorId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        status
            .parse::<OrderStatus>()
            .map_err(|_| AppError::Validation(format!("unknown order status: {status}")))?;
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let orders = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut detailed = Vec::with_capacity(orders.len());
    for order in orders {
        let items = OrderItems::find()
            .filter(OrderItemCol::OrderId.eq(order.id))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(order_item_from_entity)
            .collect();
        detailed.push(VendorOrderDetail {
            order: order_from_entity(order),
            items,
        });
    }

    Ok(ApiResponse::success(VendorOrderList { orders: detailed }))
}
