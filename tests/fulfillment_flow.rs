mod common;

use campus_market_api::{
    error::AppError,
    middleware::auth::AuthUser,
    models::InventoryAdjustment,
    routes::params::{OrderListQuery, Pagination},
    services::{cart_service, fulfillment_service, order_service},
    state::AppState,
};
use uuid::Uuid;

async fn place_order(
    state: &AppState,
    buyer: &AuthUser,
    product_id: Uuid,
    quantity: i32,
) -> anyhow::Result<Uuid> {
    cart_service::add_item(&state.pool, buyer, common::add_request(product_id, quantity)).await?;
    let order_ids = order_service::checkout(state, buyer, common::checkout_request())
        .await?
        .data
        .unwrap()
        .order_ids;
    Ok(order_ids[0])
}

async fn adjustments_for(
    state: &AppState,
    product_id: Uuid,
) -> anyhow::Result<Vec<InventoryAdjustment>> {
    let rows = sqlx::query_as::<_, InventoryAdjustment>(
        "SELECT * FROM inventory_adjustments WHERE product_id = $1 ORDER BY created_at DESC",
    )
    .bind(product_id)
    .fetch_all(&state.pool)
    .await?;
    Ok(rows)
}

#[tokio::test]
async fn acceptance_decrements_stock_and_logs_adjustment() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };
    let seller = common::vendor();
    let buyer = common::student();
    let product = common::seed_product(&state, seller.user_id, "Charger", 1500, 20).await?;
    let order_id = place_order(&state, &buyer, product.id, 5).await?;

    fulfillment_service::transition(&state, &seller, order_id, "processing").await?;

    assert_eq!(common::current_stock(&state, product.id).await?, 15);
    let log = adjustments_for(&state, product.id).await?;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].previous_stock, 20);
    assert_eq!(log[0].delta, -5);
    assert_eq!(log[0].new_stock, 15);
    assert_eq!(log[0].reason, "order accepted");

    Ok(())
}

// Stock floors at zero, and the audit row records the delta actually applied
// rather than the requested quantity.
#[tokio::test]
async fn oversized_order_floors_stock_and_logs_applied_delta() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };
    let seller = common::vendor();
    let buyer = common::student();
    let product = common::seed_product(&state, seller.user_id, "Poster Tube", 600, 10).await?;
    let order_id = place_order(&state, &buyer, product.id, 15).await?;

    fulfillment_service::transition(&state, &seller, order_id, "processing").await?;

    assert_eq!(common::current_stock(&state, product.id).await?, 0);
    let log = adjustments_for(&state, product.id).await?;
    assert_eq!(log[0].previous_stock, 10);
    assert_eq!(log[0].delta, -10);
    assert_eq!(log[0].new_stock, 0);

    Ok(())
}

// A duplicate accept request fails the successor check and must not touch
// stock a second time.
#[tokio::test]
async fn repeated_accept_decrements_exactly_once() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };
    let seller = common::vendor();
    let buyer = common::student();
    let product = common::seed_product(&state, seller.user_id, "Tote Bag", 800, 20).await?;
    let order_id = place_order(&state, &buyer, product.id, 5).await?;

    fulfillment_service::transition(&state, &seller, order_id, "processing").await?;
    let err = fulfillment_service::transition(&state, &seller, order_id, "processing")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(common::current_stock(&state, product.id).await?, 15);
    assert_eq!(adjustments_for(&state, product.id).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn delivery_completes_the_paired_payment() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };
    let seller = common::vendor();
    let buyer = common::student();
    let product = common::seed_product(&state, seller.user_id, "Water Bottle", 1100, 30).await?;
    let order_id = place_order(&state, &buyer, product.id, 2).await?;

    fulfillment_service::transition(&state, &seller, order_id, "processing").await?;
    fulfillment_service::transition(&state, &seller, order_id, "shipped").await?;
    fulfillment_service::transition(&state, &seller, order_id, "delivered").await?;

    let orders = order_service::list_orders(&state, &buyer)
        .await?
        .data
        .unwrap()
        .orders;
    assert_eq!(orders[0].order.status, "delivered");
    let payment = orders[0].payment.as_ref().expect("paired payment");
    assert_eq!(payment.status, "completed");
    assert!(payment.completed_at.is_some());

    Ok(())
}

#[tokio::test]
async fn illegal_transitions_are_rejected() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };
    let seller = common::vendor();
    let buyer = common::student();
    let product = common::seed_product(&state, seller.user_id, "Desk Lamp", 2000, 10).await?;
    let order_id = place_order(&state, &buyer, product.id, 1).await?;

    // Skipping ahead from pending is illegal.
    for target in ["shipped", "delivered"] {
        let err = fulfillment_service::transition(&state, &seller, order_id, target)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    // Unknown status names are rejected before any lookup.
    let err = fulfillment_service::transition(&state, &seller, order_id, "paid")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Cancelled is terminal.
    fulfillment_service::transition(&state, &seller, order_id, "cancelled").await?;
    let err = fulfillment_service::transition(&state, &seller, order_id, "processing")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Cancelling a pending order never touched inventory.
    assert_eq!(common::current_stock(&state, product.id).await?, 10);
    assert!(adjustments_for(&state, product.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn cross_vendor_transition_is_not_found() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };
    let seller = common::vendor();
    let intruder = common::vendor();
    let buyer = common::student();
    let product = common::seed_product(&state, seller.user_id, "Backpack", 3500, 10).await?;
    let order_id = place_order(&state, &buyer, product.id, 1).await?;

    let err = fulfillment_service::transition(&state, &intruder, order_id, "processing")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // No mutation happened.
    assert_eq!(common::current_stock(&state, product.id).await?, 10);
    let orders = order_service::list_orders(&state, &buyer)
        .await?
        .data
        .unwrap()
        .orders;
    assert_eq!(orders[0].order.status, "pending");

    Ok(())
}

#[tokio::test]
async fn vendor_order_listing_filters_by_status() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };
    let seller = common::vendor();
    let buyer = common::student();
    let product = common::seed_product(&state, seller.user_id, "Umbrella", 900, 10).await?;
    let order_id = place_order(&state, &buyer, product.id, 1).await?;
    fulfillment_service::transition(&state, &seller, order_id, "processing").await?;

    let query = |status: Option<&str>| OrderListQuery {
        pagination: Pagination {
            page: None,
            per_page: None,
        },
        status: status.map(str::to_string),
    };

    let processing = fulfillment_service::list_vendor_orders(&state, &seller, query(Some("processing")))
        .await?
        .data
        .unwrap()
        .orders;
    assert!(processing.iter().any(|o| o.order.id == order_id));
    assert_eq!(processing[0].items.len(), 1);

    let pending = fulfillment_service::list_vendor_orders(&state, &seller, query(Some("pending")))
        .await?
        .data
        .unwrap()
        .orders;
    assert!(pending.iter().all(|o| o.order.id != order_id));

    let err = fulfillment_service::list_vendor_orders(&state, &seller, query(Some("paid")))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}
