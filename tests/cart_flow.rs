mod common;

use campus_market_api::{
    dto::cart::UpdateCartLineRequest,
    error::AppError,
    models::CartLine,
    services::cart_service,
};
use uuid::Uuid;

// Repeated adds of the same product accumulate onto one line.
#[tokio::test]
async fn repeated_add_accumulates_quantity() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };
    let buyer = common::student();
    let product = common::seed_product(&state, Uuid::new_v4(), "Notebook", 500, 10).await?;

    let first = cart_service::add_item(&state.pool, &buyer, common::add_request(product.id, 1))
        .await?
        .data
        .unwrap();
    let second = cart_service::add_item(&state.pool, &buyer, common::add_request(product.id, 2))
        .await?
        .data
        .unwrap();
    assert_eq!(first.item_id, second.item_id);

    let lines = cart_service::list_cart(&state.pool, &buyer)
        .await?
        .data
        .unwrap()
        .items;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 3);

    Ok(())
}

// Two simultaneous adds must both land: the upsert increments in place, so
// the final quantity is the sum, not the last write.
#[tokio::test]
async fn concurrent_adds_both_count() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };
    let buyer = common::student();
    let product = common::seed_product(&state, Uuid::new_v4(), "Sticker Pack", 150, 100).await?;

    let (a, b) = tokio::join!(
        cart_service::add_item(&state.pool, &buyer, common::add_request(product.id, 1)),
        cart_service::add_item(&state.pool, &buyer, common::add_request(product.id, 1)),
    );
    a?;
    b?;

    let lines = cart_service::list_cart(&state.pool, &buyer)
        .await?
        .data
        .unwrap()
        .items;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 2);

    Ok(())
}

#[tokio::test]
async fn set_quantity_replaces_instead_of_accumulating() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };
    let buyer = common::student();
    let product = common::seed_product(&state, Uuid::new_v4(), "Pen", 120, 10).await?;

    let added = cart_service::add_item(&state.pool, &buyer, common::add_request(product.id, 3))
        .await?
        .data
        .unwrap();

    cart_service::set_quantity(
        &state.pool,
        &buyer,
        added.item_id,
        UpdateCartLineRequest { quantity: Some(2) },
    )
    .await?;

    let lines = cart_service::list_cart(&state.pool, &buyer)
        .await?
        .data
        .unwrap()
        .items;
    assert_eq!(lines[0].quantity, 2);

    Ok(())
}

#[tokio::test]
async fn zero_quantity_deletes_and_negative_is_rejected() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };
    let buyer = common::student();
    let product = common::seed_product(&state, Uuid::new_v4(), "Eraser", 80, 10).await?;

    let added = cart_service::add_item(&state.pool, &buyer, common::add_request(product.id, 1))
        .await?
        .data
        .unwrap();

    let err = cart_service::set_quantity(
        &state.pool,
        &buyer,
        added.item_id,
        UpdateCartLineRequest { quantity: Some(-1) },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    cart_service::set_quantity(
        &state.pool,
        &buyer,
        added.item_id,
        UpdateCartLineRequest { quantity: Some(0) },
    )
    .await?;

    let lines = cart_service::list_cart(&state.pool, &buyer)
        .await?
        .data
        .unwrap()
        .items;
    assert!(lines.is_empty());

    Ok(())
}

#[tokio::test]
async fn removes_are_idempotent_and_owner_scoped() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };
    let buyer = common::student();
    let other = common::student();
    let product = common::seed_product(&state, Uuid::new_v4(), "Mug", 700, 10).await?;

    let added = cart_service::add_item(&state.pool, &buyer, common::add_request(product.id, 1))
        .await?
        .data
        .unwrap();

    // Another student's delete must not touch the line.
    cart_service::remove_item(&state.pool, &other, added.item_id).await?;
    let lines: Vec<CartLine> = cart_service::list_cart(&state.pool, &buyer)
        .await?
        .data
        .unwrap()
        .items;
    assert_eq!(lines.len(), 1);

    cart_service::remove_item(&state.pool, &buyer, added.item_id).await?;
    // Removing again still succeeds.
    cart_service::remove_item(&state.pool, &buyer, added.item_id).await?;

    Ok(())
}

#[tokio::test]
async fn add_rejects_missing_product_and_bad_quantity() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };
    let buyer = common::student();

    let err = cart_service::add_item(&state.pool, &buyer, common::add_request(Uuid::new_v4(), 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let product = common::seed_product(&state, Uuid::new_v4(), "Badge", 300, 5).await?;
    let err = cart_service::add_item(&state.pool, &buyer, common::add_request(product.id, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}
