#![allow(dead_code)]

use uuid::Uuid;

use campus_market_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool},
    dto::cart::AddToCartRequest,
    dto::orders::CheckoutRequest,
    middleware::auth::AuthUser,
    models::Product,
    state::AppState,
};

/// Returns `None` (with a skip notice) when no database is configured, so the
/// integration suite can run in environments without Postgres.
pub async fn try_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    let orm = create_orm_conn(&database_url).await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: "test-secret".to_string(),
        role_policy: Default::default(),
    };

    Ok(Some(AppState { pool, orm, config }))
}

// Tests isolate through fresh account ids rather than table truncation, so
// they can run in parallel against a shared database.
pub fn student() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: "student".to_string(),
    }
}

pub fn vendor() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: "vendor".to_string(),
    }
}

pub async fn seed_product(
    state: &AppState,
    vendor_id: Uuid,
    name: &str,
    price: i64,
    stock: i32,
) -> anyhow::Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, vendor_id, name, price, stock) VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(vendor_id)
    .bind(name)
    .bind(price)
    .bind(stock)
    .fetch_one(&state.pool)
    .await?;
    Ok(product)
}

pub fn add_request(product_id: Uuid, quantity: i32) -> AddToCartRequest {
    AddToCartRequest {
        product_id: Some(product_id),
        quantity: Some(quantity),
    }
}

pub fn checkout_request() -> CheckoutRequest {
    CheckoutRequest {
        shipping_address: Some("Dorm 4, Room 12".to_string()),
        payment_method: None,
        transaction_id: None,
    }
}

pub async fn current_stock(state: &AppState, product_id: Uuid) -> anyhow::Result<i32> {
    let (stock,): (i32,) = sqlx::query_as("SELECT stock FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(stock)
}
