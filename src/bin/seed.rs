use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use campus_market_api::{config::AppConfig, db::create_pool, middleware::auth::Claims};

// Dev tooling: seeds a vendor's products and prints signed tokens for the
// accounts in ROLE_POLICY. Real token issuance lives outside this service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let mut accounts: Vec<(Uuid, String)> = config
        .role_policy
        .iter()
        .map(|(id, role)| (*id, role.clone()))
        .collect();
    accounts.sort();
    let vendor_id = accounts
        .iter()
        .find(|(_, role)| role == "vendor")
        .map(|(id, _)| *id)
        .unwrap_or_else(Uuid::new_v4);
    if !accounts.iter().any(|(_, role)| role == "vendor") {
        accounts.push((vendor_id, "vendor".to_string()));
    }
    if !accounts.iter().any(|(_, role)| role == "student") {
        accounts.push((Uuid::new_v4(), "student".to_string()));
    }

    seed_products(&pool, vendor_id).await?;

    println!("Seed completed. Dev tokens (7 day expiry):");
    for (id, role) in &accounts {
        let token = issue_token(&config.jwt_secret, *id, role)?;
        println!("  {role:<8} {id}  {token}");
    }
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool, vendor_id: Uuid) -> anyhow::Result<()> {
    for (name, category, price, stock) in [
        ("Campus Hoodie", "apparel", 4500_i64, 25_i32),
        ("USB-C Cable", "electronics", 900, 100),
        ("Meal Voucher", "food", 1200, 50),
    ] {
        let exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM products WHERE vendor_id = $1 AND name = $2")
                .bind(vendor_id)
                .bind(name)
                .fetch_optional(pool)
                .await?;
        if exists.is_some() {
            continue;
        }
        sqlx::query(
            r#"
            INSERT INTO products (id, vendor_id, name, category, price, stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vendor_id)
        .bind(name)
        .bind(category)
        .bind(price)
        .bind(stock)
        .execute(pool)
        .await?;
    }
    Ok(())
}

fn issue_token(secret: &str, user_id: Uuid, role: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: (Utc::now() + Duration::days(7)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}
