use std::collections::HashMap;
use std::env;

use anyhow::Context;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Role overrides keyed by account id; wins over the role claim in the token.
    pub role_policy: HashMap<Uuid, String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let role_policy = parse_role_policy(&env::var("ROLE_POLICY").unwrap_or_default())?;
        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            role_policy,
        })
    }
}

/// Parses `ROLE_POLICY` entries of the form `<account-uuid>=<role>`, comma separated.
fn parse_role_policy(raw: &str) -> anyhow::Result<HashMap<Uuid, String>> {
    let mut policy = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (id, role) = entry
            .split_once('=')
            .with_context(|| format!("invalid ROLE_POLICY entry: {entry}"))?;
        let id = Uuid::parse_str(id.trim())
            .with_context(|| format!("invalid account id in ROLE_POLICY entry: {entry}"))?;
        policy.insert(id, role.trim().to_string());
    }
    Ok(policy)
}
