use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use contracts::system::auth::TokenClaims;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::OnceCell;
use rand::Rng;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

const ACCESS_TOKEN_LIFETIME_HOURS: i64 = 24;
const SECRET_SETTING_KEY: &str = "jwt_secret";

static JWT_SECRET: OnceCell<String> = OnceCell::new();

/// Resolve the signing key once at startup.
///
/// A key from configuration wins; otherwise the key stored in `sys_settings`
/// is reused, or a new one is generated and stored there so tokens survive
/// restarts.
pub async fn init_jwt_secret<C: ConnectionTrait>(conn: &C, configured: Option<&str>) -> Result<()> {
    let secret = match configured {
        Some(secret) => secret.to_string(),
        None => match get_jwt_secret_from_db(conn).await? {
            Some(secret) => secret,
            None => {
                let secret = generate_jwt_secret();
                save_jwt_secret_to_db(conn, &secret).await?;
                tracing::info!("Generated new token signing key");
                secret
            }
        },
    };
    JWT_SECRET
        .set(secret)
        .map_err(|_| anyhow::anyhow!("JWT secret already initialized"))
}

fn jwt_secret() -> Result<&'static str> {
    JWT_SECRET
        .get()
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("JWT secret has not been initialized"))
}

/// Claims for a freshly issued admin token
pub fn new_claims(username: &str, now: DateTime<Utc>) -> TokenClaims {
    let exp = (now + chrono::Duration::hours(ACCESS_TOKEN_LIFETIME_HOURS)).timestamp() as usize;
    TokenClaims {
        sub: "admin".to_string(),
        username: username.to_string(),
        is_admin: true,
        exp,
        iat: now.timestamp() as usize,
        jti: uuid::Uuid::new_v4().to_string(),
    }
}

pub fn encode_token(claims: &TokenClaims, secret: &str) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")
}

pub fn decode_token(token: &str, secret: &str) -> Result<TokenClaims> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;
    Ok(token_data.claims)
}

/// Generate JWT access token with 24 hours lifetime
pub fn generate_access_token(username: &str) -> Result<(String, TokenClaims)> {
    let claims = new_claims(username, Utc::now());
    let token = encode_token(&claims, jwt_secret()?)?;
    Ok((token, claims))
}

/// Validate JWT token and extract claims
pub fn validate_token(token: &str) -> Result<TokenClaims> {
    decode_token(token, jwt_secret()?)
}

/// Generate a cryptographically secure JWT secret (256 bits)
fn generate_jwt_secret() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen::<u8>()).collect();
    general_purpose::STANDARD.encode(&random_bytes)
}

async fn get_jwt_secret_from_db<C: ConnectionTrait>(conn: &C) -> Result<Option<String>> {
    let result = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT value FROM sys_settings WHERE key = ?",
            [SECRET_SETTING_KEY.into()],
        ))
        .await?;

    match result {
        Some(row) => {
            let secret: String = row.try_get("", "value")?;
            Ok(Some(secret))
        }
        None => Ok(None),
    }
}

async fn save_jwt_secret_to_db<C: ConnectionTrait>(conn: &C, secret: &str) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT OR REPLACE INTO sys_settings (key, value, description, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
        [
            SECRET_SETTING_KEY.into(),
            secret.to_string().into(),
            "Auto-generated JWT secret for authentication".into(),
            now.clone().into(),
            now.into(),
        ],
    ))
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;

    const SECRET: &str = "test-signing-key";

    #[test]
    fn test_valid_token_roundtrip() {
        let claims = new_claims("admin", Utc::now());
        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, "admin");
        assert_eq!(decoded.jti, claims.jti);
        assert_eq!(decoded.exp - decoded.iat, 24 * 3600);
        assert!(decoded.is_admin);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let claims = new_claims("admin", Utc::now() - chrono::Duration::hours(48));
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let token = encode_token(&new_claims("admin", Utc::now()), SECRET).unwrap();
        assert!(decode_token(&token, "another-key").is_err());

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = new_claims("intruder", Utc::now());
        let forged_token = encode_token(&forged, "attacker-key").unwrap();
        parts[1] = forged_token.split('.').nth(1).unwrap().to_string();
        assert!(decode_token(&parts.join("."), SECRET).is_err());
    }

    #[tokio::test]
    async fn test_generated_secret_is_persisted() {
        let conn = test_connection().await;
        assert_eq!(get_jwt_secret_from_db(&conn).await.unwrap(), None);

        let secret = generate_jwt_secret();
        save_jwt_secret_to_db(&conn, &secret).await.unwrap();
        assert_eq!(get_jwt_secret_from_db(&conn).await.unwrap(), Some(secret));
    }
}
