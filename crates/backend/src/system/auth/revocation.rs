//! Tokens invalidated by logout, keyed by `jti`.
//!
//! Rows are only needed until the token would have expired anyway, so each
//! revocation also drops the entries whose `exp` has passed.

use chrono::Utc;
use contracts::system::auth::TokenClaims;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

pub async fn revoke<C: ConnectionTrait>(conn: &C, claims: &TokenClaims) -> anyhow::Result<()> {
    let now = Utc::now();

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "DELETE FROM sys_revoked_tokens WHERE expires_at < ?",
        [now.timestamp().into()],
    ))
    .await?;

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT OR IGNORE INTO sys_revoked_tokens (jti, expires_at, revoked_at) VALUES (?, ?, ?)",
        [
            claims.jti.clone().into(),
            (claims.exp as i64).into(),
            now.to_rfc3339().into(),
        ],
    ))
    .await?;

    Ok(())
}

pub async fn is_revoked<C: ConnectionTrait>(conn: &C, jti: &str) -> anyhow::Result<bool> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT jti FROM sys_revoked_tokens WHERE jti = ?",
            [jti.into()],
        ))
        .await?;
    Ok(row.is_some())
}
