use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

use crate::shared::config::{get_database_path, Config};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Tables are created in dependency order; `CREATE ... IF NOT EXISTS` keeps
/// the bootstrap idempotent across restarts.
const SCHEMA: &[(&str, &str)] = &[
    (
        "a001_agent",
        r#"
        CREATE TABLE IF NOT EXISTS a001_agent (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            email TEXT,
            phone TEXT,
            commission_rate REAL NOT NULL DEFAULT 0.1,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a002_policy_holder",
        r#"
        CREATE TABLE IF NOT EXISTS a002_policy_holder (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            national_id TEXT,
            address TEXT,
            phone TEXT,
            email TEXT,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a003_policy",
        r#"
        CREATE TABLE IF NOT EXISTS a003_policy (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL,
            comment TEXT,
            holder_id TEXT NOT NULL REFERENCES a002_policy_holder(id),
            agent_id TEXT REFERENCES a001_agent(id),
            premium_amount REAL NOT NULL DEFAULT 0,
            benefit_amount REAL NOT NULL DEFAULT 0,
            benefit_description TEXT,
            start_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'Active',
            grace_days INTEGER NOT NULL DEFAULT 30,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a004_member",
        r#"
        CREATE TABLE IF NOT EXISTS a004_member (
            id TEXT PRIMARY KEY NOT NULL,
            policy_id TEXT NOT NULL REFERENCES a003_policy(id),
            full_name TEXT NOT NULL,
            relationship TEXT,
            date_of_birth TEXT,
            national_id TEXT,
            created_at TEXT NOT NULL
        );
        "#,
    ),
    (
        "a005_payment",
        r#"
        CREATE TABLE IF NOT EXISTS a005_payment (
            id TEXT PRIMARY KEY NOT NULL,
            policy_id TEXT NOT NULL REFERENCES a003_policy(id),
            amount REAL NOT NULL,
            paid_at TEXT NOT NULL
        );
        "#,
    ),
    (
        "a006_commission",
        r#"
        CREATE TABLE IF NOT EXISTS a006_commission (
            id TEXT PRIMARY KEY NOT NULL,
            agent_id TEXT NOT NULL REFERENCES a001_agent(id),
            payment_id TEXT NOT NULL UNIQUE REFERENCES a005_payment(id),
            amount REAL NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    ),
    (
        "sys_sequences",
        r#"
        CREATE TABLE IF NOT EXISTS sys_sequences (
            name TEXT PRIMARY KEY NOT NULL,
            value INTEGER NOT NULL
        );
        "#,
    ),
    (
        "sys_settings",
        r#"
        CREATE TABLE IF NOT EXISTS sys_settings (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            description TEXT,
            created_at TEXT,
            updated_at TEXT
        );
        "#,
    ),
    (
        "sys_revoked_tokens",
        r#"
        CREATE TABLE IF NOT EXISTS sys_revoked_tokens (
            jti TEXT PRIMARY KEY NOT NULL,
            expires_at INTEGER NOT NULL,
            revoked_at TEXT NOT NULL
        );
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_a003_policy_status ON a003_policy(status);",
    "CREATE INDEX IF NOT EXISTS idx_a003_policy_agent ON a003_policy(agent_id);",
    "CREATE INDEX IF NOT EXISTS idx_a004_member_policy ON a004_member(policy_id);",
    "CREATE INDEX IF NOT EXISTS idx_a005_payment_policy ON a005_payment(policy_id);",
    "CREATE INDEX IF NOT EXISTS idx_a006_commission_agent ON a006_commission(agent_id);",
];

/// Create every table and index the application uses
pub async fn bootstrap_schema<C: ConnectionTrait>(conn: &C) -> anyhow::Result<()> {
    for (table, sql) in SCHEMA {
        tracing::debug!("Ensuring table {}", table);
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }
    for sql in INDEXES {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }
    Ok(())
}

pub async fn initialize_database(config: &Config) -> anyhow::Result<()> {
    let absolute_path = get_database_path(config)?;
    if let Some(parent) = absolute_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    tracing::info!("Opening database {}", absolute_path.display());
    let conn = Database::connect(&db_url).await?;

    bootstrap_schema(&conn).await?;
    set_connection(conn)
}

/// Install the process-wide connection; fails if one is already set
pub fn set_connection(conn: DatabaseConnection) -> anyhow::Result<()> {
    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

/// Fresh in-memory database with the production schema.
///
/// One pooled connection: every handle must see the same in-memory file.
#[cfg(test)]
pub async fn test_connection() -> DatabaseConnection {
    use sea_orm::ConnectOptions;

    let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let conn = Database::connect(opt).await.expect("in-memory database");
    bootstrap_schema(&conn).await.expect("schema bootstrap");
    conn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let conn = test_connection().await;
        bootstrap_schema(&conn).await.unwrap();

        let rows = conn
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type='table' ORDER BY name".to_string(),
            ))
            .await
            .unwrap();
        let names: Vec<String> = rows
            .iter()
            .map(|r| r.try_get::<String>("", "name").unwrap())
            .collect();
        for (table, _) in SCHEMA {
            assert!(names.iter().any(|n| n == table), "missing table {}", table);
        }
    }
}
