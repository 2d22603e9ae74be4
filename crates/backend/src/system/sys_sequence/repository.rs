use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

/// Next value of the named counter: 1 on first use, then +1 per call.
///
/// One upsert statement, so concurrent callers never observe the same value.
pub async fn next_value<C: ConnectionTrait>(conn: &C, name: &str) -> anyhow::Result<i64> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT INTO sys_sequences (name, value) VALUES (?, 1)
             ON CONFLICT(name) DO UPDATE SET value = value + 1
             RETURNING value",
            [name.into()],
        ))
        .await?
        .ok_or_else(|| anyhow::anyhow!("Sequence '{}' returned no value", name))?;

    Ok(row.try_get("", "value")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;

    /// Current value without advancing; `None` for an unused counter
    async fn current_value<C: ConnectionTrait>(conn: &C, name: &str) -> anyhow::Result<Option<i64>> {
        let row = conn
            .query_one(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "SELECT value FROM sys_sequences WHERE name = ?",
                [name.into()],
            ))
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("", "value")?)),
            None => Ok(None),
        }
    }

    #[tokio::test]
    async fn test_counter_starts_at_one_and_increments() {
        let conn = test_connection().await;
        assert_eq!(current_value(&conn, "policy_2024").await.unwrap(), None);

        let values = [
            next_value(&conn, "policy_2024").await.unwrap(),
            next_value(&conn, "policy_2024").await.unwrap(),
            next_value(&conn, "policy_2024").await.unwrap(),
        ];
        assert_eq!(values, [1, 2, 3]);
        assert_eq!(current_value(&conn, "policy_2024").await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let conn = test_connection().await;
        next_value(&conn, "policy_2024").await.unwrap();
        next_value(&conn, "policy_2024").await.unwrap();

        assert_eq!(next_value(&conn, "policy_2025").await.unwrap(), 1);
        assert_eq!(next_value(&conn, "policy_2024").await.unwrap(), 3);
    }
}
