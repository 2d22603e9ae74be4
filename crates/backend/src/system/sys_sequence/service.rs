use chrono::{Datelike, Utc};
use contracts::domain::a003_policy::number::{format_policy_number, sequence_key};
use sea_orm::ConnectionTrait;

use super::repository;

/// Issue the next policy number for `year`, e.g. `POL-2024-000001`
pub async fn generate_policy_number<C: ConnectionTrait>(conn: &C, year: i32) -> anyhow::Result<String> {
    let seq = repository::next_value(conn, &sequence_key(year)).await?;
    Ok(format_policy_number(year, seq))
}

/// Policy number for the current UTC year
pub async fn next_policy_number<C: ConnectionTrait>(conn: &C) -> anyhow::Result<String> {
    generate_policy_number(conn, Utc::now().year()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;

    #[tokio::test]
    async fn test_third_number_of_the_year() {
        let conn = test_connection().await;
        generate_policy_number(&conn, 2024).await.unwrap();
        generate_policy_number(&conn, 2024).await.unwrap();
        assert_eq!(
            generate_policy_number(&conn, 2024).await.unwrap(),
            "POL-2024-000003"
        );
        assert_eq!(
            generate_policy_number(&conn, 2025).await.unwrap(),
            "POL-2025-000001"
        );
    }
}
