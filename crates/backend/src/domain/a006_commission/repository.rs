use chrono::{DateTime, Utc};
use contracts::domain::a001_agent::aggregate::AgentId;
use contracts::domain::a003_policy::aggregate::PolicyId;
use contracts::domain::a006_commission::aggregate::{Commission, CommissionReportRow};
use contracts::domain::common::parse_id;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, Set, Statement,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a006_commission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub agent_id: String,
    #[sea_orm(unique)]
    pub payment_id: String,
    pub amount: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Commission {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(Commission {
            id: parse_id(&m.id).map_err(anyhow::Error::msg)?,
            agent_id: parse_id(&m.agent_id).map_err(anyhow::Error::msg)?,
            payment_id: parse_id(&m.payment_id).map_err(anyhow::Error::msg)?,
            amount: m.amount,
            created_at: m.created_at,
        })
    }
}

pub async fn insert<C: ConnectionTrait>(conn: &C, commission: &Commission) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(commission.id.to_string()),
        agent_id: Set(commission.agent_id.to_string()),
        payment_id: Set(commission.payment_id.to_string()),
        amount: Set(commission.amount),
        created_at: Set(commission.created_at),
    };
    active.insert(conn).await?;
    Ok(())
}

/// Newest first
pub async fn list_by_agent<C: ConnectionTrait>(conn: &C, agent_id: AgentId) -> anyhow::Result<Vec<Commission>> {
    Entity::find()
        .filter(Column::AgentId.eq(agent_id.to_string()))
        .order_by_desc(Column::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(Commission::try_from)
        .collect()
}

pub async fn total_by_agent<C: ConnectionTrait>(conn: &C, agent_id: AgentId) -> anyhow::Result<f64> {
    #[derive(Debug, FromQueryResult)]
    struct Total {
        total: f64,
    }

    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "SELECT COALESCE(SUM(amount), 0.0) AS total FROM a006_commission WHERE agent_id = ?",
        [agent_id.to_string().into()],
    );
    let row = Total::find_by_statement(stmt).one(conn).await?;
    Ok(row.map(|r| r.total).unwrap_or(0.0))
}

/// Commissions earned on any payment of the policy
pub async fn delete_by_policy<C: ConnectionTrait>(conn: &C, policy_id: PolicyId) -> anyhow::Result<u64> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "DELETE FROM a006_commission
             WHERE payment_id IN (SELECT id FROM a005_payment WHERE policy_id = ?)",
            [policy_id.to_string().into()],
        ))
        .await?;
    Ok(result.rows_affected())
}

#[derive(Debug, FromQueryResult)]
struct ReportRow {
    commission_id: String,
    agent_id: String,
    agent_name: String,
    policy_number: String,
    payment_amount: f64,
    commission_amount: f64,
    paid_at: DateTime<Utc>,
}

/// Commissions whose payment falls in `[from, to)`, latest payment first
pub async fn report_rows<C: ConnectionTrait>(
    conn: &C,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> anyhow::Result<Vec<CommissionReportRow>> {
    let mut sql = String::from(
        r#"
        SELECT
            c.id AS commission_id,
            c.agent_id AS agent_id,
            a.description AS agent_name,
            p.code AS policy_number,
            pay.amount AS payment_amount,
            c.amount AS commission_amount,
            pay.paid_at AS paid_at
        FROM a006_commission c
        JOIN a005_payment pay ON c.payment_id = pay.id
        JOIN a001_agent a ON c.agent_id = a.id
        JOIN a003_policy p ON pay.policy_id = p.id
        WHERE 1 = 1
        "#,
    );
    let mut values: Vec<sea_orm::Value> = Vec::new();
    if let Some(from) = from {
        sql.push_str(" AND pay.paid_at >= ?");
        values.push(from.into());
    }
    if let Some(to) = to {
        sql.push_str(" AND pay.paid_at < ?");
        values.push(to.into());
    }
    sql.push_str(" ORDER BY pay.paid_at DESC");

    let stmt = Statement::from_sql_and_values(DatabaseBackend::Sqlite, &sql, values);
    let rows = ReportRow::find_by_statement(stmt).all(conn).await?;

    Ok(rows
        .into_iter()
        .map(|r| CommissionReportRow {
            commission_id: r.commission_id,
            agent_id: r.agent_id,
            agent_name: r.agent_name,
            policy_number: r.policy_number,
            payment_amount: r.payment_amount,
            commission_amount: r.commission_amount,
            paid_at: r.paid_at,
        })
        .collect())
}
