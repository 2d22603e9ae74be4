use contracts::domain::a003_policy::aggregate::PolicyId;
use contracts::domain::a005_payment::aggregate::{Payment, PaymentId};
use contracts::domain::common::parse_id;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a005_payment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub policy_id: String,
    pub amount: f64,
    pub paid_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Payment {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: parse_id(&m.id).map_err(anyhow::Error::msg)?,
            policy_id: parse_id(&m.policy_id).map_err(anyhow::Error::msg)?,
            amount: m.amount,
            paid_at: m.paid_at,
        })
    }
}

fn into_payments(models: Vec<Model>) -> anyhow::Result<Vec<Payment>> {
    models.into_iter().map(Payment::try_from).collect()
}

pub async fn insert<C: ConnectionTrait>(conn: &C, payment: &Payment) -> anyhow::Result<PaymentId> {
    let active = ActiveModel {
        id: Set(payment.id.to_string()),
        policy_id: Set(payment.policy_id.to_string()),
        amount: Set(payment.amount),
        paid_at: Set(payment.paid_at),
    };
    active.insert(conn).await?;
    Ok(payment.id)
}

/// Latest first
pub async fn list_by_policy<C: ConnectionTrait>(conn: &C, policy_id: PolicyId) -> anyhow::Result<Vec<Payment>> {
    into_payments(
        Entity::find()
            .filter(Column::PolicyId.eq(policy_id.to_string()))
            .order_by_desc(Column::PaidAt)
            .all(conn)
            .await?,
    )
}

/// The `limit` most recent payments across all policies
pub async fn list_recent<C: ConnectionTrait>(conn: &C, limit: u64) -> anyhow::Result<Vec<Payment>> {
    into_payments(
        Entity::find()
            .order_by_desc(Column::PaidAt)
            .limit(limit)
            .all(conn)
            .await?,
    )
}

pub async fn delete_by_policy<C: ConnectionTrait>(conn: &C, policy_id: PolicyId) -> anyhow::Result<u64> {
    let result = Entity::delete_many()
        .filter(Column::PolicyId.eq(policy_id.to_string()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
