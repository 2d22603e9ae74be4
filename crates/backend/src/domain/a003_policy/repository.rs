use chrono::{DateTime, Utc};
use contracts::domain::a001_agent::aggregate::AgentId;
use contracts::domain::a003_policy::aggregate::{Policy, PolicyId};
use contracts::domain::a003_policy::status::PolicyStatus;
use contracts::domain::common::{parse_id, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_policy")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Policy number
    #[sea_orm(unique)]
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub holder_id: String,
    pub agent_id: Option<String>,
    pub premium_amount: f64,
    pub benefit_amount: f64,
    pub benefit_description: Option<String>,
    pub start_date: chrono::NaiveDate,
    pub status: String,
    pub grace_days: i32,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Policy {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let id: PolicyId = parse_id(&m.id).map_err(anyhow::Error::msg)?;
        let agent_id = m
            .agent_id
            .as_deref()
            .map(parse_id::<AgentId>)
            .transpose()
            .map_err(anyhow::Error::msg)?;

        Ok(Policy {
            base: BaseAggregate::with_metadata(id, m.code, m.description, m.comment, metadata),
            holder_id: parse_id(&m.holder_id).map_err(anyhow::Error::msg)?,
            agent_id,
            premium_amount: m.premium_amount,
            benefit_amount: m.benefit_amount,
            benefit_description: m.benefit_description,
            start_date: m.start_date,
            status: m.status.parse::<PolicyStatus>().map_err(anyhow::Error::msg)?,
            grace_days: m.grace_days,
        })
    }
}

fn to_active(aggregate: &Policy) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        holder_id: Set(aggregate.holder_id.to_string()),
        agent_id: Set(aggregate.agent_id.map(|id| id.to_string())),
        premium_amount: Set(aggregate.premium_amount),
        benefit_amount: Set(aggregate.benefit_amount),
        benefit_description: Set(aggregate.benefit_description.clone()),
        start_date: Set(aggregate.start_date),
        status: Set(aggregate.status.as_str().to_string()),
        grace_days: Set(aggregate.grace_days),
        created_at: Set(Some(aggregate.metadata().created_at)),
        updated_at: Set(Some(aggregate.metadata().updated_at)),
        version: Set(aggregate.metadata().version),
    }
}

fn into_policies(models: Vec<Model>) -> anyhow::Result<Vec<Policy>> {
    models.into_iter().map(Policy::try_from).collect()
}

pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: PolicyId) -> anyhow::Result<Option<Policy>> {
    Entity::find_by_id(id.to_string())
        .one(conn)
        .await?
        .map(Policy::try_from)
        .transpose()
}

pub async fn insert<C: ConnectionTrait>(conn: &C, aggregate: &Policy) -> anyhow::Result<PolicyId> {
    to_active(aggregate).insert(conn).await?;
    Ok(aggregate.base.id)
}

pub async fn update<C: ConnectionTrait>(conn: &C, aggregate: &Policy) -> anyhow::Result<()> {
    let mut active = to_active(aggregate);
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(conn).await?;
    Ok(())
}

pub async fn delete<C: ConnectionTrait>(conn: &C, id: PolicyId) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id.to_string()).exec(conn).await?;
    Ok(result.rows_affected > 0)
}

/// Newest first, optionally restricted to one status
pub async fn list<C: ConnectionTrait>(
    conn: &C,
    status: Option<PolicyStatus>,
) -> anyhow::Result<Vec<Policy>> {
    let mut query = Entity::find();
    if let Some(status) = status {
        query = query.filter(Column::Status.eq(status.as_str()));
    }
    into_policies(query.order_by_desc(Column::CreatedAt).all(conn).await?)
}

pub async fn list_by_agent<C: ConnectionTrait>(conn: &C, agent_id: AgentId) -> anyhow::Result<Vec<Policy>> {
    into_policies(
        Entity::find()
            .filter(Column::AgentId.eq(agent_id.to_string()))
            .order_by_desc(Column::CreatedAt)
            .all(conn)
            .await?,
    )
}

/// Policies created in `[from, to)`, newest first; either bound may be open
pub async fn list_created_between<C: ConnectionTrait>(
    conn: &C,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    status: Option<PolicyStatus>,
) -> anyhow::Result<Vec<Policy>> {
    let mut query = Entity::find();
    if let Some(from) = from {
        query = query.filter(Column::CreatedAt.gte(from));
    }
    if let Some(to) = to {
        query = query.filter(Column::CreatedAt.lt(to));
    }
    if let Some(status) = status {
        query = query.filter(Column::Status.eq(status.as_str()));
    }
    into_policies(query.order_by_desc(Column::CreatedAt).all(conn).await?)
}

pub async fn count<C: ConnectionTrait>(conn: &C) -> anyhow::Result<u64> {
    Ok(Entity::find().count(conn).await?)
}

pub async fn count_by_status<C: ConnectionTrait>(conn: &C, status: PolicyStatus) -> anyhow::Result<u64> {
    Ok(Entity::find()
        .filter(Column::Status.eq(status.as_str()))
        .count(conn)
        .await?)
}

pub async fn count_created_since<C: ConnectionTrait>(
    conn: &C,
    since: DateTime<Utc>,
) -> anyhow::Result<u64> {
    Ok(Entity::find()
        .filter(Column::CreatedAt.gte(since))
        .count(conn)
        .await?)
}

pub async fn list_by_ids<C: ConnectionTrait>(conn: &C, ids: &[PolicyId]) -> anyhow::Result<Vec<Policy>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    into_policies(
        Entity::find()
            .filter(Column::Id.is_in(ids.iter().map(|id| id.to_string())))
            .all(conn)
            .await?,
    )
}
