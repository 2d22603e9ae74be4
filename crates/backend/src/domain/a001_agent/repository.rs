use chrono::Utc;
use contracts::domain::a001_agent::aggregate::{Agent, AgentId};
use contracts::domain::common::{parse_id, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;

use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_agent")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub commission_rate: f64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Agent {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let id: AgentId = parse_id(&m.id).map_err(anyhow::Error::msg)?;

        Ok(Agent {
            base: BaseAggregate::with_metadata(id, m.code, m.description, m.comment, metadata),
            email: m.email,
            phone: m.phone,
            commission_rate: m.commission_rate,
        })
    }
}

fn to_active(aggregate: &Agent) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        email: Set(aggregate.email.clone()),
        phone: Set(aggregate.phone.clone()),
        commission_rate: Set(aggregate.commission_rate),
        created_at: Set(Some(aggregate.metadata().created_at)),
        updated_at: Set(Some(aggregate.metadata().updated_at)),
        version: Set(aggregate.metadata().version),
    }
}

/// Newest first
pub async fn list_all<C: ConnectionTrait>(conn: &C) -> anyhow::Result<Vec<Agent>> {
    Entity::find()
        .order_by_desc(Column::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(Agent::try_from)
        .collect()
}

pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: AgentId) -> anyhow::Result<Option<Agent>> {
    Entity::find_by_id(id.to_string())
        .one(conn)
        .await?
        .map(Agent::try_from)
        .transpose()
}

pub async fn insert<C: ConnectionTrait>(conn: &C, aggregate: &Agent) -> anyhow::Result<AgentId> {
    to_active(aggregate).insert(conn).await?;
    Ok(aggregate.base.id)
}

pub async fn count<C: ConnectionTrait>(conn: &C) -> anyhow::Result<u64> {
    Ok(Entity::find().count(conn).await?)
}
