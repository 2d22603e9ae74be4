use chrono::Utc;
use contracts::domain::a002_policy_holder::aggregate::{PolicyHolder, PolicyHolderId};
use contracts::domain::common::{parse_id, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;

use sea_orm::{ConnectionTrait, EntityTrait, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_policy_holder")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for PolicyHolder {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let id: PolicyHolderId = parse_id(&m.id).map_err(anyhow::Error::msg)?;

        Ok(PolicyHolder {
            base: BaseAggregate::with_metadata(id, m.code, m.description, m.comment, metadata),
            national_id: m.national_id,
            address: m.address,
            phone: m.phone,
            email: m.email,
        })
    }
}

pub async fn get_by_id<C: ConnectionTrait>(
    conn: &C,
    id: PolicyHolderId,
) -> anyhow::Result<Option<PolicyHolder>> {
    Entity::find_by_id(id.to_string())
        .one(conn)
        .await?
        .map(PolicyHolder::try_from)
        .transpose()
}

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    aggregate: &PolicyHolder,
) -> anyhow::Result<PolicyHolderId> {
    let active = ActiveModel {
        id: Set(aggregate.base.id.to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        national_id: Set(aggregate.national_id.clone()),
        address: Set(aggregate.address.clone()),
        phone: Set(aggregate.phone.clone()),
        email: Set(aggregate.email.clone()),
        created_at: Set(Some(aggregate.metadata().created_at)),
        updated_at: Set(Some(aggregate.metadata().updated_at)),
        version: Set(aggregate.metadata().version),
    };
    active.insert(conn).await?;
    Ok(aggregate.base.id)
}
