use contracts::domain::a003_policy::aggregate::PolicyId;
use contracts::domain::a004_member::aggregate::Member;
use contracts::domain::common::parse_id;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a004_member")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub policy_id: String,
    pub full_name: String,
    pub relationship: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub national_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Member {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(Member {
            id: parse_id(&m.id).map_err(anyhow::Error::msg)?,
            policy_id: parse_id(&m.policy_id).map_err(anyhow::Error::msg)?,
            full_name: m.full_name,
            relationship: m.relationship,
            date_of_birth: m.date_of_birth,
            national_id: m.national_id,
            created_at: m.created_at,
        })
    }
}

pub async fn insert<C: ConnectionTrait>(conn: &C, member: &Member) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(member.id.to_string()),
        policy_id: Set(member.policy_id.to_string()),
        full_name: Set(member.full_name.clone()),
        relationship: Set(member.relationship.clone()),
        date_of_birth: Set(member.date_of_birth),
        national_id: Set(member.national_id.clone()),
        created_at: Set(member.created_at),
    };
    active.insert(conn).await?;
    Ok(())
}

/// In the order they were added
pub async fn list_by_policy<C: ConnectionTrait>(conn: &C, policy_id: PolicyId) -> anyhow::Result<Vec<Member>> {
    Entity::find()
        .filter(Column::PolicyId.eq(policy_id.to_string()))
        .order_by_asc(Column::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(Member::try_from)
        .collect()
}

pub async fn delete_by_policy<C: ConnectionTrait>(conn: &C, policy_id: PolicyId) -> anyhow::Result<u64> {
    let result = Entity::delete_many()
        .filter(Column::PolicyId.eq(policy_id.to_string()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
