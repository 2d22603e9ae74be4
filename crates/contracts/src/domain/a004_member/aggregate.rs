use crate::domain::a003_policy::aggregate::PolicyId;
use crate::shared::form::{non_empty, optional_date, required};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор застрахованного лица
    MemberId
);

/// Person covered by a policy (spouse, child, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub policy_id: PolicyId,
    pub full_name: String,
    /// Free-form label, e.g. "Spouse", "Child"
    pub relationship: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub national_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new_for_insert(policy_id: PolicyId, dto: MemberDto) -> Self {
        Self {
            id: MemberId::new_v4(),
            policy_id,
            full_name: dto.full_name,
            relationship: dto.relationship,
            date_of_birth: dto.date_of_birth,
            national_id: dto.national_id,
            created_at: Utc::now(),
        }
    }
}

/// Validated `add_member` input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDto {
    pub full_name: String,
    pub relationship: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub national_id: Option<String>,
}

impl MemberDto {
    pub fn from_fields(
        full_name: &Option<String>,
        relationship: &Option<String>,
        date_of_birth: &Option<String>,
        national_id: &Option<String>,
    ) -> Result<Self, String> {
        Ok(Self {
            full_name: required("full_name", full_name)?,
            relationship: non_empty(relationship),
            date_of_birth: optional_date("date_of_birth", date_of_birth)?,
            national_id: non_empty(national_id),
        })
    }
}
