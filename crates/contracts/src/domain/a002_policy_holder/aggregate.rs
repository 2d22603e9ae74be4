use crate::domain::common::{short_code, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор страхователя
    PolicyHolderId
);

/// Person who owns one or more policies.
///
/// `base.description` holds the holder's full name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyHolder {
    #[serde(flatten)]
    pub base: BaseAggregate<PolicyHolderId>,

    pub national_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl PolicyHolder {
    pub fn new_for_insert(dto: PolicyHolderDto) -> Self {
        let id = PolicyHolderId::new_v4();
        let base = BaseAggregate::new(id, short_code("PH", id.value()), dto.full_name);

        Self {
            base,
            national_id: dto.national_id,
            address: dto.address,
            phone: dto.phone,
            email: dto.email,
        }
    }

    pub fn full_name(&self) -> &str {
        &self.base.description
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Policyholder name cannot be empty".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.before_write();
    }
}

impl AggregateRoot for PolicyHolder {
    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn element_name() -> &'static str {
        "Policyholder"
    }
}

/// Holder part of the new-policy form, already cleaned up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PolicyHolderDto {
    pub full_name: String,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}
