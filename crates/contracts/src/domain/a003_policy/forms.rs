//! Raw form bodies for the policy pages and their conversion into DTOs.

use super::aggregate::{NewPolicyDto, PolicyUpdate, DEFAULT_GRACE_DAYS};
use super::status::PolicyStatus;
use crate::domain::a001_agent::aggregate::AgentId;
use crate::domain::a002_policy_holder::aggregate::PolicyHolderDto;
use crate::domain::a004_member::aggregate::MemberDto;
use crate::domain::common::parse_id;
use crate::shared::form::{non_empty, optional_f64, optional_i32, parse_f64, required};
use serde::{Deserialize, Serialize};

/// `POST /policies/new`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewPolicyForm {
    pub holder_name: Option<String>,
    pub holder_national_id: Option<String>,
    pub holder_phone: Option<String>,
    pub holder_email: Option<String>,
    pub holder_address: Option<String>,
    pub agent_id: Option<String>,
    pub premium_amount: Option<String>,
    pub benefit_amount: Option<String>,
    pub benefit_description: Option<String>,
    pub grace_days: Option<String>,
}

impl TryFrom<NewPolicyForm> for NewPolicyDto {
    type Error = String;

    fn try_from(form: NewPolicyForm) -> Result<Self, Self::Error> {
        let agent_id = non_empty(&form.agent_id)
            .map(|id| parse_id::<AgentId>(&id))
            .transpose()?;

        Ok(Self {
            holder: PolicyHolderDto {
                full_name: required("holder_name", &form.holder_name)?,
                national_id: non_empty(&form.holder_national_id),
                address: non_empty(&form.holder_address),
                phone: non_empty(&form.holder_phone),
                email: non_empty(&form.holder_email),
            },
            agent_id,
            premium_amount: optional_f64("premium_amount", &form.premium_amount)?.unwrap_or(0.0),
            benefit_amount: optional_f64("benefit_amount", &form.benefit_amount)?.unwrap_or(0.0),
            benefit_description: non_empty(&form.benefit_description),
            grace_days: optional_i32("grace_days", &form.grace_days)?
                .unwrap_or(DEFAULT_GRACE_DAYS),
        })
    }
}

/// `POST /policies/:id`; `action` selects which of the other fields matter
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PolicyActionForm {
    pub action: Option<String>,
    // add_member
    pub full_name: Option<String>,
    pub relationship: Option<String>,
    pub date_of_birth: Option<String>,
    pub national_id: Option<String>,
    // record_payment
    pub amount: Option<String>,
    // update_policy
    pub premium_amount: Option<String>,
    pub benefit_amount: Option<String>,
    pub benefit_description: Option<String>,
    pub status: Option<String>,
    pub grace_days: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PolicyAction {
    AddMember(MemberDto),
    RecordPayment { amount: f64 },
    UpdatePolicy(PolicyUpdate),
    Reactivate,
}

impl TryFrom<PolicyActionForm> for PolicyAction {
    type Error = String;

    fn try_from(form: PolicyActionForm) -> Result<Self, Self::Error> {
        let action = required("action", &form.action)?;
        match action.as_str() {
            "add_member" => MemberDto::from_fields(
                &form.full_name,
                &form.relationship,
                &form.date_of_birth,
                &form.national_id,
            )
            .map(PolicyAction::AddMember),
            "record_payment" => {
                let raw = required("amount", &form.amount)?;
                Ok(PolicyAction::RecordPayment {
                    amount: parse_f64("amount", &raw)?,
                })
            }
            "update_policy" => Ok(PolicyAction::UpdatePolicy(PolicyUpdate {
                premium_amount: optional_f64("premium_amount", &form.premium_amount)?,
                benefit_amount: optional_f64("benefit_amount", &form.benefit_amount)?,
                benefit_description: non_empty(&form.benefit_description),
                status: non_empty(&form.status)
                    .map(|s| s.parse::<PolicyStatus>())
                    .transpose()?,
                grace_days: optional_i32("grace_days", &form.grace_days)?,
            })),
            "reactivate" => Ok(PolicyAction::Reactivate),
            other => Err(format!("Unknown action '{}'", other)),
        }
    }
}

/// `GET /policies?status=...`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PolicyListQuery {
    pub status: Option<String>,
}

impl PolicyListQuery {
    pub fn status_filter(&self) -> Result<Option<PolicyStatus>, String> {
        non_empty(&self.status)
            .map(|s| s.parse::<PolicyStatus>())
            .transpose()
    }
}
