use super::status::{derive_status, PolicyStatus};
use crate::domain::a001_agent::aggregate::{Agent, AgentId};
use crate::domain::a002_policy_holder::aggregate::{PolicyHolder, PolicyHolderId};
use crate::domain::a004_member::aggregate::Member;
use crate::domain::a005_payment::aggregate::{last_paid_at, Payment};
use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::domain::a006_commission::aggregate::Commission;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GRACE_DAYS: i32 = 30;

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор полиса
    PolicyId
);

// ============================================================================
// Aggregate Root
// ============================================================================

/// Insurance policy.
///
/// `base.code` is the policy number, `base.description` the holder's name
/// at issue time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    #[serde(flatten)]
    pub base: BaseAggregate<PolicyId>,

    pub holder_id: PolicyHolderId,
    pub agent_id: Option<AgentId>,

    pub premium_amount: f64,
    pub benefit_amount: f64,
    pub benefit_description: Option<String>,

    pub start_date: NaiveDate,
    pub status: PolicyStatus,
    /// Days after the last payment during which the policy stays active
    pub grace_days: i32,
}

impl Policy {
    /// New policy, always issued as `Active`
    pub fn new_for_insert(
        policy_number: String,
        holder: &PolicyHolder,
        dto: &NewPolicyDto,
        start_date: NaiveDate,
    ) -> Self {
        let base = BaseAggregate::new(
            PolicyId::new_v4(),
            policy_number,
            holder.full_name().to_string(),
        );

        Self {
            base,
            holder_id: holder.base.id,
            agent_id: dto.agent_id,
            premium_amount: dto.premium_amount,
            benefit_amount: dto.benefit_amount,
            benefit_description: dto.benefit_description.clone(),
            start_date,
            status: PolicyStatus::Active,
            grace_days: dto.grace_days,
        }
    }

    pub fn policy_number(&self) -> &str {
        &self.base.code
    }

    /// Re-derive Active/Lapsed from `payments` as of `today`.
    ///
    /// A cancelled policy keeps its status.
    pub fn refresh_status_at(&mut self, payments: &[Payment], today: NaiveDate) -> PolicyStatus {
        if !self.status.is_cancelled() {
            self.status = derive_status(last_paid_at(payments), self.grace_days, today);
        }
        self.status
    }

    /// [`Policy::refresh_status_at`] for the current UTC date
    pub fn refresh_status(&mut self, payments: &[Payment]) -> PolicyStatus {
        self.refresh_status_at(payments, Utc::now().date_naive())
    }

    /// Apply the `update_policy` form. Omitted fields keep their values.
    pub fn apply_update(&mut self, update: &PolicyUpdate) -> Result<(), String> {
        if let Some(status) = update.status {
            if self.status.is_cancelled() && !status.is_cancelled() {
                return Err("Cancelled policy can only be reactivated".into());
            }
            self.status = status;
        }
        if let Some(premium) = update.premium_amount {
            self.premium_amount = premium;
        }
        if let Some(benefit) = update.benefit_amount {
            self.benefit_amount = benefit;
        }
        if let Some(grace_days) = update.grace_days {
            self.grace_days = grace_days;
        }
        self.benefit_description = update.benefit_description.clone();
        Ok(())
    }

    /// Leave `Cancelled` and fall back to the payment-derived status
    pub fn reactivate_at(
        &mut self,
        payments: &[Payment],
        today: NaiveDate,
    ) -> Result<PolicyStatus, String> {
        if !self.status.is_cancelled() {
            return Err(format!(
                "Policy {} is {}, only cancelled policies can be reactivated",
                self.policy_number(),
                self.status
            ));
        }
        self.status = derive_status(last_paid_at(payments), self.grace_days, today);
        Ok(self.status)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.code.trim().is_empty() {
            return Err("Policy number cannot be empty".into());
        }
        if self.grace_days < 0 {
            return Err("Grace period cannot be negative".into());
        }
        if !self.premium_amount.is_finite() || !self.benefit_amount.is_finite() {
            return Err("Premium and benefit must be finite numbers".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.before_write();
    }
}

impl AggregateRoot for Policy {
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
        "Policy"
    }
}

// ============================================================================
// DTOs
// ============================================================================

/// Validated `POST /policies/new` input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPolicyDto {
    pub holder: crate::domain::a002_policy_holder::aggregate::PolicyHolderDto,
    pub agent_id: Option<AgentId>,
    pub premium_amount: f64,
    pub benefit_amount: f64,
    pub benefit_description: Option<String>,
    pub grace_days: i32,
}

/// Validated `update_policy` input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PolicyUpdate {
    pub premium_amount: Option<f64>,
    pub benefit_amount: Option<f64>,
    pub benefit_description: Option<String>,
    pub status: Option<PolicyStatus>,
    pub grace_days: Option<i32>,
}

/// Everything the policy detail view shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDetail {
    pub policy: Policy,
    pub holder: PolicyHolder,
    pub agent: Option<Agent>,
    pub members: Vec<Member>,
    pub payments: Vec<Payment>,
}

/// Data for the new-policy form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPolicyContext {
    pub agents: Vec<Agent>,
    pub default_grace_days: i32,
}

/// Result of a `POST /policies/:id` action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyActionOutcome {
    pub message: String,
    pub policy: Policy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission: Option<Commission>,
}

impl PolicyActionOutcome {
    pub fn new(message: impl Into<String>, policy: Policy) -> Self {
        Self {
            message: message.into(),
            policy,
            member: None,
            payment: None,
            commission: None,
        }
    }
}
