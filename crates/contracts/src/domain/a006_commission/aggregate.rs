use crate::domain::a001_agent::aggregate::{Agent, AgentId};
use crate::domain::a005_payment::aggregate::{Payment, PaymentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор комиссии
    CommissionId
);

/// Agent's share of a single payment.
///
/// The amount is frozen when the payment is recorded; later changes to the
/// agent's rate never touch existing commissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commission {
    pub id: CommissionId,
    pub agent_id: AgentId,
    pub payment_id: PaymentId,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

impl Commission {
    /// Commission for `payment` at the agent's current rate
    pub fn for_payment(agent: &Agent, payment: &Payment) -> Self {
        Self {
            id: CommissionId::new_v4(),
            agent_id: agent.base.id,
            payment_id: payment.id,
            amount: calculate_commission(payment.amount, agent.commission_rate),
            created_at: Utc::now(),
        }
    }
}

pub fn calculate_commission(payment_amount: f64, commission_rate: f64) -> f64 {
    payment_amount * commission_rate
}

/// Row of the `agent_commissions` report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionReportRow {
    pub commission_id: String,
    pub agent_id: String,
    pub agent_name: String,
    pub policy_number: String,
    pub payment_amount: f64,
    pub commission_amount: f64,
    pub paid_at: DateTime<Utc>,
}
