use crate::domain::a003_policy::aggregate::PolicyId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор платежа
    PaymentId
);

/// Premium payment received for a policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub policy_id: PolicyId,
    /// Taken as supplied; sign and magnitude are not checked
    pub amount: f64,
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    /// Payment dated now
    pub fn new(policy_id: PolicyId, amount: f64) -> Self {
        Self::new_at(policy_id, amount, Utc::now())
    }

    pub fn new_at(policy_id: PolicyId, amount: f64, paid_at: DateTime<Utc>) -> Self {
        Self {
            id: PaymentId::new_v4(),
            policy_id,
            amount,
            paid_at,
        }
    }
}

/// Latest `paid_at` among the payments, if any
pub fn last_paid_at(payments: &[Payment]) -> Option<DateTime<Utc>> {
    payments.iter().map(|p| p.paid_at).max()
}

/// Row of the payments overview (`GET /payments`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentListItem {
    #[serde(flatten)]
    pub payment: Payment,
    pub policy_number: String,
    pub holder_name: String,
}

/// Number of rows the payments overview returns
pub const RECENT_PAYMENTS_LIMIT: u64 = 200;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_last_paid_at_picks_latest_regardless_of_order() {
        let policy = PolicyId::new_v4();
        let early = Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let payments = vec![
            Payment::new_at(policy, 10.0, late),
            Payment::new_at(policy, 10.0, early),
        ];
        assert_eq!(last_paid_at(&payments), Some(late));
        assert_eq!(last_paid_at(&[]), None);
    }
}
