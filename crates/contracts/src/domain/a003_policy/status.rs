use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Policy status.
///
/// `Active` and `Lapsed` are derived from the payment history. `Cancelled`
/// is set by hand and stays until the policy is explicitly reactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyStatus {
    Active,
    Lapsed,
    Cancelled,
}

impl PolicyStatus {
    pub const ALL: [PolicyStatus; 3] = [Self::Active, Self::Lapsed, Self::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyStatus::Active => "Active",
            PolicyStatus::Lapsed => "Lapsed",
            PolicyStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PolicyStatus::Cancelled)
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("Unknown policy status '{}'", s))
    }
}

/// Status implied by the latest payment.
///
/// No payment at all means `Lapsed`. Otherwise the policy is `Active` while
/// `today - last_paid.date()` is at most `grace_days` whole days.
pub fn derive_status(
    last_paid: Option<DateTime<Utc>>,
    grace_days: i32,
    today: NaiveDate,
) -> PolicyStatus {
    match last_paid {
        None => PolicyStatus::Lapsed,
        Some(paid_at) => {
            let days_since = (today - paid_at.date_naive()).num_days();
            if days_since <= i64::from(grace_days) {
                PolicyStatus::Active
            } else {
                PolicyStatus::Lapsed
            }
        }
    }
}
