use serde::{Deserialize, Serialize};

/// Counters shown on the landing page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_agents: u64,
    pub total_policies: u64,
    pub active_policies: u64,
    pub lapsed_policies: u64,
    /// Policies created since 00:00 UTC today
    pub new_today: u64,
}
