use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use contracts::dashboards::d400_overview::dto::DashboardMetrics;
use contracts::domain::a003_policy::status::PolicyStatus;
use sea_orm::ConnectionTrait;

use crate::domain::{a001_agent, a003_policy};

/// Start of `day` in UTC
pub fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(0, 0, 0)
        .map(|dt| Utc.from_utc_datetime(&dt))
        .unwrap_or_else(Utc::now)
}

/// Landing page counters as of `today`.
///
/// Status counts use the stored status, which is refreshed whenever a
/// policy's detail is viewed or a payment is recorded.
pub async fn get_metrics<C: ConnectionTrait>(conn: &C, today: NaiveDate) -> Result<DashboardMetrics> {
    Ok(DashboardMetrics {
        total_agents: a001_agent::repository::count(conn).await?,
        total_policies: a003_policy::repository::count(conn).await?,
        active_policies: a003_policy::repository::count_by_status(conn, PolicyStatus::Active).await?,
        lapsed_policies: a003_policy::repository::count_by_status(conn, PolicyStatus::Lapsed).await?,
        new_today: a003_policy::repository::count_created_since(conn, day_start(today)).await?,
    })
}
