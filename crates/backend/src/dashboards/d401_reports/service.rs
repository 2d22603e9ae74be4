use anyhow::Result;
use chrono::{DateTime, Utc};
use contracts::dashboards::d401_reports::dto::{Report, ReportRequest, ReportRows, ReportType};
use sea_orm::ConnectionTrait;

use crate::dashboards::d400_overview::service::day_start;
use crate::domain::{a003_policy, a006_commission};

/// `[from, to)` bounds for the inclusive date range of a request
pub fn time_bounds(request: &ReportRequest) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let from = request.start_date.map(day_start);
    let to = request
        .end_date
        .and_then(|d| d.succ_opt())
        .map(day_start);
    (from, to)
}

/// Run a report.
///
/// Policy reports filter on the policy's creation time, the commission report
/// on the payment time. The status reports use the stored status.
pub async fn run_report<C: ConnectionTrait>(conn: &C, request: ReportRequest) -> Result<Report> {
    let (from, to) = time_bounds(&request);

    let (data, total_amount) = match request.report_type {
        ReportType::NewPolicies | ReportType::ActivePolicies | ReportType::LapsedPolicies => {
            let policies = a003_policy::repository::list_created_between(
                conn,
                from,
                to,
                request.report_type.status(),
            )
            .await?;
            (ReportRows::Policies(policies), None)
        }
        ReportType::AgentCommissions => {
            let rows = a006_commission::repository::report_rows(conn, from, to).await?;
            let total = rows.iter().map(|r| r.commission_amount).sum::<f64>();
            (ReportRows::Commissions(rows), Some(total))
        }
    };

    tracing::info!(
        "Report {} ({:?}..{:?}): {} rows",
        request.report_type,
        request.start_date,
        request.end_date,
        data.len()
    );

    Ok(Report {
        request,
        data,
        total_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_agent;
    use crate::shared::data::db::test_connection;
    use chrono::NaiveDate;
    use contracts::domain::a001_agent::aggregate::AgentDto;
    use contracts::domain::a002_policy_holder::aggregate::PolicyHolderDto;
    use contracts::domain::a003_policy::aggregate::NewPolicyDto;
    use contracts::domain::a003_policy::forms::PolicyAction;

    fn request(
        report_type: ReportType,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> ReportRequest {
        ReportRequest {
            report_type,
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn test_end_date_covers_whole_day() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let (from, to) = time_bounds(&request(ReportType::NewPolicies, Some(day), Some(day)));
        assert_eq!(from.unwrap().to_rfc3339(), "2024-12-31T00:00:00+00:00");
        assert_eq!(to.unwrap().to_rfc3339(), "2025-01-01T00:00:00+00:00");

        assert_eq!(time_bounds(&request(ReportType::NewPolicies, None, None)), (None, None));
    }

    #[tokio::test]
    async fn test_reports() {
        let conn = test_connection().await;
        let today = Utc::now().date_naive();
        let agent = a001_agent::service::create(
            &conn,
            AgentDto {
                name: "Alice".into(),
                email: None,
                phone: None,
                commission_rate: 0.10,
            },
        )
        .await
        .unwrap();

        let dto = |name: &str, with_agent: bool| NewPolicyDto {
            holder: PolicyHolderDto {
                full_name: name.into(),
                ..Default::default()
            },
            agent_id: with_agent.then_some(agent.base.id),
            premium_amount: 100.0,
            benefit_amount: 1000.0,
            benefit_description: None,
            grace_days: 30,
        };
        let paid = a003_policy::service::create(&conn, dto("Maria Santos", true)).await.unwrap();
        let unpaid = a003_policy::service::create(&conn, dto("John Doe", false)).await.unwrap();
        a003_policy::service::perform_action(
            &conn,
            paid.base.id,
            PolicyAction::RecordPayment { amount: 1000.0 },
        )
        .await
        .unwrap();
        a003_policy::service::get_detail(&conn, unpaid.base.id).await.unwrap();

        let new_today = run_report(&conn, request(ReportType::NewPolicies, Some(today), Some(today)))
            .await
            .unwrap();
        assert_eq!(new_today.data.len(), 2);

        let yesterday = today.pred_opt().unwrap();
        let none = run_report(&conn, request(ReportType::NewPolicies, None, Some(yesterday)))
            .await
            .unwrap();
        assert!(none.data.is_empty());

        let active = run_report(&conn, request(ReportType::ActivePolicies, None, None))
            .await
            .unwrap();
        match active.data {
            ReportRows::Policies(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].base.id, paid.base.id);
            }
            other => panic!("unexpected rows {:?}", other),
        }

        let lapsed = run_report(&conn, request(ReportType::LapsedPolicies, None, None))
            .await
            .unwrap();
        assert_eq!(lapsed.data.len(), 1);

        let commissions = run_report(&conn, request(ReportType::AgentCommissions, Some(today), None))
            .await
            .unwrap();
        assert!((commissions.total_amount.unwrap() - 100.0).abs() < 1e-9);
        match commissions.data {
            ReportRows::Commissions(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].agent_name, "Alice");
                assert_eq!(rows[0].policy_number, paid.policy_number());
                assert!((rows[0].payment_amount - 1000.0).abs() < 1e-9);
            }
            other => panic!("unexpected rows {:?}", other),
        }
    }
}
