use super::repository;
use crate::domain::{a001_agent, a003_policy, a006_commission};
use crate::shared::error::AppError;
use contracts::domain::a003_policy::aggregate::{Policy, PolicyId};
use contracts::domain::a005_payment::aggregate::{Payment, PaymentListItem, RECENT_PAYMENTS_LIMIT};
use contracts::domain::a006_commission::aggregate::Commission;
use contracts::domain::common::AggregateRoot;
use sea_orm::{ConnectionTrait, TransactionTrait};
use std::collections::HashMap;

/// What recording one payment produced
#[derive(Debug, Clone)]
pub struct AppliedPayment {
    pub policy: Policy,
    pub payment: Payment,
    pub commission: Option<Commission>,
}

/// Record a payment dated now.
///
/// Creates the commission at the agent's current rate when the policy has an
/// agent, then re-derives and stores the policy status. All writes share one
/// transaction.
pub async fn apply_payment<C>(conn: &C, policy_id: PolicyId, amount: f64) -> anyhow::Result<AppliedPayment>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = conn.begin().await?;

    let mut policy = a003_policy::repository::get_by_id(&txn, policy_id)
        .await?
        .ok_or_else(AppError::missing::<Policy>)?;

    let payment = Payment::new(policy.base.id, amount);
    repository::insert(&txn, &payment).await?;

    let commission = match policy.agent_id {
        Some(agent_id) => {
            let agent = a001_agent::repository::get_by_id(&txn, agent_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Agent {} of policy {} is missing", agent_id, policy.policy_number()))?;
            let commission = Commission::for_payment(&agent, &payment);
            a006_commission::repository::insert(&txn, &commission).await?;
            Some(commission)
        }
        None => None,
    };

    let payments = repository::list_by_policy(&txn, policy.base.id).await?;
    policy.refresh_status(&payments);
    policy.before_write();
    a003_policy::repository::update(&txn, &policy).await?;

    txn.commit().await?;

    tracing::info!(
        "Payment recorded: policy {}, amount {:.2}, commission {:?}, status {}",
        policy.policy_number(),
        amount,
        commission.as_ref().map(|c| c.amount),
        policy.status
    );

    Ok(AppliedPayment {
        policy,
        payment,
        commission,
    })
}

/// Most recent payments with their policy number and holder name
pub async fn list_recent<C: ConnectionTrait>(conn: &C) -> anyhow::Result<Vec<PaymentListItem>> {
    let payments = repository::list_recent(conn, RECENT_PAYMENTS_LIMIT).await?;

    let mut policy_ids: Vec<PolicyId> = payments.iter().map(|p| p.policy_id).collect();
    policy_ids.sort_by_key(|id| id.value());
    policy_ids.dedup();

    let policies: HashMap<PolicyId, Policy> = a003_policy::repository::list_by_ids(conn, &policy_ids)
        .await?
        .into_iter()
        .map(|p| (p.base.id, p))
        .collect();

    Ok(payments
        .into_iter()
        .map(|payment| {
            let (policy_number, holder_name) = policies
                .get(&payment.policy_id)
                .map(|p| (p.code().to_string(), p.description().to_string()))
                .unwrap_or_default();
            PaymentListItem {
                payment,
                policy_number,
                holder_name,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;
    use contracts::domain::a001_agent::aggregate::{Agent, AgentDto};
    use contracts::domain::a002_policy_holder::aggregate::PolicyHolderDto;
    use contracts::domain::a003_policy::aggregate::NewPolicyDto;
    use contracts::domain::a003_policy::status::PolicyStatus;
    use sea_orm::{DatabaseBackend, DatabaseConnection, Statement};

    async fn setup(conn: &DatabaseConnection, with_agent: bool) -> (Policy, Option<Agent>) {
        let agent = if with_agent {
            Some(
                a001_agent::service::create(
                    conn,
                    AgentDto {
                        name: "Alice".into(),
                        email: None,
                        phone: None,
                        commission_rate: 0.10,
                    },
                )
                .await
                .unwrap(),
            )
        } else {
            None
        };
        let policy = a003_policy::service::create(
            conn,
            NewPolicyDto {
                holder: PolicyHolderDto {
                    full_name: "Maria Santos".into(),
                    ..Default::default()
                },
                agent_id: agent.as_ref().map(|a| a.base.id),
                premium_amount: 1000.0,
                benefit_amount: 20000.0,
                benefit_description: None,
                grace_days: 30,
            },
        )
        .await
        .unwrap();
        (policy, agent)
    }

    #[tokio::test]
    async fn test_payment_with_agent_creates_commission() {
        let conn = test_connection().await;
        let (policy, agent) = setup(&conn, true).await;
        let agent = agent.unwrap();

        let applied = apply_payment(&conn, policy.base.id, 1000.0).await.unwrap();
        let commission = applied.commission.expect("commission");
        assert!((commission.amount - 100.0).abs() < 1e-9);
        assert_eq!(commission.agent_id, agent.base.id);
        assert_eq!(commission.payment_id, applied.payment.id);
        assert_eq!(applied.policy.status, PolicyStatus::Active);

        let stored = a006_commission::repository::list_by_agent(&conn, agent.base.id)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_rate_change_does_not_touch_existing_commission() {
        let conn = test_connection().await;
        let (policy, agent) = setup(&conn, true).await;
        let agent = agent.unwrap();
        apply_payment(&conn, policy.base.id, 1000.0).await.unwrap();

        conn.execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE a001_agent SET commission_rate = ? WHERE id = ?",
            [0.5f64.into(), agent.base.id.to_string().into()],
        ))
        .await
        .unwrap();

        let second = apply_payment(&conn, policy.base.id, 1000.0).await.unwrap();
        assert!((second.commission.unwrap().amount - 500.0).abs() < 1e-9);

        let total = a006_commission::repository::total_by_agent(&conn, agent.base.id)
            .await
            .unwrap();
        assert!((total - 600.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_payment_without_agent_has_no_commission() {
        let conn = test_connection().await;
        let (policy, _) = setup(&conn, false).await;

        let applied = apply_payment(&conn, policy.base.id, 250.0).await.unwrap();
        assert!(applied.commission.is_none());

        let row = conn
            .query_one(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT COUNT(*) AS n FROM a006_commission".to_string(),
            ))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.try_get::<i64>("", "n").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_payment_for_unknown_policy_is_not_found() {
        let conn = test_connection().await;
        let err = apply_payment(&conn, PolicyId::new_v4(), 10.0).await.unwrap_err();
        assert!(matches!(AppError::from(err), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recent_payments_carry_policy_number() {
        let conn = test_connection().await;
        let (policy, _) = setup(&conn, false).await;
        apply_payment(&conn, policy.base.id, 100.0).await.unwrap();
        apply_payment(&conn, policy.base.id, 200.0).await.unwrap();

        let items = list_recent(&conn).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].payment.paid_at >= items[1].payment.paid_at);
        assert_eq!(items[0].policy_number, policy.policy_number());
        assert_eq!(items[0].holder_name, "Maria Santos");
    }
}
