use super::{document, repository};
use crate::domain::{a001_agent, a002_policy_holder, a004_member, a005_payment, a006_commission};
use crate::shared::error::AppError;
use crate::system::sys_sequence;
use chrono::Utc;
use contracts::domain::a001_agent::aggregate::Agent;
use contracts::domain::a002_policy_holder::aggregate::PolicyHolder;
use contracts::domain::a003_policy::aggregate::{
    NewPolicyContext, NewPolicyDto, Policy, PolicyActionOutcome, PolicyDetail, PolicyId,
    DEFAULT_GRACE_DAYS,
};
use contracts::domain::a003_policy::forms::PolicyAction;
use contracts::domain::a003_policy::status::PolicyStatus;
use contracts::domain::a004_member::aggregate::Member;
use sea_orm::{ConnectionTrait, TransactionTrait};

async fn load<C: ConnectionTrait>(conn: &C, id: PolicyId) -> anyhow::Result<Policy> {
    Ok(repository::get_by_id(conn, id)
        .await?
        .ok_or_else(AppError::missing::<Policy>)?)
}

async fn load_holder<C: ConnectionTrait>(conn: &C, policy: &Policy) -> anyhow::Result<PolicyHolder> {
    a002_policy_holder::repository::get_by_id(conn, policy.holder_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Holder of policy {} is missing", policy.policy_number()))
}

async fn load_agent<C: ConnectionTrait>(conn: &C, policy: &Policy) -> anyhow::Result<Option<Agent>> {
    match policy.agent_id {
        Some(agent_id) => a001_agent::repository::get_by_id(conn, agent_id).await,
        None => Ok(None),
    }
}

/// Agents offered on the new-policy form
pub async fn new_policy_context<C: ConnectionTrait>(conn: &C) -> anyhow::Result<NewPolicyContext> {
    Ok(NewPolicyContext {
        agents: a001_agent::repository::list_all(conn).await?,
        default_grace_days: DEFAULT_GRACE_DAYS,
    })
}

/// Create the holder and an `Active` policy starting today, in one transaction
pub async fn create<C>(conn: &C, dto: NewPolicyDto) -> anyhow::Result<Policy>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = conn.begin().await?;

    if let Some(agent_id) = dto.agent_id {
        if a001_agent::repository::get_by_id(&txn, agent_id).await?.is_none() {
            return Err(AppError::Validation(format!("Agent {} does not exist", agent_id)).into());
        }
    }

    let mut holder = PolicyHolder::new_for_insert(dto.holder.clone());
    holder.validate().map_err(AppError::Validation)?;
    holder.before_write();
    a002_policy_holder::repository::insert(&txn, &holder).await?;

    let policy_number = sys_sequence::service::next_policy_number(&txn).await?;
    let mut policy = Policy::new_for_insert(policy_number, &holder, &dto, Utc::now().date_naive());
    policy.validate().map_err(AppError::Validation)?;
    policy.before_write();
    repository::insert(&txn, &policy).await?;

    txn.commit().await?;

    tracing::info!(
        "Policy {} created for '{}'",
        policy.policy_number(),
        holder.full_name()
    );
    Ok(policy)
}

pub async fn list<C: ConnectionTrait>(conn: &C, status: Option<PolicyStatus>) -> anyhow::Result<Vec<Policy>> {
    repository::list(conn, status).await
}

/// Detail view. The status is re-derived from payments and stored if it changed.
pub async fn get_detail<C: ConnectionTrait>(conn: &C, id: PolicyId) -> anyhow::Result<PolicyDetail> {
    let mut policy = load(conn, id).await?;
    let payments = a005_payment::repository::list_by_policy(conn, id).await?;

    let previous = policy.status;
    if policy.refresh_status(&payments) != previous {
        policy.before_write();
        repository::update(conn, &policy).await?;
        tracing::info!(
            "Policy {} status {} -> {}",
            policy.policy_number(),
            previous,
            policy.status
        );
    }

    let holder = load_holder(conn, &policy).await?;
    let agent = load_agent(conn, &policy).await?;
    let members = a004_member::repository::list_by_policy(conn, id).await?;

    Ok(PolicyDetail {
        policy,
        holder,
        agent,
        members,
        payments,
    })
}

/// `POST /policies/:id`
pub async fn perform_action<C>(
    conn: &C,
    id: PolicyId,
    action: PolicyAction,
) -> anyhow::Result<PolicyActionOutcome>
where
    C: ConnectionTrait + TransactionTrait,
{
    match action {
        PolicyAction::AddMember(dto) => {
            let policy = load(conn, id).await?;
            let member = Member::new_for_insert(policy.base.id, dto);
            a004_member::repository::insert(conn, &member).await?;
            tracing::info!(
                "Member '{}' added to policy {}",
                member.full_name,
                policy.policy_number()
            );
            let mut outcome = PolicyActionOutcome::new("Member added", policy);
            outcome.member = Some(member);
            Ok(outcome)
        }
        PolicyAction::RecordPayment { amount } => {
            if !amount.is_finite() {
                return Err(AppError::Validation("Amount must be a finite number".into()).into());
            }
            let applied = a005_payment::service::apply_payment(conn, id, amount).await?;
            let mut outcome =
                PolicyActionOutcome::new("Payment recorded & status updated", applied.policy);
            outcome.payment = Some(applied.payment);
            outcome.commission = applied.commission;
            Ok(outcome)
        }
        PolicyAction::UpdatePolicy(update) => {
            let mut policy = load(conn, id).await?;
            policy.apply_update(&update).map_err(AppError::Validation)?;
            policy.validate().map_err(AppError::Validation)?;
            policy.before_write();
            repository::update(conn, &policy).await?;
            tracing::info!("Policy {} updated", policy.policy_number());
            Ok(PolicyActionOutcome::new("Policy updated", policy))
        }
        PolicyAction::Reactivate => {
            let mut policy = load(conn, id).await?;
            let payments = a005_payment::repository::list_by_policy(conn, id).await?;
            policy
                .reactivate_at(&payments, Utc::now().date_naive())
                .map_err(AppError::Validation)?;
            policy.before_write();
            repository::update(conn, &policy).await?;
            tracing::info!(
                "Policy {} reactivated as {}",
                policy.policy_number(),
                policy.status
            );
            Ok(PolicyActionOutcome::new("Policy reactivated", policy))
        }
    }
}

/// Delete the policy with its members, payments and their commissions
pub async fn delete<C>(conn: &C, id: PolicyId) -> anyhow::Result<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = conn.begin().await?;
    let policy = load(&txn, id).await?;

    let commissions = a006_commission::repository::delete_by_policy(&txn, id).await?;
    let payments = a005_payment::repository::delete_by_policy(&txn, id).await?;
    let members = a004_member::repository::delete_by_policy(&txn, id).await?;
    repository::delete(&txn, id).await?;

    txn.commit().await?;

    tracing::info!(
        "Policy {} deleted with {} members, {} payments, {} commissions",
        policy.policy_number(),
        members,
        payments,
        commissions
    );
    Ok(())
}

/// PDF of the policy; returns the download file name and the document bytes
pub async fn render_document<C: ConnectionTrait>(conn: &C, id: PolicyId) -> anyhow::Result<(String, Vec<u8>)> {
    let policy = load(conn, id).await?;
    let holder = load_holder(conn, &policy).await?;
    let agent = load_agent(conn, &policy).await?;
    let members = a004_member::repository::list_by_policy(conn, id).await?;

    let bytes = document::render_policy_document(&policy, &holder, agent.as_ref(), &members)?;
    Ok((format!("{}.pdf", policy.policy_number()), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;
    use contracts::domain::a001_agent::aggregate::AgentDto;
    use contracts::domain::a002_policy_holder::aggregate::PolicyHolderDto;
    use contracts::domain::a003_policy::aggregate::PolicyUpdate;
    use contracts::domain::a004_member::aggregate::MemberDto;
    use sea_orm::{DatabaseBackend, DatabaseConnection, Statement};

    fn new_policy(holder: &str, agent: Option<&Agent>) -> NewPolicyDto {
        NewPolicyDto {
            holder: PolicyHolderDto {
                full_name: holder.to_string(),
                ..Default::default()
            },
            agent_id: agent.map(|a| a.base.id),
            premium_amount: 1000.0,
            benefit_amount: 50000.0,
            benefit_description: Some("Funeral cover".into()),
            grace_days: 30,
        }
    }

    async fn agent(conn: &DatabaseConnection) -> Agent {
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
        .unwrap()
    }

    async fn count(conn: &DatabaseConnection, table: &str) -> i64 {
        let row = conn
            .query_one(Statement::from_string(
                DatabaseBackend::Sqlite,
                format!("SELECT COUNT(*) AS n FROM {}", table),
            ))
            .await
            .unwrap()
            .unwrap();
        row.try_get("", "n").unwrap()
    }

    #[tokio::test]
    async fn test_create_issues_sequential_numbers() {
        let conn = test_connection().await;
        let first = create(&conn, new_policy("Maria Santos", None)).await.unwrap();
        let second = create(&conn, new_policy("John Doe", None)).await.unwrap();

        assert_eq!(first.status, PolicyStatus::Active);
        assert!(first.policy_number().ends_with("-000001"));
        assert!(second.policy_number().ends_with("-000002"));
        assert_eq!(first.start_date, Utc::now().date_naive());
        assert_eq!(count(&conn, "a002_policy_holder").await, 2);
    }

    #[tokio::test]
    async fn test_create_with_unknown_agent_writes_nothing() {
        let conn = test_connection().await;
        let mut dto = new_policy("Maria Santos", None);
        dto.agent_id = Some(contracts::domain::a001_agent::aggregate::AgentId::new_v4());

        let err = create(&conn, dto).await.unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Validation(_)));
        assert_eq!(count(&conn, "a002_policy_holder").await, 0);
        assert_eq!(count(&conn, "a003_policy").await, 0);
    }

    #[tokio::test]
    async fn test_detail_refreshes_and_persists_status() {
        let conn = test_connection().await;
        let policy = create(&conn, new_policy("Maria Santos", None)).await.unwrap();

        // no payments yet: a new policy lapses on first view
        let detail = get_detail(&conn, policy.base.id).await.unwrap();
        assert_eq!(detail.policy.status, PolicyStatus::Lapsed);
        let stored = repository::get_by_id(&conn, policy.base.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PolicyStatus::Lapsed);
        assert_eq!(detail.holder.full_name(), "Maria Santos");

        perform_action(&conn, policy.base.id, PolicyAction::RecordPayment { amount: 1000.0 })
            .await
            .unwrap();
        let detail = get_detail(&conn, policy.base.id).await.unwrap();
        assert_eq!(detail.policy.status, PolicyStatus::Active);
        assert_eq!(detail.payments.len(), 1);
    }

    #[tokio::test]
    async fn test_add_member_and_unknown_policy() {
        let conn = test_connection().await;
        let policy = create(&conn, new_policy("Maria Santos", None)).await.unwrap();
        let member = MemberDto {
            full_name: "Ana Santos".into(),
            relationship: Some("Child".into()),
            date_of_birth: chrono::NaiveDate::from_ymd_opt(2015, 6, 1),
            national_id: None,
        };

        let outcome = perform_action(&conn, policy.base.id, PolicyAction::AddMember(member.clone()))
            .await
            .unwrap();
        assert_eq!(outcome.message, "Member added");
        let detail = get_detail(&conn, policy.base.id).await.unwrap();
        assert_eq!(detail.members.len(), 1);
        assert_eq!(detail.members[0].full_name, "Ana Santos");

        let err = perform_action(&conn, PolicyId::new_v4(), PolicyAction::AddMember(member))
            .await
            .unwrap_err();
        assert!(matches!(AppError::from(err), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cancelled_is_sticky_until_reactivated() {
        let conn = test_connection().await;
        let policy = create(&conn, new_policy("Maria Santos", None)).await.unwrap();
        let id = policy.base.id;
        perform_action(&conn, id, PolicyAction::RecordPayment { amount: 100.0 })
            .await
            .unwrap();

        let cancel = PolicyUpdate {
            status: Some(PolicyStatus::Cancelled),
            ..Default::default()
        };
        perform_action(&conn, id, PolicyAction::UpdatePolicy(cancel))
            .await
            .unwrap();

        // payments and detail views do not revive it
        perform_action(&conn, id, PolicyAction::RecordPayment { amount: 100.0 })
            .await
            .unwrap();
        assert_eq!(get_detail(&conn, id).await.unwrap().policy.status, PolicyStatus::Cancelled);

        let back_to_active = PolicyUpdate {
            status: Some(PolicyStatus::Active),
            ..Default::default()
        };
        let err = perform_action(&conn, id, PolicyAction::UpdatePolicy(back_to_active))
            .await
            .unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Validation(_)));

        let outcome = perform_action(&conn, id, PolicyAction::Reactivate).await.unwrap();
        assert_eq!(outcome.policy.status, PolicyStatus::Active);
    }

    #[tokio::test]
    async fn test_non_finite_payment_is_rejected() {
        let conn = test_connection().await;
        let policy = create(&conn, new_policy("Maria Santos", None)).await.unwrap();
        for amount in [f64::NAN, f64::INFINITY] {
            let err = perform_action(&conn, policy.base.id, PolicyAction::RecordPayment { amount })
                .await
                .unwrap_err();
            let err = AppError::from(err);
            assert!(matches!(err, AppError::Validation(_)));
            assert_eq!(err.status(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
        }
        assert_eq!(count(&conn, "a005_payment").await, 0);
    }

    #[tokio::test]
    async fn test_update_keeps_omitted_fields() {
        let conn = test_connection().await;
        let policy = create(&conn, new_policy("Maria Santos", None)).await.unwrap();
        let update = PolicyUpdate {
            premium_amount: Some(1200.0),
            grace_days: Some(45),
            ..Default::default()
        };
        let outcome = perform_action(&conn, policy.base.id, PolicyAction::UpdatePolicy(update))
            .await
            .unwrap();
        assert_eq!(outcome.policy.premium_amount, 1200.0);
        assert_eq!(outcome.policy.benefit_amount, 50000.0);
        assert_eq!(outcome.policy.grace_days, 45);
        assert_eq!(outcome.policy.base.metadata.version, 2);
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let conn = test_connection().await;
        let alice = agent(&conn).await;
        let policy = create(&conn, new_policy("Maria Santos", Some(&alice))).await.unwrap();
        let other = create(&conn, new_policy("John Doe", Some(&alice))).await.unwrap();
        let id = policy.base.id;

        perform_action(
            &conn,
            id,
            PolicyAction::AddMember(MemberDto {
                full_name: "Ana Santos".into(),
                relationship: None,
                date_of_birth: None,
                national_id: None,
            }),
        )
        .await
        .unwrap();
        perform_action(&conn, id, PolicyAction::RecordPayment { amount: 1000.0 })
            .await
            .unwrap();
        perform_action(&conn, other.base.id, PolicyAction::RecordPayment { amount: 500.0 })
            .await
            .unwrap();

        delete(&conn, id).await.unwrap();

        assert!(repository::get_by_id(&conn, id).await.unwrap().is_none());
        assert_eq!(count(&conn, "a004_member").await, 0);
        assert_eq!(count(&conn, "a005_payment").await, 1);
        assert_eq!(count(&conn, "a006_commission").await, 1);

        let err = delete(&conn, id).await.unwrap_err();
        assert!(matches!(AppError::from(err), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_render_document_names_file_after_policy() {
        let conn = test_connection().await;
        let policy = create(&conn, new_policy("Maria Santos", None)).await.unwrap();
        let (name, bytes) = render_document(&conn, policy.base.id).await.unwrap();
        assert_eq!(name, format!("{}.pdf", policy.policy_number()));
        assert!(bytes.starts_with(b"%PDF"));
    }
}
