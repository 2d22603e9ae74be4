use super::repository;
use crate::domain::{a003_policy, a006_commission};
use crate::shared::error::AppError;
use contracts::domain::a001_agent::aggregate::{Agent, AgentDetail, AgentDto, AgentId};
use contracts::domain::common::AggregateRoot;
use sea_orm::ConnectionTrait;

/// Создание нового агента
pub async fn create<C: ConnectionTrait>(conn: &C, dto: AgentDto) -> anyhow::Result<Agent> {
    let mut aggregate = Agent::new_for_insert(dto);

    aggregate.validate().map_err(AppError::Validation)?;

    aggregate.before_write();

    repository::insert(conn, &aggregate).await?;
    tracing::info!(
        "Agent {} '{}' created, rate {}",
        aggregate.code(),
        aggregate.name(),
        aggregate.commission_rate
    );
    Ok(aggregate)
}

pub async fn list_all<C: ConnectionTrait>(conn: &C) -> anyhow::Result<Vec<Agent>> {
    repository::list_all(conn).await
}

/// Agent with their policies, commissions and commission total
pub async fn get_detail<C: ConnectionTrait>(conn: &C, id: AgentId) -> anyhow::Result<AgentDetail> {
    let agent = repository::get_by_id(conn, id)
        .await?
        .ok_or_else(AppError::missing::<Agent>)?;

    let policies = a003_policy::repository::list_by_agent(conn, id).await?;
    let commissions = a006_commission::repository::list_by_agent(conn, id).await?;
    let total_commission = a006_commission::repository::total_by_agent(conn, id).await?;

    Ok(AgentDetail {
        agent,
        policies,
        commissions,
        total_commission,
    })
}
