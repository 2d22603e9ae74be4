use axum::{
    extract::{Form, Path},
    http::StatusCode,
    Json,
};
use contracts::domain::a001_agent::aggregate::{Agent, AgentDetail, AgentDto, AgentForm, AgentId};
use contracts::domain::common::parse_id;

use crate::domain::a001_agent;
use crate::shared::data::db::get_connection;
use crate::shared::error::{AppError, AppResult};

/// GET /agents
pub async fn list_all() -> AppResult<Json<Vec<Agent>>> {
    Ok(Json(a001_agent::service::list_all(get_connection()).await?))
}

/// POST /agents
pub async fn create(Form(form): Form<AgentForm>) -> AppResult<(StatusCode, Json<Agent>)> {
    let dto = AgentDto::try_from(form).map_err(AppError::Validation)?;
    let agent = a001_agent::service::create(get_connection(), dto).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

/// GET /agents/:id
pub async fn get_detail(Path(id): Path<String>) -> AppResult<Json<AgentDetail>> {
    let id: AgentId = parse_id(&id).map_err(AppError::Validation)?;
    Ok(Json(a001_agent::service::get_detail(get_connection(), id).await?))
}
