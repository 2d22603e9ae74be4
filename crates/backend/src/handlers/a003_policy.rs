use axum::{
    extract::{Form, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use contracts::domain::a003_policy::aggregate::{
    NewPolicyContext, NewPolicyDto, Policy, PolicyActionOutcome, PolicyDetail, PolicyId,
};
use contracts::domain::a003_policy::forms::{
    NewPolicyForm, PolicyAction, PolicyActionForm, PolicyListQuery,
};
use contracts::domain::common::parse_id;

use crate::domain::a003_policy;
use crate::shared::data::db::get_connection;
use crate::shared::error::{AppError, AppResult};

fn policy_id(raw: &str) -> AppResult<PolicyId> {
    parse_id(raw).map_err(AppError::Validation)
}

/// GET /policies?status=Active
pub async fn list_all(Query(query): Query<PolicyListQuery>) -> AppResult<Json<Vec<Policy>>> {
    let status = query.status_filter().map_err(AppError::Validation)?;
    Ok(Json(a003_policy::service::list(get_connection(), status).await?))
}

/// GET /policies/new
pub async fn new_policy_context() -> AppResult<Json<NewPolicyContext>> {
    Ok(Json(
        a003_policy::service::new_policy_context(get_connection()).await?,
    ))
}

/// POST /policies/new
pub async fn create(Form(form): Form<NewPolicyForm>) -> AppResult<(StatusCode, Json<Policy>)> {
    let dto = NewPolicyDto::try_from(form).map_err(AppError::Validation)?;
    let policy = a003_policy::service::create(get_connection(), dto).await?;
    Ok((StatusCode::CREATED, Json(policy)))
}

/// GET /policies/:id
pub async fn get_detail(Path(id): Path<String>) -> AppResult<Json<PolicyDetail>> {
    let id = policy_id(&id)?;
    Ok(Json(a003_policy::service::get_detail(get_connection(), id).await?))
}

/// POST /policies/:id
pub async fn perform_action(
    Path(id): Path<String>,
    Form(form): Form<PolicyActionForm>,
) -> AppResult<Json<PolicyActionOutcome>> {
    let id = policy_id(&id)?;
    let action = PolicyAction::try_from(form).map_err(AppError::Validation)?;
    Ok(Json(
        a003_policy::service::perform_action(get_connection(), id, action).await?,
    ))
}

/// DELETE /policies/:id
pub async fn delete(Path(id): Path<String>) -> AppResult<StatusCode> {
    let id = policy_id(&id)?;
    a003_policy::service::delete(get_connection(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /policies/:id/document.pdf
pub async fn document(Path(id): Path<String>) -> AppResult<Response> {
    let id = policy_id(&id)?;
    let (file_name, bytes) = a003_policy::service::render_document(get_connection(), id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}
