use axum::{
    extract::{Form, Query},
    Json,
};
use contracts::dashboards::d401_reports::dto::{
    Report, ReportForm, ReportRequest, ReportType, ReportsPage,
};

use crate::dashboards::d401_reports::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::{AppError, AppResult};

async fn run(form: ReportForm) -> AppResult<Report> {
    let request = ReportRequest::try_from(form).map_err(AppError::Validation)?;
    Ok(service::run_report(get_connection(), request).await?)
}

/// GET /reports: report types, plus the report itself when `report_type` is given
pub async fn get_reports(Query(form): Query<ReportForm>) -> AppResult<Json<ReportsPage>> {
    let report = if form.is_empty() {
        None
    } else {
        Some(run(form).await?)
    };
    Ok(Json(ReportsPage {
        report_types: ReportType::ALL.to_vec(),
        report,
    }))
}

/// POST /reports
pub async fn run_report(Form(form): Form<ReportForm>) -> AppResult<Json<Report>> {
    Ok(Json(run(form).await?))
}
