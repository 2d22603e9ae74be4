use axum::Json;
use chrono::Utc;
use contracts::dashboards::d400_overview::dto::DashboardMetrics;

use crate::dashboards::d400_overview::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::AppResult;

/// GET /
pub async fn get_metrics() -> AppResult<Json<DashboardMetrics>> {
    Ok(Json(
        service::get_metrics(get_connection(), Utc::now().date_naive()).await?,
    ))
}
