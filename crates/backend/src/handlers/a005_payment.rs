use axum::Json;
use contracts::domain::a005_payment::aggregate::PaymentListItem;

use crate::domain::a005_payment;
use crate::shared::data::db::get_connection;
use crate::shared::error::AppResult;

/// GET /payments
pub async fn list_recent() -> AppResult<Json<Vec<PaymentListItem>>> {
    Ok(Json(a005_payment::service::list_recent(get_connection()).await?))
}
