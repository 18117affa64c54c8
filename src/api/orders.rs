//! Order handlers
//!
//! Order intake records the payment method and the status derived from it;
//! talking to an actual payment gateway is not this service's job.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use super::auth::AdminAuth;
use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::models::{NewOrder, Order};

/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    Json(data): Json<NewOrder>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    data.validate()?;
    let order = state.transient.create_order(data).await;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders (admin)
pub async fn list(_admin: AdminAuth, State(state): State<AppState>) -> Json<Vec<Order>> {
    Json(state.transient.orders().await)
}

/// GET /api/orders/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Order>> {
    state
        .transient
        .order(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Order".to_string()))
}
