//! Admin login, credential management, and dashboard stats

use axum::extract::State;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::auth::AdminAuth;
use super::error::{ApiError, ApiResult};
use super::AppState;

/// In-memory admin credentials; replaced via the update endpoint, reset on
/// restart.
#[derive(Clone, Debug)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/admin/login — returns the admin token on a credential match.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let creds = state.admin.read().await;
    if req.email == creds.email && req.password == creds.password {
        info!(email = %req.email, "admin login");
        Ok(Json(json!({ "success": true, "token": state.config.admin_token })))
    } else {
        Err(ApiError::InvalidCredentials)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCredentialsRequest {
    pub current_email: String,
    pub current_password: String,
    pub new_email: String,
    pub new_password: String,
}

/// POST /api/admin/update-credentials
pub async fn update_credentials(
    State(state): State<AppState>,
    Json(req): Json<UpdateCredentialsRequest>,
) -> ApiResult<Json<Value>> {
    let mut creds = state.admin.write().await;
    if req.current_email != creds.email || req.current_password != creds.password {
        return Err(ApiError::InvalidCredentials);
    }
    creds.email = req.new_email;
    creds.password = req.new_password;
    info!("admin credentials updated");
    Ok(Json(
        json!({ "success": true, "message": "Credentials updated successfully" }),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_products: usize,
    pub total_orders: usize,
    pub total_categories: usize,
    pub total_revenue: String,
}

/// GET /api/admin/stats — dashboard counters plus revenue summed over the
/// decimal-as-text order totals. Unparseable totals are skipped.
pub async fn stats(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> ApiResult<Json<StatsResponse>> {
    let products = state.catalog.products().await?;
    let categories = state.catalog.categories().await?;
    let orders = state.transient.orders().await;

    let revenue: Decimal = orders
        .iter()
        .filter_map(|order| order.total.parse::<Decimal>().ok())
        .sum();

    Ok(Json(StatsResponse {
        total_products: products.len(),
        total_orders: orders.len(),
        total_categories: categories.len(),
        total_revenue: revenue.round_dp(2).to_string(),
    }))
}
