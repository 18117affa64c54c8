//! Shipping settings handlers

use axum::extract::State;
use axum::Json;

use super::auth::AdminAuth;
use super::AppState;
use crate::models::{ShippingPatch, ShippingSettings};

/// GET /api/shipping — public, read by the checkout page.
pub async fn get_public(State(state): State<AppState>) -> Json<ShippingSettings> {
    Json(state.transient.shipping_settings().await)
}

/// GET /api/admin/shipping
pub async fn get_for_admin(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Json<ShippingSettings> {
    Json(state.transient.shipping_settings().await)
}

/// PUT /api/admin/shipping — shallow merge of the supplied fields.
pub async fn update(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(patch): Json<ShippingPatch>,
) -> Json<ShippingSettings> {
    Json(state.transient.update_shipping_settings(patch).await)
}
