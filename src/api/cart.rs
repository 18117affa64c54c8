//! Cart handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::models::{CartItem, NewCartItem};

/// GET /api/cart/:session_id
pub async fn get(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Vec<CartItem>> {
    Json(state.transient.cart_items(&session_id).await)
}

/// POST /api/cart — upsert by `(session, product, size, color)`.
pub async fn add(
    State(state): State<AppState>,
    Json(item): Json<NewCartItem>,
) -> ApiResult<(StatusCode, Json<CartItem>)> {
    item.validate()?;
    let item = state.transient.add_to_cart(item).await;
    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize)]
pub struct CartItemUpdate {
    pub quantity: u32,
}

/// PATCH /api/cart/:item_id
pub async fn update(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(body): Json<CartItemUpdate>,
) -> ApiResult<Json<CartItem>> {
    if body.quantity < 1 {
        return Err(ApiError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }
    let item = state
        .transient
        .update_cart_item(&item_id, body.quantity)
        .await?;
    Ok(Json(item))
}

/// DELETE /api/cart/:item_id
pub async fn remove(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> ApiResult<Json<Value>> {
    if state.transient.remove_from_cart(&item_id).await {
        Ok(Json(json!({ "message": "Item removed from cart" })))
    } else {
        Err(ApiError::NotFound("Cart item".to_string()))
    }
}

/// DELETE /api/cart/clear/:session_id — always succeeds.
pub async fn clear(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Value> {
    state.transient.clear_cart(&session_id).await;
    Json(json!({ "message": "Cart cleared" }))
}
