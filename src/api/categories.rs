//! Category handlers

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use validator::Validate;

use super::auth::AdminAuth;
use super::error::{ApiError, ApiResult};
use super::upload::{collect_form, SubmittedForm};
use super::AppState;
use crate::models::{Category, CategoryPatch, NewCategory};

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.catalog.categories().await?))
}

/// GET /api/categories/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Category>> {
    state
        .catalog
        .category(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Category".to_string()))
}

/// POST /api/categories — admin-only multipart create with a single
/// `image` file, or an `image` URL field as fallback.
pub async fn create(
    _admin: AdminAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let form = collect_form(&state.config.uploads_dir, multipart, "image").await?;

    let data = NewCategory {
        name: form.text("name").unwrap_or_default().to_string(),
        description: form.text("description").unwrap_or_default().to_string(),
        image: submitted_image(&form).unwrap_or_default(),
    };
    data.validate()?;

    let category = state.catalog.create_category(data).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/:id (admin) — partial update; the image only
/// changes when a file was uploaded or a non-empty URL was sent.
pub async fn update(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<Category>> {
    let form = collect_form(&state.config.uploads_dir, multipart, "image").await?;

    let patch = CategoryPatch {
        name: form
            .text("name")
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        description: form.text("description").map(str::to_string),
        image: submitted_image(&form),
    };

    let category = state.catalog.update_category(&id, patch).await?;
    Ok(Json(category))
}

/// DELETE /api/categories/:id (admin)
pub async fn delete(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    if state.catalog.delete_category(&id).await? {
        Ok(Json(json!({ "message": "Category deleted successfully" })))
    } else {
        Err(ApiError::NotFound("Category".to_string()))
    }
}

/// An uploaded file takes priority over an `image` URL field.
fn submitted_image(form: &SubmittedForm) -> Option<String> {
    form.upload_refs().into_iter().next().or_else(|| {
        form.text("image")
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
}
