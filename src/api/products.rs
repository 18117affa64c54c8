//! Product handlers

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;
use validator::Validate;

use super::auth::AdminAuth;
use super::error::{ApiError, ApiResult};
use super::upload::{collect_form, SubmittedForm};
use super::AppState;
use crate::models::{ColorVariant, NewProduct, Product, ProductPatch};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub featured: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_products: usize,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

/// GET /api/products — storefront listing with category/featured filters
/// and pagination. The `category` parameter also accepts the
/// `new-arrivals` and `sale` aliases and a comma-separated list of
/// category names.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ProductListResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(12).max(1);
    let offset = ((page - 1) * limit) as usize;

    let mut products = match query.category.as_deref() {
        None | Some("") | Some("all") => state.catalog.products().await?,
        Some("new-arrivals") => state.catalog.new_arrivals().await?,
        Some("sale") => state.catalog.sale_products().await?,
        Some(list) if list.contains(',') => {
            let wanted: Vec<&str> = list.split(',').map(str::trim).collect();
            state
                .catalog
                .products()
                .await?
                .into_iter()
                .filter(|p| wanted.contains(&p.category.as_str()))
                .collect()
        }
        Some(single) => state
            .catalog
            .products()
            .await?
            .into_iter()
            .filter(|p| p.category == single)
            .collect(),
    };

    if query.featured.as_deref() == Some("true") {
        products.retain(|p| p.featured);
    }

    let total = products.len();
    let paged: Vec<Product> = products
        .into_iter()
        .skip(offset)
        .take(limit as usize)
        .collect();

    Ok(Json(ProductListResponse {
        products: paged,
        pagination: Pagination {
            current_page: page,
            total_pages: (total as u32).div_ceil(limit),
            total_products: total,
            has_more: offset + (limit as usize) < total,
        },
    }))
}

/// GET /api/products/new-arrivals
pub async fn new_arrivals(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.catalog.new_arrivals().await?))
}

/// GET /api/products/sale
pub async fn sale(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.catalog.sale_products().await?))
}

/// GET /api/products/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    state
        .catalog
        .product(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Product".to_string()))
}

/// POST /api/products — admin-only multipart create. Uploaded `images`
/// files become the gallery; an `image` URL field is the fallback when
/// nothing was uploaded.
pub async fn create(
    _admin: AdminAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<Product>> {
    let form = collect_form(&state.config.uploads_dir, multipart, "images").await?;
    let data = new_product_from_form(&form)?;
    data.validate()?;
    let product = state.catalog.create_product(data).await?;
    Ok(Json(product))
}

/// PUT /api/products/:id — admin-only multipart update. `existingImages`
/// (a JSON array of kept references) plus any new uploads form the
/// replacement gallery; an empty result leaves the stored gallery alone.
pub async fn update(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<Product>> {
    let form = collect_form(&state.config.uploads_dir, multipart, "images").await?;

    let mut images: Vec<String> = form.parsed("existingImages")?.unwrap_or_default();
    images.extend(form.upload_refs());

    let patch = ProductPatch {
        name: form.text("name").map(str::to_string),
        description: form.text("description").map(str::to_string),
        category: form.text("category").map(str::to_string),
        price: form.text("price").map(str::to_string),
        original_price: form.text("originalPrice").map(str::to_string),
        discount: form.text("discount").map(|raw| parse_int(Some(raw))),
        stock: form.text("stock").map(|raw| parse_int(Some(raw))),
        image: None,
        images: Some(images),
        color: form.text("color").map(str::to_string),
        colors: form.parsed("colors")?,
        color_variants: remap_variants(&form)?,
        sizes: form.parsed("sizes")?,
        featured: form.text("featured").map(|v| v == "true"),
        is_new: form.text("isNew").map(|v| v == "true"),
    };

    let product = state.catalog.update_product(&id, patch).await?;
    Ok(Json(product))
}

/// DELETE /api/products/:id (admin)
pub async fn delete(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    if state.catalog.delete_product(&id).await? {
        Ok(Json(json!({ "message": "Product deleted successfully" })))
    } else {
        Err(ApiError::NotFound("Product".to_string()))
    }
}

fn new_product_from_form(form: &SubmittedForm) -> Result<NewProduct, ApiError> {
    let color_variants = remap_variants(form)?;

    let mut images = form.upload_refs();
    if images.is_empty() {
        if let Some(url) = form.text("image").filter(|s| !s.trim().is_empty()) {
            images.push(url.to_string());
        }
    }

    Ok(NewProduct {
        name: form.text("name").unwrap_or_default().to_string(),
        description: form.text("description").unwrap_or_default().to_string(),
        category: form.text("category").unwrap_or_default().to_string(),
        price: form.text("price").unwrap_or_default().to_string(),
        original_price: form.text("originalPrice").map(str::to_string),
        discount: parse_int(form.text("discount")),
        stock: parse_int(form.text("stock")),
        image: form.text("image").map(str::to_string),
        images,
        color: form.text("color").map(str::to_string),
        colors: form.parsed("colors")?.unwrap_or_default(),
        color_variants,
        sizes: form.parsed("sizes")?.unwrap_or_default(),
        featured: form.flag("featured"),
        is_new: form.flag("isNew"),
    })
}

/// Rewrites uploaded file names inside the submitted variant mapping to
/// their stored `/uploads/...` references; unmatched entries pass through
/// as URLs. An unparseable mapping is dropped rather than failing the
/// whole request.
fn remap_variants(form: &SubmittedForm) -> Result<Option<String>, ApiError> {
    let Some(raw) = form.text("colorVariants").filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    let mut variants: Vec<ColorVariant> = match serde_json::from_str(raw) {
        Ok(variants) => variants,
        Err(e) => {
            warn!(error = %e, "ignoring unparseable color variants");
            return Ok(None);
        }
    };

    for variant in &mut variants {
        for image in &mut variant.images {
            if let Some(upload) = form.uploads.iter().find(|u| u.original_name == *image) {
                *image = upload.reference.clone();
            }
        }
    }

    serde_json::to_string(&variants)
        .map(Some)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

fn parse_int(value: Option<&str>) -> u32 {
    value.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}
