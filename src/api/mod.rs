//! JSON API surface
//!
//! The request-handling layer around the stores: it validates and types
//! incoming data, places uploaded images on disk, gates admin operations
//! behind the configured token, and maps store errors onto HTTP statuses.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod error;
pub mod orders;
pub mod products;
pub mod shipping;
pub mod upload;

pub use self::auth::AdminAuth;
pub use self::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::store::{CatalogStore, TransientStore};
use self::admin::AdminCredentials;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub transient: Arc<TransientStore>,
    pub admin: Arc<RwLock<AdminCredentials>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let admin = AdminCredentials {
            email: config.admin_email.clone(),
            password: config.admin_password.clone(),
        };
        Self {
            catalog: Arc::new(CatalogStore::new(config.data_dir.clone())),
            transient: Arc::new(TransientStore::new()),
            admin: Arc::new(RwLock::new(admin)),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/update-credentials", post(admin::update_credentials))
        .route("/api/admin/stats", get(admin::stats))
        .route(
            "/api/admin/shipping",
            get(shipping::get_for_admin).put(shipping::update),
        )
        .route("/api/shipping", get(shipping::get_public))
        .route("/api/products", get(products::list).post(products::create))
        .route("/api/products/new-arrivals", get(products::new_arrivals))
        .route("/api/products/sale", get(products::sale))
        .route(
            "/api/products/:id",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route(
            "/api/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/api/categories/:id",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/api/orders", get(orders::list).post(orders::create))
        .route("/api/orders/:id", get(orders::get))
        .route("/api/cart", post(cart::add))
        .route("/api/cart/clear/:session_id", delete(cart::clear))
        // One parameterized cart path: GET reads a session's items, while
        // PATCH/DELETE address a single item by id.
        .route(
            "/api/cart/:id",
            get(cart::get).patch(cart::update).delete(cart::remove),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "boutique-commerce" }))
}
