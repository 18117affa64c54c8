//! Boutique Commerce
//!
//! Self-hosted storefront backend for a boutique-scale shop.
//!
//! ## Features
//! - Product catalog with image galleries and per-color variant images
//! - Category management
//! - Session-scoped shopping carts with line merging
//! - Order intake with payment-method-derived status
//! - Admin-gated management API with image uploads
//! - City-based shipping configuration
//!
//! Products and categories persist as JSON files; carts, orders, and
//! shipping settings live in memory for the process lifetime.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use store::{CatalogStore, TransientStore};
