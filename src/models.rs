//! Entity and request types
//!
//! The wire shape and the persisted JSON files share these types; field
//! names serialize in camelCase. Monetary amounts are carried as
//! decimal-as-text and never computed on here, except where the admin
//! dashboard sums order totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

// =============================================================================
// Catalog entities
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: String,
    #[serde(default)]
    pub original_price: Option<String>,
    #[serde(default)]
    pub discount: u32,
    #[serde(default)]
    pub stock: u32,
    /// Primary image reference; always the first entry of `images` whenever
    /// that array is non-empty.
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    /// Color-to-image mapping, stored as an opaque JSON string.
    #[serde(default)]
    pub color_variants: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub is_new: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn on_sale(&self) -> bool {
        self.discount > 0
    }
}

/// Structured form of one `colorVariants` entry. The catalog stores the
/// mapping as an opaque string; this type exists to parse it where an image
/// has to be extracted from it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColorVariant {
    pub color: String,
    pub images: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "price is required"))]
    pub price: String,
    #[serde(default)]
    pub original_price: Option<String>,
    #[serde(default)]
    pub discount: u32,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub color_variants: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub is_new: bool,
}

/// Partial product update. Only fields that are present override the stored
/// entity; the image/variant fields follow the merge policy implemented by
/// the catalog store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub original_price: Option<String>,
    pub discount: Option<u32>,
    pub stock: Option<u32>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub color: Option<String>,
    pub colors: Option<Vec<String>>,
    pub color_variants: Option<String>,
    pub sizes: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub is_new: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    /// Not unique: two categories may share a name. Products reference
    /// categories by free-text name, not id.
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "image is required"))]
    pub image: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub session_id: String,
    pub product_id: String,
    pub quantity: u32,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    /// Items with the same merge key are collapsed into one entry whose
    /// quantity accumulates.
    pub fn merge_key(&self) -> (&str, &str, Option<&str>, Option<&str>) {
        (
            self.session_id.as_str(),
            self.product_id.as_str(),
            self.selected_size.as_deref(),
            self.selected_color.as_deref(),
        )
    }
}

fn default_quantity() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    #[validate(length(min = 1, message = "sessionId is required"))]
    pub session_id: String,
    #[validate(length(min = 1, message = "productId is required"))]
    pub product_id: String,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
    #[serde(default)]
    pub selected_size: Option<String>,
    #[serde(default)]
    pub selected_color: Option<String>,
}

impl NewCartItem {
    pub fn merge_key(&self) -> (&str, &str, Option<&str>, Option<&str>) {
        (
            self.session_id.as_str(),
            self.product_id.as_str(),
            self.selected_size.as_deref(),
            self.selected_color.as_deref(),
        )
    }
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cod,
    Jazzcash,
    Card,
    Bank,
}

impl PaymentMethod {
    /// Payment status a fresh order starts in. Gateway methods sit in
    /// `processing` until external confirmation; COD and bank transfer stay
    /// `pending` until delivery-time or manual settlement.
    pub fn initial_status(self) -> PaymentStatus {
        match self {
            PaymentMethod::Cod | PaymentMethod::Bank => PaymentStatus::Pending,
            PaymentMethod::Jazzcash | PaymentMethod::Card => PaymentStatus::Processing,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Human-facing number, distinct from `id`.
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub customer_address: String,
    pub customer_city: String,
    pub customer_state: String,
    pub customer_zip: String,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// JSON snapshot of the cart items at checkout time.
    pub items: String,
    pub subtotal: String,
    pub tax: String,
    pub shipping: String,
    pub total: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[validate(length(min = 1, message = "customerName is required"))]
    pub customer_name: String,
    #[validate(email(message = "customerEmail must be a valid email"))]
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[validate(length(min = 1, message = "customerAddress is required"))]
    pub customer_address: String,
    #[validate(length(min = 1, message = "customerCity is required"))]
    pub customer_city: String,
    #[validate(length(min = 1, message = "customerState is required"))]
    pub customer_state: String,
    #[validate(length(min = 1, message = "customerZip is required"))]
    pub customer_zip: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub items: String,
    #[validate(length(min = 1, message = "subtotal is required"))]
    pub subtotal: String,
    #[validate(length(min = 1, message = "tax is required"))]
    pub tax: String,
    #[validate(length(min = 1, message = "shipping is required"))]
    pub shipping: String,
    #[validate(length(min = 1, message = "total is required"))]
    pub total: String,
    #[serde(default)]
    pub status: OrderStatus,
}

// =============================================================================
// Shipping settings
// =============================================================================

/// Process-wide shipping configuration. Initialized with defaults at
/// startup, replaced field-by-field by admin updates, never persisted.
/// Rate values are stored exactly as supplied.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingSettings {
    pub free_shipping_threshold: i64,
    pub standard_shipping: i64,
    pub express_shipping: i64,
    pub city_wise_shipping: HashMap<String, i64>,
}

impl Default for ShippingSettings {
    fn default() -> Self {
        let city_wise_shipping = HashMap::from([
            ("karachi".to_string(), 150),
            ("lahore".to_string(), 180),
            ("islamabad".to_string(), 200),
            ("other".to_string(), 250),
        ]);
        Self {
            free_shipping_threshold: 2000,
            standard_shipping: 200,
            express_shipping: 500,
            city_wise_shipping,
        }
    }
}

impl ShippingSettings {
    /// City rate with the `other` fallback. Unknown cities (and a map with
    /// no `other` entry) fall back to the flat standard rate.
    pub fn rate_for_city(&self, city: &str) -> i64 {
        let key = city.trim().to_lowercase();
        self.city_wise_shipping
            .get(&key)
            .or_else(|| self.city_wise_shipping.get("other"))
            .copied()
            .unwrap_or(self.standard_shipping)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingPatch {
    pub free_shipping_threshold: Option<i64>,
    pub standard_shipping: Option<i64>,
    pub express_shipping: Option<i64>,
    pub city_wise_shipping: Option<HashMap<String, i64>>,
}
