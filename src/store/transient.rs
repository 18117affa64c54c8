//! In-memory cart, order, and shipping-settings state
//!
//! Everything here lives for the process lifetime only. The store owns the
//! sole mutable reference to each collection; operations are its only
//! mutation surface.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{CartItem, NewCartItem, NewOrder, Order, ShippingPatch, ShippingSettings};

/// First human-facing order number handed out by a fresh process.
const ORDER_SEQ_START: u64 = 10001;

pub struct TransientStore {
    cart_items: Mutex<Vec<CartItem>>,
    orders: Mutex<Vec<Order>>,
    shipping: RwLock<ShippingSettings>,
    order_seq: AtomicU64,
}

impl Default for TransientStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransientStore {
    pub fn new() -> Self {
        Self {
            cart_items: Mutex::new(Vec::new()),
            orders: Mutex::new(Vec::new()),
            shipping: RwLock::new(ShippingSettings::default()),
            order_seq: AtomicU64::new(ORDER_SEQ_START),
        }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// A session's cart items in insertion order.
    pub async fn cart_items(&self, session_id: &str) -> Vec<CartItem> {
        let items = self.cart_items.lock().await;
        items
            .iter()
            .filter(|item| item.session_id == session_id)
            .cloned()
            .collect()
    }

    /// Upsert by `(sessionId, productId, selectedSize, selectedColor)`: an
    /// existing entry accumulates the incoming quantity, otherwise the item
    /// is appended under a fresh id.
    pub async fn add_to_cart(&self, item: NewCartItem) -> CartItem {
        let mut items = self.cart_items.lock().await;
        if let Some(existing) = items.iter_mut().find(|i| i.merge_key() == item.merge_key()) {
            existing.quantity += item.quantity;
            return existing.clone();
        }

        let new_item = CartItem {
            id: Uuid::new_v4().to_string(),
            session_id: item.session_id,
            product_id: item.product_id,
            quantity: item.quantity,
            selected_size: item.selected_size,
            selected_color: item.selected_color,
            created_at: Utc::now(),
        };
        items.push(new_item.clone());
        new_item
    }

    pub async fn update_cart_item(&self, item_id: &str, quantity: u32) -> StoreResult<CartItem> {
        let mut items = self.cart_items.lock().await;
        let item = items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| StoreError::not_found(format!("cart item {item_id}")))?;
        item.quantity = quantity;
        Ok(item.clone())
    }

    /// Returns whether an item was removed.
    pub async fn remove_from_cart(&self, item_id: &str) -> bool {
        let mut items = self.cart_items.lock().await;
        let before = items.len();
        items.retain(|i| i.id != item_id);
        items.len() != before
    }

    /// Always succeeds; clearing an empty session is a no-op.
    pub async fn clear_cart(&self, session_id: &str) {
        let mut items = self.cart_items.lock().await;
        items.retain(|i| i.session_id != session_id);
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Creates an order with a monotonic `ORD{n}` number and a payment
    /// status derived from the payment method. Orders are immutable after
    /// this point.
    pub async fn create_order(&self, data: NewOrder) -> Order {
        let seq = self.order_seq.fetch_add(1, Ordering::Relaxed);
        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_number: format!("ORD{seq}"),
            customer_name: data.customer_name,
            customer_email: data.customer_email,
            customer_phone: data.customer_phone,
            customer_address: data.customer_address,
            customer_city: data.customer_city,
            customer_state: data.customer_state,
            customer_zip: data.customer_zip,
            payment_method: data.payment_method,
            payment_status: data.payment_method.initial_status(),
            items: data.items,
            subtotal: data.subtotal,
            tax: data.tax,
            shipping: data.shipping,
            total: data.total,
            status: data.status,
            created_at: Utc::now(),
        };
        self.orders.lock().await.push(order.clone());
        debug!(order_number = %order.order_number, method = ?order.payment_method, "order created");
        order
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.orders.lock().await.clone()
    }

    pub async fn order(&self, id: &str) -> Option<Order> {
        let orders = self.orders.lock().await;
        orders.iter().find(|o| o.id == id).cloned()
    }

    // =========================================================================
    // Shipping settings
    // =========================================================================

    pub async fn shipping_settings(&self) -> ShippingSettings {
        self.shipping.read().await.clone()
    }

    /// Shallow field merge: only present patch fields replace the current
    /// value. A supplied city map replaces the whole map. Rate values are
    /// taken as given.
    pub async fn update_shipping_settings(&self, patch: ShippingPatch) -> ShippingSettings {
        let mut settings = self.shipping.write().await;
        if let Some(threshold) = patch.free_shipping_threshold {
            settings.free_shipping_threshold = threshold;
        }
        if let Some(standard) = patch.standard_shipping {
            settings.standard_shipping = standard;
        }
        if let Some(express) = patch.express_shipping {
            settings.express_shipping = express;
        }
        if let Some(cities) = patch.city_wise_shipping {
            settings.city_wise_shipping = cities;
        }
        settings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderStatus, PaymentMethod, PaymentStatus};
    use std::collections::HashMap;

    fn cart_entry(quantity: u32) -> NewCartItem {
        NewCartItem {
            session_id: "s1".to_string(),
            product_id: "p1".to_string(),
            quantity,
            selected_size: Some("M".to_string()),
            selected_color: Some("Red".to_string()),
        }
    }

    fn order_for(method: PaymentMethod) -> NewOrder {
        NewOrder {
            customer_name: "Ayesha Khan".to_string(),
            customer_email: "ayesha@example.com".to_string(),
            customer_phone: None,
            customer_address: "12 Mall Road".to_string(),
            customer_city: "Lahore".to_string(),
            customer_state: "Punjab".to_string(),
            customer_zip: "54000".to_string(),
            payment_method: method,
            items: r#"[{"productId":"p1","quantity":2}]"#.to_string(),
            subtotal: "9000".to_string(),
            tax: "0".to_string(),
            shipping: "180".to_string(),
            total: "9180".to_string(),
            status: OrderStatus::Pending,
        }
    }

    #[tokio::test]
    async fn add_to_cart_merges_on_composite_key() {
        let store = TransientStore::new();
        let first = store.add_to_cart(cart_entry(2)).await;
        let merged = store.add_to_cart(cart_entry(3)).await;

        assert_eq!(first.id, merged.id);
        assert_eq!(merged.quantity, 5);
        assert_eq!(store.cart_items("s1").await.len(), 1);
    }

    #[tokio::test]
    async fn differing_size_or_color_is_a_separate_line() {
        let store = TransientStore::new();
        store.add_to_cart(cart_entry(1)).await;

        let mut large = cart_entry(1);
        large.selected_size = Some("L".to_string());
        store.add_to_cart(large).await;

        let mut no_color = cart_entry(1);
        no_color.selected_color = None;
        store.add_to_cart(no_color).await;

        assert_eq!(store.cart_items("s1").await.len(), 3);
    }

    #[tokio::test]
    async fn cart_items_are_scoped_to_session() {
        let store = TransientStore::new();
        store.add_to_cart(cart_entry(1)).await;
        let mut other = cart_entry(1);
        other.session_id = "s2".to_string();
        store.add_to_cart(other).await;

        assert_eq!(store.cart_items("s1").await.len(), 1);
        assert_eq!(store.cart_items("s2").await.len(), 1);
        assert!(store.cart_items("s3").await.is_empty());
    }

    #[tokio::test]
    async fn update_cart_item_replaces_quantity() {
        let store = TransientStore::new();
        let item = store.add_to_cart(cart_entry(2)).await;
        let updated = store.update_cart_item(&item.id, 7).await.unwrap();
        assert_eq!(updated.quantity, 7);

        let err = store.update_cart_item("missing", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn remove_and_clear_cart() {
        let store = TransientStore::new();
        let item = store.add_to_cart(cart_entry(1)).await;

        assert!(store.remove_from_cart(&item.id).await);
        assert!(!store.remove_from_cart(&item.id).await);

        store.add_to_cart(cart_entry(1)).await;
        store.clear_cart("s1").await;
        store.clear_cart("s1").await; // no-op on empty session
        assert!(store.cart_items("s1").await.is_empty());
    }

    #[tokio::test]
    async fn payment_status_follows_payment_method() {
        let store = TransientStore::new();
        let cod = store.create_order(order_for(PaymentMethod::Cod)).await;
        assert_eq!(cod.payment_status, PaymentStatus::Pending);

        let jazzcash = store.create_order(order_for(PaymentMethod::Jazzcash)).await;
        assert_eq!(jazzcash.payment_status, PaymentStatus::Processing);

        let bank = store.create_order(order_for(PaymentMethod::Bank)).await;
        assert_eq!(bank.payment_status, PaymentStatus::Pending);

        let card = store.create_order(order_for(PaymentMethod::Card)).await;
        assert_eq!(card.payment_status, PaymentStatus::Processing);
    }

    #[tokio::test]
    async fn order_numbers_are_unique_and_monotonic() {
        let store = TransientStore::new();
        let a = store.create_order(order_for(PaymentMethod::Cod)).await;
        let b = store.create_order(order_for(PaymentMethod::Cod)).await;

        assert_eq!(a.order_number, format!("ORD{ORDER_SEQ_START}"));
        assert_eq!(b.order_number, format!("ORD{}", ORDER_SEQ_START + 1));
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn orders_are_listed_and_fetched_by_id() {
        let store = TransientStore::new();
        let order = store.create_order(order_for(PaymentMethod::Cod)).await;

        assert_eq!(store.orders().await.len(), 1);
        assert_eq!(store.order(&order.id).await.unwrap().id, order.id);
        assert!(store.order("missing").await.is_none());
    }

    #[tokio::test]
    async fn shipping_patch_merges_field_by_field() {
        let store = TransientStore::new();
        let updated = store
            .update_shipping_settings(ShippingPatch {
                standard_shipping: Some(220),
                ..ShippingPatch::default()
            })
            .await;

        assert_eq!(updated.standard_shipping, 220);
        // Untouched fields keep their defaults.
        assert_eq!(updated.free_shipping_threshold, 2000);
        assert_eq!(updated.express_shipping, 500);
        assert_eq!(updated.rate_for_city("Karachi"), 150);

        let cities = HashMap::from([("multan".to_string(), 210), ("other".to_string(), 300)]);
        let replaced = store
            .update_shipping_settings(ShippingPatch {
                city_wise_shipping: Some(cities),
                ..ShippingPatch::default()
            })
            .await;
        assert_eq!(replaced.rate_for_city("Multan"), 210);
        assert_eq!(replaced.rate_for_city("Karachi"), 300); // map was replaced wholesale
    }

    #[tokio::test]
    async fn negative_rates_are_stored_as_given() {
        let store = TransientStore::new();
        let updated = store
            .update_shipping_settings(ShippingPatch {
                express_shipping: Some(-50),
                ..ShippingPatch::default()
            })
            .await;
        assert_eq!(updated.express_shipping, -50);
    }
}
