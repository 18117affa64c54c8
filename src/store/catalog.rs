//! Durable product/category catalog
//!
//! Every mutating operation performs a full load, an in-memory mutation,
//! and a full rewrite of the backing JSON file. Catalog size is assumed to
//! be boutique-scale, so there is no indexing or partial-write path. A
//! per-collection mutex serializes the load-mutate-save cycle; plain reads
//! take the current file content as-is.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    Category, CategoryPatch, ColorVariant, NewCategory, NewProduct, Product, ProductPatch,
};

const PRODUCTS_FILE: &str = "products.json";
const CATEGORIES_FILE: &str = "categories.json";

pub struct CatalogStore {
    data_dir: PathBuf,
    products_write: Mutex<()>,
    categories_write: Mutex<()>,
}

impl CatalogStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            products_write: Mutex::new(()),
            categories_write: Mutex::new(()),
        }
    }

    fn products_path(&self) -> PathBuf {
        self.data_dir.join(PRODUCTS_FILE)
    }

    fn categories_path(&self) -> PathBuf {
        self.data_dir.join(CATEGORIES_FILE)
    }

    /// A missing file is an uninitialized collection and reads as empty; a
    /// file that exists but fails to parse is surfaced as [`StoreError::Corrupt`]
    /// so data loss is distinguishable from a first run.
    async fn read_collection<T: DeserializeOwned>(&self, path: &Path) -> StoreResult<Vec<T>> {
        match fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn write_collection<T: Serialize>(&self, path: &Path, items: &[T]) -> StoreResult<()> {
        fs::create_dir_all(&self.data_dir).await?;
        let json = serde_json::to_vec_pretty(items)?;
        fs::write(path, json).await?;
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// All products in insertion order.
    pub async fn products(&self) -> StoreResult<Vec<Product>> {
        self.read_collection(&self.products_path()).await
    }

    pub async fn product(&self, id: &str) -> StoreResult<Option<Product>> {
        let products = self.products().await?;
        Ok(products.into_iter().find(|p| p.id == id))
    }

    /// Case-insensitive exact match on the `category` field.
    pub async fn products_by_category(&self, category: &str) -> StoreResult<Vec<Product>> {
        let wanted = category.to_lowercase();
        let products = self.products().await?;
        Ok(products
            .into_iter()
            .filter(|p| p.category.to_lowercase() == wanted)
            .collect())
    }

    pub async fn featured_products(&self) -> StoreResult<Vec<Product>> {
        let products = self.products().await?;
        Ok(products.into_iter().filter(|p| p.featured).collect())
    }

    pub async fn new_arrivals(&self) -> StoreResult<Vec<Product>> {
        let products = self.products().await?;
        Ok(products.into_iter().filter(|p| p.is_new).collect())
    }

    pub async fn sale_products(&self) -> StoreResult<Vec<Product>> {
        let products = self.products().await?;
        Ok(products.into_iter().filter(|p| p.on_sale()).collect())
    }

    pub async fn create_product(&self, data: NewProduct) -> StoreResult<Product> {
        let (image, images) =
            resolve_images(&data.images, data.image.as_deref(), data.color_variants.as_deref())
                .ok_or_else(|| StoreError::validation("at least one image is required"))?;

        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: data.name,
            description: data.description,
            category: data.category,
            price: data.price,
            original_price: data.original_price,
            discount: data.discount,
            stock: data.stock,
            image,
            images,
            color: data.color,
            colors: data.colors,
            color_variants: data.color_variants,
            sizes: data.sizes,
            featured: data.featured,
            is_new: data.is_new,
            created_at: Utc::now(),
        };

        let path = self.products_path();
        let _guard = self.products_write.lock().await;
        let mut products: Vec<Product> = self.read_collection(&path).await?;
        products.push(product.clone());
        self.write_collection(&path, &products).await?;
        debug!(id = %product.id, name = %product.name, "product created");
        Ok(product)
    }

    /// Field-by-field merge: only present patch fields override. A supplied
    /// non-empty `images` array replaces the array and recomputes the
    /// primary `image`; otherwise the prior image state is preserved.
    pub async fn update_product(&self, id: &str, patch: ProductPatch) -> StoreResult<Product> {
        let path = self.products_path();
        let _guard = self.products_write.lock().await;
        let mut products: Vec<Product> = self.read_collection(&path).await?;
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found(format!("product {id}")))?;

        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = description;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(original_price) = patch.original_price {
            product.original_price = Some(original_price);
        }
        if let Some(discount) = patch.discount {
            product.discount = discount;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(color) = patch.color {
            product.color = Some(color);
        }
        if let Some(colors) = patch.colors {
            product.colors = colors;
        }
        if let Some(color_variants) = patch.color_variants {
            product.color_variants = Some(color_variants);
        }
        if let Some(sizes) = patch.sizes {
            product.sizes = sizes;
        }
        if let Some(featured) = patch.featured {
            product.featured = featured;
        }
        if let Some(is_new) = patch.is_new {
            product.is_new = is_new;
        }

        match patch.images.filter(|images| !images.is_empty()) {
            Some(images) => {
                product.image = images[0].clone();
                product.images = images;
            }
            None => {
                // No replacement array: prior images/image stand, unless a
                // bare primary-image override was sent.
                if let Some(image) = patch.image.filter(|s| !s.trim().is_empty()) {
                    product.image = image;
                }
            }
        }

        let updated = product.clone();
        self.write_collection(&path, &products).await?;
        debug!(id = %updated.id, "product updated");
        Ok(updated)
    }

    /// Returns whether a removal occurred. The file is rewritten only when
    /// it did.
    pub async fn delete_product(&self, id: &str) -> StoreResult<bool> {
        let path = self.products_path();
        let _guard = self.products_write.lock().await;
        let mut products: Vec<Product> = self.read_collection(&path).await?;
        let before = products.len();
        products.retain(|p| p.id != id);
        let removed = products.len() != before;
        if removed {
            self.write_collection(&path, &products).await?;
            debug!(%id, "product deleted");
        }
        Ok(removed)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn categories(&self) -> StoreResult<Vec<Category>> {
        self.read_collection(&self.categories_path()).await
    }

    pub async fn category(&self, id: &str) -> StoreResult<Option<Category>> {
        let categories = self.categories().await?;
        Ok(categories.into_iter().find(|c| c.id == id))
    }

    /// Name uniqueness is not enforced; two categories may share a name.
    pub async fn create_category(&self, data: NewCategory) -> StoreResult<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: data.name,
            description: data.description,
            image: data.image,
            created_at: Utc::now(),
        };

        let path = self.categories_path();
        let _guard = self.categories_write.lock().await;
        let mut categories: Vec<Category> = self.read_collection(&path).await?;
        categories.push(category.clone());
        self.write_collection(&path, &categories).await?;
        debug!(id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    pub async fn update_category(&self, id: &str, patch: CategoryPatch) -> StoreResult<Category> {
        let path = self.categories_path();
        let _guard = self.categories_write.lock().await;
        let mut categories: Vec<Category> = self.read_collection(&path).await?;
        let category = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::not_found(format!("category {id}")))?;

        if let Some(name) = patch.name {
            category.name = name;
        }
        if let Some(description) = patch.description {
            category.description = description;
        }
        if let Some(image) = patch.image {
            category.image = image;
        }

        let updated = category.clone();
        self.write_collection(&path, &categories).await?;
        Ok(updated)
    }

    pub async fn delete_category(&self, id: &str) -> StoreResult<bool> {
        let path = self.categories_path();
        let _guard = self.categories_write.lock().await;
        let mut categories: Vec<Category> = self.read_collection(&path).await?;
        let before = categories.len();
        categories.retain(|c| c.id != id);
        let removed = categories.len() != before;
        if removed {
            self.write_collection(&path, &categories).await?;
        }
        Ok(removed)
    }
}

/// Resolve the primary image and image array for a new product.
///
/// Resolution order: an explicit non-empty `images` array, then a single
/// `image` reference, then the first color variant's images. `None` means
/// the product has no usable image and must be rejected.
fn resolve_images(
    images: &[String],
    image: Option<&str>,
    color_variants: Option<&str>,
) -> Option<(String, Vec<String>)> {
    if let Some(first) = images.first() {
        return Some((first.clone(), images.to_vec()));
    }
    if let Some(url) = image.filter(|s| !s.trim().is_empty()) {
        return Some((url.to_string(), vec![url.to_string()]));
    }
    if let Some(raw) = color_variants {
        if let Ok(variants) = serde_json::from_str::<Vec<ColorVariant>>(raw) {
            if let Some(first) = variants.iter().find(|v| !v.images.is_empty()) {
                return Some((first.images[0].clone(), first.images.clone()));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProduct;

    fn store(dir: &tempfile::TempDir) -> CatalogStore {
        CatalogStore::new(dir.path())
    }

    fn dress(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: "A formal dress".to_string(),
            category: "Ladies Collection".to_string(),
            price: "4500".to_string(),
            original_price: Some("5500".to_string()),
            discount: 18,
            stock: 10,
            images: vec!["/uploads/front.jpg".to_string(), "/uploads/back.jpg".to_string()],
            colors: vec!["Navy Blue".to_string()],
            sizes: vec!["S".to_string(), "M".to_string()],
            featured: true,
            is_new: true,
            ..NewProduct::default()
        }
    }

    #[tokio::test]
    async fn created_product_primary_image_is_first_of_array() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = store(&dir);
        let product = catalog.create_product(dress("Dress")).await.unwrap();
        assert_eq!(product.image, "/uploads/front.jpg");
        assert_eq!(product.image, product.images[0]);

        // Survives a reload from disk.
        let reloaded = store(&dir).product(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.image, reloaded.images[0]);
    }

    #[tokio::test]
    async fn create_without_any_image_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = store(&dir);
        let mut data = dress("No Image");
        data.images.clear();
        data.image = None;
        data.color_variants = None;
        let err = catalog.create_product(data).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(catalog.products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_falls_back_to_color_variant_images() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = store(&dir);
        let mut data = dress("Variant Only");
        data.images.clear();
        data.color_variants =
            Some(r#"[{"color":"Red","images":["/uploads/red1.jpg","/uploads/red2.jpg"]}]"#.to_string());
        let product = catalog.create_product(data).await.unwrap();
        assert_eq!(product.image, "/uploads/red1.jpg");
        assert_eq!(product.images.len(), 2);
    }

    #[tokio::test]
    async fn unparseable_color_variants_cannot_satisfy_image_requirement() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = store(&dir);
        let mut data = dress("Bad Variants");
        data.images.clear();
        data.color_variants = Some("not json".to_string());
        assert!(matches!(
            catalog.create_product(data).await.unwrap_err(),
            StoreError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn update_without_images_preserves_image_fields() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = store(&dir);
        let mut data = dress("Merge Test");
        data.color_variants = Some(r#"[{"color":"Navy","images":["/uploads/front.jpg"]}]"#.to_string());
        let created = catalog.create_product(data).await.unwrap();

        let patch = ProductPatch {
            name: Some("Renamed".to_string()),
            price: Some("3999".to_string()),
            ..ProductPatch::default()
        };
        let updated = catalog.update_product(&created.id, patch).await.unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.price, "3999");
        assert_eq!(updated.images, created.images);
        assert_eq!(updated.image, created.image);
        assert_eq!(updated.colors, created.colors);
        assert_eq!(updated.color_variants, created.color_variants);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_with_new_images_replaces_and_recomputes_primary() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = store(&dir);
        let created = catalog.create_product(dress("Replace Test")).await.unwrap();

        let patch = ProductPatch {
            images: Some(vec!["/uploads/new1.jpg".to_string(), "/uploads/new2.jpg".to_string()]),
            colors: Some(vec!["Red".to_string()]),
            ..ProductPatch::default()
        };
        let updated = catalog.update_product(&created.id, patch).await.unwrap();

        assert_eq!(updated.image, "/uploads/new1.jpg");
        assert_eq!(updated.images, vec!["/uploads/new1.jpg", "/uploads/new2.jpg"]);
        assert_eq!(updated.colors, vec!["Red"]);
    }

    #[tokio::test]
    async fn update_with_empty_images_array_keeps_prior_array() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = store(&dir);
        let created = catalog.create_product(dress("Empty Array")).await.unwrap();

        let patch = ProductPatch {
            images: Some(Vec::new()),
            ..ProductPatch::default()
        };
        let updated = catalog.update_product(&created.id, patch).await.unwrap();
        assert_eq!(updated.images, created.images);
        assert_eq!(updated.image, created.image);
    }

    #[tokio::test]
    async fn update_missing_product_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = store(&dir);
        let err = catalog
            .update_product("nope", ProductPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_missing_product_reports_not_removed() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = store(&dir);
        catalog.create_product(dress("Keeper")).await.unwrap();

        assert!(!catalog.delete_product("missing-id").await.unwrap());
        assert_eq!(catalog.products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_existing_product_removes_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = store(&dir);
        let product = catalog.create_product(dress("Doomed")).await.unwrap();

        assert!(catalog.delete_product(&product.id).await.unwrap());
        assert!(store(&dir).products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn category_filter_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = store(&dir);
        catalog.create_product(dress("Dress")).await.unwrap();

        let found = catalog.products_by_category("ladies collection").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(catalog.products_by_category("jewelry").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn featured_new_and_sale_filters() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = store(&dir);
        catalog.create_product(dress("On Sale")).await.unwrap();
        let mut plain = dress("Plain");
        plain.discount = 0;
        plain.featured = false;
        plain.is_new = false;
        catalog.create_product(plain).await.unwrap();

        assert_eq!(catalog.featured_products().await.unwrap().len(), 1);
        assert_eq!(catalog.new_arrivals().await.unwrap().len(), 1);
        let sale = catalog.sale_products().await.unwrap();
        assert_eq!(sale.len(), 1);
        assert_eq!(sale[0].name, "On Sale");
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = store(&dir);
        assert!(catalog.products().await.unwrap().is_empty());
        assert!(catalog.categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error_not_an_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PRODUCTS_FILE), b"{ not json").unwrap();
        let catalog = store(&dir);
        assert!(matches!(
            catalog.products().await.unwrap_err(),
            StoreError::Corrupt { .. }
        ));
    }

    #[tokio::test]
    async fn duplicate_category_names_are_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = store(&dir);
        let data = NewCategory {
            name: "Jewelry".to_string(),
            description: "Shiny things".to_string(),
            image: "/uploads/jewelry.jpg".to_string(),
        };
        let first = catalog.create_category(data.clone()).await.unwrap();
        let second = catalog.create_category(data).await.unwrap();

        assert_ne!(first.id, second.id);
        let names: Vec<_> = catalog
            .categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Jewelry", "Jewelry"]);
    }

    #[tokio::test]
    async fn category_update_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = store(&dir);
        let created = catalog
            .create_category(NewCategory {
                name: "Kids".to_string(),
                description: String::new(),
                image: "/uploads/kids.jpg".to_string(),
            })
            .await
            .unwrap();

        let updated = catalog
            .update_category(
                &created.id,
                CategoryPatch {
                    description: Some("Clothes for children".to_string()),
                    ..CategoryPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Kids");
        assert_eq!(updated.description, "Clothes for children");

        assert!(catalog.delete_category(&created.id).await.unwrap());
        assert!(!catalog.delete_category(&created.id).await.unwrap());
    }
}
