use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::errors::{DomainResult, Violations};

/// Catalog product
///
/// # Invariants
/// - Name and brand are non-empty
/// - Base price is positive
/// - Variant SKUs are non-empty and unique within the product
/// - Variant prices are positive and stock is never negative
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub base_price: Decimal,
    pub category_id: Uuid,
    pub brand: String,
    pub variants: Vec<Variant>,
    pub images: Vec<ProductImage>,
    pub rating: Rating,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchasable size/color combination of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub size: Option<String>,
    pub color: Option<String>,
    pub sku: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
}

/// Variant identity carried by inventory rows, cart lines and order items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRef {
    pub size: Option<String>,
    pub color: Option<String>,
    pub sku: String,
}

impl From<&Variant> for VariantRef {
    fn from(v: &Variant) -> Self {
        Self {
            size: v.size.clone(),
            color: v.color.clone(),
            sku: v.sku.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

/// Aggregate of approved review ratings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub average: f64,
    pub count: i64,
}

/// Fields accepted when creating a product
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_price: Option<Decimal>,
    pub category: Option<Uuid>,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub is_featured: bool,
}

/// Partial product update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<Decimal>,
    pub category: Option<Uuid>,
    pub brand: Option<String>,
    pub variants: Option<Vec<Variant>>,
    pub images: Option<Vec<ProductImage>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

impl Product {
    /// Validates and builds a new active product
    pub fn new(new: NewProduct) -> DomainResult<Self> {
        let mut v = Violations::new();
        v.check(new.name.trim().is_empty(), "Product name is required")
            .check(
                new.base_price.map_or(true, |p| p <= Decimal::ZERO),
                "Price must be greater than 0",
            )
            .check(new.category.is_none(), "Category is required")
            .check(new.brand.trim().is_empty(), "Brand is required");
        check_variants(&mut v, &new.variants);
        v.into_result()?;

        let now = Utc::now();
        let images = with_primary(new.images, &new.name);
        Ok(Self {
            id: Uuid::new_v4(),
            name: new.name.trim().to_string(),
            description: new.description,
            base_price: new.base_price.unwrap_or_default(),
            category_id: new.category.unwrap_or_default(),
            brand: new.brand.trim().to_string(),
            variants: new.variants,
            images,
            rating: Rating::default(),
            is_active: true,
            is_featured: new.is_featured,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a partial update, validating the fields that are present
    pub fn apply(&mut self, update: ProductUpdate) -> DomainResult<()> {
        let mut v = Violations::new();
        if let Some(name) = &update.name {
            v.check(name.trim().is_empty(), "Product name is required");
        }
        if let Some(price) = update.base_price {
            v.check(price <= Decimal::ZERO, "Price must be greater than 0");
        }
        if let Some(brand) = &update.brand {
            v.check(brand.trim().is_empty(), "Brand is required");
        }
        if let Some(variants) = &update.variants {
            check_variants(&mut v, variants);
        }
        v.into_result()?;

        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.base_price {
            self.base_price = price;
        }
        if let Some(category) = update.category {
            self.category_id = category;
        }
        if let Some(brand) = update.brand {
            self.brand = brand.trim().to_string();
        }
        if let Some(variants) = update.variants {
            self.variants = variants;
        }
        if let Some(images) = update.images {
            self.images = with_primary(images, &self.name);
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        if let Some(featured) = update.is_featured {
            self.is_featured = featured;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn variant(&self, sku: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.sku == sku)
    }

    pub fn primary_image(&self) -> Option<&str> {
        self.images
            .iter()
            .find(|i| i.is_primary)
            .or_else(|| self.images.first())
            .map(|i| i.url.as_str())
    }

    /// Soft delete
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}

impl Rating {
    /// Averages the given ratings, rounded to one decimal
    pub fn from_ratings(ratings: &[i16]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }
        let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        let average = sum as f64 / ratings.len() as f64;
        Self {
            average: (average * 10.0).round() / 10.0,
            count: ratings.len() as i64,
        }
    }
}

fn check_variants(v: &mut Violations, variants: &[Variant]) {
    let mut seen = HashSet::new();
    for variant in variants {
        v.check(variant.sku.trim().is_empty(), "Variant SKU is required")
            .check(
                !variant.sku.trim().is_empty() && !seen.insert(variant.sku.as_str()),
                format!("Duplicate variant SKU: {}", variant.sku),
            )
            .check(
                variant.price <= Decimal::ZERO,
                format!("Variant {} price must be greater than 0", variant.sku),
            )
            .check(
                variant.stock < 0,
                format!("Variant {} stock cannot be negative", variant.sku),
            );
    }
}

/// The first image becomes primary when none is flagged; alt text defaults to the product name
fn with_primary(mut images: Vec<ProductImage>, name: &str) -> Vec<ProductImage> {
    let has_primary = images.iter().any(|i| i.is_primary);
    for (index, image) in images.iter_mut().enumerate() {
        if !has_primary && index == 0 {
            image.is_primary = true;
        }
        if image.alt_text.is_none() {
            image.alt_text = Some(name.to_string());
        }
    }
    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn variant(sku: &str, price: i64, stock: i32) -> Variant {
        Variant {
            size: Some("M".into()),
            color: Some("Black".into()),
            sku: sku.into(),
            price: Decimal::from(price),
            stock,
        }
    }

    fn new_product() -> NewProduct {
        NewProduct {
            name: "Trail Runner".into(),
            description: "Lightweight shoe".into(),
            base_price: Some(Decimal::from(2499)),
            category: Some(Uuid::new_v4()),
            brand: "Stride".into(),
            variants: vec![variant("TR-M-BLK", 2499, 5), variant("TR-L-BLK", 2599, 0)],
            images: vec![
                ProductImage { url: "/a.jpg".into(), alt_text: None, is_primary: false },
                ProductImage { url: "/b.jpg".into(), alt_text: None, is_primary: false },
            ],
            is_featured: false,
        }
    }

    #[test]
    fn create_valid_product() {
        let product = Product::new(new_product()).unwrap();
        assert!(product.is_active);
        assert_eq!(product.rating, Rating::default());
        assert_eq!(product.variant("TR-L-BLK").unwrap().price, Decimal::from(2599));
        assert_eq!(product.primary_image(), Some("/a.jpg"));
        assert_eq!(product.images[1].alt_text.as_deref(), Some("Trail Runner"));
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let err = Product::new(NewProduct {
            name: " ".into(),
            base_price: Some(Decimal::ZERO),
            category: None,
            brand: String::new(),
            ..new_product()
        })
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Product name is required, Price must be greater than 0, Category is required, Brand is required"
        );
    }

    #[test]
    fn duplicate_skus_rejected() {
        let err = Product::new(NewProduct {
            variants: vec![variant("X", 10, 1), variant("X", 12, 1)],
            ..new_product()
        })
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate variant SKU: X"));
    }

    #[test]
    fn negative_stock_rejected() {
        assert!(Product::new(NewProduct {
            variants: vec![variant("X", 10, -1)],
            ..new_product()
        })
        .is_err());
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let mut product = Product::new(new_product()).unwrap();
        product
            .apply(ProductUpdate {
                base_price: Some(Decimal::from(1999)),
                is_featured: Some(true),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(product.base_price, Decimal::from(1999));
        assert!(product.is_featured);
        assert_eq!(product.name, "Trail Runner");
    }

    #[test]
    fn invalid_update_changes_nothing() {
        let mut product = Product::new(new_product()).unwrap();
        let result = product.apply(ProductUpdate {
            name: Some("Renamed".into()),
            base_price: Some(Decimal::from(-5)),
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(product.name, "Trail Runner");
    }

    #[test]
    fn rating_rounds_to_one_decimal() {
        let rating = Rating::from_ratings(&[5, 4, 4]);
        assert_eq!(rating.count, 3);
        assert_eq!(rating.average, 4.3);
        assert_eq!(Rating::from_ratings(&[]), Rating::default());
    }

    #[test]
    fn deactivate_is_soft_delete() {
        let mut product = Product::new(new_product()).unwrap();
        product.deactivate();
        assert!(!product.is_active);
    }
}
