use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{DomainError, DomainResult};
use super::product::VariantRef;

/// Threshold applied to new inventory rows
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

/// Stock level of one product variant
///
/// # Invariants
/// - `is_low_stock == (quantity <= low_stock_threshold)` after every mutation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variant: VariantRef,
    pub quantity: i32,
    pub low_stock_threshold: i32,
    pub is_low_stock: bool,
    pub last_restocked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin restock payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdate {
    pub quantity: Option<i32>,
    pub low_stock_threshold: Option<i32>,
}

/// Quantity of one SKU to reserve or release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLine {
    pub product_id: Uuid,
    pub sku: String,
    pub quantity: i32,
}

impl InventoryItem {
    pub fn new(product_id: Uuid, variant: VariantRef, quantity: i32) -> Self {
        let now = Utc::now();
        let mut item = Self {
            id: Uuid::new_v4(),
            product_id,
            variant,
            quantity: quantity.max(0),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            is_low_stock: false,
            last_restocked: None,
            created_at: now,
            updated_at: now,
        };
        item.refresh_low_stock();
        item
    }

    /// Applies an admin restock and stamps `last_restocked`
    pub fn restock(&mut self, update: InventoryUpdate) -> DomainResult<()> {
        if update.quantity.is_some_and(|q| q < 0) {
            return Err(DomainError::invalid("Quantity cannot be negative"));
        }
        if update.low_stock_threshold.is_some_and(|t| t < 0) {
            return Err(DomainError::invalid("Low stock threshold cannot be negative"));
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(threshold) = update.low_stock_threshold {
            self.low_stock_threshold = threshold;
        }
        let now = Utc::now();
        self.last_restocked = Some(now);
        self.updated_at = now;
        self.refresh_low_stock();
        Ok(())
    }

    /// Adds `delta` (negative to take stock); fails when stock would go negative
    pub fn adjust(&mut self, delta: i32) -> DomainResult<()> {
        let next = self.quantity + delta;
        if next < 0 {
            return Err(DomainError::invalid_state(format!(
                "Insufficient stock for {}",
                self.variant.sku
            )));
        }
        self.quantity = next;
        self.updated_at = Utc::now();
        self.refresh_low_stock();
        Ok(())
    }

    pub fn has(&self, quantity: i32) -> bool {
        self.quantity >= quantity
    }

    fn refresh_low_stock(&mut self) {
        self.is_low_stock = self.quantity <= self.low_stock_threshold;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32) -> InventoryItem {
        InventoryItem::new(
            Uuid::new_v4(),
            VariantRef { size: None, color: None, sku: "SKU-1".into() },
            quantity,
        )
    }

    #[test]
    fn low_stock_at_threshold() {
        assert!(item(10).is_low_stock);
        assert!(!item(11).is_low_stock);
    }

    #[test]
    fn adjust_recomputes_flag() {
        let mut i = item(12);
        i.adjust(-2).unwrap();
        assert_eq!(i.quantity, 10);
        assert!(i.is_low_stock);
        i.adjust(5).unwrap();
        assert!(!i.is_low_stock);
    }

    #[test]
    fn adjust_cannot_go_negative() {
        let mut i = item(1);
        assert!(i.adjust(-2).is_err());
        assert_eq!(i.quantity, 1);
    }

    #[test]
    fn restock_stamps_and_recomputes() {
        let mut i = item(50);
        i.restock(InventoryUpdate { quantity: Some(3), low_stock_threshold: Some(2) }).unwrap();
        assert_eq!(i.quantity, 3);
        assert!(!i.is_low_stock);
        assert!(i.last_restocked.is_some());

        i.restock(InventoryUpdate { quantity: None, low_stock_threshold: Some(5) }).unwrap();
        assert!(i.is_low_stock);
    }

    #[test]
    fn restock_rejects_negative_values() {
        let mut i = item(5);
        assert!(i.restock(InventoryUpdate { quantity: Some(-1), ..Default::default() }).is_err());
    }
}
