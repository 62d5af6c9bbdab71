use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::errors::{DomainError, DomainResult};
use super::product::VariantRef;

/// A user's shopping cart (one per user)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub image: Option<String>,
    pub variant: VariantRef,
    pub quantity: i32,
    pub price: Decimal,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl Cart {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn total_items(&self) -> i32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Existing line for the same product and SKU
    pub fn line_for(&self, product_id: Uuid, sku: &str) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|i| i.product_id == product_id && i.variant.sku == sku)
    }

    /// Adds to an existing line, returning the new quantity
    pub fn increase(&mut self, item_id: Uuid, quantity: i32) -> DomainResult<i32> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| DomainError::not_found("Item not found in cart"))?;
        item.quantity += quantity;
        let updated = item.quantity;
        self.touch();
        Ok(updated)
    }

    pub fn push(&mut self, item: CartItem) {
        self.items.push(item);
        self.touch();
    }

    /// Sets a line's quantity; zero removes the line
    pub fn set_quantity(&mut self, item_id: Uuid, quantity: i32) -> DomainResult<()> {
        if quantity < 0 {
            return Err(DomainError::invalid("Quantity cannot be negative"));
        }
        if self.item(item_id).is_none() {
            return Err(DomainError::not_found("Item not found in cart"));
        }
        if quantity == 0 {
            self.remove(item_id);
        } else if let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) {
            item.quantity = quantity;
            self.touch();
        }
        Ok(())
    }

    pub fn remove(&mut self, item_id: Uuid) {
        self.items.retain(|i| i.id != item_id);
        self.touch();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(sku: &str, price: i64, quantity: i32) -> CartItem {
        CartItem {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: "Tee".into(),
            image: None,
            variant: VariantRef { size: None, color: None, sku: sku.into() },
            quantity,
            price: Decimal::from(price),
        }
    }

    #[test]
    fn totals() {
        let mut cart = Cart::new(Uuid::new_v4());
        cart.push(line("A", 100, 2));
        cart.push(line("B", 250, 1));
        assert_eq!(cart.total_price(), Decimal::from(450));
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn zero_quantity_removes_line() {
        let mut cart = Cart::new(Uuid::new_v4());
        let item = line("A", 100, 2);
        let id = item.id;
        cart.push(item);
        cart.set_quantity(id, 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn unknown_item_is_not_found() {
        let mut cart = Cart::new(Uuid::new_v4());
        assert_eq!(
            cart.set_quantity(Uuid::new_v4(), 1),
            Err(DomainError::not_found("Item not found in cart"))
        );
    }

    #[test]
    fn increase_merges_quantity() {
        let mut cart = Cart::new(Uuid::new_v4());
        let item = line("A", 100, 2);
        let (id, product_id) = (item.id, item.product_id);
        cart.push(item);
        assert_eq!(cart.increase(id, 3).unwrap(), 5);
        assert_eq!(cart.line_for(product_id, "A").unwrap().quantity, 5);
        assert!(cart.line_for(product_id, "B").is_none());
    }

    #[test]
    fn clear_empties_cart() {
        let mut cart = Cart::new(Uuid::new_v4());
        cart.push(line("A", 100, 1));
        cart.clear();
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }
}
