use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{contains_ci, paginate, MemoryStore, Tables};
use crate::domain::cart::Cart;
use crate::domain::coupon::{normalize_code, Coupon};
use crate::domain::inventory::StockLine;
use crate::domain::order::{order_number, Order, OrderStatus};
use crate::domain::pagination::{PageRequest, Paginated};
use crate::domain::repositories::{
    CartRepository, CouponRepository, OrderQuery, OrderRepository, Placement, RepoResult,
    RepositoryError,
};

/// Moves stock by `sign * quantity` for every line, all or nothing.
/// Releasing (positive sign) skips variants without an inventory row.
pub(super) fn apply_stock(t: &mut Tables, lines: &[StockLine], sign: i32) -> RepoResult<()> {
    let mut wanted: HashMap<(Uuid, &str), i32> = HashMap::new();
    for line in lines {
        *wanted.entry((line.product_id, line.sku.as_str())).or_default() += line.quantity;
    }

    let mut updates = Vec::with_capacity(wanted.len());
    for ((product_id, sku), quantity) in wanted {
        let row = t
            .inventory
            .values()
            .find(|i| i.product_id == product_id && i.variant.sku == sku);
        match row {
            Some(row) => {
                let mut next = row.clone();
                next.adjust(sign * quantity)
                    .map_err(|e| RepositoryError::conflict(e.to_string()))?;
                updates.push(next);
            }
            None if sign < 0 => {
                return Err(RepositoryError::conflict(format!("Insufficient stock for {sku}")));
            }
            None => {}
        }
    }
    for item in updates {
        t.inventory.insert(item.id, item);
    }
    Ok(())
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> RepoResult<Option<Cart>> {
        Ok(self.tables.read().await.carts.get(&user_id).cloned())
    }

    async fn save(&self, cart: &Cart) -> RepoResult<()> {
        self.tables
            .write()
            .await
            .carts
            .insert(cart.user_id, cart.clone());
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn place(&self, mut order: Order, placement: Placement) -> RepoResult<Order> {
        let mut t = self.tables.write().await;

        if let Some(intent) = order.payment.payment_intent_id.as_deref() {
            if t
                .orders
                .values()
                .any(|o| o.payment.payment_intent_id.as_deref() == Some(intent))
            {
                return Err(RepositoryError::conflict(
                    "An order already exists for this payment",
                ));
            }
        }

        let coupon_id = match placement.coupon_code.as_deref() {
            Some(code) => {
                let code = normalize_code(code);
                let coupon = t
                    .coupons
                    .values()
                    .find(|c| c.code == code)
                    .ok_or_else(|| RepositoryError::conflict("Invalid coupon code"))?;
                if !coupon.is_valid_at(Utc::now()) {
                    return Err(RepositoryError::conflict("Coupon is expired or no longer valid"));
                }
                Some(coupon.id)
            }
            None => None,
        };

        apply_stock(&mut t, &order.stock_lines(), -1)?;

        let day = order.created_at.date_naive();
        let sequence = t
            .orders
            .values()
            .filter(|o| o.created_at.date_naive() == day)
            .count() as i64
            + 1;
        order.order_number = order_number(day, sequence);

        if let Some(coupon) = coupon_id.and_then(|id| t.coupons.get_mut(&id)) {
            coupon.used_count += 1;
            coupon.updated_at = Utc::now();
        }
        if placement.clear_cart {
            if let Some(cart) = t.carts.get_mut(&order.user_id) {
                cart.clear();
            }
        }
        t.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Order>> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn find_by_payment_intent(&self, intent_id: &str) -> RepoResult<Option<Order>> {
        let t = self.tables.read().await;
        Ok(t
            .orders
            .values()
            .find(|o| o.payment.payment_intent_id.as_deref() == Some(intent_id))
            .cloned())
    }

    async fn update(&self, order: &Order) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        let slot = t
            .orders
            .get_mut(&order.id)
            .ok_or_else(|| RepositoryError::not_found("Order not found"))?;
        *slot = order.clone();
        Ok(())
    }

    async fn cancel(&self, order: &Order) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        match t.orders.get(&order.id) {
            None => return Err(RepositoryError::not_found("Order not found")),
            Some(stored) if stored.status == OrderStatus::Cancelled => {
                return Err(RepositoryError::conflict("Order is already cancelled"));
            }
            Some(_) => {}
        }
        apply_stock(&mut t, &order.stock_lines(), 1)?;
        t.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn list(&self, query: &OrderQuery, page: PageRequest) -> RepoResult<Paginated<Order>> {
        let t = self.tables.read().await;
        let mut orders: Vec<Order> = t
            .orders
            .values()
            .filter(|o| query.user_id.map_or(true, |u| o.user_id == u))
            .filter(|o| query.status.map_or(true, |s| o.status == s))
            .filter(|o| match query.search.as_deref() {
                Some(s) => {
                    contains_ci(&o.order_number, s)
                        || t
                            .users
                            .get(&o.user_id)
                            .is_some_and(|u| contains_ci(u.username.as_str(), s))
                }
                None => true,
            })
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(orders, page))
    }
}

#[async_trait]
impl CouponRepository for MemoryStore {
    async fn create(&self, coupon: &Coupon) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        if t.coupons.values().any(|c| c.code == coupon.code) {
            return Err(RepositoryError::conflict("Coupon code already exists"));
        }
        t.coupons.insert(coupon.id, coupon.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Coupon>> {
        Ok(self.tables.read().await.coupons.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> RepoResult<Option<Coupon>> {
        let code = normalize_code(code);
        let t = self.tables.read().await;
        Ok(t.coupons.values().find(|c| c.code == code).cloned())
    }

    async fn update(&self, coupon: &Coupon) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        if t
            .coupons
            .values()
            .any(|c| c.id != coupon.id && c.code == coupon.code)
        {
            return Err(RepositoryError::conflict("Coupon code already exists"));
        }
        let slot = t
            .coupons
            .get_mut(&coupon.id)
            .ok_or_else(|| RepositoryError::not_found("Coupon not found"))?;
        // redemptions are counted by `place` only
        let used_count = slot.used_count;
        *slot = coupon.clone();
        slot.used_count = used_count;
        Ok(())
    }

    async fn list(&self, active: Option<bool>) -> RepoResult<Vec<Coupon>> {
        let t = self.tables.read().await;
        let mut coupons: Vec<Coupon> = t
            .coupons
            .values()
            .filter(|c| active.map_or(true, |a| c.is_active == a))
            .cloned()
            .collect();
        coupons.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(coupons)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::checkout::CheckoutSummary;
    use crate::domain::coupon::{DiscountType, NewCoupon};
    use crate::domain::inventory::InventoryItem;
    use crate::domain::order::{
        OrderDraft, OrderLine, Payment, PaymentMethod, PaymentStatus, ShippingAddress,
    };
    use crate::domain::product::VariantRef;
    use crate::domain::repositories::InventoryRepository;

    const SKU: &str = "TEE-M";

    async fn stocked(store: &MemoryStore, product_id: Uuid, quantity: i32) {
        let variant = VariantRef {
            size: Some("M".into()),
            color: None,
            sku: SKU.into(),
        };
        store
            .ensure(&[InventoryItem::new(product_id, variant, quantity)])
            .await
            .unwrap();
    }

    async fn stock(store: &MemoryStore, product_id: Uuid) -> i32 {
        store
            .find_by_variant(product_id, SKU)
            .await
            .unwrap()
            .unwrap()
            .quantity
    }

    fn order(product_id: Uuid, quantity: i32) -> Order {
        let price = Decimal::from(499);
        let summary =
            CheckoutSummary::compute(price * Decimal::from(quantity), "Kerala", Decimal::ZERO);
        Order::new(OrderDraft {
            user_id: Uuid::new_v4(),
            lines: vec![OrderLine {
                product_id,
                product_name: "Tee".into(),
                variant: VariantRef {
                    size: Some("M".into()),
                    color: None,
                    sku: SKU.into(),
                },
                quantity,
                price,
            }],
            shipping_address: ShippingAddress::default(),
            summary,
            coupon_code: None,
            payment: Payment {
                method: PaymentMethod::Cod,
                payment_intent_id: None,
                status: PaymentStatus::Pending,
                amount: summary.total,
                transaction_id: None,
            },
            status: OrderStatus::Pending,
            notes: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn cancelling_the_same_order_twice_restocks_once() {
        let store = MemoryStore::new();
        let product_id = Uuid::new_v4();
        stocked(&store, product_id, 10).await;

        let placed = store.place(order(product_id, 5), Placement::default()).await.unwrap();
        assert_eq!(stock(&store, product_id).await, 5);

        // two requests that both read the order while it was still pending
        let mut first = placed.clone();
        first.cancel(None).unwrap();
        let mut second = placed.clone();
        second.cancel(None).unwrap();

        store.cancel(&first).await.unwrap();
        let again = store.cancel(&second).await;
        assert!(matches!(again, Err(RepositoryError::Conflict(_))));
        assert_eq!(stock(&store, product_id).await, 10);
    }

    #[tokio::test]
    async fn coupon_update_keeps_redemption_count() {
        let store = MemoryStore::new();
        let product_id = Uuid::new_v4();
        stocked(&store, product_id, 10).await;

        let coupon = Coupon::new(NewCoupon {
            code: "FLAT100".into(),
            description: None,
            discount_type: DiscountType::Fixed,
            discount_value: Decimal::from(100),
            minimum_amount: Decimal::ZERO,
            maximum_discount: None,
            usage_limit: None,
            valid_from: None,
            valid_until: Utc::now() + Duration::days(30),
        })
        .unwrap();
        CouponRepository::create(&store, &coupon).await.unwrap();

        let mut edited = CouponRepository::find_by_id(&store, coupon.id)
            .await
            .unwrap()
            .unwrap();
        store
            .place(
                order(product_id, 1),
                Placement {
                    coupon_code: Some("flat100".into()),
                    clear_cart: false,
                },
            )
            .await
            .unwrap();

        edited.description = Some("Flat 100 off".into());
        CouponRepository::update(&store, &edited).await.unwrap();

        let stored = CouponRepository::find_by_id(&store, coupon.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.used_count, 1);
        assert_eq!(stored.description.as_deref(), Some("Flat 100 off"));
    }
}
