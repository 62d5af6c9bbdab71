use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{OrderStatus, PaymentMethod, PaymentStatus};
use crate::domain::checkout::CheckoutSummary;
use crate::domain::errors::{DomainError, DomainResult, Violations};
use crate::domain::inventory::StockLine;
use crate::domain::product::VariantRef;
use crate::domain::user::Address;

/// Days after delivery during which a return can be requested
pub const RETURN_WINDOW_DAYS: i64 = 7;

/// Customer order
///
/// Prices, totals and the shipping address are frozen at placement time.
/// Every status change is appended to `status_history`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total_amount: Decimal,
    pub coupon_code: Option<String>,
    pub payment: Payment,
    pub status: OrderStatus,
    pub status_history: Vec<StatusChange>,
    pub tracking_number: Option<String>,
    pub shipping_provider: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub return_reason: Option<String>,
    pub refund_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub variant: VariantRef,
    pub quantity: i32,
    pub price: Decimal,
    pub total: Decimal,
}

/// Line requested for a new order; `total` is derived
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub variant: VariantRef,
    pub quantity: i32,
    pub price: Decimal,
}

impl OrderLine {
    pub fn total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone: String,
}

impl From<&Address> for ShippingAddress {
    fn from(a: &Address) -> Self {
        Self {
            full_name: a.full_name.clone(),
            street: a.street.clone(),
            city: a.city.clone(),
            state: a.state.clone(),
            zip_code: a.zip_code.clone(),
            country: a.country.clone(),
            phone: a.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub method: PaymentMethod,
    pub payment_intent_id: Option<String>,
    pub status: PaymentStatus,
    pub amount: Decimal,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub note: Option<String>,
}

/// Everything needed to place an order
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub user_id: Uuid,
    pub lines: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub summary: CheckoutSummary,
    pub coupon_code: Option<String>,
    pub payment: Payment,
    pub status: OrderStatus,
    pub notes: Option<String>,
}

impl Order {
    /// Builds an order from a draft. The order number is assigned by the
    /// repository when the order is persisted.
    pub fn new(draft: OrderDraft) -> DomainResult<Self> {
        let mut v = Violations::new();
        v.check(draft.lines.is_empty(), "Order must contain at least one item");
        for line in &draft.lines {
            v.check(
                line.quantity < 1,
                format!("Quantity for {} must be at least 1", line.variant.sku),
            )
            .check(
                line.price < Decimal::ZERO,
                format!("Price for {} cannot be negative", line.variant.sku),
            );
        }
        v.into_result()?;

        let now = Utc::now();
        let items = draft
            .lines
            .into_iter()
            .map(|line| OrderItem {
                total: line.total(),
                product_id: line.product_id,
                product_name: line.product_name,
                variant: line.variant,
                quantity: line.quantity,
                price: line.price,
            })
            .collect();

        Ok(Self {
            id: Uuid::new_v4(),
            order_number: String::new(),
            user_id: draft.user_id,
            items,
            shipping_address: draft.shipping_address,
            subtotal: draft.summary.subtotal,
            shipping: draft.summary.shipping,
            tax: draft.summary.tax,
            discount: draft.summary.discount,
            total_amount: draft.summary.total,
            coupon_code: draft.coupon_code,
            payment: draft.payment,
            status: draft.status,
            status_history: vec![StatusChange {
                status: draft.status,
                timestamp: now,
                note: Some("Order created".to_string()),
            }],
            tracking_number: None,
            shipping_provider: None,
            estimated_delivery: None,
            cancellation_reason: None,
            return_reason: None,
            refund_amount: None,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        })
    }

    /// Sets the status and records it; the note defaults to "Status updated to <status>"
    pub fn update_status(&mut self, status: OrderStatus, note: Option<String>) {
        let now = Utc::now();
        self.status = status;
        self.status_history.push(StatusChange {
            status,
            timestamp: now,
            note: Some(note.unwrap_or_else(|| format!("Status updated to {status}"))),
        });
        self.updated_at = now;
    }

    /// Customer cancellation; only pending or confirmed orders qualify
    pub fn cancel(&mut self, reason: Option<String>) -> DomainResult<()> {
        if !self.status.is_cancellable() {
            return Err(DomainError::invalid_state(
                "Order cannot be cancelled at this stage",
            ));
        }
        self.cancellation_reason = reason;
        self.update_status(OrderStatus::Cancelled, None);
        Ok(())
    }

    /// Customer return request within the return window after delivery
    pub fn request_return(&mut self, reason: Option<String>, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != OrderStatus::Delivered {
            return Err(DomainError::invalid_state(
                "Only delivered orders can be returned",
            ));
        }
        let deadline = self.delivered_at() + Duration::days(RETURN_WINDOW_DAYS);
        if now > deadline {
            return Err(DomainError::invalid_state(format!(
                "Return period ({RETURN_WINDOW_DAYS} days) has expired"
            )));
        }
        self.return_reason = reason;
        self.update_status(OrderStatus::ReturnRequested, None);
        Ok(())
    }

    /// When the order was last marked delivered (falls back to the last update)
    pub fn delivered_at(&self) -> DateTime<Utc> {
        self.status_history
            .iter()
            .rev()
            .find(|c| c.status == OrderStatus::Delivered)
            .map(|c| c.timestamp)
            .unwrap_or(self.updated_at)
    }

    pub fn mark_payment_failed(&mut self) {
        self.payment.status = PaymentStatus::Failed;
        self.update_status(OrderStatus::PaymentFailed, Some("Payment failed".to_string()));
    }

    pub fn contains_product(&self, product_id: Uuid) -> bool {
        self.items.iter().any(|i| i.product_id == product_id)
    }

    /// Stock consumed by this order, one line per item
    pub fn stock_lines(&self) -> Vec<StockLine> {
        self.items
            .iter()
            .map(|i| StockLine {
                product_id: i.product_id,
                sku: i.variant.sku.clone(),
                quantity: i.quantity,
            })
            .collect()
    }
}
