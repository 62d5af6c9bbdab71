use rust_decimal::Decimal;
use serde::Serialize;

use super::money::round_money;

/// States that pay the remote-area shipping surcharge
pub const REMOTE_STATES: [&str; 4] = [
    "Andaman and Nicobar Islands",
    "Lakshadweep",
    "Mizoram",
    "Nagaland",
];

fn free_shipping_above() -> Decimal {
    Decimal::from(999)
}

fn standard_shipping() -> Decimal {
    Decimal::from(50)
}

fn remote_surcharge() -> Decimal {
    Decimal::from(100)
}

/// 18% GST
fn tax_rate() -> Decimal {
    Decimal::new(18, 2)
}

/// Shipping for a cart subtotal delivered to `state`
pub fn shipping_cost(subtotal: Decimal, state: &str) -> Decimal {
    if subtotal > free_shipping_above() {
        return Decimal::ZERO;
    }
    if REMOTE_STATES.iter().any(|s| s.eq_ignore_ascii_case(state.trim())) {
        return standard_shipping() + remote_surcharge();
    }
    standard_shipping()
}

/// Price breakdown shown at checkout and frozen onto the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl CheckoutSummary {
    /// total = subtotal + shipping + tax - discount, each part rounded to 2 dp
    pub fn compute(subtotal: Decimal, state: &str, discount: Decimal) -> Self {
        let subtotal = round_money(subtotal);
        let shipping = shipping_cost(subtotal, state);
        let tax = round_money(subtotal * tax_rate());
        let discount = round_money(discount.max(Decimal::ZERO).min(subtotal));
        Self {
            subtotal,
            shipping,
            tax,
            discount,
            total: subtotal + shipping + tax - discount,
        }
    }
}
