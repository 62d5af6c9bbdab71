use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a currency amount to two decimal places (half away from zero)
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a currency amount to minor units (paise) for the payment gateway
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    let minor = round_money(amount) * Decimal::ONE_HUNDRED;
    minor.trunc().to_i64()
}
