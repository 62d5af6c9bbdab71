use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::errors::{DomainError, DomainResult, Violations};
use super::money::round_money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "discount_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountType::Percentage => write!(f, "percentage"),
            DiscountType::Fixed => write!(f, "fixed"),
        }
    }
}

/// Discount code
///
/// # Invariants
/// - Code is stored upper-case
/// - Percentage values are in (0, 100], fixed values are positive
/// - `valid_from < valid_until`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub minimum_amount: Decimal,
    pub maximum_discount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCoupon {
    #[serde(default)]
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub minimum_amount: Decimal,
    pub maximum_discount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponUpdate {
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<Decimal>,
    pub minimum_amount: Option<Decimal>,
    pub maximum_discount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl Coupon {
    pub fn new(new: NewCoupon) -> DomainResult<Self> {
        let now = Utc::now();
        let coupon = Self {
            id: Uuid::new_v4(),
            code: normalize_code(&new.code),
            description: new.description,
            discount_type: new.discount_type,
            discount_value: new.discount_value,
            minimum_amount: new.minimum_amount,
            maximum_discount: new.maximum_discount,
            usage_limit: new.usage_limit,
            used_count: 0,
            valid_from: new.valid_from.unwrap_or(now),
            valid_until: new.valid_until,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        coupon.validate()?;
        Ok(coupon)
    }

    /// Applies a partial update; on failure the coupon is left unchanged
    pub fn apply(&mut self, update: CouponUpdate) -> DomainResult<()> {
        let mut next = self.clone();
        if update.description.is_some() {
            next.description = update.description;
        }
        if let Some(v) = update.discount_type {
            next.discount_type = v;
        }
        if let Some(v) = update.discount_value {
            next.discount_value = v;
        }
        if let Some(v) = update.minimum_amount {
            next.minimum_amount = v;
        }
        if update.maximum_discount.is_some() {
            next.maximum_discount = update.maximum_discount;
        }
        if update.usage_limit.is_some() {
            next.usage_limit = update.usage_limit;
        }
        if let Some(v) = update.valid_from {
            next.valid_from = v;
        }
        if let Some(v) = update.valid_until {
            next.valid_until = v;
        }
        if let Some(v) = update.is_active {
            next.is_active = v;
        }
        next.validate()?;
        next.updated_at = Utc::now();
        *self = next;
        Ok(())
    }

    /// Active, inside its validity window and below its usage limit
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.valid_from <= now
            && now <= self.valid_until
            && self.usage_limit.map_or(true, |limit| self.used_count < limit)
    }

    /// Discount for `amount`, ignoring validity and minimum checks
    pub fn discount_for(&self, amount: Decimal) -> Decimal {
        let discount = match self.discount_type {
            DiscountType::Percentage => {
                let raw = amount * self.discount_value / Decimal::ONE_HUNDRED;
                match self.maximum_discount {
                    Some(cap) => raw.min(cap),
                    None => raw,
                }
            }
            DiscountType::Fixed => self.discount_value.min(amount),
        };
        round_money(discount.max(Decimal::ZERO))
    }

    /// Full check used by coupon validation: validity, then minimum amount
    pub fn redeem_preview(&self, amount: Decimal, now: DateTime<Utc>) -> DomainResult<Decimal> {
        if !self.is_valid_at(now) {
            return Err(DomainError::invalid("Coupon is expired or no longer valid"));
        }
        if amount < self.minimum_amount {
            return Err(DomainError::invalid(format!(
                "Minimum order amount of {} required",
                self.minimum_amount
            )));
        }
        Ok(self.discount_for(amount))
    }

    /// Soft delete
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Violations::new();
        v.check(self.code.is_empty(), "Coupon code is required")
            .check(
                self.discount_value <= Decimal::ZERO,
                "Discount value must be greater than 0",
            )
            .check(
                self.discount_type == DiscountType::Percentage
                    && self.discount_value > Decimal::ONE_HUNDRED,
                "Percentage discount cannot exceed 100",
            )
            .check(
                self.minimum_amount < Decimal::ZERO,
                "Minimum amount cannot be negative",
            )
            .check(
                self.maximum_discount.is_some_and(|m| m <= Decimal::ZERO),
                "Maximum discount must be greater than 0",
            )
            .check(
                self.usage_limit.is_some_and(|l| l < 1),
                "Usage limit must be at least 1",
            )
            .check(
                self.valid_until <= self.valid_from,
                "Coupon must end after it starts",
            );
        v.into_result()
    }
}

/// Codes are matched case-insensitively by storing them upper-case
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
