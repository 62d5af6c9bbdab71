use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::unique_violation;
use crate::domain::coupon::{normalize_code, Coupon, DiscountType};
use crate::domain::repositories::{CouponRepository, RepoResult, RepositoryError};

const COUPON_COLUMNS: &str = "id, code, description, discount_type, discount_value, minimum_amount, \
                              maximum_discount, usage_limit, used_count, valid_from, valid_until, \
                              is_active, created_at, updated_at";

#[derive(FromRow)]
struct CouponRow {
    id: Uuid,
    code: String,
    description: Option<String>,
    discount_type: DiscountType,
    discount_value: Decimal,
    minimum_amount: Decimal,
    maximum_discount: Option<Decimal>,
    usage_limit: Option<i32>,
    used_count: i32,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CouponRow> for Coupon {
    fn from(r: CouponRow) -> Self {
        Self {
            id: r.id,
            code: r.code,
            description: r.description,
            discount_type: r.discount_type,
            discount_value: r.discount_value,
            minimum_amount: r.minimum_amount,
            maximum_discount: r.maximum_discount,
            usage_limit: r.usage_limit,
            used_count: r.used_count,
            valid_from: r.valid_from,
            valid_until: r.valid_until,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL implementation of CouponRepository
pub struct PostgresCouponRepository {
    pool: PgPool,
}

impl PostgresCouponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CouponRepository for PostgresCouponRepository {
    async fn create(&self, coupon: &Coupon) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code, description, discount_type, discount_value, minimum_amount,
                maximum_discount, usage_limit, used_count, valid_from, valid_until,
                is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(coupon.id)
        .bind(&coupon.code)
        .bind(&coupon.description)
        .bind(coupon.discount_type)
        .bind(coupon.discount_value)
        .bind(coupon.minimum_amount)
        .bind(coupon.maximum_discount)
        .bind(coupon.usage_limit)
        .bind(coupon.used_count)
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(coupon.is_active)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "Coupon code already exists"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Coupon>> {
        let row: Option<CouponRow> =
            sqlx::query_as(&format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Coupon::from))
    }

    async fn find_by_code(&self, code: &str) -> RepoResult<Option<Coupon>> {
        let row: Option<CouponRow> =
            sqlx::query_as(&format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE code = $1"))
                .bind(normalize_code(code))
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Coupon::from))
    }

    async fn update(&self, coupon: &Coupon) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE coupons
            SET code = $2, description = $3, discount_type = $4, discount_value = $5,
                minimum_amount = $6, maximum_discount = $7, usage_limit = $8,
                valid_from = $9, valid_until = $10, is_active = $11, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(coupon.id)
        .bind(&coupon.code)
        .bind(&coupon.description)
        .bind(coupon.discount_type)
        .bind(coupon.discount_value)
        .bind(coupon.minimum_amount)
        .bind(coupon.maximum_discount)
        .bind(coupon.usage_limit)
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(coupon.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "Coupon code already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Coupon not found"));
        }
        Ok(())
    }

    async fn list(&self, active: Option<bool>) -> RepoResult<Vec<Coupon>> {
        let rows: Vec<CouponRow> = sqlx::query_as(&format!(
            r#"
            SELECT {COUPON_COLUMNS}
            FROM coupons
            WHERE $1::BOOLEAN IS NULL OR is_active = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(active)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Coupon::from).collect())
    }
}
