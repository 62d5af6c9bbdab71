use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::inventory::{InventoryItem, StockLine};
use crate::domain::pagination::{PageRequest, Paginated};
use crate::domain::product::VariantRef;
use crate::domain::repositories::{InventoryRepository, RepoResult, RepositoryError};

const INVENTORY_COLUMNS: &str = "id, product_id, size, color, sku, quantity, low_stock_threshold, \
                                 is_low_stock, last_restocked, created_at, updated_at";

#[derive(FromRow)]
struct InventoryRow {
    id: Uuid,
    product_id: Uuid,
    size: Option<String>,
    color: Option<String>,
    sku: String,
    quantity: i32,
    low_stock_threshold: i32,
    is_low_stock: bool,
    last_restocked: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InventoryRow> for InventoryItem {
    fn from(r: InventoryRow) -> Self {
        Self {
            id: r.id,
            product_id: r.product_id,
            variant: VariantRef {
                size: r.size,
                color: r.color,
                sku: r.sku,
            },
            quantity: r.quantity,
            low_stock_threshold: r.low_stock_threshold,
            is_low_stock: r.is_low_stock,
            last_restocked: r.last_restocked,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Takes stock for every line inside `tx`; the first line that cannot be
/// covered aborts with a `Conflict` and the caller's transaction rolls back.
/// One entry per (product, sku), in key order so concurrent orders lock
/// inventory rows in the same sequence
fn merged(lines: &[StockLine]) -> Vec<StockLine> {
    let mut totals: BTreeMap<(Uuid, &str), i32> = BTreeMap::new();
    for line in lines {
        *totals.entry((line.product_id, line.sku.as_str())).or_default() += line.quantity;
    }
    totals
        .into_iter()
        .map(|((product_id, sku), quantity)| StockLine {
            product_id,
            sku: sku.to_string(),
            quantity,
        })
        .collect()
}

pub(super) async fn reserve_stock(
    tx: &mut Transaction<'_, Postgres>,
    lines: &[StockLine],
) -> RepoResult<()> {
    for line in merged(lines) {
        let result = sqlx::query(
            r#"
            UPDATE inventory
            SET quantity = quantity - $3, updated_at = NOW()
            WHERE product_id = $1 AND sku = $2 AND quantity >= $3
            "#,
        )
        .bind(line.product_id)
        .bind(&line.sku)
        .bind(line.quantity)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::conflict(format!(
                "Insufficient stock for {}",
                line.sku
            )));
        }
    }
    Ok(())
}

pub(super) async fn release_stock(
    tx: &mut Transaction<'_, Postgres>,
    lines: &[StockLine],
) -> RepoResult<()> {
    for line in merged(lines) {
        sqlx::query(
            r#"
            UPDATE inventory
            SET quantity = quantity + $3, updated_at = NOW()
            WHERE product_id = $1 AND sku = $2
            "#,
        )
        .bind(line.product_id)
        .bind(&line.sku)
        .bind(line.quantity)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// PostgreSQL implementation of InventoryRepository
pub struct PostgresInventoryRepository {
    pool: PgPool,
}

impl PostgresInventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryRepository for PostgresInventoryRepository {
    async fn ensure(&self, items: &[InventoryItem]) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;
        for item in items {
            sqlx::query(
                r#"
                INSERT INTO inventory (
                    id, product_id, size, color, sku, quantity, low_stock_threshold,
                    last_restocked, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (product_id, sku) DO NOTHING
                "#,
            )
            .bind(item.id)
            .bind(item.product_id)
            .bind(&item.variant.size)
            .bind(&item.variant.color)
            .bind(&item.variant.sku)
            .bind(item.quantity)
            .bind(item.low_stock_threshold)
            .bind(item.last_restocked)
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<InventoryItem>> {
        let row: Option<InventoryRow> =
            sqlx::query_as(&format!("SELECT {INVENTORY_COLUMNS} FROM inventory WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(InventoryItem::from))
    }

    async fn find_by_variant(&self, product_id: Uuid, sku: &str) -> RepoResult<Option<InventoryItem>> {
        let row: Option<InventoryRow> = sqlx::query_as(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory WHERE product_id = $1 AND sku = $2"
        ))
        .bind(product_id)
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(InventoryItem::from))
    }

    async fn update(&self, item: &InventoryItem) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE inventory
            SET quantity = $2, low_stock_threshold = $3, last_restocked = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(item.id)
        .bind(item.quantity)
        .bind(item.low_stock_threshold)
        .bind(item.last_restocked)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Inventory item not found"));
        }
        Ok(())
    }

    async fn list(&self, low_stock_only: bool, page: PageRequest) -> RepoResult<Paginated<InventoryItem>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM inventory WHERE is_low_stock OR NOT $1")
                .bind(low_stock_only)
                .fetch_one(&self.pool)
                .await?;

        let rows: Vec<InventoryRow> = sqlx::query_as(&format!(
            r#"
            SELECT {INVENTORY_COLUMNS}
            FROM inventory
            WHERE is_low_stock OR NOT $1
            ORDER BY quantity ASC, sku ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(low_stock_only)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Paginated::new(
            rows.into_iter().map(InventoryItem::from).collect(),
            total,
            page,
        ))
    }

    async fn release(&self, lines: &[StockLine]) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;
        release_stock(&mut tx, lines).await?;
        tx.commit().await?;
        Ok(())
    }
}
