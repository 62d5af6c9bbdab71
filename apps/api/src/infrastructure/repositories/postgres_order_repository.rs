use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::like_pattern;
use super::postgres_inventory_repository::{release_stock, reserve_stock};
use crate::domain::coupon::normalize_code;
use crate::domain::order::{
    order_number, Order, OrderItem, OrderStatus, Payment, ShippingAddress, StatusChange,
};
use crate::domain::pagination::{PageRequest, Paginated};
use crate::domain::repositories::{
    OrderQuery, OrderRepository, Placement, RepoResult, RepositoryError,
};

const ORDER_COLUMNS: &str = "o.id, o.order_number, o.user_id, o.items, o.shipping_address, \
                             o.subtotal, o.shipping, o.tax, o.discount, o.total_amount, \
                             o.coupon_code, o.payment, o.status, o.status_history, \
                             o.tracking_number, o.shipping_provider, o.estimated_delivery, \
                             o.cancellation_reason, o.return_reason, o.refund_amount, o.notes, \
                             o.created_at, o.updated_at";

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    user_id: Uuid,
    items: Json<Vec<OrderItem>>,
    shipping_address: Json<ShippingAddress>,
    subtotal: Decimal,
    shipping: Decimal,
    tax: Decimal,
    discount: Decimal,
    total_amount: Decimal,
    coupon_code: Option<String>,
    payment: Json<Payment>,
    status: OrderStatus,
    status_history: Json<Vec<StatusChange>>,
    tracking_number: Option<String>,
    shipping_provider: Option<String>,
    estimated_delivery: Option<DateTime<Utc>>,
    cancellation_reason: Option<String>,
    return_reason: Option<String>,
    refund_amount: Option<Decimal>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(r: OrderRow) -> Self {
        Self {
            id: r.id,
            order_number: r.order_number,
            user_id: r.user_id,
            items: r.items.0,
            shipping_address: r.shipping_address.0,
            subtotal: r.subtotal,
            shipping: r.shipping,
            tax: r.tax,
            discount: r.discount,
            total_amount: r.total_amount,
            coupon_code: r.coupon_code,
            payment: r.payment.0,
            status: r.status,
            status_history: r.status_history.0,
            tracking_number: r.tracking_number,
            shipping_provider: r.shipping_provider,
            estimated_delivery: r.estimated_delivery,
            cancellation_reason: r.cancellation_reason,
            return_reason: r.return_reason,
            refund_amount: r.refund_amount,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL implementation of OrderRepository
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_query<'a>(builder: &mut QueryBuilder<'a, Postgres>, query: &OrderQuery) {
    builder.push(" FROM orders o LEFT JOIN users u ON u.id = o.user_id WHERE TRUE");
    if let Some(user_id) = query.user_id {
        builder.push(" AND o.user_id = ").push_bind(user_id);
    }
    if let Some(status) = query.status {
        builder.push(" AND o.status = ").push_bind(status);
    }
    if let Some(search) = &query.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (o.order_number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.username ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

const UPDATE_ORDER: &str = r#"
    UPDATE orders
    SET items = $2, shipping_address = $3, payment = $4, payment_intent_id = $5,
        status = $6, status_history = $7, tracking_number = $8, shipping_provider = $9,
        estimated_delivery = $10, cancellation_reason = $11, return_reason = $12,
        refund_amount = $13, notes = $14, updated_at = $15
    WHERE id = $1
"#;

/// `UPDATE_ORDER` that only matches an order not yet cancelled
const CANCEL_ORDER: &str = r#"
    UPDATE orders
    SET items = $2, shipping_address = $3, payment = $4, payment_intent_id = $5,
        status = $6, status_history = $7, tracking_number = $8, shipping_provider = $9,
        estimated_delivery = $10, cancellation_reason = $11, return_reason = $12,
        refund_amount = $13, notes = $14, updated_at = $15
    WHERE id = $1 AND status <> 'cancelled'
"#;

fn update_query(order: &Order) -> sqlx::query::Query<'_, Postgres, sqlx::postgres::PgArguments> {
    update_query_with(UPDATE_ORDER, order)
}

fn update_query_with<'q>(
    sql: &'q str,
    order: &'q Order,
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
    sqlx::query(sql)
        .bind(order.id)
        .bind(Json(&order.items))
        .bind(Json(&order.shipping_address))
        .bind(Json(&order.payment))
        .bind(order.payment.payment_intent_id.as_deref())
        .bind(order.status)
        .bind(Json(&order.status_history))
        .bind(order.tracking_number.as_deref())
        .bind(order.shipping_provider.as_deref())
        .bind(order.estimated_delivery)
        .bind(order.cancellation_reason.as_deref())
        .bind(order.return_reason.as_deref())
        .bind(order.refund_amount)
        .bind(order.notes.as_deref())
        .bind(order.updated_at)
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn place(&self, mut order: Order, placement: Placement) -> RepoResult<Order> {
        let mut tx = self.pool.begin().await?;

        reserve_stock(&mut tx, &order.stock_lines()).await?;

        if let Some(code) = placement.coupon_code.as_deref() {
            let redeemed = sqlx::query(
                r#"
                UPDATE coupons
                SET used_count = used_count + 1, updated_at = NOW()
                WHERE code = $1
                  AND is_active
                  AND valid_from <= NOW() AND valid_until >= NOW()
                  AND (usage_limit IS NULL OR used_count < usage_limit)
                "#,
            )
            .bind(normalize_code(code))
            .execute(&mut *tx)
            .await?;

            if redeemed.rows_affected() == 0 {
                return Err(RepositoryError::conflict(
                    "Coupon is expired or no longer valid",
                ));
            }
        }

        // Serialize number assignment across concurrent placements
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext('orders.order_number'))")
            .execute(&mut *tx)
            .await?;

        let day = order.created_at.date_naive();
        let day_start = day
            .and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc())
            .unwrap_or(order.created_at);
        let placed_today: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(day_start)
        .bind(day_start + Duration::days(1))
        .fetch_one(&mut *tx)
        .await?;
        order.order_number = order_number(day, placed_today + 1);

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, user_id, items, shipping_address, subtotal, shipping, tax,
                discount, total_amount, coupon_code, payment, payment_intent_id, status,
                status_history, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(order.id)
        .bind(&order.order_number)
        .bind(order.user_id)
        .bind(Json(&order.items))
        .bind(Json(&order.shipping_address))
        .bind(order.subtotal)
        .bind(order.shipping)
        .bind(order.tax)
        .bind(order.discount)
        .bind(order.total_amount)
        .bind(order.coupon_code.as_deref())
        .bind(Json(&order.payment))
        .bind(order.payment.payment_intent_id.as_deref())
        .bind(order.status)
        .bind(Json(&order.status_history))
        .bind(order.notes.as_deref())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| super::unique_violation(e, "An order already exists for this payment"))?;

        if placement.clear_cart {
            sqlx::query("UPDATE carts SET items = '[]'::jsonb, updated_at = NOW() WHERE user_id = $1")
                .bind(order.user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::info!(order_id = %order.id, order_number = %order.order_number, "Order placed");
        Ok(order)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Order::from))
    }

    async fn find_by_payment_intent(&self, intent_id: &str) -> RepoResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.payment_intent_id = $1"
        ))
        .bind(intent_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    async fn update(&self, order: &Order) -> RepoResult<()> {
        let result = update_query(order).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Order not found"));
        }
        Ok(())
    }

    async fn cancel(&self, order: &Order) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;
        // the row lock taken here serialises concurrent cancels of one order
        let result = update_query_with(CANCEL_ORDER, order)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM orders WHERE id = $1")
                .bind(order.id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match exists {
                Some(_) => RepositoryError::conflict("Order is already cancelled"),
                None => RepositoryError::not_found("Order not found"),
            });
        }
        release_stock(&mut tx, &order.stock_lines()).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list(&self, query: &OrderQuery, page: PageRequest) -> RepoResult<Paginated<Order>> {
        let mut count = QueryBuilder::new("SELECT COUNT(*)");
        push_query(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new(format!("SELECT {ORDER_COLUMNS}"));
        push_query(&mut select, query);
        select
            .push(" ORDER BY o.created_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows: Vec<OrderRow> = select.build_query_as().fetch_all(&self.pool).await?;

        Ok(Paginated::new(
            rows.into_iter().map(Order::from).collect(),
            total,
            page,
        ))
    }
}
