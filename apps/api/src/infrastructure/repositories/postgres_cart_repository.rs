use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::cart::{Cart, CartItem};
use crate::domain::repositories::{CartRepository, RepoResult};

#[derive(FromRow)]
struct CartRow {
    id: Uuid,
    user_id: Uuid,
    items: Json<Vec<CartItem>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// PostgreSQL implementation of CartRepository
pub struct PostgresCartRepository {
    pool: PgPool,
}

impl PostgresCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartRepository for PostgresCartRepository {
    async fn find_by_user(&self, user_id: Uuid) -> RepoResult<Option<Cart>> {
        let row: Option<CartRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, items, created_at, updated_at
            FROM carts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Cart {
            id: r.id,
            user_id: r.user_id,
            items: r.items.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }))
    }

    async fn save(&self, cart: &Cart) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO carts (id, user_id, items, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET items = EXCLUDED.items, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(cart.id)
        .bind(cart.user_id)
        .bind(Json(&cart.items))
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
