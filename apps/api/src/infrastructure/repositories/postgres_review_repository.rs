use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::unique_violation;
use crate::domain::pagination::{PageRequest, Paginated};
use crate::domain::repositories::{RepoResult, RepositoryError, ReviewRepository};
use crate::domain::review::{AdminResponse, RatingSummary, Review, ReviewSort};

const REVIEW_COLUMNS: &str = "id, user_id, author, product_id, order_id, rating, title, comment, \
                              is_verified_purchase, is_approved, helpful_by, helpful_count, \
                              admin_response, moderated_at, created_at, updated_at";

#[derive(FromRow)]
struct ReviewRow {
    id: Uuid,
    user_id: Uuid,
    author: String,
    product_id: Uuid,
    order_id: Uuid,
    rating: i16,
    title: String,
    comment: String,
    is_verified_purchase: bool,
    is_approved: bool,
    helpful_by: Vec<Uuid>,
    helpful_count: i32,
    admin_response: Option<Json<AdminResponse>>,
    moderated_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(r: ReviewRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            author: r.author,
            product_id: r.product_id,
            order_id: r.order_id,
            rating: r.rating,
            title: r.title,
            comment: r.comment,
            is_verified_purchase: r.is_verified_purchase,
            is_approved: r.is_approved,
            helpful_by: r.helpful_by,
            helpful_count: r.helpful_count,
            admin_response: r.admin_response.map(|j| j.0),
            moderated_at: r.moderated_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL implementation of ReviewRepository
pub struct PostgresReviewRepository {
    pool: PgPool,
}

impl PostgresReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn page(&self, scope: Scope, order_by: &str, page: PageRequest) -> RepoResult<Paginated<Review>> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM reviews");
        scope.push(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new(format!("SELECT {REVIEW_COLUMNS} FROM reviews"));
        scope.push(&mut select);
        select
            .push(" ORDER BY ")
            .push(order_by)
            .push(" LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows: Vec<ReviewRow> = select.build_query_as().fetch_all(&self.pool).await?;

        Ok(Paginated::new(
            rows.into_iter().map(Review::from).collect(),
            total,
            page,
        ))
    }
}

/// Which reviews a listing covers
#[derive(Clone, Copy)]
enum Scope {
    ApprovedFor(Uuid),
    WrittenBy(Uuid),
    Pending,
}

impl Scope {
    fn push(self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Scope::ApprovedFor(product_id) => {
                builder
                    .push(" WHERE is_approved AND product_id = ")
                    .push_bind(product_id);
            }
            Scope::WrittenBy(user_id) => {
                builder.push(" WHERE user_id = ").push_bind(user_id);
            }
            Scope::Pending => {
                builder.push(" WHERE moderated_at IS NULL");
            }
        }
    }
}

#[async_trait]
impl ReviewRepository for PostgresReviewRepository {
    async fn create(&self, review: &Review) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reviews (
                id, user_id, author, product_id, order_id, rating, title, comment,
                is_verified_purchase, is_approved, helpful_by, helpful_count,
                admin_response, moderated_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(review.id)
        .bind(review.user_id)
        .bind(&review.author)
        .bind(review.product_id)
        .bind(review.order_id)
        .bind(review.rating)
        .bind(&review.title)
        .bind(&review.comment)
        .bind(review.is_verified_purchase)
        .bind(review.is_approved)
        .bind(&review.helpful_by)
        .bind(review.helpful_count)
        .bind(review.admin_response.as_ref().map(Json))
        .bind(review.moderated_at)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            unique_violation(e, "You have already reviewed this product for this order")
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Review>> {
        let row: Option<ReviewRow> =
            sqlx::query_as(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Review::from))
    }

    async fn exists(&self, user_id: Uuid, product_id: Uuid, order_id: Uuid) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM reviews
                WHERE user_id = $1 AND product_id = $2 AND order_id = $3
            )
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(order_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update(&self, review: &Review) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE reviews
            SET is_approved = $2, helpful_by = $3, helpful_count = $4, admin_response = $5,
                moderated_at = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(review.id)
        .bind(review.is_approved)
        .bind(&review.helpful_by)
        .bind(review.helpful_count)
        .bind(review.admin_response.as_ref().map(Json))
        .bind(review.moderated_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Review not found"));
        }
        Ok(())
    }

    async fn list_approved(
        &self,
        product_id: Uuid,
        sort: ReviewSort,
        page: PageRequest,
    ) -> RepoResult<Paginated<Review>> {
        self.page(Scope::ApprovedFor(product_id), sort.sql(), page).await
    }

    async fn list_for_user(&self, user_id: Uuid, page: PageRequest) -> RepoResult<Paginated<Review>> {
        self.page(Scope::WrittenBy(user_id), ReviewSort::Newest.sql(), page)
            .await
    }

    async fn list_pending(&self, page: PageRequest) -> RepoResult<Paginated<Review>> {
        self.page(Scope::Pending, ReviewSort::Oldest.sql(), page).await
    }

    async fn rating_summary(&self, product_id: Uuid) -> RepoResult<RatingSummary> {
        let ratings: Vec<i16> = sqlx::query_scalar(
            "SELECT rating FROM reviews WHERE product_id = $1 AND is_approved",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(RatingSummary::from_ratings(&ratings))
    }
}
