use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{like_pattern, unique_violation};
use crate::domain::pagination::{PageRequest, Paginated};
use crate::domain::product::{
    Brand, Category, Product, ProductFilter, ProductImage, Rating, Variant,
};
use crate::domain::repositories::{
    CatalogRepository, ProductRepository, RepoResult, RepositoryError,
};

const PRODUCT_COLUMNS: &str = "id, name, description, base_price, category_id, brand, variants, \
                               images, rating_average, rating_count, is_active, is_featured, \
                               created_at, updated_at";

#[derive(FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    base_price: Decimal,
    category_id: Uuid,
    brand: String,
    variants: Json<Vec<Variant>>,
    images: Json<Vec<ProductImage>>,
    rating_average: f64,
    rating_count: i64,
    is_active: bool,
    is_featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            base_price: r.base_price,
            category_id: r.category_id,
            brand: r.brand,
            variants: r.variants.0,
            images: r.images.0,
            rating: Rating {
                average: r.rating_average,
                count: r.rating_count,
            },
            is_active: r.is_active,
            is_featured: r.is_featured,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    image: Option<String>,
    parent_id: Option<Uuid>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            image: r.image,
            parent_id: r.parent_id,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(FromRow)]
struct BrandRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    logo: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<BrandRow> for Brand {
    fn from(r: BrandRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            logo: r.logo,
            is_active: r.is_active,
            created_at: r.created_at,
        }
    }
}

/// PostgreSQL implementation of ProductRepository and CatalogRepository
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends the WHERE clause for `filter`
fn push_filter<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &ProductFilter) {
    builder.push(" WHERE TRUE");
    if let Some(active) = filter.active {
        builder.push(" AND is_active = ").push_bind(active);
    }
    if let Some(category) = filter.category {
        builder.push(" AND category_id = ").push_bind(category);
    }
    if !filter.brands.is_empty() {
        builder.push(" AND (");
        let mut brands = builder.separated(" OR ");
        for brand in &filter.brands {
            brands.push("brand ILIKE ").push_bind_unseparated(like_pattern(brand));
        }
        builder.push(")");
    }
    if let Some(min) = filter.min_price {
        builder.push(" AND base_price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        builder.push(" AND base_price <= ").push_bind(max);
    }
    if let Some(min) = filter.min_rating {
        builder.push(" AND rating_average >= ").push_bind(min);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(featured) = filter.featured {
        builder.push(" AND is_featured = ").push_bind(featured);
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn create(&self, product: &Product) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, base_price, category_id, brand, variants, images,
                rating_average, rating_count, is_active, is_featured, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.base_price)
        .bind(product.category_id)
        .bind(&product.brand)
        .bind(Json(&product.variants))
        .bind(Json(&product.images))
        .bind(product.rating.average)
        .bind(product.rating.count)
        .bind(product.is_active)
        .bind(product.is_featured)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Product>> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Product::from))
    }

    async fn update(&self, product: &Product) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, base_price = $4, category_id = $5, brand = $6,
                variants = $7, images = $8, is_active = $9, is_featured = $10, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.base_price)
        .bind(product.category_id)
        .bind(&product.brand)
        .bind(Json(&product.variants))
        .bind(Json(&product.images))
        .bind(product.is_active)
        .bind(product.is_featured)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Product not found"));
        }
        Ok(())
    }

    async fn list(&self, filter: &ProductFilter, page: PageRequest) -> RepoResult<Paginated<Product>> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM products");
        push_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY ")
            .push(filter.sort.sql())
            .push(" LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows: Vec<ProductRow> = select.build_query_as().fetch_all(&self.pool).await?;

        Ok(Paginated::new(
            rows.into_iter().map(Product::from).collect(),
            total,
            page,
        ))
    }

    async fn set_rating(&self, id: Uuid, rating: Rating) -> RepoResult<()> {
        sqlx::query(
            "UPDATE products SET rating_average = $2, rating_count = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(rating.average)
        .bind(rating.count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for PostgresProductRepository {
    async fn create_category(&self, category: &Category) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, image, parent_id, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.image)
        .bind(category.parent_id)
        .bind(category.is_active)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "Category already exists"))?;

        Ok(())
    }

    async fn find_category(&self, id: Uuid) -> RepoResult<Option<Category>> {
        let row: Option<CategoryRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, image, parent_id, is_active, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    async fn update_category(&self, category: &Category) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = $2, description = $3, image = $4, parent_id = $5, is_active = $6,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.image)
        .bind(category.parent_id)
        .bind(category.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "Category already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Category not found"));
        }
        Ok(())
    }

    async fn list_categories(&self, active_only: bool) -> RepoResult<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, image, parent_id, is_active, created_at, updated_at
            FROM categories
            WHERE is_active OR NOT $1
            ORDER BY name
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn create_brand(&self, brand: &Brand) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO brands (id, name, description, logo, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(brand.id)
        .bind(&brand.name)
        .bind(&brand.description)
        .bind(&brand.logo)
        .bind(brand.is_active)
        .bind(brand.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "Brand already exists"))?;

        Ok(())
    }

    async fn list_brands(&self, active_only: bool) -> RepoResult<Vec<Brand>> {
        let rows: Vec<BrandRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, logo, is_active, created_at
            FROM brands
            WHERE is_active OR NOT $1
            ORDER BY name
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Brand::from).collect())
    }
}
