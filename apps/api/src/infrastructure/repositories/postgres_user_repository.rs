use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{like_pattern, unique_violation};
use crate::domain::pagination::{PageRequest, Paginated};
use crate::domain::repositories::{RepoResult, RepositoryError, UserRepository};
use crate::domain::user::{Address, Profile, Role, User, Username};

const USER_COLUMNS: &str = "id, username, password_hash, role, profile, addresses, \
                            is_active, last_login, created_at, updated_at";

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: Role,
    profile: Json<Profile>,
    addresses: Json<Vec<Address>>,
    is_active: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let username = Username::new(r.username)
            .map_err(|e| RepositoryError::Database(sqlx::Error::Decode(Box::new(e))))?;
        Ok(User {
            id: r.id,
            username,
            password_hash: r.password_hash,
            role: r.role,
            profile: r.profile.0,
            addresses: r.addresses.0,
            is_active: r.is_active,
            last_login: r.last_login,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_search<'a>(builder: &mut QueryBuilder<'a, Postgres>, search: Option<&str>) {
    if let Some(search) = search {
        let pattern = like_pattern(search);
        builder
            .push(" WHERE (username ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR profile->>'firstName' ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR profile->>'lastName' ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &User) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, password_hash, role, profile, addresses,
                is_active, last_login, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id)
        .bind(user.username.as_str())
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(Json(&user.profile))
        .bind(Json(&user.addresses))
        .bind(user.is_active)
        .bind(user.last_login)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "Username already exists"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(username) = LOWER($1)"
        ))
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, role = $3, profile = $4, addresses = $5,
                is_active = $6, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(Json(&user.profile))
        .bind(Json(&user.addresses))
        .bind(user.is_active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("User not found"));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("User not found"));
        }
        Ok(())
    }

    async fn record_login(&self, id: Uuid) -> RepoResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_login = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, search: Option<&str>, page: PageRequest) -> RepoResult<Paginated<User>> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM users");
        push_search(&mut count, search);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_search(&mut select, search);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows: Vec<UserRow> = select.build_query_as().fetch_all(&self.pool).await?;

        let users = rows
            .into_iter()
            .map(User::try_from)
            .collect::<RepoResult<Vec<_>>>()?;
        Ok(Paginated::new(users, total, page))
    }
}
