//! Postgres adapters (`db-postgres` feature).
//!
//! Plain `sqlx::query` with explicit binds and `Row::get`; no
//! compile-time checked macros, so builds never require a live database.
//! Migrations are embedded and run at connect time.

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use domains::error::{DomainError, DomainResult};
use domains::models::{Post, PostChanges, PostStatus, ProfileFields, User};
use domains::ports::{PostStore, UserStore};

pub use sqlx::postgres::PgPool;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Connect a pool and bring the schema up to date.
pub async fn connect(url: &str, max_connections: u32) -> DomainResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .map_err(db_err)?;
    MIGRATOR
        .run(&pool)
        .await
        .map_err(|err| DomainError::Internal(format!("migration: {err}")))?;
    info!(max_connections, "postgres pool ready");
    Ok(pool)
}

fn db_err(err: sqlx::Error) -> DomainError {
    if let Some(db) = err.as_database_error() {
        if db.is_unique_violation() {
            return DomainError::Conflict(db.message().to_owned());
        }
    }
    DomainError::Internal(format!("database: {err}"))
}

fn row_to_user(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        address: row.get("address"),
        bio: row.get("bio"),
        theme: row.get("theme"),
        password_hash: row.get("password_hash"),
        is_admin: row.get("is_admin"),
        is_confirmed: row.get("is_confirmed"),
        image_id: row.get("image_id"),
        pinned: row.get("pinned"),
        created_at: row.get("created_at"),
    }
}

fn row_to_post(row: &PgRow) -> Post {
    let status: String = row.get("status");
    Post {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        author: row.get("author"),
        // A row that predates a status rename degrades to a draft rather
        // than failing the whole listing.
        status: PostStatus::parse(&status).unwrap_or(PostStatus::Draft),
        publish_date: row.get("publish_date"),
        image_id: row.get("image_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn insert(&self, user: User) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO users \
             (id, email, name, address, bio, theme, password_hash, \
              is_admin, is_confirmed, image_id, pinned, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.address)
        .bind(&user.bio)
        .bind(&user.theme)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.is_confirmed)
        .bind(user.image_id)
        .bind(&user.pinned)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, fields: ProfileFields) -> DomainResult<()> {
        sqlx::query(
            "UPDATE users SET name = $2, address = $3, bio = $4, theme = $5 WHERE id = $1",
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.address)
        .bind(&fields.bio)
        .bind(&fields.theme)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn set_confirmed(&self, email: &str) -> DomainResult<()> {
        sqlx::query("UPDATE users SET is_confirmed = TRUE WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn set_image(&self, id: Uuid, image_id: Option<Uuid>) -> DomainResult<()> {
        sqlx::query("UPDATE users SET image_id = $2 WHERE id = $1")
            .bind(id)
            .bind(image_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn add_pin(&self, email: &str, post_id: Uuid) -> DomainResult<()> {
        // The containment guard makes repeated adds a no-op instead of
        // growing the array.
        sqlx::query(
            "UPDATE users SET pinned = array_append(pinned, $2) \
             WHERE email = $1 AND NOT (pinned @> ARRAY[$2])",
        )
        .bind(email)
        .bind(post_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn remove_pin(&self, email: &str, post_id: Uuid) -> DomainResult<()> {
        sqlx::query("UPDATE users SET pinned = array_remove(pinned, $2) WHERE email = $1")
            .bind(email)
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn list_all(&self) -> DomainResult<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY email ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(row_to_user).collect())
    }
}

pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn find(&self, id: Uuid) -> DomainResult<Option<Post>> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(row_to_post))
    }

    async fn list_published(&self) -> DomainResult<Vec<Post>> {
        let rows = sqlx::query(
            "SELECT * FROM posts WHERE status = 'published' ORDER BY publish_date DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.iter().map(row_to_post).collect())
    }

    async fn list_by_author(&self, author: &str) -> DomainResult<Vec<Post>> {
        let rows = sqlx::query("SELECT * FROM posts WHERE author = $1 ORDER BY publish_date DESC")
            .bind(author)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(row_to_post).collect())
    }

    async fn list_by_ids(&self, ids: &[Uuid]) -> DomainResult<Vec<Post>> {
        let rows = sqlx::query("SELECT * FROM posts WHERE id = ANY($1) ORDER BY publish_date DESC")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(row_to_post).collect())
    }

    async fn insert(&self, post: Post) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO posts \
             (id, title, content, author, status, publish_date, image_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.status.as_str())
        .bind(post.publish_date)
        .bind(post.image_id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update_content(&self, id: Uuid, changes: PostChanges) -> DomainResult<()> {
        sqlx::query(
            "UPDATE posts SET title = $2, content = $3, status = $4, \
             publish_date = $5, updated_at = $6 WHERE id = $1",
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(changes.status.as_str())
        .bind(changes.publish_date)
        .bind(changes.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn set_image(&self, id: Uuid, image_id: Uuid) -> DomainResult<()> {
        sqlx::query("UPDATE posts SET image_id = $2 WHERE id = $1")
            .bind(id)
            .bind(image_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
