//! Blog repository implementation for PostgreSQL.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;

use quill_core::error::StorageResult;
use quill_core::models::{Blog, BlogId, NewBlog, OrderingKey, UserId, truncate_to_micros};
use quill_core::ports::{AllBlogs, BlogRepository, EntityStore};

use super::database::Database;
use super::helpers::{KeysetBound, parse_user_id, query_error};

const BLOG_COLUMNS: &str = "id, owner_id, title, description, created_at";

/// PostgreSQL implementation of BlogRepository.
pub struct PgBlogRepository {
    pool: PgPool,
}

impl PgBlogRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Keyset window over all blogs.
    async fn fetch_window(
        &self,
        bound: KeysetBound,
        key: Option<&OrderingKey>,
        limit: usize,
    ) -> StorageResult<Vec<Blog>> {
        // SAFETY: only the comparison operator and ORDER BY come from
        // `KeysetBound`; every value is bound as a parameter.
        let where_clause = match key {
            Some(_) => format!("WHERE {}", bound.condition(1)),
            None => String::new(),
        };
        let limit_param = if key.is_some() { 3 } else { 1 };

        let query = format!(
            "SELECT {} FROM blogs {} {} LIMIT ${}",
            BLOG_COLUMNS,
            where_clause,
            bound.order_by(),
            limit_param
        );

        let mut query_builder = sqlx::query_as::<_, BlogRow>(&query);
        if let Some(key) = key {
            query_builder = query_builder.bind(key.created_at).bind(key.id);
        }

        let rows: Vec<BlogRow> = query_builder
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        rows.into_iter().map(BlogRow::into_blog).collect()
    }
}

#[async_trait]
impl EntityStore for PgBlogRepository {
    type Node = Blog;
    type Scope = AllBlogs;

    #[instrument(skip_all, fields(limit = limit))]
    async fn fetch_after(
        &self,
        _scope: &AllBlogs,
        after: Option<&OrderingKey>,
        limit: usize,
    ) -> StorageResult<Vec<Blog>> {
        self.fetch_window(KeysetBound::After, after, limit).await
    }

    #[instrument(skip_all, fields(limit = limit))]
    async fn fetch_before(
        &self,
        _scope: &AllBlogs,
        before: Option<&OrderingKey>,
        limit: usize,
    ) -> StorageResult<Vec<Blog>> {
        self.fetch_window(KeysetBound::Before, before, limit).await
    }

    async fn exists_after(&self, _scope: &AllBlogs, key: &OrderingKey) -> StorageResult<bool> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM blogs WHERE (created_at, id) > ($1, $2))",
        )
        .bind(key.created_at)
        .bind(key.id)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(row.0)
    }

    async fn exists_before(&self, _scope: &AllBlogs, key: &OrderingKey) -> StorageResult<bool> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM blogs WHERE (created_at, id) < ($1, $2))",
        )
        .bind(key.created_at)
        .bind(key.id)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(row.0)
    }
}

#[async_trait]
impl BlogRepository for PgBlogRepository {
    async fn insert_blog(&self, owner: &UserId, blog: NewBlog) -> StorageResult<Blog> {
        let row = sqlx::query_as::<_, BlogRow>(&format!(
            r#"
            INSERT INTO blogs (owner_id, title, description, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            BLOG_COLUMNS
        ))
        .bind(owner.as_str())
        .bind(&blog.title)
        .bind(&blog.description)
        .bind(truncate_to_micros(Utc::now()))
        .fetch_one(&self.pool)
        .await
        .map_err(query_error)?;

        row.into_blog()
    }

    async fn get_blog(&self, id: BlogId) -> StorageResult<Option<Blog>> {
        let row = sqlx::query_as::<_, BlogRow>(&format!(
            "SELECT {} FROM blogs WHERE id = $1",
            BLOG_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        row.map(BlogRow::into_blog).transpose()
    }
}

/// Database row representation for Blog.
#[derive(sqlx::FromRow)]
struct BlogRow {
    id: i64,
    owner_id: String,
    title: String,
    description: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl BlogRow {
    fn into_blog(self) -> StorageResult<Blog> {
        Ok(Blog {
            id: BlogId(self.id),
            owner: parse_user_id(self.owner_id, "blog.owner_id")?,
            title: self.title,
            description: self.description,
            created_at: self.created_at,
        })
    }
}
