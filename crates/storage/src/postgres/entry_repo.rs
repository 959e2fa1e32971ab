//! Entry repository implementation for PostgreSQL.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;

use quill_core::error::StorageResult;
use quill_core::models::{
    BlogId, Entry, EntryId, NewEntry, OrderingKey, UserId, truncate_to_micros,
};
use quill_core::ports::{BlogEntries, EntityStore, EntryRepository};

use super::helpers::{KeysetBound, parse_user_id, query_error};

const ENTRY_COLUMNS: &str = "id, blog_id, author_id, title, body, created_at";

/// PostgreSQL implementation of EntryRepository.
pub struct PgEntryRepository {
    pool: PgPool,
}

impl PgEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Keyset window over the entries of one blog.
    async fn fetch_window(
        &self,
        blog_id: BlogId,
        bound: KeysetBound,
        key: Option<&OrderingKey>,
        limit: usize,
    ) -> StorageResult<Vec<Entry>> {
        // SAFETY: only the comparison operator and ORDER BY come from
        // `KeysetBound`; every value is bound as a parameter.
        let mut conditions = vec!["blog_id = $1".to_string()];
        if key.is_some() {
            conditions.push(bound.condition(2));
        }
        let limit_param = if key.is_some() { 4 } else { 2 };

        let query = format!(
            "SELECT {} FROM entries WHERE {} {} LIMIT ${}",
            ENTRY_COLUMNS,
            conditions.join(" AND "),
            bound.order_by(),
            limit_param
        );

        let mut query_builder = sqlx::query_as::<_, EntryRow>(&query).bind(blog_id.0);
        if let Some(key) = key {
            query_builder = query_builder.bind(key.created_at).bind(key.id);
        }

        let rows: Vec<EntryRow> = query_builder
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        rows.into_iter().map(EntryRow::into_entry).collect()
    }

    async fn exists(&self, blog_id: BlogId, bound: KeysetBound, key: &OrderingKey) -> StorageResult<bool> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM entries WHERE blog_id = $1 AND {})",
            bound.condition(2)
        );

        let row: (bool,) = sqlx::query_as(&query)
            .bind(blog_id.0)
            .bind(key.created_at)
            .bind(key.id)
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(row.0)
    }
}

#[async_trait]
impl EntityStore for PgEntryRepository {
    type Node = Entry;
    type Scope = BlogEntries;

    #[instrument(skip_all, fields(blog = %scope.0, limit = limit))]
    async fn fetch_after(
        &self,
        scope: &BlogEntries,
        after: Option<&OrderingKey>,
        limit: usize,
    ) -> StorageResult<Vec<Entry>> {
        self.fetch_window(scope.0, KeysetBound::After, after, limit)
            .await
    }

    #[instrument(skip_all, fields(blog = %scope.0, limit = limit))]
    async fn fetch_before(
        &self,
        scope: &BlogEntries,
        before: Option<&OrderingKey>,
        limit: usize,
    ) -> StorageResult<Vec<Entry>> {
        self.fetch_window(scope.0, KeysetBound::Before, before, limit)
            .await
    }

    async fn exists_after(&self, scope: &BlogEntries, key: &OrderingKey) -> StorageResult<bool> {
        self.exists(scope.0, KeysetBound::After, key).await
    }

    async fn exists_before(&self, scope: &BlogEntries, key: &OrderingKey) -> StorageResult<bool> {
        self.exists(scope.0, KeysetBound::Before, key).await
    }
}

#[async_trait]
impl EntryRepository for PgEntryRepository {
    async fn insert_entry(
        &self,
        blog_id: BlogId,
        author: &UserId,
        entry: NewEntry,
    ) -> StorageResult<Entry> {
        let row = sqlx::query_as::<_, EntryRow>(&format!(
            r#"
            INSERT INTO entries (blog_id, author_id, title, body, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(blog_id.0)
        .bind(author.as_str())
        .bind(&entry.title)
        .bind(&entry.body)
        .bind(truncate_to_micros(Utc::now()))
        .fetch_one(&self.pool)
        .await
        .map_err(query_error)?;

        row.into_entry()
    }

    async fn get_entry(&self, id: EntryId) -> StorageResult<Option<Entry>> {
        let row = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {} FROM entries WHERE id = $1",
            ENTRY_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        row.map(EntryRow::into_entry).transpose()
    }

    async fn delete_entry(&self, id: EntryId) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Database row representation for Entry.
#[derive(sqlx::FromRow)]
struct EntryRow {
    id: i64,
    blog_id: i64,
    author_id: String,
    title: String,
    body: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl EntryRow {
    fn into_entry(self) -> StorageResult<Entry> {
        Ok(Entry {
            id: EntryId(self.id),
            blog_id: BlogId(self.blog_id),
            author: parse_user_id(self.author_id, "entry.author_id")?,
            title: self.title,
            body: self.body,
            created_at: self.created_at,
        })
    }
}
