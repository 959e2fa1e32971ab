//! In-memory storage implementation for tests and local development.
//!
//! Mirrors the PostgreSQL adapter: same keyset semantics on
//! `(created_at, id)`, same foreign-key behaviour for entries.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use quill_core::error::{StorageError, StorageResult};
use quill_core::models::{
    Blog, BlogId, Entry, EntryId, NewBlog, NewEntry, OrderingKey, Ordered, UserId,
};
use quill_core::ports::{
    AllBlogs, BlogEntries, BlogRepository, EntityStore, EntryRepository, Repositories,
};

/// State shared by the in-memory repositories.
#[derive(Debug, Default)]
struct MemoryState {
    blogs: DashMap<BlogId, Blog>,
    entries: DashMap<EntryId, Entry>,
    next_id: AtomicI64,
    /// Last issued creation time, in micros. Keeps creation order monotonic.
    last_created: AtomicI64,
}

impl MemoryState {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1
    }

    /// Current time, never earlier than the previously issued one.
    fn created_at(&self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_micros();
        let prev = self
            .last_created
            .fetch_max(now, AtomicOrdering::SeqCst);
        let micros = prev.max(now);
        DateTime::from_timestamp_micros(micros).unwrap_or_else(Utc::now)
    }
}

/// Keyset window over `items`: strictly after (ascending) or strictly
/// before (descending) `key`.
fn window<T: Ordered>(
    mut items: Vec<T>,
    key: Option<&OrderingKey>,
    limit: usize,
    descending: bool,
) -> Vec<T> {
    items.sort_by_key(|i| i.ordering_key());
    if descending {
        items.reverse();
    }
    items
        .into_iter()
        .filter(|i| match key {
            Some(k) if descending => i.ordering_key() < *k,
            Some(k) => i.ordering_key() > *k,
            None => true,
        })
        .take(limit)
        .collect()
}

// =============================================================================
// Blogs
// =============================================================================

/// In-memory implementation of BlogRepository.
#[derive(Debug)]
pub struct MemoryBlogRepository {
    state: Arc<MemoryState>,
}

impl MemoryBlogRepository {
    fn snapshot(&self) -> Vec<Blog> {
        self.state.blogs.iter().map(|b| b.value().clone()).collect()
    }
}

#[async_trait]
impl EntityStore for MemoryBlogRepository {
    type Node = Blog;
    type Scope = AllBlogs;

    async fn fetch_after(
        &self,
        _scope: &AllBlogs,
        after: Option<&OrderingKey>,
        limit: usize,
    ) -> StorageResult<Vec<Blog>> {
        Ok(window(self.snapshot(), after, limit, false))
    }

    async fn fetch_before(
        &self,
        _scope: &AllBlogs,
        before: Option<&OrderingKey>,
        limit: usize,
    ) -> StorageResult<Vec<Blog>> {
        Ok(window(self.snapshot(), before, limit, true))
    }

    async fn exists_after(&self, _scope: &AllBlogs, key: &OrderingKey) -> StorageResult<bool> {
        Ok(self
            .state
            .blogs
            .iter()
            .any(|b| b.value().ordering_key() > *key))
    }

    async fn exists_before(&self, _scope: &AllBlogs, key: &OrderingKey) -> StorageResult<bool> {
        Ok(self
            .state
            .blogs
            .iter()
            .any(|b| b.value().ordering_key() < *key))
    }
}

#[async_trait]
impl BlogRepository for MemoryBlogRepository {
    async fn insert_blog(&self, owner: &UserId, blog: NewBlog) -> StorageResult<Blog> {
        let blog = Blog {
            id: BlogId(self.state.next_id()),
            owner: owner.clone(),
            title: blog.title,
            description: blog.description,
            created_at: self.state.created_at(),
        };
        self.state.blogs.insert(blog.id, blog.clone());
        Ok(blog)
    }

    async fn get_blog(&self, id: BlogId) -> StorageResult<Option<Blog>> {
        Ok(self.state.blogs.get(&id).map(|b| b.value().clone()))
    }
}

// =============================================================================
// Entries
// =============================================================================

/// In-memory implementation of EntryRepository.
#[derive(Debug)]
pub struct MemoryEntryRepository {
    state: Arc<MemoryState>,
}

impl MemoryEntryRepository {
    fn snapshot(&self, blog_id: BlogId) -> Vec<Entry> {
        self.state
            .entries
            .iter()
            .filter(|e| e.value().blog_id == blog_id)
            .map(|e| e.value().clone())
            .collect()
    }

    fn any_in_blog(&self, blog_id: BlogId, pred: impl Fn(OrderingKey) -> bool) -> bool {
        self.state
            .entries
            .iter()
            .any(|e| e.value().blog_id == blog_id && pred(e.value().ordering_key()))
    }
}

#[async_trait]
impl EntityStore for MemoryEntryRepository {
    type Node = Entry;
    type Scope = BlogEntries;

    async fn fetch_after(
        &self,
        scope: &BlogEntries,
        after: Option<&OrderingKey>,
        limit: usize,
    ) -> StorageResult<Vec<Entry>> {
        Ok(window(self.snapshot(scope.0), after, limit, false))
    }

    async fn fetch_before(
        &self,
        scope: &BlogEntries,
        before: Option<&OrderingKey>,
        limit: usize,
    ) -> StorageResult<Vec<Entry>> {
        Ok(window(self.snapshot(scope.0), before, limit, true))
    }

    async fn exists_after(&self, scope: &BlogEntries, key: &OrderingKey) -> StorageResult<bool> {
        Ok(self.any_in_blog(scope.0, |k| k > *key))
    }

    async fn exists_before(&self, scope: &BlogEntries, key: &OrderingKey) -> StorageResult<bool> {
        Ok(self.any_in_blog(scope.0, |k| k < *key))
    }
}

#[async_trait]
impl EntryRepository for MemoryEntryRepository {
    async fn insert_entry(
        &self,
        blog_id: BlogId,
        author: &UserId,
        entry: NewEntry,
    ) -> StorageResult<Entry> {
        if !self.state.blogs.contains_key(&blog_id) {
            return Err(StorageError::ConstraintViolation(format!(
                "blog {} does not exist",
                blog_id
            )));
        }

        let entry = Entry {
            id: EntryId(self.state.next_id()),
            blog_id,
            author: author.clone(),
            title: entry.title,
            body: entry.body,
            created_at: self.state.created_at(),
        };
        self.state.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn get_entry(&self, id: EntryId) -> StorageResult<Option<Entry>> {
        Ok(self.state.entries.get(&id).map(|e| e.value().clone()))
    }

    async fn delete_entry(&self, id: EntryId) -> StorageResult<bool> {
        Ok(self.state.entries.remove(&id).is_some())
    }
}

// =============================================================================
// Composite Repository
// =============================================================================

/// In-memory repositories implementing the `Repositories` trait.
#[derive(Debug)]
pub struct MemoryRepositories {
    blogs: MemoryBlogRepository,
    entries: MemoryEntryRepository,
}

impl MemoryRepositories {
    pub fn new() -> Self {
        let state = Arc::new(MemoryState::default());
        Self {
            blogs: MemoryBlogRepository {
                state: state.clone(),
            },
            entries: MemoryEntryRepository { state },
        }
    }

    /// Creates new in-memory repositories wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for MemoryRepositories {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repositories for MemoryRepositories {
    fn blogs(&self) -> &dyn BlogRepository {
        &self.blogs
    }

    fn entries(&self) -> &dyn EntryRepository {
        &self.entries
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}
