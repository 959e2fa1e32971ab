//! Port traits for data repositories.
//!
//! These traits define the storage interface used by the domain layer.
//! Implementations live in the infrastructure layer (e.g., `quill-storage`).

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::models::{Blog, BlogId, Entry, EntryId, NewBlog, NewEntry, UserId};

use super::pagination::{AllBlogs, BlogEntries};
use super::store::EntityStore;

// =============================================================================
// Repository Traits
// =============================================================================

/// Repository for blogs, pageable over all blogs.
#[async_trait]
pub trait BlogRepository: EntityStore<Node = Blog, Scope = AllBlogs> {
    /// Insert a blog owned by `owner`.
    async fn insert_blog(&self, owner: &UserId, blog: NewBlog) -> StorageResult<Blog>;

    /// Get blog by ID.
    async fn get_blog(&self, id: BlogId) -> StorageResult<Option<Blog>>;
}

/// Repository for entries, pageable per blog.
#[async_trait]
pub trait EntryRepository: EntityStore<Node = Entry, Scope = BlogEntries> {
    /// Insert an entry into an existing blog.
    async fn insert_entry(
        &self,
        blog_id: BlogId,
        author: &UserId,
        entry: NewEntry,
    ) -> StorageResult<Entry>;

    /// Get entry by ID.
    async fn get_entry(&self, id: EntryId) -> StorageResult<Option<Entry>>;

    /// Delete an entry. Returns whether a row was removed.
    async fn delete_entry(&self, id: EntryId) -> StorageResult<bool>;
}

// =============================================================================
// Composite Repository
// =============================================================================

/// Combined repository access for the API.
#[async_trait]
pub trait Repositories: Send + Sync {
    /// Access the blog repository.
    fn blogs(&self) -> &dyn BlogRepository;

    /// Access the entry repository.
    fn entries(&self) -> &dyn EntryRepository;

    /// Check that the backing store is reachable.
    async fn is_healthy(&self) -> bool;
}
