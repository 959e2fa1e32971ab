//! Blog service - listing, publishing and ownership checks.
//!
//! Every mutation requires an authenticated viewer. Publishing into or
//! deleting from a blog is restricted to the blog's owner.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::error::{DomainError, DomainResult};
use crate::metrics::{record_entity_created, record_entity_deleted};
use crate::models::{Blog, BlogId, Entry, EntryId, NewBlog, NewEntry, UserId};
use crate::ports::{AllBlogs, BlogEntries, Connection, Pagination, Repositories};

use super::paginator::paginate;

/// Maximum length of blog and entry titles.
pub const MAX_TITLE_LENGTH: usize = 200;
/// Maximum length of a blog description.
pub const MAX_DESCRIPTION_LENGTH: usize = 2_000;
/// Maximum length of an entry body.
pub const MAX_BODY_LENGTH: usize = 100_000;

/// Application service over the blog and entry repositories.
pub struct BlogService {
    repositories: Arc<dyn Repositories>,
}

impl BlogService {
    pub fn new(repositories: Arc<dyn Repositories>) -> Self {
        Self { repositories }
    }

    /// Check the backing store.
    pub async fn is_healthy(&self) -> bool {
        self.repositories.is_healthy().await
    }

    /// Page through all blogs, oldest first.
    pub async fn list_blogs(&self, args: &Pagination) -> DomainResult<Connection<Blog>> {
        Ok(paginate(self.repositories.blogs(), &AllBlogs, args).await?)
    }

    /// Page through the entries of one blog, oldest first.
    pub async fn list_entries(
        &self,
        blog_id: BlogId,
        args: &Pagination,
    ) -> DomainResult<Connection<Entry>> {
        let scope = BlogEntries(blog_id);
        // Bad arguments fail before any read, even for an unknown blog.
        args.resolve(&scope)?;
        self.require_blog(blog_id).await?;
        Ok(paginate(self.repositories.entries(), &scope, args).await?)
    }

    pub async fn get_blog(&self, id: BlogId) -> DomainResult<Option<Blog>> {
        Ok(self.repositories.blogs().get_blog(id).await?)
    }

    pub async fn get_entry(&self, id: EntryId) -> DomainResult<Option<Entry>> {
        Ok(self.repositories.entries().get_entry(id).await?)
    }

    /// Create a blog owned by the viewer.
    #[instrument(skip_all)]
    pub async fn create_blog(&self, viewer: Option<&UserId>, input: NewBlog) -> DomainResult<Blog> {
        let owner = viewer.ok_or(DomainError::Unauthenticated)?;

        let title = validate_title(&input.title)?;
        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if let Some(d) = &description {
            validate_length(d, "description", MAX_DESCRIPTION_LENGTH)?;
        }

        let blog = self
            .repositories
            .blogs()
            .insert_blog(owner, NewBlog { title, description })
            .await?;

        record_entity_created("blog");
        info!(blog = %blog.id, owner = %owner, "📝 Blog created");
        Ok(blog)
    }

    /// Publish an entry in a blog the viewer owns.
    #[instrument(skip_all, fields(blog = %blog_id))]
    pub async fn create_entry(
        &self,
        viewer: Option<&UserId>,
        blog_id: BlogId,
        input: NewEntry,
    ) -> DomainResult<Entry> {
        let author = viewer.ok_or(DomainError::Unauthenticated)?;

        let title = validate_title(&input.title)?;
        validate_length(&input.body, "body", MAX_BODY_LENGTH)?;

        let blog = self.require_blog(blog_id).await?;
        if !blog.is_owned_by(author) {
            warn!(viewer = %author, "Rejected entry from non-owner");
            return Err(DomainError::Forbidden(format!(
                "only the owner of blog {} may publish in it",
                blog_id
            )));
        }

        let entry = self
            .repositories
            .entries()
            .insert_entry(
                blog_id,
                author,
                NewEntry {
                    title,
                    body: input.body,
                },
            )
            .await?;

        record_entity_created("entry");
        info!(entry = %entry.id, "📝 Entry published");
        Ok(entry)
    }

    /// Delete an entry from a blog the viewer owns.
    #[instrument(skip_all, fields(entry = %entry_id))]
    pub async fn delete_entry(&self, viewer: Option<&UserId>, entry_id: EntryId) -> DomainResult<()> {
        let viewer = viewer.ok_or(DomainError::Unauthenticated)?;

        let entry = self
            .repositories
            .entries()
            .get_entry(entry_id)
            .await?
            .ok_or(DomainError::EntryNotFound(entry_id))?;

        let blog = self.require_blog(entry.blog_id).await?;
        if !blog.is_owned_by(viewer) {
            warn!(viewer = %viewer, "Rejected delete from non-owner");
            return Err(DomainError::Forbidden(format!(
                "only the owner of blog {} may delete its entries",
                blog.id
            )));
        }

        if !self.repositories.entries().delete_entry(entry_id).await? {
            // Lost a race with another delete.
            return Err(DomainError::EntryNotFound(entry_id));
        }

        record_entity_deleted("entry");
        info!("🗑️  Entry deleted");
        Ok(())
    }

    async fn require_blog(&self, id: BlogId) -> DomainResult<Blog> {
        self.repositories
            .blogs()
            .get_blog(id)
            .await?
            .ok_or(DomainError::BlogNotFound(id))
    }
}

fn validate_title(title: &str) -> DomainResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::ValidationError("title cannot be empty".into()));
    }
    validate_length(title, "title", MAX_TITLE_LENGTH)?;
    Ok(title.to_string())
}

fn validate_length(value: &str, field_name: &str, max: usize) -> DomainResult<()> {
    if value.chars().count() > max {
        return Err(DomainError::ValidationError(format!(
            "{} too long: maximum {} characters allowed",
            field_name, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::{PaginationError, StorageResult};
    use crate::models::OrderingKey;
    use crate::ports::{BlogRepository, EntityStore, EntryRepository};

    /// Repositories with no blogs and no entries that count every read.
    #[derive(Default)]
    struct EmptyRepositories {
        blogs: EmptyBlogs,
        entries: EmptyEntries,
    }

    #[derive(Default)]
    struct EmptyBlogs {
        reads: AtomicUsize,
    }

    #[derive(Default)]
    struct EmptyEntries {
        reads: AtomicUsize,
    }

    impl EmptyRepositories {
        fn reads(&self) -> usize {
            self.blogs.reads.load(AtomicOrdering::SeqCst)
                + self.entries.reads.load(AtomicOrdering::SeqCst)
        }
    }

    #[async_trait]
    impl EntityStore for EmptyBlogs {
        type Node = Blog;
        type Scope = AllBlogs;

        async fn fetch_after(&self, _: &AllBlogs, _: Option<&OrderingKey>, _: usize) -> StorageResult<Vec<Blog>> {
            self.reads.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(Vec::new())
        }

        async fn fetch_before(&self, _: &AllBlogs, _: Option<&OrderingKey>, _: usize) -> StorageResult<Vec<Blog>> {
            self.reads.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(Vec::new())
        }

        async fn exists_after(&self, _: &AllBlogs, _: &OrderingKey) -> StorageResult<bool> {
            self.reads.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(false)
        }

        async fn exists_before(&self, _: &AllBlogs, _: &OrderingKey) -> StorageResult<bool> {
            self.reads.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(false)
        }
    }

    #[async_trait]
    impl BlogRepository for EmptyBlogs {
        async fn insert_blog(&self, _: &UserId, _: NewBlog) -> StorageResult<Blog> {
            unreachable!("read-only fixture")
        }

        async fn get_blog(&self, _: BlogId) -> StorageResult<Option<Blog>> {
            self.reads.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(None)
        }
    }

    #[async_trait]
    impl EntityStore for EmptyEntries {
        type Node = Entry;
        type Scope = BlogEntries;

        async fn fetch_after(&self, _: &BlogEntries, _: Option<&OrderingKey>, _: usize) -> StorageResult<Vec<Entry>> {
            self.reads.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(Vec::new())
        }

        async fn fetch_before(&self, _: &BlogEntries, _: Option<&OrderingKey>, _: usize) -> StorageResult<Vec<Entry>> {
            self.reads.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(Vec::new())
        }

        async fn exists_after(&self, _: &BlogEntries, _: &OrderingKey) -> StorageResult<bool> {
            self.reads.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(false)
        }

        async fn exists_before(&self, _: &BlogEntries, _: &OrderingKey) -> StorageResult<bool> {
            self.reads.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(false)
        }
    }

    #[async_trait]
    impl EntryRepository for EmptyEntries {
        async fn insert_entry(&self, _: BlogId, _: &UserId, _: NewEntry) -> StorageResult<Entry> {
            unreachable!("read-only fixture")
        }

        async fn get_entry(&self, _: EntryId) -> StorageResult<Option<Entry>> {
            self.reads.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(None)
        }

        async fn delete_entry(&self, _: EntryId) -> StorageResult<bool> {
            unreachable!("read-only fixture")
        }
    }

    #[async_trait]
    impl Repositories for EmptyRepositories {
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

    fn service() -> (BlogService, Arc<EmptyRepositories>) {
        let repos = Arc::new(EmptyRepositories::default());
        (BlogService::new(repos.clone()), repos)
    }

    // Test critique: des arguments invalides échouent avant toute lecture,
    // même pour un blog inconnu
    #[tokio::test]
    async fn test_list_entries_validates_before_lookup() {
        let (service, repos) = service();

        let err = service
            .list_entries(BlogId(404), &Pagination::first(-1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Pagination(PaginationError::Validation(_))));

        let err = service
            .list_entries(
                BlogId(404),
                &Pagination::first(2).after(crate::ports::Cursor::from("garbage".to_string())),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Pagination(PaginationError::InvalidCursor(_))));

        assert_eq!(repos.reads(), 0);
    }

    #[tokio::test]
    async fn test_list_entries_unknown_blog_is_not_found() {
        let (service, _) = service();

        let err = service
            .list_entries(BlogId(404), &Pagination::first(2))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BlogNotFound(BlogId(404))));
    }

    #[tokio::test]
    async fn test_mutations_require_viewer() {
        let (service, repos) = service();

        let err = service
            .create_blog(None, NewBlog { title: "x".into(), description: None })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated));
        assert_eq!(repos.reads(), 0);
    }

    #[test]
    fn test_title_is_trimmed_and_bounded() {
        assert_eq!(validate_title("  Hello  ").unwrap(), "Hello");
        // Vide = erreur
        assert!(validate_title("   ").is_err());
        // Trop long = erreur
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH)).is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let accents = "é".repeat(MAX_TITLE_LENGTH);
        assert!(validate_length(&accents, "title", MAX_TITLE_LENGTH).is_ok());
    }
}
