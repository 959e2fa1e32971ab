//! PostgreSQL storage adapter.
//!
//! This module implements the repository traits defined in `quill-core`
//! using PostgreSQL as the backing store.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool and migrations
//! - [`PgRepositories`] - Composite repository implementing `Repositories` trait
//! - Individual repos: `PgBlogRepository`, `PgEntryRepository`
//!
//! Pages are read with keyset predicates on `(created_at, id)`, backed by
//! the matching indexes created in the migrations.
//!
//! # Usage
//!
//! ```ignore
//! let config = DatabaseConfig::for_api(&database_url);
//! let db = Database::connect(&config).await?;
//! db.migrate().await?;
//!
//! let repositories = PgRepositories::new(Arc::new(db));
//! ```

mod blog_repo;
mod database;
mod entry_repo;
mod helpers;

pub use blog_repo::PgBlogRepository;
pub use database::{DEFAULT_MAX_CONNECTIONS, Database, DatabaseConfig};
pub use entry_repo::PgEntryRepository;

use std::sync::Arc;

use async_trait::async_trait;

use quill_core::ports::{BlogRepository, EntryRepository, Repositories};

// =============================================================================
// Composite Repository
// =============================================================================

/// Aggregated PostgreSQL repositories implementing the `Repositories` trait.
///
/// This provides a single entry point for all storage operations.
pub struct PgRepositories {
    db: Arc<Database>,
    blogs: PgBlogRepository,
    entries: PgEntryRepository,
}

impl PgRepositories {
    /// Create a new repository aggregate from a database connection.
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            blogs: PgBlogRepository::new(&db),
            entries: PgEntryRepository::new(db.pool().clone()),
            db,
        }
    }
}

#[async_trait]
impl Repositories for PgRepositories {
    fn blogs(&self) -> &dyn BlogRepository {
        &self.blogs
    }

    fn entries(&self) -> &dyn EntryRepository {
        &self.entries
    }

    async fn is_healthy(&self) -> bool {
        self.db.is_healthy().await
    }
}
