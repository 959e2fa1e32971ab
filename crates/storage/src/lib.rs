//! Storage layer for the Quill blogging API.
//!
//! This crate provides implementations of the repository traits defined in
//! `quill-core`: a PostgreSQL adapter for production and an in-memory
//! adapter for tests and local development.
//!
//! # Architecture
//!
//! The storage layer follows the repository pattern:
//!
//! - [`postgres::Database`] - Connection pool management
//! - [`postgres::PgRepositories`] - Composite repository for blogs and entries
//! - [`memory::MemoryRepositories`] - Same contract, held in memory
//!
//! # Usage
//!
//! ```ignore
//! use quill_storage::{Database, DatabaseConfig, PgRepositories};
//!
//! // Connect to the database
//! let config = DatabaseConfig::for_api(&database_url);
//! let db = Database::connect(&config).await?;
//!
//! // Run migrations
//! db.migrate().await?;
//!
//! // Create repositories
//! let repositories = Arc::new(PgRepositories::new(Arc::new(db)));
//! ```

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepositories;
pub use postgres::{DEFAULT_MAX_CONNECTIONS, Database, DatabaseConfig, PgRepositories};
