//! GraphQL API for the Quill blogging service.
//!
//! Exposes blogs and their entries as Relay-style connections, plus the
//! mutations that create blogs and publish or delete entries.
//!
//! # Usage
//!
//! ```ignore
//! use quill_graphql::{AppState, ServerConfig, serve_with_shutdown};
//!
//! let state = AppState::new(Arc::new(BlogService::new(repositories)));
//! serve_with_shutdown(state, ServerConfig::default(), shutdown).await?;
//! ```

mod error;
mod schema;
mod server;
mod types;

pub use error::{ApiError, api_error, error_code};
pub use schema::{
    Blog, BlogConnection, Entry, EntryConnection, MAX_QUERY_COMPLEXITY, MAX_QUERY_DEPTH,
    MutationRoot, PageInfo, QueryRoot, build_schema,
};
pub use server::{AppState, ServerConfig, router, serve_with_shutdown};
pub use types::{QuillSchema, USER_ID_HEADER, Viewer};
