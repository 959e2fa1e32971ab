//! Core domain layer for the Quill blogging API.
//!
//! This crate contains the domain models, port traits (interfaces), and
//! business logic services. It follows hexagonal architecture principles -
//! this is the innermost layer with no dependencies on infrastructure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       quill (binary)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                quill-graphql (API + HTTP)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │              quill-storage (PostgreSQL / memory)            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                  quill-core  ← YOU ARE HERE                 │
//! │               (models, ports, services)                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`] - Domain models (Blog, Entry, OrderingKey, etc.)
//! - [`ports`] - Pagination types and interface traits for adapters
//! - [`services`] - Connection paginator and blog service
//! - [`error`] - Domain error types
//! - [`metrics`] - Prometheus metrics definitions
//!
//! # Key Concepts
//!
//! ## Connections
//!
//! Lists are exposed as Relay-style connections. [`services::paginate`]
//! turns [`ports::Pagination`] arguments into a [`ports::Connection`] by
//! querying an [`ports::EntityStore`]. Cursors are opaque, scoped to one
//! collection and carry everything needed to resume, so no state is kept
//! between pages.
//!
//! ## Ports
//!
//! - [`ports::EntityStore`] - Keyset window fetches and boundary probes
//! - [`ports::BlogRepository`] / [`ports::EntryRepository`] - CRUD on top
//! - [`ports::Repositories`] - Composite access used by the service

pub mod error;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
