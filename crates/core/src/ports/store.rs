//! Port trait for ordered entity collections.
//!
//! The connection paginator only ever talks to an [`EntityStore`]: a window
//! fetch in either direction plus one-past-the-window existence probes.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::models::{OrderingKey, Ordered};

use super::pagination::CursorScope;

/// Keyset access to an ordered collection of entities.
///
/// All bounds are strict: an entity whose key equals the bound is never
/// part of the result.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Entity type stored in the collection.
    type Node: Ordered + Send + Sync;
    /// Collection selector, also used to scope cursors.
    type Scope: CursorScope;

    /// Up to `limit` entities after `after` (or from the start), ascending.
    async fn fetch_after(
        &self,
        scope: &Self::Scope,
        after: Option<&OrderingKey>,
        limit: usize,
    ) -> StorageResult<Vec<Self::Node>>;

    /// Up to `limit` entities before `before` (or from the end), descending.
    async fn fetch_before(
        &self,
        scope: &Self::Scope,
        before: Option<&OrderingKey>,
        limit: usize,
    ) -> StorageResult<Vec<Self::Node>>;

    /// Whether any entity sorts after `key`.
    async fn exists_after(&self, scope: &Self::Scope, key: &OrderingKey) -> StorageResult<bool>;

    /// Whether any entity sorts before `key`.
    async fn exists_before(&self, scope: &Self::Scope, key: &OrderingKey) -> StorageResult<bool>;
}
