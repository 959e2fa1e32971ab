//! Domain models for blogs and entries.
//!
//! These models are storage-agnostic and represent the canonical
//! form of blogging data within the domain layer.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

/// Macro to generate i64-backed identifier newtypes.
///
/// Generates:
/// - `Display` trait implementation
/// - `From<i64>` implementation
/// - `get()` accessor
macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl $name {
            /// Get the raw identifier value.
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

id_newtype!(
    /// Blog identifier.
    BlogId
);

id_newtype!(
    /// Entry identifier.
    EntryId
);

/// Maximum length for a user identifier.
pub const MAX_USER_ID_LENGTH: usize = 128;

/// Identifier of an authenticated user.
///
/// Issued by the upstream authentication layer and treated as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Parse a user identifier, rejecting blank or oversized values.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.len() > MAX_USER_ID_LENGTH {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// Position of an entity within its collection.
///
/// Ordered by creation time, ties broken by identifier. Timestamps are kept
/// at microsecond precision so they survive a database round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderingKey {
    pub created_at: DateTime<Utc>,
    pub id: i64,
}

impl OrderingKey {
    pub fn new(created_at: DateTime<Utc>, id: i64) -> Self {
        Self {
            created_at: truncate_to_micros(created_at),
            id,
        }
    }

    /// Creation time as microseconds since the Unix epoch.
    pub fn micros(&self) -> i64 {
        self.created_at.timestamp_micros()
    }

    /// Rebuild a key from its microsecond timestamp and identifier.
    pub fn from_micros(micros: i64, id: i64) -> Option<Self> {
        DateTime::from_timestamp_micros(micros).map(|created_at| Self { created_at, id })
    }
}

impl Ord for OrderingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for OrderingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An entity that lives in an ordered, pageable collection.
pub trait Ordered {
    fn ordering_key(&self) -> OrderingKey;
}

/// Drop sub-microsecond precision from a timestamp.
pub fn truncate_to_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(ts.timestamp_micros()).unwrap_or(ts)
}

// =============================================================================
// Blogs
// =============================================================================

/// A blog owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub id: BlogId,
    /// User who created the blog and may publish entries in it.
    pub owner: UserId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Blog {
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }
}

impl Ordered for Blog {
    fn ordering_key(&self) -> OrderingKey {
        OrderingKey::new(self.created_at, self.id.0)
    }
}

/// Input for creating a blog.
#[derive(Debug, Clone, Default)]
pub struct NewBlog {
    pub title: String,
    pub description: Option<String>,
}

// =============================================================================
// Entries
// =============================================================================

/// A post published in a blog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub blog_id: BlogId,
    pub author: UserId,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Ordered for Entry {
    fn ordering_key(&self) -> OrderingKey {
        OrderingKey::new(self.created_at, self.id.0)
    }
}

/// Input for publishing an entry.
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub title: String,
    pub body: String,
}
