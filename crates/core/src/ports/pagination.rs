//! Pagination types for list queries.
//!
//! These types implement Relay-style cursor pagination, commonly used
//! with GraphQL but also applicable to other APIs.
//!
//! # Cursor format
//!
//! A cursor is URL-safe base64 (no padding) over a small JSON payload:
//!
//! ```text
//! {"v":1,"s":"blog:7:entries","t":1718000000000000,"i":42,"c":"9f1c0a..."}
//! ```
//!
//! - `v` - format version
//! - `s` - scope tag of the collection the cursor was issued for
//! - `t`/`i` - ordering key (creation micros, identifier)
//! - `c` - truncated SHA-256 over the other fields
//!
//! Cursors from another collection fail with [`CursorError::ScopeMismatch`],
//! edited payloads fail with [`CursorError::ChecksumMismatch`].

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::{CursorError, PaginationError, PaginationResult};
use crate::models::{BlogId, OrderingKey};

/// Default page size when neither `first` nor `last` is given.
pub const DEFAULT_PAGE_SIZE: i32 = 20;
/// Maximum page size; larger requests are clamped.
pub const MAX_PAGE_SIZE: i32 = 100;
/// Longest cursor token accepted for decoding.
pub const MAX_CURSOR_LENGTH: usize = 512;

const CURSOR_VERSION: u8 = 1;
const CHECKSUM_BYTES: usize = 8;

// =============================================================================
// Scopes
// =============================================================================

/// Identifies the collection a cursor belongs to.
pub trait CursorScope: Send + Sync {
    /// Stable tag embedded in every cursor issued for this collection.
    fn scope_tag(&self) -> String;

    /// Low-cardinality collection name, used as a metrics label.
    fn collection(&self) -> &'static str;
}

/// The set of all blogs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllBlogs;

impl CursorScope for AllBlogs {
    fn scope_tag(&self) -> String {
        "blogs".to_string()
    }

    fn collection(&self) -> &'static str {
        "blogs"
    }
}

/// The entries of a single blog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlogEntries(pub BlogId);

impl CursorScope for BlogEntries {
    fn scope_tag(&self) -> String {
        format!("blog:{}:entries", self.0)
    }

    fn collection(&self) -> &'static str {
        "entries"
    }
}

// =============================================================================
// Cursor
// =============================================================================

/// Opaque cursor for pagination.
///
/// The cursor value is implementation-specific and should be treated
/// as an opaque token by clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub value: String,
}

#[derive(Deserialize)]
struct CursorPayload {
    v: u8,
    s: String,
    t: i64,
    i: i64,
    c: String,
}

fn checksum(scope: &str, micros: i64, id: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("quill-cursor:v{CURSOR_VERSION}|{scope}|{micros}|{id}").as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..CHECKSUM_BYTES])
}

impl Cursor {
    /// Encode the cursor of an entity at `key` within `scope`.
    pub fn encode<S: CursorScope + ?Sized>(scope: &S, key: &OrderingKey) -> Self {
        let scope = scope.scope_tag();
        let payload = serde_json::json!({
            "v": CURSOR_VERSION,
            "s": scope,
            "t": key.micros(),
            "i": key.id,
            "c": checksum(&scope, key.micros(), key.id),
        });
        Self {
            value: URL_SAFE_NO_PAD.encode(payload.to_string()),
        }
    }

    /// Decode the ordering key, checking that the cursor was issued for `scope`.
    pub fn decode<S: CursorScope + ?Sized>(&self, scope: &S) -> Result<OrderingKey, CursorError> {
        let token = self.value.as_str();
        if token.len() > MAX_CURSOR_LENGTH {
            return Err(CursorError::TooLong {
                len: token.len(),
                max: MAX_CURSOR_LENGTH,
            });
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| CursorError::Encoding)?;
        let payload: CursorPayload =
            serde_json::from_slice(&bytes).map_err(|_| CursorError::Malformed)?;

        if payload.v != CURSOR_VERSION {
            return Err(CursorError::UnsupportedVersion(payload.v));
        }
        if payload.c != checksum(&payload.s, payload.t, payload.i) {
            return Err(CursorError::ChecksumMismatch);
        }

        let expected = scope.scope_tag();
        if payload.s != expected {
            return Err(CursorError::ScopeMismatch {
                expected,
                found: payload.s,
            });
        }

        OrderingKey::from_micros(payload.t, payload.i).ok_or(CursorError::Malformed)
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self { value }
    }
}

// =============================================================================
// Arguments
// =============================================================================

/// Pagination parameters for list queries.
///
/// Supports forward pagination (`first`/`after`) and backward
/// pagination (`last`/`before`). When both `first` and `last` are
/// given, `first` wins and the request pages forward.
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    /// Number of items to fetch (forward pagination).
    pub first: Option<i32>,
    /// Cursor to start after (forward pagination).
    pub after: Option<Cursor>,
    /// Number of items to fetch (backward pagination).
    pub last: Option<i32>,
    /// Cursor to end before (backward pagination).
    pub before: Option<Cursor>,
}

/// A validated, decoded pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Forward {
        limit: usize,
        after: Option<OrderingKey>,
    },
    Backward {
        limit: usize,
        before: Option<OrderingKey>,
    },
}

impl PageRequest {
    /// Direction label for logs and metrics.
    pub fn direction(&self) -> &'static str {
        match self {
            Self::Forward { .. } => "forward",
            Self::Backward { .. } => "backward",
        }
    }
}

impl Pagination {
    /// Forward page of `first` items from the start of the collection.
    pub fn first(first: i32) -> Self {
        Self {
            first: Some(first),
            ..Default::default()
        }
    }

    /// Backward page of the `last` items of the collection.
    pub fn last(last: i32) -> Self {
        Self {
            last: Some(last),
            ..Default::default()
        }
    }

    pub fn after(mut self, cursor: Cursor) -> Self {
        self.after = Some(cursor);
        self
    }

    pub fn before(mut self, cursor: Cursor) -> Self {
        self.before = Some(cursor);
        self
    }

    /// Validate the arguments and decode their cursors for `scope`.
    ///
    /// Every supplied cursor is decoded, including one the chosen
    /// direction ignores, so a garbage token never passes silently.
    pub fn resolve<S: CursorScope + ?Sized>(&self, scope: &S) -> PaginationResult<PageRequest> {
        let first = validate_size(self.first, "first")?;
        let last = validate_size(self.last, "last")?;
        let after = decode_optional(self.after.as_ref(), "after", scope)?;
        let before = decode_optional(self.before.as_ref(), "before", scope)?;

        Ok(match (first, last) {
            (Some(limit), _) => PageRequest::Forward { limit, after },
            (None, Some(limit)) => PageRequest::Backward { limit, before },
            (None, None) => PageRequest::Forward {
                limit: DEFAULT_PAGE_SIZE as usize,
                after,
            },
        })
    }
}

fn validate_size(size: Option<i32>, field_name: &str) -> PaginationResult<Option<usize>> {
    match size {
        Some(n) if n < 0 => Err(PaginationError::Validation(format!(
            "{} must not be negative, got {}",
            field_name, n
        ))),
        Some(n) => Ok(Some(n.min(MAX_PAGE_SIZE) as usize)),
        None => Ok(None),
    }
}

fn decode_optional<S: CursorScope + ?Sized>(
    cursor: Option<&Cursor>,
    field_name: &str,
    scope: &S,
) -> PaginationResult<Option<OrderingKey>> {
    match cursor {
        Some(c) if c.value.is_empty() => Err(PaginationError::Validation(format!(
            "{} cannot be empty",
            field_name
        ))),
        Some(c) => Ok(Some(c.decode(scope)?)),
        None => Ok(None),
    }
}

// =============================================================================
// Results
// =============================================================================

/// Paginated result set with edges and page info.
///
/// This is the Relay connection pattern for cursor-based pagination.
/// Edges are always in ascending key order, whatever the direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection<T> {
    /// List of edges (node + cursor pairs).
    pub edges: Vec<Edge<T>>,
    /// Information about the current page.
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    /// Nodes of the page, in edge order.
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|e| &e.node)
    }
}

/// A single item in a paginated result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge<T> {
    /// The actual item.
    pub node: T,
    /// Cursor for this item (used for pagination).
    pub cursor: Cursor,
}

/// Information about the current page in a paginated result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Whether there are items before this page.
    pub has_previous_page: bool,
    /// Cursor of the first item in this page.
    pub start_cursor: Option<Cursor>,
    /// Cursor of the last item in this page.
    pub end_cursor: Option<Cursor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(micros: i64, id: i64) -> OrderingKey {
        OrderingKey::from_micros(micros, id).unwrap()
    }

    fn tamper(cursor: &Cursor, edit: impl FnOnce(&mut serde_json::Value)) -> Cursor {
        let bytes = URL_SAFE_NO_PAD.decode(&cursor.value).unwrap();
        let mut json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        edit(&mut json);
        Cursor {
            value: URL_SAFE_NO_PAD.encode(serde_json::to_vec(&json).unwrap()),
        }
    }

    #[test]
    fn cursor_encoding_is_stable() {
        let k = key(1_700_000_000_000_000, 7);
        assert_eq!(Cursor::encode(&AllBlogs, &k), Cursor::encode(&AllBlogs, &k));
        assert_eq!(Cursor::encode(&AllBlogs, &k).decode(&AllBlogs), Ok(k));
    }

    #[test]
    fn cursor_payload_has_every_field() {
        let cursor = Cursor::encode(&AllBlogs, &key(1_000, 9));
        assert!(!cursor.value.is_empty());

        let bytes = URL_SAFE_NO_PAD.decode(&cursor.value).unwrap();
        let payload: CursorPayload = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(payload.v, CURSOR_VERSION);
        assert_eq!(payload.s, "blogs");
        assert_eq!((payload.t, payload.i), (1_000, 9));
        assert_eq!(payload.c, checksum("blogs", 1_000, 9));
        assert_eq!(payload.c.len(), CHECKSUM_BYTES * 2);
    }

    // Test critique: un curseur d'une autre collection est rejeté
    #[test]
    fn cursor_from_other_collection_is_rejected() {
        let k = key(1_000, 1);
        let cursor = Cursor::encode(&BlogEntries(BlogId(1)), &k);

        let err = cursor.decode(&BlogEntries(BlogId(2))).unwrap_err();
        assert!(matches!(err, CursorError::ScopeMismatch { .. }));
        assert!(cursor.decode(&AllBlogs).is_err());
    }

    // Test critique: un payload modifié ne doit jamais pointer ailleurs
    #[test]
    fn tampered_cursor_is_rejected() {
        let cursor = Cursor::encode(&AllBlogs, &key(1_000, 1));

        let moved = tamper(&cursor, |j| j["i"] = serde_json::json!(2));
        assert_eq!(moved.decode(&AllBlogs), Err(CursorError::ChecksumMismatch));

        let rescoped = tamper(&cursor, |j| j["s"] = serde_json::json!("blog:1:entries"));
        assert_eq!(
            rescoped.decode(&BlogEntries(BlogId(1))),
            Err(CursorError::ChecksumMismatch)
        );
    }

    #[test]
    fn corrupted_cursor_is_rejected() {
        let garbage = Cursor::from("not a cursor!".to_string());
        assert_eq!(garbage.decode(&AllBlogs), Err(CursorError::Encoding));

        let not_json = Cursor::from(URL_SAFE_NO_PAD.encode(b"hello"));
        assert_eq!(not_json.decode(&AllBlogs), Err(CursorError::Malformed));

        let huge = Cursor::from("A".repeat(MAX_CURSOR_LENGTH + 1));
        assert!(matches!(
            huge.decode(&AllBlogs),
            Err(CursorError::TooLong { .. })
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let cursor = Cursor::encode(&AllBlogs, &key(1_000, 1));
        let v2 = tamper(&cursor, |j| j["v"] = serde_json::json!(2));
        assert_eq!(v2.decode(&AllBlogs), Err(CursorError::UnsupportedVersion(2)));
    }

    #[test]
    fn resolve_defaults_to_forward_page() {
        let req = Pagination::default().resolve(&AllBlogs).unwrap();
        assert_eq!(
            req,
            PageRequest::Forward {
                limit: DEFAULT_PAGE_SIZE as usize,
                after: None
            }
        );
    }

    // Test critique: first l'emporte sur last quand les deux sont fournis
    #[test]
    fn resolve_first_takes_precedence_over_last() {
        let args = Pagination {
            first: Some(3),
            last: Some(5),
            ..Default::default()
        };
        let req = args.resolve(&AllBlogs).unwrap();
        assert_eq!(req, PageRequest::Forward { limit: 3, after: None });
        assert_eq!(req.direction(), "forward");
    }

    #[test]
    fn resolve_backward_uses_before() {
        let k = key(5_000, 3);
        let args = Pagination::last(2).before(Cursor::encode(&AllBlogs, &k));
        assert_eq!(
            args.resolve(&AllBlogs).unwrap(),
            PageRequest::Backward {
                limit: 2,
                before: Some(k)
            }
        );
    }

    #[test]
    fn resolve_rejects_malformed_arguments() {
        // Valeurs négatives = erreur de validation
        let err = Pagination::first(-1).resolve(&AllBlogs).unwrap_err();
        assert!(matches!(err, PaginationError::Validation(_)));

        let err = Pagination::last(-5).resolve(&AllBlogs).unwrap_err();
        assert!(matches!(err, PaginationError::Validation(_)));

        // Curseur vide = erreur de validation, pas InvalidCursor
        let err = Pagination::first(2)
            .after(Cursor::from(String::new()))
            .resolve(&AllBlogs)
            .unwrap_err();
        assert!(matches!(err, PaginationError::Validation(_)));
    }

    #[test]
    fn resolve_checks_ignored_cursor_too() {
        let err = Pagination::first(2)
            .before(Cursor::from("garbage".to_string()))
            .resolve(&AllBlogs)
            .unwrap_err();
        assert!(matches!(err, PaginationError::InvalidCursor(_)));
    }

    #[test]
    fn resolve_clamps_oversized_pages() {
        let req = Pagination::first(10_000).resolve(&AllBlogs).unwrap();
        assert_eq!(
            req,
            PageRequest::Forward {
                limit: MAX_PAGE_SIZE as usize,
                after: None
            }
        );
    }
}
