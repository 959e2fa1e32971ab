//! GraphQL type definitions.

use async_graphql::{EmptySubscription, Schema};

use quill_core::models::UserId;

use crate::schema::{MutationRoot, QueryRoot};

/// The Quill GraphQL schema type.
pub type QuillSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Header carrying the authenticated user id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user of the current request, if any.
///
/// Attached to every request as request-scoped data.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<UserId>);

impl Viewer {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn user(id: UserId) -> Self {
        Self(Some(id))
    }

    /// Build the viewer from a raw header value. Blank or oversized ids
    /// are treated as anonymous.
    pub fn from_header(value: Option<&str>) -> Self {
        Self(value.and_then(UserId::parse))
    }

    pub fn id(&self) -> Option<&UserId> {
        self.0.as_ref()
    }
}
