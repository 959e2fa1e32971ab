//! GraphQL schema definition.
//!
//! Blogs and entries are exposed as Relay-style connections; both accept
//! `first`/`after` and `last`/`before`. When both `first` and `last` are
//! given, `first` wins.

use std::sync::Arc;

use async_graphql::{
    ComplexObject, Context, EmptySubscription, InputObject, Object, Result, Schema, SimpleObject,
};
use chrono::{DateTime, Utc};

use quill_core::models::{BlogId, EntryId, NewBlog, NewEntry};
use quill_core::ports::{Cursor, Pagination};
use quill_core::services::BlogService;

use crate::error::api_error;
use crate::types::{QuillSchema, Viewer};

// -----------------------------------------------------------------------------
// Schema Configuration
// -----------------------------------------------------------------------------

/// Maximum query depth to prevent deeply nested queries (DoS protection).
/// Note: GraphQL introspection requires depth ~13, so we use 15 to allow it.
pub const MAX_QUERY_DEPTH: usize = 15;

/// Maximum query complexity score (DoS protection).
/// Each field has a default complexity of 1, nested objects multiply.
pub const MAX_QUERY_COMPLEXITY: usize = 500;

// -----------------------------------------------------------------------------
// Schema Builder
// -----------------------------------------------------------------------------

/// Build the GraphQL schema around a blog service.
///
/// Includes query depth and complexity limits for DoS protection.
pub fn build_schema(service: Arc<BlogService>) -> QuillSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .limit_depth(MAX_QUERY_DEPTH)
        .limit_complexity(MAX_QUERY_COMPLEXITY)
        .finish()
}

fn viewer<'a>(ctx: &'a Context<'_>) -> Option<&'a quill_core::models::UserId> {
    ctx.data_opt::<Viewer>().and_then(Viewer::id)
}

fn pagination_args(
    first: Option<i32>,
    after: Option<String>,
    last: Option<i32>,
    before: Option<String>,
) -> Pagination {
    Pagination {
        first,
        after: after.map(Cursor::from),
        last,
        before: before.map(Cursor::from),
    }
}

// -----------------------------------------------------------------------------
// Query Root
// -----------------------------------------------------------------------------

/// Query root for blogs and entries.
#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The authenticated user id, if any.
    async fn viewer<'ctx>(&self, ctx: &Context<'ctx>) -> Option<String> {
        viewer(ctx).map(|v| v.to_string())
    }

    /// List all blogs, oldest first.
    async fn blogs<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<BlogConnection> {
        let service = ctx.data::<Arc<BlogService>>()?;

        let connection = service
            .list_blogs(&pagination_args(first, after, last, before))
            .await
            .map_err(api_error)?;

        Ok(BlogConnection::from(connection))
    }

    /// Get a blog by ID.
    async fn blog<'ctx>(&self, ctx: &Context<'ctx>, id: i64) -> Result<Option<Blog>> {
        let service = ctx.data::<Arc<BlogService>>()?;

        let blog = service.get_blog(BlogId(id)).await.map_err(api_error)?;
        Ok(blog.map(Blog::from))
    }

    /// Get an entry by ID.
    async fn entry<'ctx>(&self, ctx: &Context<'ctx>, id: i64) -> Result<Option<Entry>> {
        let service = ctx.data::<Arc<BlogService>>()?;

        let entry = service.get_entry(EntryId(id)).await.map_err(api_error)?;
        Ok(entry.map(Entry::from))
    }
}

// -----------------------------------------------------------------------------
// Mutation Root
// -----------------------------------------------------------------------------

/// Mutation root. Every mutation requires an authenticated viewer.
#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a blog owned by the viewer.
    async fn create_blog<'ctx>(&self, ctx: &Context<'ctx>, input: CreateBlogInput) -> Result<Blog> {
        let service = ctx.data::<Arc<BlogService>>()?;

        let blog = service
            .create_blog(
                viewer(ctx),
                NewBlog {
                    title: input.title,
                    description: input.description,
                },
            )
            .await
            .map_err(api_error)?;

        Ok(Blog::from(blog))
    }

    /// Publish an entry in a blog owned by the viewer.
    async fn create_entry<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        blog_id: i64,
        input: CreateEntryInput,
    ) -> Result<Entry> {
        let service = ctx.data::<Arc<BlogService>>()?;

        let entry = service
            .create_entry(
                viewer(ctx),
                BlogId(blog_id),
                NewEntry {
                    title: input.title,
                    body: input.body,
                },
            )
            .await
            .map_err(api_error)?;

        Ok(Entry::from(entry))
    }

    /// Delete an entry from a blog owned by the viewer.
    async fn delete_entry<'ctx>(&self, ctx: &Context<'ctx>, id: i64) -> Result<bool> {
        let service = ctx.data::<Arc<BlogService>>()?;

        service
            .delete_entry(viewer(ctx), EntryId(id))
            .await
            .map_err(api_error)?;

        Ok(true)
    }
}

// -----------------------------------------------------------------------------
// GraphQL Types
// -----------------------------------------------------------------------------

/// Input for `createBlog`.
#[derive(InputObject)]
pub struct CreateBlogInput {
    pub title: String,
    pub description: Option<String>,
}

/// Input for `createEntry`.
#[derive(InputObject)]
pub struct CreateEntryInput {
    pub title: String,
    pub body: String,
}

/// A blog.
#[derive(SimpleObject)]
#[graphql(complex)]
pub struct Blog {
    pub id: i64,
    /// User id of the owner.
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[ComplexObject]
impl Blog {
    /// Entries of this blog, oldest first.
    async fn entries<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<EntryConnection> {
        let service = ctx.data::<Arc<BlogService>>()?;

        let connection = service
            .list_entries(BlogId(self.id), &pagination_args(first, after, last, before))
            .await
            .map_err(api_error)?;

        Ok(EntryConnection::from(connection))
    }
}

impl From<quill_core::models::Blog> for Blog {
    fn from(b: quill_core::models::Blog) -> Self {
        Self {
            id: b.id.get(),
            owner: b.owner.to_string(),
            title: b.title,
            description: b.description,
            created_at: b.created_at,
        }
    }
}

/// An entry published in a blog.
#[derive(SimpleObject)]
pub struct Entry {
    pub id: i64,
    pub blog_id: i64,
    /// User id of the author.
    pub author: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<quill_core::models::Entry> for Entry {
    fn from(e: quill_core::models::Entry) -> Self {
        Self {
            id: e.id.get(),
            blog_id: e.blog_id.get(),
            author: e.author.to_string(),
            title: e.title,
            body: e.body,
            created_at: e.created_at,
        }
    }
}

// -----------------------------------------------------------------------------
// Connection Types (Relay-style pagination)
// -----------------------------------------------------------------------------

#[derive(SimpleObject)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// Generate Relay-style connection types (Edge + Connection) with From impl.
macro_rules! define_connection {
    ($node:ty, $core_model:ty, $edge:ident, $connection:ident) => {
        #[derive(SimpleObject)]
        pub struct $edge {
            pub node: $node,
            pub cursor: String,
        }

        #[derive(SimpleObject)]
        pub struct $connection {
            pub edges: Vec<$edge>,
            pub page_info: PageInfo,
        }

        impl From<quill_core::ports::Connection<$core_model>> for $connection {
            fn from(conn: quill_core::ports::Connection<$core_model>) -> Self {
                Self {
                    edges: conn
                        .edges
                        .into_iter()
                        .map(|e| $edge {
                            node: <$node>::from(e.node),
                            cursor: e.cursor.value,
                        })
                        .collect(),
                    page_info: PageInfo {
                        has_next_page: conn.page_info.has_next_page,
                        has_previous_page: conn.page_info.has_previous_page,
                        start_cursor: conn.page_info.start_cursor.map(|c| c.value),
                        end_cursor: conn.page_info.end_cursor.map(|c| c.value),
                    },
                }
            }
        }
    };
}

define_connection!(Blog, quill_core::models::Blog, BlogEdge, BlogConnection);
define_connection!(Entry, quill_core::models::Entry, EntryEdge, EntryConnection);

#[cfg(test)]
mod tests {
    use async_graphql::Request;
    use serde_json::{Value, json};

    use quill_core::models::UserId;
    use quill_storage::MemoryRepositories;

    use super::*;

    fn schema() -> QuillSchema {
        let repos = MemoryRepositories::new_shared();
        build_schema(Arc::new(BlogService::new(repos)))
    }

    fn as_user(query: &str, user: &str) -> Request {
        Request::new(query).data(Viewer::user(UserId::parse(user).unwrap()))
    }

    async fn run(schema: &QuillSchema, request: impl Into<Request>) -> Value {
        let response = schema.execute(request).await;
        serde_json::to_value(&response).unwrap()
    }

    fn error_code(response: &Value) -> &str {
        response["errors"][0]["extensions"]["code"]
            .as_str()
            .unwrap_or_default()
    }

    async fn create_blog(schema: &QuillSchema, owner: &str, title: &str) -> i64 {
        let query = format!(r#"mutation {{ createBlog(input: {{ title: "{}" }}) {{ id }} }}"#, title);
        let res = run(schema, as_user(&query, owner)).await;
        res["data"]["createBlog"]["id"].as_i64().unwrap()
    }

    async fn create_entry(schema: &QuillSchema, owner: &str, blog_id: i64, title: &str) -> Value {
        let query = format!(
            r#"mutation {{ createEntry(blogId: {}, input: {{ title: "{}", body: "..." }}) {{ id title author }} }}"#,
            blog_id, title
        );
        run(schema, as_user(&query, owner)).await
    }

    const ENTRIES_PAGE: &str = r#"
        query($id: Int!, $after: String) {
            blog(id: $id) {
                entries(first: 2, after: $after) {
                    edges { cursor node { title } }
                    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                }
            }
        }
    "#;

    // Scénario complet: 10 entrées, first=2 puis suivre endCursor jusqu'au bout
    #[tokio::test]
    async fn test_entries_connection_traversal() {
        let schema = schema();
        let blog_id = create_blog(&schema, "alice", "Journal").await;
        for i in 0..10 {
            create_entry(&schema, "alice", blog_id, &format!("Entry {}", i)).await;
        }

        let mut after = Value::Null;
        let mut titles = Vec::new();
        let mut pages = 0;
        loop {
            let request = Request::new(ENTRIES_PAGE).variables(async_graphql::Variables::from_json(
                json!({ "id": blog_id, "after": after }),
            ));
            let res = run(&schema, request).await;
            let conn = &res["data"]["blog"]["entries"];
            pages += 1;

            for edge in conn["edges"].as_array().unwrap() {
                titles.push(edge["node"]["title"].as_str().unwrap().to_string());
            }
            if !conn["pageInfo"]["hasNextPage"].as_bool().unwrap() {
                break;
            }
            after = conn["pageInfo"]["endCursor"].clone();
        }

        assert_eq!(pages, 5);
        let expected: Vec<String> = (0..10).map(|i| format!("Entry {}", i)).collect();
        assert_eq!(titles, expected);
    }

    #[tokio::test]
    async fn test_blogs_backward_page() {
        let schema = schema();
        for title in ["A", "B", "C"] {
            create_blog(&schema, "alice", title).await;
        }

        let res = run(
            &schema,
            "{ blogs(last: 2) { edges { node { title } } pageInfo { hasNextPage hasPreviousPage } } }",
        )
        .await;
        let conn = &res["data"]["blogs"];
        assert_eq!(conn["edges"][0]["node"]["title"], "B");
        assert_eq!(conn["edges"][1]["node"]["title"], "C");
        assert_eq!(conn["pageInfo"]["hasPreviousPage"], true);
        assert_eq!(conn["pageInfo"]["hasNextPage"], false);
    }

    // Test critique: un curseur corrompu donne INVALID_CURSOR, pas une erreur interne
    #[tokio::test]
    async fn test_corrupted_cursor_has_invalid_cursor_code() {
        let schema = schema();
        create_blog(&schema, "alice", "A").await;

        let res = run(&schema, r#"{ blogs(first: 1, after: "bogus!!") { edges { cursor } } }"#).await;
        assert_eq!(error_code(&res), "INVALID_CURSOR");
    }

    // Test critique: un curseur de blogs n'est pas accepté pour des entrées
    #[tokio::test]
    async fn test_foreign_cursor_rejected() {
        let schema = schema();
        let blog_id = create_blog(&schema, "alice", "A").await;

        let res = run(&schema, "{ blogs(first: 1) { pageInfo { endCursor } } }").await;
        let blogs_cursor = res["data"]["blogs"]["pageInfo"]["endCursor"].clone();

        let request = Request::new(ENTRIES_PAGE).variables(async_graphql::Variables::from_json(
            json!({ "id": blog_id, "after": blogs_cursor }),
        ));
        let res = run(&schema, request).await;
        assert_eq!(error_code(&res), "INVALID_CURSOR");
    }

    #[tokio::test]
    async fn test_negative_first_is_validation_error() {
        let schema = schema();
        let res = run(&schema, "{ blogs(first: -1) { edges { cursor } } }").await;
        assert_eq!(error_code(&res), "VALIDATION_ERROR");
    }

    // Test critique: seules les personnes authentifiées peuvent créer un blog
    #[tokio::test]
    async fn test_create_blog_requires_viewer() {
        let schema = schema();
        let res = run(&schema, r#"mutation { createBlog(input: { title: "x" }) { id } }"#).await;
        assert_eq!(error_code(&res), "UNAUTHENTICATED");
    }

    // Test critique: seul le propriétaire peut publier dans son blog
    #[tokio::test]
    async fn test_only_owner_can_publish() {
        let schema = schema();
        let blog_id = create_blog(&schema, "alice", "Alice's").await;

        let res = create_entry(&schema, "mallory", blog_id, "Spam").await;
        assert_eq!(error_code(&res), "FORBIDDEN");

        let res = create_entry(&schema, "alice", blog_id, "Hello").await;
        assert_eq!(res["data"]["createEntry"]["author"], "alice");
    }

    #[tokio::test]
    async fn test_delete_entry_ownership() {
        let schema = schema();
        let blog_id = create_blog(&schema, "alice", "Alice's").await;
        let res = create_entry(&schema, "alice", blog_id, "Hello").await;
        let entry_id = res["data"]["createEntry"]["id"].as_i64().unwrap();
        let mutation = format!("mutation {{ deleteEntry(id: {}) }}", entry_id);

        let res = run(&schema, as_user(&mutation, "bob")).await;
        assert_eq!(error_code(&res), "FORBIDDEN");

        let res = run(&schema, as_user(&mutation, "alice")).await;
        assert_eq!(res["data"]["deleteEntry"], true);

        let res = run(&schema, as_user(&mutation, "alice")).await;
        assert_eq!(error_code(&res), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_viewer_field() {
        let schema = schema();
        let res = run(&schema, as_user("{ viewer }", "alice")).await;
        assert_eq!(res["data"]["viewer"], "alice");

        let res = run(&schema, Request::new("{ viewer }").data(Viewer::anonymous())).await;
        assert_eq!(res["data"]["viewer"], Value::Null);
    }
}
