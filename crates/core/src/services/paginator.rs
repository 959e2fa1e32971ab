//! Connection paginator - builds Relay-style pages over an [`EntityStore`].
//!
//! Pagination is stateless: everything needed to resume lives in the
//! cursor. A call issues one window fetch (one entity past the requested
//! size, which answers the "more in this direction" question) and at most
//! one existence probe for the opposite direction.
//!
//! Walking a collection with `after = end_cursor` until `has_next_page`
//! is false visits every entity exactly once, provided nothing is inserted
//! or deleted between pages. Mutation during traversal gives no ordering
//! guarantee.

use tracing::{debug, instrument};

use crate::error::{PaginationError, PaginationResult};
use crate::metrics::{PaginationTimer, record_page_served, record_pagination_error};
use crate::models::Ordered;
use crate::ports::{Connection, Cursor, CursorScope, Edge, EntityStore, PageInfo, PageRequest, Pagination};

/// Build one page of `scope` from `store` according to `args`.
///
/// Arguments and cursors are validated before the store is touched.
/// Store failures are returned as [`PaginationError::Store`] without retry.
#[instrument(skip_all, fields(collection = scope.collection()))]
pub async fn paginate<S>(
    store: &S,
    scope: &S::Scope,
    args: &Pagination,
) -> PaginationResult<Connection<S::Node>>
where
    S: EntityStore + ?Sized,
{
    let collection = scope.collection();
    let _timer = PaginationTimer::new(collection);

    let result = match args.resolve(scope) {
        Ok(request) => fetch_page(store, scope, request).await,
        Err(e) => Err(e),
    };

    match &result {
        Ok(conn) => debug!(
            edges = conn.edges.len(),
            has_next = conn.page_info.has_next_page,
            has_previous = conn.page_info.has_previous_page,
            "Page built"
        ),
        Err(e) => {
            debug!(error = %e, "Pagination failed");
            record_pagination_error(collection, error_kind(e));
        }
    }

    result
}

async fn fetch_page<S>(
    store: &S,
    scope: &S::Scope,
    request: PageRequest,
) -> PaginationResult<Connection<S::Node>>
where
    S: EntityStore + ?Sized,
{
    let connection = match request {
        PageRequest::Forward { limit, after } => {
            let mut nodes = store.fetch_after(scope, after.as_ref(), limit + 1).await?;
            let has_next_page = nodes.len() > limit;
            nodes.truncate(limit);

            // Without `after` the window starts at the head of the collection.
            let probe = match (nodes.first(), after) {
                (_, None) => None,
                (Some(first), Some(_)) => Some(first.ordering_key()),
                (None, Some(key)) => Some(key),
            };
            let has_previous_page = match probe {
                Some(key) => store.exists_before(scope, &key).await?,
                None => false,
            };

            build_connection(scope, nodes, has_previous_page, has_next_page)
        }
        PageRequest::Backward { limit, before } => {
            let mut nodes = store.fetch_before(scope, before.as_ref(), limit + 1).await?;
            let has_previous_page = nodes.len() > limit;
            nodes.truncate(limit);
            nodes.sort_by_key(|n| n.ordering_key());

            // Without `before` the window ends at the tail of the collection.
            let probe = match (nodes.last(), before) {
                (_, None) => None,
                (Some(last), Some(_)) => Some(last.ordering_key()),
                (None, Some(key)) => Some(key),
            };
            let has_next_page = match probe {
                Some(key) => store.exists_after(scope, &key).await?,
                None => false,
            };

            build_connection(scope, nodes, has_previous_page, has_next_page)
        }
    };

    record_page_served(scope.collection(), request.direction());
    Ok(connection)
}

fn build_connection<T, S>(
    scope: &S,
    nodes: Vec<T>,
    has_previous_page: bool,
    has_next_page: bool,
) -> Connection<T>
where
    T: Ordered,
    S: CursorScope + ?Sized,
{
    let edges: Vec<Edge<T>> = nodes
        .into_iter()
        .map(|node| {
            let cursor = Cursor::encode(scope, &node.ordering_key());
            Edge { node, cursor }
        })
        .collect();

    let page_info = PageInfo {
        has_next_page,
        has_previous_page,
        start_cursor: edges.first().map(|e| e.cursor.clone()),
        end_cursor: edges.last().map(|e| e.cursor.clone()),
    };

    Connection { edges, page_info }
}

fn error_kind(err: &PaginationError) -> &'static str {
    match err {
        PaginationError::Validation(_) => "validation",
        PaginationError::InvalidCursor(_) => "invalid_cursor",
        PaginationError::Store(_) => "store",
    }
}
