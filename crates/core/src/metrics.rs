//! Metrics definitions for the API.
//!
//! This module defines all metrics used throughout Quill.
//! Metrics are collected using the `metrics` crate and can be exported
//! to Prometheus via `metrics-exporter-prometheus`.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "pagination_requests_total",
        "Total number of connection pages served"
    );
    describe_counter!(
        "pagination_errors_total",
        "Total number of rejected or failed pagination requests"
    );
    describe_histogram!(
        "pagination_duration_seconds",
        "Time taken to build a connection page in seconds"
    );
    describe_counter!(
        "entities_created_total",
        "Total number of blogs and entries created"
    );
    describe_counter!(
        "entities_deleted_total",
        "Total number of blogs and entries deleted"
    );
}

/// Record a served page.
///
/// # Arguments
/// * `collection` - The collection name ("blogs" or "entries")
/// * `direction` - "forward" or "backward"
pub fn record_page_served(collection: &'static str, direction: &'static str) {
    counter!("pagination_requests_total", "collection" => collection, "direction" => direction)
        .increment(1);
}

/// Record a pagination failure.
///
/// # Arguments
/// * `collection` - The collection name
/// * `kind` - "validation", "invalid_cursor" or "store"
pub fn record_pagination_error(collection: &'static str, kind: &'static str) {
    counter!("pagination_errors_total", "collection" => collection, "kind" => kind).increment(1);
}

pub fn record_entity_created(kind: &'static str) {
    counter!("entities_created_total", "kind" => kind).increment(1);
}

pub fn record_entity_deleted(kind: &'static str) {
    counter!("entities_deleted_total", "kind" => kind).increment(1);
}

/// A timer that records pagination duration when dropped.
pub struct PaginationTimer {
    start: Instant,
    collection: &'static str,
}

impl PaginationTimer {
    /// Start a new timer for `collection`.
    pub fn new(collection: &'static str) -> Self {
        Self {
            start: Instant::now(),
            collection,
        }
    }
}

impl Drop for PaginationTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        histogram!("pagination_duration_seconds", "collection" => self.collection).record(duration);
    }
}
