//! Index Catalog Module
//!
//! Thin handlers for browsing and deleting indices. All state lives in the
//! search backend; these endpoints only shape its answers into JSON.

pub mod handlers;
pub mod types;
