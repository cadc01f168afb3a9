//! CSV Search Service Library
//!
//! This library crate defines the modules behind the HTTP service that
//! uploads CSV files into a search engine and queries them back out.
//!
//! ## Architecture Modules
//! The service is composed of four loosely coupled subsystems:
//!
//! - **`backend`**: The boundary toward the external search engine. Defines
//!   the `SearchBackend` trait and its Elasticsearch implementation; all
//!   tokenization, scoring, highlighting, and persistence happen there.
//! - **`ingestion`**: The upload pipeline. Validates a CSV file, infers a
//!   field schema, provisions the destination index idempotently, and bulk
//!   writes documents with per-row accounting.
//! - **`catalog`**: Browsing and deletion of existing indices.
//! - **`search`**: Full-text queries with fuzzy matching, highlighting,
//!   and pagination.

pub mod backend;
pub mod catalog;
pub mod config;
pub mod ingestion;
pub mod search;
