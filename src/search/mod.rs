//! Search Service Module
//!
//! Exposes full-text queries over the indexed collections. Tokenization,
//! scoring, and highlighting all happen inside the external backend; this
//! module validates the request, forwards it, and shapes the results.
//!
//! ## Submodules
//! - **`handlers`**: HTTP request handler for the Axum web server.
//! - **`types`**: Query parameters and response DTOs.

pub mod handlers;
pub mod types;
