//! Ingestion Service Module
//!
//! Handles the intake of uploaded CSV files and their transformation into
//! documents stored in the search backend.
//!
//! ## Workflow
//! 1. **Validation**: media type, size limit, header shape, index name.
//! 2. **Parsing**: lenient comma-splitting; mismatched rows are dropped.
//! 3. **Provisioning**: the destination index is created idempotently with
//!    a schema inferred from the CSV header.
//! 4. **Bulk write**: one synchronously-refreshed bulk request, with
//!    per-row acceptance accounting.

pub mod csv;
pub mod handlers;
pub mod pipeline;
pub mod types;

#[cfg(test)]
mod tests;
