//! Ingestion Module Tests
//!
//! Validates the upload pipeline end to end against a mock backend.
//!
//! ## Test Scopes
//! - **Parser**: Field splitting, header validation, lenient row dropping.
//! - **Validation**: The fail-fast error taxonomy and its ordering.
//! - **Pipeline**: Provisioning idempotence, deterministic document ids,
//!   partial-failure accounting, and side-effect-free short circuits.

#[cfg(test)]
mod tests {
    use crate::backend::types::{
        BulkItemError, BulkSummary, CollectionInfo, CollectionSchema, SearchRequest, SearchResults,
    };
    use crate::backend::{BackendError, SearchBackend};
    use crate::config::Config;
    use crate::ingestion::csv::{non_blank_lines, parse_header, parse_rows, split_fields};
    use crate::ingestion::pipeline::{infer_schema, validate_collection_name, IngestionPipeline};
    use crate::ingestion::types::{IngestDocument, IngestError, TabularInput};
    use async_trait::async_trait;
    use axum::body::Bytes;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    // ============================================================
    // MOCK BACKEND
    // ============================================================

    /// In-memory stand-in for the search engine. Records every call so
    /// tests can assert on side effects (or their absence).
    struct MockBackend {
        alive: bool,
        existing: Mutex<HashSet<String>>,
        created: Mutex<Vec<String>>,
        bulk_calls: Mutex<Vec<(String, Vec<IngestDocument>)>>,
        reject_ids: HashSet<String>,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                alive: true,
                existing: Mutex::new(HashSet::new()),
                created: Mutex::new(Vec::new()),
                bulk_calls: Mutex::new(Vec::new()),
                reject_ids: HashSet::new(),
            }
        }

        fn dead() -> Self {
            Self {
                alive: false,
                ..Self::new()
            }
        }

        fn with_existing(name: &str) -> Self {
            let mock = Self::new();
            mock.existing.lock().unwrap().insert(name.to_string());
            mock
        }

        fn rejecting(ids: &[&str]) -> Self {
            Self {
                reject_ids: ids.iter().map(|id| id.to_string()).collect(),
                ..Self::new()
            }
        }

        fn created_count(&self) -> usize {
            self.created.lock().unwrap().len()
        }

        fn bulk_documents(&self, call: usize) -> Vec<IngestDocument> {
            self.bulk_calls.lock().unwrap()[call].1.clone()
        }
    }

    #[async_trait]
    impl SearchBackend for MockBackend {
        async fn ping(&self) -> Result<(), BackendError> {
            if self.alive {
                Ok(())
            } else {
                Err(BackendError::Unreachable("mock backend is down".to_string()))
            }
        }

        async fn collection_exists(&self, name: &str) -> Result<bool, BackendError> {
            Ok(self.existing.lock().unwrap().contains(name))
        }

        async fn create_collection(
            &self,
            name: &str,
            _schema: &CollectionSchema,
        ) -> Result<(), BackendError> {
            self.created.lock().unwrap().push(name.to_string());
            self.existing.lock().unwrap().insert(name.to_string());
            Ok(())
        }

        async fn bulk_write(
            &self,
            name: &str,
            documents: &[IngestDocument],
        ) -> Result<BulkSummary, BackendError> {
            self.bulk_calls
                .lock()
                .unwrap()
                .push((name.to_string(), documents.to_vec()));

            let item_errors: Vec<BulkItemError> = documents
                .iter()
                .filter(|doc| self.reject_ids.contains(&doc.id))
                .map(|doc| BulkItemError {
                    id: doc.id.clone(),
                    status: 400,
                    reason: "mapper_parsing_exception".to_string(),
                })
                .collect();

            Ok(BulkSummary {
                accepted: documents.len() - item_errors.len(),
                rejected: item_errors.len(),
                item_errors,
            })
        }

        async fn delete_collection(&self, _name: &str) -> Result<(), BackendError> {
            Ok(())
        }

        async fn list_collections(&self) -> Result<Vec<CollectionInfo>, BackendError> {
            Ok(Vec::new())
        }

        async fn search(&self, _request: &SearchRequest) -> Result<SearchResults, BackendError> {
            Ok(SearchResults {
                hits: Vec::new(),
                total: 0,
                took_ms: 0,
            })
        }
    }

    fn csv_input(content: &str) -> TabularInput {
        TabularInput {
            content: Bytes::from(content.as_bytes().to_vec()),
            media_type: Some("text/csv".to_string()),
            file_name: "data.csv".to_string(),
        }
    }

    fn pipeline_with(mock: Arc<MockBackend>) -> IngestionPipeline {
        IngestionPipeline::new(mock, Arc::new(Config::default()))
    }

    // ============================================================
    // PARSER TESTS
    // ============================================================

    #[test]
    fn test_split_fields_trims_and_strips_quotes() {
        let fields = split_fields(r#" "title" , author ,"year 1999""#);
        assert_eq!(fields, vec!["title", "author", "year 1999"]);
    }

    #[test]
    fn test_non_blank_lines_filters_empty_lines() {
        let lines = non_blank_lines("a,b\n\n  \n1,2\n");
        assert_eq!(lines, vec!["a,b", "1,2"]);
    }

    #[test]
    fn test_parse_header_rejects_empty_column_name() {
        let result = parse_header("title,,author");
        assert!(matches!(result, Err(IngestError::InvalidHeader)));
    }

    #[test]
    fn test_parse_header_rejects_quoted_empty_column() {
        let result = parse_header(r#"title,"",author"#);
        assert!(matches!(result, Err(IngestError::InvalidHeader)));
    }

    #[test]
    fn test_parse_rows_drops_arity_mismatch() {
        let lines = vec!["a,b,c", "1,2", "1,2,3", "1,2,3,4"];
        let rows = parse_rows(&lines, 3);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line_no, 2);
        assert_eq!(rows[0].values, vec!["1", "2", "3"]);
    }

    // ============================================================
    // COLLECTION NAME TESTS
    // ============================================================

    #[test]
    fn test_collection_name_rejects_uppercase() {
        assert!(matches!(
            validate_collection_name("My_Index"),
            Err(IngestError::InvalidCollectionName)
        ));
    }

    #[test]
    fn test_collection_name_accepts_lowercase_with_separators() {
        assert!(validate_collection_name("my-index_2").is_ok());
        assert!(validate_collection_name("0logs").is_ok());
    }

    #[test]
    fn test_collection_name_rejects_leading_separator_and_empty() {
        assert!(validate_collection_name("-index").is_err());
        assert!(validate_collection_name("_index").is_err());
        assert!(validate_collection_name("").is_err());
    }

    // ============================================================
    // SCHEMA INFERENCE TESTS
    // ============================================================

    #[test]
    fn test_inferred_schema_shape() {
        let schema = infer_schema(&["title".to_string(), "body".to_string()]);
        let mappings = schema.to_mappings();

        let properties = &mappings["properties"];
        assert_eq!(properties["title"]["type"], "text");
        assert_eq!(properties["title"]["fields"]["keyword"]["type"], "keyword");
        assert_eq!(properties["title"]["fields"]["keyword"]["ignore_above"], 256);
        assert_eq!(properties["id"]["type"], "keyword");
        assert_eq!(properties["indexed_at"]["type"], "date");
        assert_eq!(properties["file_size"]["type"], "long");
        assert_eq!(properties["description"]["type"], "text");
    }

    // ============================================================
    // PIPELINE TESTS - validation taxonomy
    // ============================================================

    #[tokio::test]
    async fn test_unsupported_format_rejected() {
        let pipeline = pipeline_with(Arc::new(MockBackend::new()));
        let input = TabularInput {
            content: Bytes::from(b"a,b\n1,2".to_vec()),
            media_type: Some("text/plain".to_string()),
            file_name: "notes.txt".to_string(),
        };

        let err = pipeline.ingest(input, "logs", None).await.unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat));
    }

    #[tokio::test]
    async fn test_csv_media_type_accepted_despite_filename() {
        let mock = Arc::new(MockBackend::new());
        let pipeline = pipeline_with(mock.clone());
        let input = TabularInput {
            content: Bytes::from(b"a,b\n1,2".to_vec()),
            media_type: Some("application/csv".to_string()),
            file_name: "export.dat".to_string(),
        };

        let outcome = pipeline.ingest(input, "logs", None).await.unwrap();
        assert_eq!(outcome.total_rows, 1);
    }

    #[tokio::test]
    async fn test_payload_too_large() {
        let mock = Arc::new(MockBackend::new());
        let config = Config {
            max_upload_bytes: 8,
            ..Config::default()
        };
        let pipeline = IngestionPipeline::new(mock.clone(), Arc::new(config));

        let err = pipeline
            .ingest(csv_input("a,b\n1,2\n3,4"), "logs", None)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::PayloadTooLarge { limit_bytes: 8 }));
        assert_eq!(mock.created_count(), 0);
    }

    #[tokio::test]
    async fn test_header_only_input_rejected() {
        let pipeline = pipeline_with(Arc::new(MockBackend::new()));

        let err = pipeline
            .ingest(csv_input("a,b"), "logs", None)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::EmptyOrHeaderOnly));
    }

    #[tokio::test]
    async fn test_no_valid_rows_when_all_arities_mismatch() {
        let pipeline = pipeline_with(Arc::new(MockBackend::new()));

        let err = pipeline
            .ingest(csv_input("a,b\n1\n1,2,3"), "logs", None)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::NoValidRows));
    }

    #[tokio::test]
    async fn test_invalid_collection_name_via_pipeline() {
        let pipeline = pipeline_with(Arc::new(MockBackend::new()));

        let err = pipeline
            .ingest(csv_input("a,b\n1,2"), "My_Index", None)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::InvalidCollectionName));
    }

    #[tokio::test]
    async fn test_invalid_header_reported_before_invalid_name() {
        // Both the header and the index name are bad; the header check
        // comes first in the validation sequence.
        let pipeline = pipeline_with(Arc::new(MockBackend::new()));

        let err = pipeline
            .ingest(csv_input("a,,c\n1,2,3"), "My_Index", None)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::InvalidHeader));
    }

    // ============================================================
    // PIPELINE TESTS - liveness short circuit
    // ============================================================

    #[tokio::test]
    async fn test_dead_backend_short_circuits_without_side_effects() {
        let mock = Arc::new(MockBackend::dead());
        let pipeline = pipeline_with(mock.clone());

        let err = pipeline
            .ingest(csv_input("a,b\n1,2"), "logs", None)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::BackendUnavailable(_)));
        assert_eq!(mock.created_count(), 0);
        assert!(mock.bulk_calls.lock().unwrap().is_empty());
    }

    // ============================================================
    // PIPELINE TESTS - happy path and accounting
    // ============================================================

    #[tokio::test]
    async fn test_ingest_happy_path() {
        let mock = Arc::new(MockBackend::new());
        let pipeline = pipeline_with(mock.clone());

        let outcome = pipeline
            .ingest(
                csv_input("title,author\nDune,Herbert\nHyperion,Simmons"),
                "books",
                Some("sci-fi catalog"),
            )
            .await
            .unwrap();

        assert_eq!(outcome.total_rows, 2);
        assert_eq!(outcome.accepted_rows, 2);
        assert_eq!(outcome.rejected_rows, 0);
        assert_eq!(outcome.headers, vec!["title", "author"]);
        assert_eq!(mock.created_count(), 1);

        let documents = mock.bulk_documents(0);
        assert_eq!(documents[0].id, "books_1");
        assert_eq!(documents[1].id, "books_2");
        assert_eq!(documents[0].description, "sci-fi catalog");
        assert_eq!(documents[0].file_name, "data.csv");
    }

    #[tokio::test]
    async fn test_document_field_set_is_headers_plus_metadata() {
        let mock = Arc::new(MockBackend::new());
        let pipeline = pipeline_with(mock.clone());

        pipeline
            .ingest(csv_input("title,author\nDune,Herbert"), "books", None)
            .await
            .unwrap();

        let document = &mock.bulk_documents(0)[0];
        let value = serde_json::to_value(document).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();

        assert_eq!(
            keys,
            vec![
                "author",
                "description",
                "file_name",
                "file_size",
                "id",
                "indexed_at",
                "title",
            ]
        );
    }

    #[tokio::test]
    async fn test_dropped_rows_leave_gaps_in_document_ids() {
        let mock = Arc::new(MockBackend::new());
        let pipeline = pipeline_with(mock.clone());

        // Line 2 has the wrong arity and is dropped; line 3 keeps its id.
        let outcome = pipeline
            .ingest(csv_input("a,b\n1,2\nonly-one-field\n5,6"), "logs", None)
            .await
            .unwrap();

        assert_eq!(outcome.total_rows, 2);
        let documents = mock.bulk_documents(0);
        assert_eq!(documents[0].id, "logs_1");
        assert_eq!(documents[1].id, "logs_3");
    }

    #[tokio::test]
    async fn test_partial_failure_is_success_with_tally() {
        let mock = Arc::new(MockBackend::rejecting(&["books_2"]));
        let pipeline = pipeline_with(mock.clone());

        let outcome = pipeline
            .ingest(
                csv_input("id_no,title\n1,Dune\n2,Hyperion"),
                "books",
                None,
            )
            .await
            .unwrap();

        assert_eq!(outcome.total_rows, 2);
        assert_eq!(outcome.accepted_rows, 1);
        assert_eq!(outcome.rejected_rows, 1);
        assert_eq!(outcome.item_errors.len(), 1);
        assert_eq!(outcome.item_errors[0].id, "books_2");
        assert_eq!(
            outcome.accepted_rows + outcome.rejected_rows,
            outcome.total_rows
        );
    }

    // ============================================================
    // PIPELINE TESTS - provisioning idempotence
    // ============================================================

    #[tokio::test]
    async fn test_reingest_does_not_recreate_index_and_keeps_ids() {
        let mock = Arc::new(MockBackend::new());
        let pipeline = pipeline_with(mock.clone());
        let content = "title,author\nDune,Herbert";

        pipeline
            .ingest(csv_input(content), "books", None)
            .await
            .unwrap();
        pipeline
            .ingest(csv_input(content), "books", None)
            .await
            .unwrap();

        // One creation, two bulk writes, identical ids both times.
        assert_eq!(mock.created_count(), 1);
        let first = mock.bulk_documents(0);
        let second = mock.bulk_documents(1);
        assert_eq!(first[0].id, second[0].id);
    }

    #[tokio::test]
    async fn test_existing_index_skips_schema_creation() {
        let mock = Arc::new(MockBackend::with_existing("books"));
        let pipeline = pipeline_with(mock.clone());

        let outcome = pipeline
            .ingest(csv_input("title,author\nDune,Herbert"), "books", None)
            .await
            .unwrap();

        assert_eq!(outcome.total_rows, 1);
        assert_eq!(mock.created_count(), 0);
    }

    #[tokio::test]
    async fn test_existing_index_rejected_when_disallowed() {
        let mock = Arc::new(MockBackend::with_existing("books"));
        let config = Config {
            allow_existing_collection: false,
            ..Config::default()
        };
        let pipeline = IngestionPipeline::new(mock.clone(), Arc::new(config));

        let err = pipeline
            .ingest(csv_input("title,author\nDune,Herbert"), "books", None)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::ProvisioningFailed(_)));
        assert!(mock.bulk_calls.lock().unwrap().is_empty());
    }

    // ============================================================
    // PIPELINE TESTS - reserved field shadowing
    // ============================================================

    #[tokio::test]
    async fn test_reserved_column_is_shadowed_by_metadata() {
        let mock = Arc::new(MockBackend::new());
        let pipeline = pipeline_with(mock.clone());

        pipeline
            .ingest(csv_input("id,title\n42,Dune"), "books", None)
            .await
            .unwrap();

        let document = &mock.bulk_documents(0)[0];
        // The synthesized identifier wins over the CSV's own "id" column.
        assert_eq!(document.id, "books_1");
        assert!(!document.fields.contains_key("id"));
        assert_eq!(document.fields["title"], "Dune");
    }
}
