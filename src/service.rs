//! Dashboard service: the upload and fetch flows behind the HTTP API.

use crate::error::DashboardError;
use crate::ingest::{check_filename, decode_upload, parse_identifiers};
use crate::models::StatisticsSummary;
use crate::session::{RecordPage, SessionStore};
use crate::source::RecordSource;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub session_id: String,
    pub talent_count: usize,
}

/// Ties the record source to the session store.
pub struct DashboardService {
    store: SessionStore,
    source: Arc<dyn RecordSource>,
}

impl DashboardService {
    pub fn new(store: SessionStore, source: Arc<dyn RecordSource>) -> Self {
        Self { store, source }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Parse an uploaded id list, fetch and aggregate its records, and
    /// open a new session for them.
    pub async fn upload(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<UploadOutcome, DashboardError> {
        let start = Instant::now();

        check_filename(filename)?;
        let text = decode_upload(bytes)?;
        let talent_ids = parse_identifiers(&text);
        debug!("Parsed {} talent ids from {}", talent_ids.len(), filename);

        if talent_ids.is_empty() && !self.store.allows_empty_upload() {
            return Err(DashboardError::EmptyUpload);
        }

        let records = self.source.fetch(&talent_ids).await?;
        let talent_count = records.len();

        // Aggregation is CPU-bound; keep it off the async workers
        let store = self.store.clone();
        let name = filename.to_string();
        let session_id = tokio::task::spawn_blocking(move || store.create(&name, records))
            .await
            .map_err(|e| DashboardError::Internal(format!("aggregation task failed: {}", e)))??;

        info!(
            "Upload {} processed via {} source: {} experts in {:.1}ms",
            filename,
            self.source.name(),
            talent_count,
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(UploadOutcome {
            session_id,
            talent_count,
        })
    }

    /// Statistics for a previously uploaded batch.
    pub fn dashboard(&self, session_id: &str) -> Result<StatisticsSummary, DashboardError> {
        self.store.get(session_id)
    }

    /// A page of the records behind a session.
    pub fn experts(
        &self,
        session_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<RecordPage, DashboardError> {
        self.store.records(session_id, offset, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AggregationPolicy;
    use crate::models::ExpertRecord;
    use crate::session::StoreOptions;
    use crate::source::MockSource;
    use async_trait::async_trait;

    /// Source that hands back a fixed batch regardless of ids.
    struct FixedSource(Vec<ExpertRecord>);

    #[async_trait]
    impl RecordSource for FixedSource {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch(&self, _ids: &[String]) -> Result<Vec<ExpertRecord>, DashboardError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl RecordSource for FailingSource {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch(&self, _ids: &[String]) -> Result<Vec<ExpertRecord>, DashboardError> {
            Err(DashboardError::Source("upstream unavailable".to_string()))
        }
    }

    fn service_with(source: Arc<dyn RecordSource>) -> DashboardService {
        let store = SessionStore::new(AggregationPolicy::default(), StoreOptions::default());
        DashboardService::new(store, source)
    }

    #[tokio::test]
    async fn test_upload_dedups_ids() {
        let service = service_with(Arc::new(MockSource::new()));

        let outcome = service.upload("talent_ids.txt", b"a\nb\nb\nc\n").await.unwrap();
        assert_eq!(outcome.talent_count, 3);

        let summary = service.dashboard(&outcome.session_id).unwrap();
        assert_eq!(summary.total_experts, 3);

        let page = service.experts(&outcome.session_id, 0, 50).unwrap();
        let ids: Vec<&str> = page.records.iter().map(|r| r.talent_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_masters_kpi_end_to_end() {
        let records: Vec<ExpertRecord> = (0..10)
            .map(|i| {
                let degree = match i {
                    0 | 1 | 2 => "硕士",
                    3 => "博士",
                    _ => "本科",
                };
                ExpertRecord::new(format!("t{}", i), degree, "普通本科")
            })
            .collect();
        let service = service_with(Arc::new(FixedSource(records)));

        let outcome = service.upload("ids.txt", b"x\n").await.unwrap();
        let summary = service.dashboard(&outcome.session_id).unwrap();

        assert_eq!(summary.kpi.masters_and_above_count, 4);
        assert_eq!(summary.kpi.masters_and_above_pct, 40.0);
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let service = service_with(Arc::new(MockSource::new()));
        let result = service.upload("ids.txt", b"\n  \n# only a comment\n").await;
        assert!(matches!(result, Err(DashboardError::EmptyUpload)));
        assert!(service.store().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_extension_rejected() {
        let service = service_with(Arc::new(MockSource::new()));
        let result = service.upload("ids.xlsx", b"a\n").await;
        assert!(matches!(result, Err(DashboardError::InvalidFile(_))));
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let service = service_with(Arc::new(FailingSource));
        let result = service.upload("ids.txt", b"a\n").await;
        assert!(matches!(result, Err(DashboardError::Source(_))));
        assert!(service.store().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_records_fail_upload() {
        let bad = vec![ExpertRecord::new("t1", "硕士", "")];
        let service = service_with(Arc::new(FixedSource(bad)));
        let result = service.upload("ids.txt", b"t1\n").await;
        assert!(matches!(result, Err(DashboardError::Validation { .. })));
    }

    #[test]
    fn test_unknown_session() {
        let service = service_with(Arc::new(MockSource::new()));
        assert!(matches!(
            service.dashboard("nope1234"),
            Err(DashboardError::NotFound(_))
        ));
    }
}
