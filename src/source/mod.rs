//! Record sources.
//!
//! A record source turns a list of talent ids into one attribute record per
//! id. The service only sees the [`RecordSource`] trait; which variant backs
//! it is a configuration choice.

pub mod mock;
pub mod remote;

use crate::config::{SourceConfig, SourceKind};
use crate::error::DashboardError;
use crate::models::ExpertRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub use mock::MockSource;
pub use remote::RemoteSource;

/// Supplies expert records for a batch of talent ids.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Fetch one record per id.
    async fn fetch(&self, talent_ids: &[String]) -> Result<Vec<ExpertRecord>, DashboardError>;
}

/// Build the record source selected by configuration.
pub fn build_source(config: &SourceConfig) -> Result<Arc<dyn RecordSource>> {
    match config.kind {
        SourceKind::Mock => Ok(Arc::new(MockSource::new())),
        SourceKind::Remote => {
            let url = config
                .remote_url
                .clone()
                .context("source.remote_url is required for the remote source")?;
            let source = RemoteSource::new(url, config.timeout_seconds)?;
            Ok(Arc::new(source))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_mock_source() {
        let source = build_source(&SourceConfig::default()).unwrap();
        assert_eq!(source.name(), "mock");
    }

    #[test]
    fn test_build_remote_source() {
        let config = SourceConfig {
            kind: SourceKind::Remote,
            remote_url: Some("http://localhost:9000/experts".to_string()),
            timeout_seconds: 5,
        };
        let source = build_source(&config).unwrap();
        assert_eq!(source.name(), "remote");
    }

    #[test]
    fn test_remote_source_without_url_fails() {
        let config = SourceConfig {
            kind: SourceKind::Remote,
            ..SourceConfig::default()
        };
        assert!(build_source(&config).is_err());
    }
}
