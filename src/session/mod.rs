//! In-memory session store.
//!
//! Maps a session id to the uploaded batch and the statistics computed
//! from it. Built once at startup and shared by handle; cloning the store
//! clones the handle, not the data.

use crate::analysis::{summarize, AggregationPolicy};
use crate::error::DashboardError;
use crate::models::{ExpertRecord, StatisticsSummary};
use crate::validation::validate_batch;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const SESSION_ID_LEN: usize = 8;

/// One aggregated upload. Never mutated after insert.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub filename: String,
    pub records: Vec<ExpertRecord>,
    pub summary: StatisticsSummary,
    pub created_at: DateTime<Utc>,
}

/// A page of records from one session.
#[derive(Debug, Clone)]
pub struct RecordPage {
    /// Records in the whole batch.
    pub total: usize,
    pub records: Vec<ExpertRecord>,
}

/// Store settings.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Sessions older than this are treated as missing.
    pub ttl: Option<Duration>,
    pub allow_empty_upload: bool,
}

/// Process-wide session mapping.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
    policy: Arc<AggregationPolicy>,
    options: StoreOptions,
}

impl SessionStore {
    pub fn new(policy: AggregationPolicy, options: StoreOptions) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            policy: Arc::new(policy),
            options,
        }
    }

    pub fn allows_empty_upload(&self) -> bool {
        self.options.allow_empty_upload
    }

    /// Validate and aggregate a batch, store it, and return the new id.
    ///
    /// Records without an explicit `is_elite_school` get the flag derived
    /// from their tier, so served records always carry it.
    pub fn create(
        &self,
        filename: &str,
        mut records: Vec<ExpertRecord>,
    ) -> Result<String, DashboardError> {
        if records.is_empty() && !self.options.allow_empty_upload {
            return Err(DashboardError::EmptyUpload);
        }

        validate_batch(&records)?;
        for record in records.iter_mut().filter(|r| r.is_elite_school.is_none()) {
            record.is_elite_school = Some(self.policy.is_elite_school(record));
        }
        let summary = summarize(&records, &self.policy);

        let mut guard = self.inner.write();
        let id = loop {
            let candidate = new_session_id();
            if !guard.contains_key(&candidate) {
                break candidate;
            }
            debug!("Session id collision on {}, regenerating", candidate);
        };

        info!(
            "Created session {} for {} ({} experts)",
            id,
            filename,
            records.len()
        );

        guard.insert(
            id.clone(),
            Session {
                id: id.clone(),
                filename: filename.to_string(),
                records,
                summary,
                created_at: Utc::now(),
            },
        );

        Ok(id)
    }

    /// Statistics for a session.
    pub fn get(&self, session_id: &str) -> Result<StatisticsSummary, DashboardError> {
        self.with_session(session_id, Utc::now(), |s| s.summary.clone())
    }

    /// A page of a session's records.
    pub fn records(
        &self,
        session_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<RecordPage, DashboardError> {
        self.with_session(session_id, Utc::now(), |s| RecordPage {
            total: s.records.len(),
            records: s.records.iter().skip(offset).take(limit).cloned().collect(),
        })
    }

    /// Drop sessions that outlived the TTL. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let Some(ttl) = self.options.ttl else {
            return 0;
        };

        let mut guard = self.inner.write();
        let before = guard.len();
        guard.retain(|_, session| {
            let expired = is_expired(session, ttl, now);
            if expired {
                debug!("Expiring session {} ({})", session.id, session.filename);
            }
            !expired
        });
        before - guard.len()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    fn with_session<T, F>(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
        f: F,
    ) -> Result<T, DashboardError>
    where
        F: FnOnce(&Session) -> T,
    {
        let guard = self.inner.read();
        match guard.get(session_id) {
            Some(session) if !self.expired(session, now) => Ok(f(session)),
            _ => Err(DashboardError::NotFound(session_id.to_string())),
        }
    }

    fn expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        self.options
            .ttl
            .map(|ttl| is_expired(session, ttl, now))
            .unwrap_or(false)
    }
}

fn is_expired(session: &Session, ttl: Duration, now: DateTime<Utc>) -> bool {
    now - session.created_at > ttl
}

fn new_session_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SESSION_ID_LEN);
    id
}
