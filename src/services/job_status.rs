//! In-process run bookkeeping for the scrape jobs
//!
//! Tracks when each job last ran, last succeeded and why it last failed, so
//! an operator can spot upstream layout drift from `/api/jobs` instead of
//! trawling logs.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub job_name: String,
    pub last_attempt_at: Option<NaiveDateTime>,
    pub last_success_at: Option<NaiveDateTime>,
    pub last_error: Option<String>,
    pub success_count: u64,
    pub error_count: u64,
    /// Invocations dropped because a run was still in flight
    pub skipped_count: u64,
}

#[derive(Clone, Default)]
pub struct JobStatusRegistry {
    inner: Arc<RwLock<BTreeMap<&'static str, JobStatus>>>,
}

impl JobStatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, job_name: &'static str, f: impl FnOnce(&mut JobStatus)) {
        let mut jobs = self.inner.write();
        let status = jobs.entry(job_name).or_insert_with(|| JobStatus {
            job_name: job_name.to_string(),
            ..Default::default()
        });
        f(status);
    }

    /// Make the job visible before its first run
    pub fn register(&self, job_name: &'static str) {
        self.update(job_name, |_| {});
    }

    pub fn record_success(&self, job_name: &'static str) {
        let now = Utc::now().naive_utc();
        self.update(job_name, |s| {
            s.last_attempt_at = Some(now);
            s.last_success_at = Some(now);
            s.last_error = None;
            s.success_count += 1;
        });
        tracing::debug!("[{}] Recorded successful run", job_name);
    }

    pub fn record_failure(&self, job_name: &'static str, error: &str) {
        let now = Utc::now().naive_utc();
        self.update(job_name, |s| {
            s.last_attempt_at = Some(now);
            s.last_error = Some(error.to_string());
            s.error_count += 1;
        });
        tracing::debug!("[{}] Recorded failed run: {}", job_name, error);
    }

    pub fn record_skipped(&self, job_name: &'static str) {
        self.update(job_name, |s| s.skipped_count += 1);
    }

    pub fn get(&self, job_name: &str) -> Option<JobStatus> {
        self.inner.read().get(job_name).cloned()
    }

    pub fn snapshot(&self) -> Vec<JobStatus> {
        self.inner.read().values().cloned().collect()
    }
}
