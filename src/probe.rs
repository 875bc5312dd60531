use anyhow::Result;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::WaitTimeout;

pub type JobId = i64;

// ----------------------------------------------------------------------------
// Declarations
// ----------------------------------------------------------------------------

/// The job surface the probe consumes: an identifier and a tag list the
/// completion callbacks may append to, plus a description for logs.
#[derive(Debug)]
pub struct Job {
    pub id: JobId,
    pub desc: String,
    tags: Mutex<Vec<String>>,
}

/// Completion registry a scheduler under test reports into.
///
/// `done_job` and `reject_job` are the two callbacks to install into the
/// scheduler; they may be invoked from any thread. Each map takes at most one
/// entry per job id, and a given id lands in exactly one of the two. That
/// invariant is the callers' to keep (single writer per key); the registry
/// does not police overwrites.
#[derive(Debug, Default)]
pub struct SchedulerProbe {
    pub results: DashMap<JobId, Value>,
    pub errors: DashMap<JobId, anyhow::Error>,
}

/// Knobs for the blocking wait. Tests polling a slow scheduler pass their
/// own values instead of relying on `Default`.
#[derive(Clone, Copy, Debug)]
pub struct WaitOptions {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Job {
    pub fn new(id: JobId, desc: impl Into<String>) -> Self {
        Job {
            id,
            desc: desc.into(),
            tags: Default::default(),
        }
    }

    /// Snapshot of the tags appended so far.
    pub fn tags(&self) -> Vec<String> {
        self.tags.lock().expect("job tag mutex poisoned").clone()
    }

    fn add_tags(&self, tags: &[&str]) {
        if tags.is_empty() {
            return;
        }
        let mut held = self.tags.lock().expect("job tag mutex poisoned");
        held.extend(tags.iter().map(|t| t.to_string()));
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        WaitOptions {
            poll_interval: Duration::from_millis(20),
            timeout: Duration::from_secs(1),
        }
    }
}

impl SchedulerProbe {
    pub fn new() -> Self {
        Default::default()
    }

    /// Success callback: appends `tags` to the job and records `result`
    /// under the job's id.
    pub fn done_job(&self, job: &Job, result: Value, tags: &[&str]) {
        tracing::trace!("job {} [{}] succeeded", job.id, job.desc);
        job.add_tags(tags);
        self.results.insert(job.id, result);
    }

    /// Failure callback. With a job attached the error is recorded as data
    /// for the test to assert on. Without one the failure is systemic (a
    /// scheduler fault, not attributable to any job): nothing is recorded and
    /// the error comes straight back to whoever pumped the notification.
    pub fn reject_job(&self, job: Option<&Job>, error: anyhow::Error, tags: &[&str]) -> Result<()> {
        match job {
            Some(job) => {
                tracing::trace!("job {} [{}] failed: {:#}", job.id, job.desc, error);
                job.add_tags(tags);
                self.errors.insert(job.id, error);
                Ok(())
            }
            None => Err(error),
        }
    }

    pub fn has_result(&self, id: JobId) -> bool {
        self.results.contains_key(&id)
    }

    pub fn has_error(&self, id: JobId) -> bool {
        self.errors.contains_key(&id)
    }

    /// True once the job has landed in either map.
    pub fn is_complete(&self, id: JobId) -> bool {
        self.has_result(id) || self.has_error(id)
    }

    pub fn result(&self, id: JobId) -> Option<Value> {
        self.results.get(&id).map(|entry| entry.value().clone())
    }

    pub fn error_message(&self, id: JobId) -> Option<String> {
        self.errors.get(&id).map(|entry| format!("{:#}", entry.value()))
    }

    /// Block until every id in `job_ids` is present in the union of the two
    /// maps, or fail with a [`WaitTimeout`] once `opts.timeout` of wall-clock
    /// time has elapsed.
    ///
    /// Pure polling: membership is re-checked every `opts.poll_interval`, and
    /// no ordering between ids is assumed. An already-satisfied wait returns
    /// immediately even with a zero timeout.
    pub fn wait_for_jobs(&self, job_ids: &[JobId], opts: &WaitOptions) -> Result<()> {
        let start = Instant::now();
        loop {
            let pending: Vec<JobId> =
                job_ids.iter().copied().filter(|id| !self.is_complete(*id)).collect();
            if pending.is_empty() {
                tracing::debug!("all {} jobs complete after {:?}", job_ids.len(), start.elapsed());
                return Ok(());
            }
            if start.elapsed() >= opts.timeout {
                tracing::debug!("wait timed out with {} jobs pending", pending.len());
                return Err(WaitTimeout {
                    waited: start.elapsed(),
                    pending,
                }
                .into());
            }
            std::thread::sleep(opts.poll_interval);
        }
    }
}
