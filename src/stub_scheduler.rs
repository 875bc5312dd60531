use anyhow::Result;
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::probe::{Job, SchedulerProbe};

pub type WorkFn = dyn FnOnce(&Job) -> Result<Value> + Send + 'static;

struct QueuedWork {
    job: Arc<Job>,
    work: Box<WorkFn>,
}

/// Minimal concurrent driver for the completion callbacks.
///
/// Submitted work runs on a pool of worker threads and reports through the
/// probe: `Ok(value)` lands in `probe.results` via `done_job`, `Err` lands in
/// `probe.errors` via `reject_job`. There is no job graph or persistence;
/// workers drain the channel until `shutdown` disconnects it.
pub struct StubScheduler {
    pub probe: Arc<SchedulerProbe>,
    next_job_id: AtomicI64,
    sender: crossbeam::channel::Sender<QueuedWork>,
    workers: Vec<JoinHandle<()>>,
}

impl StubScheduler {
    pub fn new(num_workers: usize) -> Self {
        Self::with_probe(Arc::new(SchedulerProbe::new()), num_workers)
    }

    pub fn with_default_workers() -> Self {
        Self::new(num_cpus::get_physical())
    }

    pub fn with_probe(probe: Arc<SchedulerProbe>, num_workers: usize) -> Self {
        let (tx, rx) = crossbeam::channel::unbounded::<QueuedWork>();

        let workers = (0..num_workers)
            .map(|worker_id| {
                let probe = probe.clone();
                let receiver = rx.clone();
                std::thread::spawn(move || {
                    // Loop until the channel disconnects
                    while let Ok(queued) = receiver.recv() {
                        tracing::trace!("worker {} running job {}", worker_id, queued.job.id);
                        match (queued.work)(&queued.job) {
                            Ok(value) => probe.done_job(&queued.job, value, &[]),
                            Err(error) => {
                                probe
                                    .reject_job(Some(&queued.job), error, &[])
                                    .expect("job-attributed rejection does not escalate");
                            }
                        }
                    }
                })
            })
            .collect();

        StubScheduler {
            probe,
            next_job_id: AtomicI64::new(0),
            sender: tx,
            workers,
        }
    }

    pub fn next_id(&self) -> i64 {
        self.next_job_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Queue `work` for a worker thread. The returned job handle is live
    /// immediately; completion shows up in the probe.
    pub fn submit<F>(&self, desc: impl Into<String>, work: F) -> Arc<Job>
    where
        F: FnOnce(&Job) -> Result<Value> + Send + 'static,
    {
        let job = Arc::new(Job::new(self.next_id(), desc));
        self.sender
            .send(QueuedWork {
                job: job.clone(),
                work: Box::new(work),
            })
            .expect("stub scheduler workers have shut down");
        job
    }

    /// Disconnect the queue and join the workers. Work already submitted
    /// still runs to completion first.
    pub fn shutdown(self) {
        drop(self.sender);
        for handle in self.workers {
            handle.join().expect("stub scheduler worker panicked");
        }
    }
}
