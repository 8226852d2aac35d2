//! Named background jobs.
//!
//! Each job owns one tokio task while it runs: it asks its provider for a
//! payload, publishes the payload to its destination, then sleeps for its
//! interval. A failed fetch is logged and the job carries on; only an
//! explicit [`Scheduler::stop`] ends the loop.
//!
//! ## State machine
//!
//! ```text
//!          start()               stop()
//!   Idle ──────────► Running ──────────► StopRequested
//!    ▲                                        │
//!    └──────────── run-loop observes ─────────┘
//! ```
//!
//! The state lives in one `watch` channel per job and every transition is a
//! compare-and-set under the channel's lock, so `start`, `stop` and the
//! loop's own exit cannot interleave into an inconsistent state. The loop
//! wakes from its sleep as soon as a stop is requested, but an in-flight
//! provider call always runs to completion first.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::SchedulerError;
use crate::sink::{truncate_chars, Destination, OutputSink, MESSAGE_LIMIT};
use crate::source::ContentProvider;

/// Shortest interval a job may be registered with.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
    StopRequested,
}

/// Outcome of a start/stop request. None of these are failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobControl {
    Started,
    AlreadyRunning,
    StopRequested,
    AlreadyStopped,
}

/// Everything needed to register a job.
pub struct JobSpec {
    pub name: String,
    pub interval: Duration,
    pub provider: Arc<dyn ContentProvider>,
    pub destination: Destination,
    /// Text put in front of every payload.
    pub prefix: String,
    /// Character limit applied after the prefix.
    pub limit: usize,
}

impl JobSpec {
    pub fn new(
        name: impl Into<String>,
        interval: Duration,
        provider: Arc<dyn ContentProvider>,
        destination: Destination,
    ) -> Self {
        Self {
            name: name.into(),
            interval,
            provider,
            destination,
            prefix: String::new(),
            limit: MESSAGE_LIMIT,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Point-in-time view of one job.
#[derive(Debug, Clone)]
pub struct JobStatus {
    pub name: String,
    pub state: JobState,
    pub interval: Duration,
    pub published: u64,
    pub failures: u64,
    pub last_published: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct JobStats {
    published: u64,
    failures: u64,
    last_published: Option<DateTime<Utc>>,
}

struct Job {
    spec: JobSpec,
    state: watch::Sender<JobState>,
    stats: Mutex<JobStats>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Job {
    fn new(spec: JobSpec) -> Self {
        let (state, _) = watch::channel(JobState::Idle);
        Self {
            spec,
            state,
            stats: Mutex::new(JobStats::default()),
            handle: Mutex::new(None),
        }
    }

    fn state(&self) -> JobState {
        *self.state.borrow()
    }

    /// Move `from` → `to` atomically; on mismatch return the state seen.
    fn transition(&self, from: JobState, to: JobState) -> Result<(), JobState> {
        let mut seen = from;
        let changed = self.state.send_if_modified(|state| {
            seen = *state;
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        });
        if changed {
            Ok(())
        } else {
            Err(seen)
        }
    }

    fn stats(&self) -> std::sync::MutexGuard<'_, JobStats> {
        self.stats.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn status(&self) -> JobStatus {
        let stats = self.stats();
        JobStatus {
            name: self.spec.name.clone(),
            state: self.state(),
            interval: self.spec.interval,
            published: stats.published,
            failures: stats.failures,
            last_published: stats.last_published,
        }
    }

    /// One produce → publish round. Failures are logged, never propagated.
    async fn tick(&self, sink: &dyn OutputSink) {
        let spec = &self.spec;
        let payload = match spec.provider.produce().await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    job = %spec.name,
                    provider = spec.provider.name(),
                    error = %e,
                    "provider failed"
                );
                self.stats().failures += 1;
                return;
            }
        };

        if payload.trim().is_empty() {
            tracing::debug!(job = %spec.name, "empty payload, nothing to publish");
            return;
        }

        let message = format!("{}{}", spec.prefix, payload);
        let message = truncate_chars(&message, spec.limit);
        match sink.publish(&spec.destination, message).await {
            Ok(()) => {
                tracing::debug!(
                    job = %spec.name,
                    destination = %spec.destination,
                    chars = message.chars().count(),
                    "published"
                );
                let mut stats = self.stats();
                stats.published += 1;
                stats.last_published = Some(Utc::now());
            }
            Err(e) => {
                tracing::warn!(
                    job = %spec.name,
                    destination = %spec.destination,
                    error = %e,
                    "publish failed"
                );
                self.stats().failures += 1;
            }
        }
    }

    async fn run(self: Arc<Self>, sink: Arc<dyn OutputSink>) {
        let mut state_rx = self.state.subscribe();
        tracing::info!(job = %self.spec.name, interval = ?self.spec.interval, "job started");

        loop {
            self.tick(sink.as_ref()).await;

            tokio::select! {
                _ = tokio::time::sleep(self.spec.interval) => {}
                _ = stop_requested(&mut state_rx) => {}
            }

            if self.transition(JobState::StopRequested, JobState::Idle).is_ok() {
                tracing::info!(job = %self.spec.name, "job stopped");
                return;
            }
        }
    }
}

/// Resolves once the watched state reads `StopRequested`.
async fn stop_requested(rx: &mut watch::Receiver<JobState>) {
    loop {
        if *rx.borrow_and_update() == JobState::StopRequested {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender gone: the job itself is being dropped.
            return;
        }
    }
}

/// Owner of every job; the only place job state changes.
pub struct Scheduler {
    sink: Arc<dyn OutputSink>,
    jobs: RwLock<BTreeMap<String, Arc<Job>>>,
}

impl Scheduler {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            sink,
            jobs: RwLock::new(BTreeMap::new()),
        }
    }

    /// Add a job in the `Idle` state.
    pub fn register(&self, spec: JobSpec) -> Result<(), SchedulerError> {
        if spec.interval < MIN_INTERVAL {
            return Err(SchedulerError::IntervalTooShort {
                name: spec.name,
                interval: spec.interval,
            });
        }

        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        if jobs.contains_key(&spec.name) {
            return Err(SchedulerError::DuplicateName(spec.name));
        }
        tracing::debug!(job = %spec.name, provider = spec.provider.name(), "job registered");
        jobs.insert(spec.name.clone(), Arc::new(Job::new(spec)));
        Ok(())
    }

    fn job(&self, name: &str) -> Result<Arc<Job>, SchedulerError> {
        self.jobs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
            .ok_or_else(|| SchedulerError::UnknownJob(name.to_string()))
    }

    /// Launch the job's run-loop unless one is already live.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, name: &str) -> Result<JobControl, SchedulerError> {
        let job = self.job(name)?;
        if job.transition(JobState::Idle, JobState::Running).is_err() {
            return Ok(JobControl::AlreadyRunning);
        }

        let handle = tokio::spawn(Arc::clone(&job).run(Arc::clone(&self.sink)));
        *job.handle.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        Ok(JobControl::Started)
    }

    /// Ask a running job to stop; it exits at its next wake.
    pub fn stop(&self, name: &str) -> Result<JobControl, SchedulerError> {
        let job = self.job(name)?;
        match job.transition(JobState::Running, JobState::StopRequested) {
            Ok(()) => {
                tracing::info!(job = name, "stop requested");
                Ok(JobControl::StopRequested)
            }
            Err(_) => Ok(JobControl::AlreadyStopped),
        }
    }

    /// Whether a run-loop is live for `name`. May be stale by the time the
    /// caller looks at it.
    pub fn is_running(&self, name: &str) -> bool {
        self.job(name)
            .map(|job| job.state() != JobState::Idle)
            .unwrap_or(false)
    }

    pub fn state(&self, name: &str) -> Option<JobState> {
        self.job(name).ok().map(|job| job.state())
    }

    pub fn status(&self) -> Vec<JobStatus> {
        self.jobs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(|job| job.status())
            .collect()
    }

    /// Request stop on every job and wait for their loops to exit.
    ///
    /// A job blocked inside a provider call finishes that call first.
    pub async fn shutdown(&self) {
        let jobs: Vec<Arc<Job>> = self
            .jobs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();

        for job in &jobs {
            let _ = job.transition(JobState::Running, JobState::StopRequested);
        }

        for job in &jobs {
            let handle = job.handle.lock().unwrap_or_else(|e| e.into_inner()).take();
            if let Some(handle) = handle {
                if let Err(e) = handle.await {
                    tracing::error!(job = %job.spec.name, error = %e, "job task panicked");
                }
            }
        }
        tracing::info!(jobs = jobs.len(), "scheduler drained");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
