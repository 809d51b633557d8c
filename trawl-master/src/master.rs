//! Master
//!
//! The orchestration engine of the crawl cluster: composes the worker and
//! job registries, drives jobs through their lifecycle phases with
//! barriers, and runs the two perpetual background loops (worker liveness
//! checker, job completion checker).
//!
//! Concurrency model: RPC handlers and both loops share the registries;
//! every decision reads and every write happens under the owning registry's
//! lock, and all remote calls are issued against owned snapshots taken
//! before any await.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use trawl_client::{ClientError, WorkerRpc};
use trawl_core::domain::job::BudgetStatus;
use trawl_core::domain::worker::WorkerInfo;

use crate::barrier::{Barrier, BarrierError, WorkerOp};
use crate::config::Config;
use crate::registry::job::JobAlreadyRunning;
use crate::registry::{JobController, JobRegistry, WorkerRegistry};
use crate::store::{JobStore, StoreError};

/// Master error type
#[derive(Debug, Error)]
pub enum MasterError {
    #[error("job {0} is not running")]
    JobNotFound(String),

    #[error(transparent)]
    AlreadyRunning(#[from] JobAlreadyRunning),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Barrier(#[from] BarrierError),

    #[error("failed to push job package to {address}: {source}")]
    PushFailed {
        address: String,
        source: ClientError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Explicit lifecycle of the master's background work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    NotStarted,
    Running,
    Stopped,
}

/// The cluster master
pub struct Master {
    config: Config,
    workers: WorkerRegistry,
    jobs: JobRegistry,
    store: JobStore,
    rpc: Arc<dyn WorkerRpc>,
    lifecycle: Mutex<Lifecycle>,
    cancel: CancellationToken,
    loop_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Master {
    pub fn new(config: Config, rpc: Arc<dyn WorkerRpc>) -> Result<Self, MasterError> {
        let store = JobStore::new(&config.working_dir)?;

        Ok(Self {
            config,
            workers: WorkerRegistry::new(),
            jobs: JobRegistry::new(),
            store,
            rpc,
            lifecycle: Mutex::new(Lifecycle::NotStarted),
            cancel: CancellationToken::new(),
            loop_handles: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Token cancelled when the master shuts down; the binary ties the RPC
    /// listener's graceful shutdown to it
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    // =============================================================================
    // RPC surface
    // =============================================================================

    /// Records a worker heartbeat and returns the full known worker set so
    /// a newly joined worker learns its peers
    pub fn register_heartbeat(&self, address: &str) -> Vec<String> {
        self.workers.register(address, Utc::now());
        self.workers.snapshot()
    }

    /// Owned copies of every tracked worker record
    pub fn worker_infos(&self) -> Vec<WorkerInfo> {
        self.workers.infos()
    }

    /// Names of all currently running jobs
    pub fn running_jobs(&self) -> Vec<String> {
        self.jobs.running_jobs()
    }

    pub fn job_controller(&self, job_name: &str) -> Option<Arc<JobController>> {
        self.jobs.get(job_name)
    }

    pub fn job_controllers(&self) -> Vec<Arc<JobController>> {
        self.jobs.controllers()
    }

    /// Rolls a job out to the cluster.
    ///
    /// Extracts the package (if asked), loads the description, builds and
    /// registers the job controller, pushes the archive to every assignable
    /// worker, then runs the `prepare` and `run_job` barriers strictly in
    /// order: `run_job` is never issued until `prepare` has returned for
    /// every target, since running against half-prepared nodes leaves
    /// inconsistent per-node state. Any failure past registration aborts
    /// the rollout and unregisters the job.
    pub async fn run_job(&self, job_name: &str, unzip: bool) -> Result<(), MasterError> {
        tracing::info!("Starting job rollout: {} (unzip: {})", job_name, unzip);

        if unzip {
            self.store.unzip(job_name)?;
        }

        let description = self.store.load_description(job_name)?;
        let targets = self.workers.assignable();

        let controller = Arc::new(JobController::new(
            self.store.tracker_dir(),
            description,
            Arc::clone(&self.rpc),
            targets.clone(),
        )?);
        self.jobs.register(Arc::clone(&controller))?;

        match self.rollout(job_name, &targets).await {
            Ok(()) => {
                tracing::info!("Job {} running on {} worker(s)", job_name, targets.len());
                Ok(())
            }
            Err(e) => {
                tracing::error!("Rollout of {} aborted: {}", job_name, e);
                self.jobs.remove(job_name);
                controller.shutdown();
                Err(e)
            }
        }
    }

    async fn rollout(&self, job_name: &str, targets: &[String]) -> Result<(), MasterError> {
        let archive = self.store.read_archive(job_name)?;
        for worker in targets {
            self.rpc
                .push_archive(worker, job_name, archive.clone())
                .await
                .map_err(|source| MasterError::PushFailed {
                    address: worker.clone(),
                    source,
                })?;
        }

        Barrier::new(
            targets.to_vec(),
            Arc::clone(&self.rpc),
            WorkerOp::Prepare(job_name.to_string()),
        )
        .run(true)
        .await?;

        Barrier::new(
            targets.to_vec(),
            Arc::clone(&self.rpc),
            WorkerOp::RunJob(job_name.to_string()),
        )
        .run(true)
        .await?;

        Ok(())
    }

    /// Tears a job down on its current worker set: `stop_job` barrier, then
    /// `clear_job` barrier, strictly in order.
    ///
    /// The job stays in the registry; completion detection and shutdown
    /// remove it after teardown.
    pub async fn stop_job(&self, job_name: &str) -> Result<(), MasterError> {
        let controller = self
            .jobs
            .get(job_name)
            .ok_or_else(|| MasterError::JobNotFound(job_name.to_string()))?;
        let targets = controller.workers();

        tracing::info!("Stopping job {} on {} worker(s)", job_name, targets.len());

        Barrier::new(
            targets.clone(),
            Arc::clone(&self.rpc),
            WorkerOp::StopJob(job_name.to_string()),
        )
        .run(true)
        .await?;

        Barrier::new(
            targets,
            Arc::clone(&self.rpc),
            WorkerOp::ClearJob(job_name.to_string()),
        )
        .run(true)
        .await?;

        Ok(())
    }

    /// Stops a job and removes it from the registry
    ///
    /// Teardown errors are logged but never block removal; a job whose
    /// workers are unreachable must still leave the running set.
    async fn retire_job(&self, job_name: &str) {
        if let Err(e) = self.stop_job(job_name).await {
            tracing::warn!("teardown of {} was incomplete: {}", job_name, e);
        }
        if let Some(controller) = self.jobs.remove(job_name) {
            controller.shutdown();
        }
    }

    // =============================================================================
    // Background loops
    // =============================================================================

    /// One pass of the worker liveness checker.
    ///
    /// The state machine itself runs under the registry lock inside
    /// `sweep`; the membership changes it reports are then applied with
    /// remote calls issued lock-free.
    pub async fn check_workers_once(&self, now: DateTime<Utc>) {
        let report = self.workers.sweep(
            now,
            self.config.heartbeat_check_interval,
            self.config.recovery_threshold,
        );

        for worker in &report.stopped {
            for controller in self.jobs.controllers() {
                controller.remove_worker(worker).await;
            }
        }

        // Every stable worker is reconciled against every running job, not
        // just the ones that transitioned this sweep: this is how a worker
        // that joined the cluster after a rollout gets assigned, and how
        // membership drift is repaired.
        for worker in &report.stable {
            for controller in self.jobs.controllers() {
                let job_name = controller.job_name();
                if controller.has_worker(worker) {
                    continue;
                }
                match self.rpc.has_job(worker).await {
                    Ok(true) => {}
                    Ok(false) => {
                        // The worker does not have the job loaded; load it
                        // before admitting the worker into the set.
                        match self.rpc.prepare(worker, job_name).await {
                            Ok(()) => {
                                if let Err(e) = self.rpc.run_job(worker, job_name).await {
                                    tracing::warn!(
                                        "run_job of {} on stable {} failed: {}",
                                        job_name,
                                        worker,
                                        e
                                    );
                                }
                            }
                            Err(e) => {
                                tracing::warn!(
                                    "prepare of {} on stable {} failed: {}",
                                    job_name,
                                    worker,
                                    e
                                );
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!("has_job on stable {} failed: {}", worker, e);
                    }
                }
                controller.add_worker(worker).await;
            }
        }
    }

    /// One pass of the job completion checker.
    ///
    /// The budget service is authoritative: once it reports all work
    /// finished, the job is torn down and removed.
    pub async fn check_jobs_once(&self) {
        for controller in self.jobs.controllers() {
            if controller.budget().status() == BudgetStatus::AllFinished {
                tracing::info!("Job {} finished its budget, retiring", controller.job_name());
                self.retire_job(controller.job_name()).await;
            }
        }
    }

    /// Starts the two background loops as independent long-running tasks
    /// sharing one cancellation token.
    ///
    /// Each loop re-checks the token before working and keeps its idle wait
    /// cancellable, so shutdown latency is bounded by the in-flight remote
    /// calls, not by the polling interval.
    pub fn run(self: &Arc<Self>) {
        {
            let mut lifecycle = self.lifecycle.lock().unwrap();
            if *lifecycle != Lifecycle::NotStarted {
                return;
            }
            *lifecycle = Lifecycle::Running;
        }

        let worker_loop = {
            let master = Arc::clone(self);
            let token = self.cancel.clone();
            let interval = self.config.heartbeat_check_interval;
            tokio::spawn(async move {
                while !token.is_cancelled() {
                    master.check_workers_once(Utc::now()).await;
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = tokio::time::sleep(interval) => {}
                    }
                }
                tracing::debug!("worker liveness loop exited");
            })
        };

        let job_loop = {
            let master = Arc::clone(self);
            let token = self.cancel.clone();
            let interval = self.config.job_check_interval;
            tokio::spawn(async move {
                while !token.is_cancelled() {
                    master.check_jobs_once().await;
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = tokio::time::sleep(interval) => {}
                    }
                }
                tracing::debug!("job completion loop exited");
            })
        };

        let mut handles = self.loop_handles.lock().unwrap();
        handles.push(worker_loop);
        handles.push(job_loop);

        tracing::info!("Master background loops started");
    }

    /// Drains and stops the master.
    ///
    /// Fail-soft end to end: every running job is torn down best-effort, a
    /// best-effort shutdown barrier reaches every known worker, then both
    /// loops are cancelled and joined. Idempotent, and a no-op if the loops
    /// never started.
    pub async fn shutdown(&self) {
        {
            let mut lifecycle = self.lifecycle.lock().unwrap();
            if *lifecycle != Lifecycle::Running {
                return;
            }
            *lifecycle = Lifecycle::Stopped;
        }

        tracing::info!("Master shutting down");

        if self.jobs.has_running_jobs() {
            let names = self.jobs.running_jobs();
            tracing::info!("Stopping {} running job(s)", names.len());
            for job_name in names {
                self.retire_job(&job_name).await;
            }
        }

        let everyone = self.workers.snapshot();
        if !everyone.is_empty() {
            // Best-effort broadcast; unreachable workers must not keep the
            // master from reaching its terminal state.
            let _ = Barrier::new(everyone, Arc::clone(&self.rpc), WorkerOp::Shutdown)
                .run(false)
                .await;
        }

        self.cancel.cancel();
        let handles = std::mem::take(&mut *self.loop_handles.lock().unwrap());
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("background loop panicked: {}", e);
            }
        }

        tracing::info!("Master shut down");
    }
}
