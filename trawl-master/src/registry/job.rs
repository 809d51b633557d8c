//! Job Registry
//!
//! Per-job controllers and the map of currently running jobs.
//!
//! A `JobController` owns everything master-side that belongs to one job:
//! its tracker directory, the three resource-control services, and the set
//! of workers currently assigned to it. Membership changes are propagated
//! to the job's other workers so every node converges on the same view for
//! work partitioning.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use trawl_client::WorkerRpc;
use trawl_core::domain::job::JobDescription;

use crate::tracker::{BudgetService, CounterService, SpeedService};

/// Registering a job whose name is already running
#[derive(Debug, Error)]
#[error("job {0} is already running")]
pub struct JobAlreadyRunning(pub String);

/// Master-side aggregate for one running job
pub struct JobController {
    job_name: String,
    working_dir: PathBuf,
    description: JobDescription,
    counter: CounterService,
    budget: BudgetService,
    speed: SpeedService,
    workers: Mutex<Vec<String>>,
    rpc: Arc<dyn WorkerRpc>,
    active: AtomicBool,
}

impl JobController {
    /// Builds the controller for a job: allocates its tracker directory and
    /// starts the three resource-control services scoped to its namespace.
    ///
    /// `initial_workers` seeds the worker set; peers are not notified for
    /// the seed members since the rollout barriers reach all of them anyway.
    pub fn new(
        tracker_root: &Path,
        description: JobDescription,
        rpc: Arc<dyn WorkerRpc>,
        initial_workers: Vec<String>,
    ) -> io::Result<Self> {
        let working_dir = tracker_root.join(&description.name);
        std::fs::create_dir_all(&working_dir)?;

        let counter = CounterService::new(&working_dir, &description.settings)?;
        let budget = BudgetService::new(&working_dir, &description.settings)?;
        let speed = SpeedService::new(&working_dir, &description.settings)?;

        Ok(Self {
            job_name: description.name.clone(),
            working_dir,
            description,
            counter,
            budget,
            speed,
            workers: Mutex::new(initial_workers),
            rpc,
            active: AtomicBool::new(true),
        })
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn description(&self) -> &JobDescription {
        &self.description
    }

    pub fn counter(&self) -> &CounterService {
        &self.counter
    }

    pub fn budget(&self) -> &BudgetService {
        &self.budget
    }

    pub fn speed(&self) -> &SpeedService {
        &self.speed
    }

    /// Current worker membership of this job
    pub fn workers(&self) -> Vec<String> {
        self.workers.lock().unwrap().clone()
    }

    pub fn has_worker(&self, worker: &str) -> bool {
        self.workers
            .lock()
            .unwrap()
            .iter()
            .any(|w| w == worker)
    }

    /// Adds a worker to this job's membership.
    ///
    /// Idempotent. Every worker already in the set is told about the new
    /// peer first (`add_node`), matching the ordering workers expect when
    /// repartitioning. Notification failures are logged; the new worker is
    /// admitted regardless.
    pub async fn add_worker(&self, worker: &str) {
        let peers = {
            let members = self.workers.lock().unwrap();
            if members.iter().any(|w| w == worker) {
                return;
            }
            members.clone()
        };

        for peer in &peers {
            if let Err(e) = self.rpc.add_node(peer, worker).await {
                tracing::warn!(
                    "failed to notify {} of new worker {} for job {}: {}",
                    peer,
                    worker,
                    self.job_name,
                    e
                );
            }
        }

        let mut members = self.workers.lock().unwrap();
        if !members.iter().any(|w| w == worker) {
            members.push(worker.to_string());
        }
    }

    /// Removes a worker from this job's membership.
    ///
    /// Idempotent. The worker is dropped from the set first, then every
    /// remaining member is told to forget it (`remove_node`).
    pub async fn remove_worker(&self, worker: &str) {
        let remaining = {
            let mut members = self.workers.lock().unwrap();
            let Some(pos) = members.iter().position(|w| w == worker) else {
                return;
            };
            members.remove(pos);
            members.clone()
        };

        for peer in &remaining {
            if let Err(e) = self.rpc.remove_node(peer, worker).await {
                tracing::warn!(
                    "failed to notify {} of removed worker {} for job {}: {}",
                    peer,
                    worker,
                    self.job_name,
                    e
                );
            }
        }
    }

    /// Shuts the controller's resource services down. Idempotent.
    pub fn shutdown(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.counter.shutdown();
            self.budget.shutdown();
            self.speed.shutdown();
            tracing::info!("Job controller for {} shut down", self.job_name);
        }
    }
}

/// Map of currently running jobs
///
/// Presence in the registry is what "running" means; `register` and
/// `remove` are the only lifecycle mutations.
pub struct JobRegistry {
    jobs: Mutex<HashMap<String, Arc<JobController>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a controller under its job name. Exactly one controller
    /// may exist per name; duplicates are rejected.
    pub fn register(&self, controller: Arc<JobController>) -> Result<(), JobAlreadyRunning> {
        let mut jobs = self.jobs.lock().unwrap();
        let name = controller.job_name().to_string();
        if jobs.contains_key(&name) {
            return Err(JobAlreadyRunning(name));
        }
        jobs.insert(name, controller);
        Ok(())
    }

    /// Removes a job, returning its controller for teardown
    pub fn remove(&self, job_name: &str) -> Option<Arc<JobController>> {
        self.jobs.lock().unwrap().remove(job_name)
    }

    pub fn get(&self, job_name: &str) -> Option<Arc<JobController>> {
        self.jobs.lock().unwrap().get(job_name).cloned()
    }

    /// Owned snapshot of every running job's controller
    pub fn controllers(&self) -> Vec<Arc<JobController>> {
        self.jobs.lock().unwrap().values().cloned().collect()
    }

    /// Names of all currently running jobs
    pub fn running_jobs(&self) -> Vec<String> {
        self.jobs.lock().unwrap().keys().cloned().collect()
    }

    pub fn has_running_jobs(&self) -> bool {
        !self.jobs.lock().unwrap().is_empty()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockRpc;
    use trawl_core::domain::job::JobSettings;

    fn description(name: &str) -> JobDescription {
        JobDescription {
            name: name.to_string(),
            settings: JobSettings::default(),
        }
    }

    fn controller(rpc: Arc<MockRpc>, workers: &[&str]) -> (tempfile::TempDir, JobController) {
        let tmp = tempfile::tempdir().unwrap();
        let ctl = JobController::new(
            tmp.path(),
            description("crawl1"),
            rpc,
            workers.iter().map(|w| w.to_string()).collect(),
        )
        .unwrap();
        (tmp, ctl)
    }

    #[tokio::test]
    async fn test_add_worker_notifies_existing_members_only() {
        let rpc = Arc::new(MockRpc::new());
        let (_tmp, ctl) = controller(rpc.clone(), &["a:1", "b:1"]);

        ctl.add_worker("c:1").await;

        assert!(ctl.has_worker("c:1"));
        assert_eq!(
            rpc.calls(),
            vec!["add_node a:1 c:1".to_string(), "add_node b:1 c:1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_add_worker_is_idempotent() {
        let rpc = Arc::new(MockRpc::new());
        let (_tmp, ctl) = controller(rpc.clone(), &["a:1"]);

        ctl.add_worker("a:1").await;

        assert_eq!(ctl.workers(), vec!["a:1".to_string()]);
        assert!(rpc.calls().is_empty());
    }

    #[tokio::test]
    async fn test_remove_worker_notifies_remaining_members() {
        let rpc = Arc::new(MockRpc::new());
        let (_tmp, ctl) = controller(rpc.clone(), &["a:1", "b:1", "c:1"]);

        ctl.remove_worker("b:1").await;

        assert!(!ctl.has_worker("b:1"));
        assert_eq!(
            rpc.calls(),
            vec![
                "remove_node a:1 b:1".to_string(),
                "remove_node c:1 b:1".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_remove_unknown_worker_is_a_no_op() {
        let rpc = Arc::new(MockRpc::new());
        let (_tmp, ctl) = controller(rpc.clone(), &["a:1"]);

        ctl.remove_worker("z:1").await;

        assert_eq!(ctl.workers(), vec!["a:1".to_string()]);
        assert!(rpc.calls().is_empty());
    }

    #[tokio::test]
    async fn test_registry_rejects_duplicate_names() {
        let rpc = Arc::new(MockRpc::new());
        let registry = JobRegistry::new();
        let (_tmp1, ctl1) = controller(rpc.clone(), &[]);
        let (_tmp2, ctl2) = controller(rpc, &[]);

        registry.register(Arc::new(ctl1)).unwrap();
        assert!(registry.register(Arc::new(ctl2)).is_err());
        assert_eq!(registry.running_jobs(), vec!["crawl1".to_string()]);
    }

    #[tokio::test]
    async fn test_registry_remove_returns_controller() {
        let rpc = Arc::new(MockRpc::new());
        let registry = JobRegistry::new();
        let (_tmp, ctl) = controller(rpc, &["a:1"]);
        registry.register(Arc::new(ctl)).unwrap();

        let removed = registry.remove("crawl1").unwrap();
        assert_eq!(removed.job_name(), "crawl1");
        assert!(!registry.has_running_jobs());
        assert!(registry.remove("crawl1").is_none());
    }
}
