//! Per-job resource-control service handles
//!
//! Each running job owns three resource-control services scoped to its
//! namespace under `master/tracker/<job>/`: request counting, budget/quota
//! accounting, and rate control. Their internal accounting algorithms are
//! independent subsystems; the master only constructs them, polls the
//! budget status, and shuts them down with the job.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use trawl_core::domain::job::{BudgetStatus, JobSettings};

/// Request-counter service handle for one job
pub struct CounterService {
    dir: PathBuf,
}

impl CounterService {
    pub fn new(job_dir: &Path, _settings: &JobSettings) -> io::Result<Self> {
        let dir = job_dir.join("counter");
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn shutdown(&self) {
        tracing::debug!("counter service for {:?} shut down", self.dir);
    }
}

/// Budget/quota accounting service handle for one job
///
/// Authoritative for job completion: once it reports `AllFinished`, the
/// master tears the job down. The status is driven by the budget subsystem
/// as workers apply and finish work units.
pub struct BudgetService {
    dir: PathBuf,
    status: Mutex<BudgetStatus>,
}

impl BudgetService {
    pub fn new(job_dir: &Path, _settings: &JobSettings) -> io::Result<Self> {
        let dir = job_dir.join("budget");
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            status: Mutex::new(BudgetStatus::InProgress),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Current accounting status
    pub fn status(&self) -> BudgetStatus {
        *self.status.lock().unwrap()
    }

    /// Records a status change from the budget subsystem
    pub fn set_status(&self, status: BudgetStatus) {
        *self.status.lock().unwrap() = status;
    }

    pub fn shutdown(&self) {
        tracing::debug!("budget service for {:?} shut down", self.dir);
    }
}

/// Rate-control service handle for one job
pub struct SpeedService {
    dir: PathBuf,
}

impl SpeedService {
    pub fn new(job_dir: &Path, _settings: &JobSettings) -> io::Result<Self> {
        let dir = job_dir.join("speed");
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn shutdown(&self) {
        tracing::debug!("speed service for {:?} shut down", self.dir);
    }
}
