//! Worker Registry
//!
//! Liveness ledger for the cluster: worker address -> heartbeat record,
//! plus the black list of workers currently considered failed.
//!
//! Heartbeat RPC handlers and the liveness checker loop mutate the same
//! entries concurrently, so every operation takes the registry lock and
//! returns owned data. The liveness sweep itself runs entirely under the
//! lock and only reports which workers changed state; the remote calls
//! those transitions require happen afterwards, lock-free, in the caller.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use trawl_core::domain::worker::{WorkerInfo, WorkerStatus};

/// State transitions produced by one liveness sweep
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Workers that escalated Hangup -> Stopped this sweep
    pub stopped: Vec<String>,

    /// Workers at or above the stability threshold this sweep, whether
    /// they just recovered or have been Running all along. Membership
    /// repair runs off this list every sweep, so a worker that joined the
    /// cluster after a rollout still gets assigned to running jobs.
    pub stable: Vec<String>,
}

struct Inner {
    workers: HashMap<String, WorkerInfo>,
    /// Addresses currently Stopped; consulted for job assignment, cleared
    /// only on recovery. Entries in `workers` are never deleted.
    black_list: HashSet<String>,
}

/// Liveness ledger for all known workers
pub struct WorkerRegistry {
    inner: Mutex<Inner>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                workers: HashMap::new(),
                black_list: HashSet::new(),
            }),
        }
    }

    /// Records a heartbeat from a worker.
    ///
    /// Idempotent upsert: first heartbeat creates the entry, subsequent
    /// ones bump the consecutive count and refresh the timestamp. The
    /// timestamp never moves backwards even if sweeps and heartbeats race.
    pub fn register(&self, address: &str, now: DateTime<Utc>) {
        let mut inner = self.inner.lock().unwrap();
        match inner.workers.get_mut(address) {
            Some(info) => {
                info.consecutive_count += 1;
                if now > info.last_heartbeat {
                    info.last_heartbeat = now;
                }
            }
            None => {
                tracing::info!("Worker joined: {}", address);
                inner
                    .workers
                    .insert(address.to_string(), WorkerInfo::new(address, now));
            }
        }
    }

    /// Returns the current set of known worker addresses
    pub fn snapshot(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.workers.keys().cloned().collect()
    }

    /// Known workers eligible for job assignment (not black-listed)
    pub fn assignable(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .workers
            .keys()
            .filter(|addr| !inner.black_list.contains(*addr))
            .cloned()
            .collect()
    }

    /// Returns owned copies of every worker record
    pub fn infos(&self) -> Vec<WorkerInfo> {
        let inner = self.inner.lock().unwrap();
        inner.workers.values().cloned().collect()
    }

    /// Current status of a worker, if known
    pub fn status(&self, address: &str) -> Option<WorkerStatus> {
        let inner = self.inner.lock().unwrap();
        inner.workers.get(address).map(|info| info.status)
    }

    /// Whether a worker is currently black-listed
    pub fn is_black_listed(&self, address: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.black_list.contains(address)
    }

    /// Runs one pass of the liveness state machine over every entry.
    ///
    /// A heartbeat gap longer than `check_interval` resets the consecutive
    /// count and escalates one level: Running -> Hangup, Hangup -> Stopped
    /// (black-listed). A worker that has heartbeated on time at least
    /// `recovery_threshold` times in a row is trusted as Running again and
    /// taken off the black list. Escalation never skips Hangup; recovery
    /// only happens through the stability threshold.
    ///
    /// Every worker meeting the threshold is reported as stable, already-
    /// Running ones included: the caller re-checks their job membership on
    /// each sweep. Transitions are applied to the live entries under the
    /// lock; the report tells the caller which workers need
    /// job-membership updates.
    pub fn sweep(
        &self,
        now: DateTime<Utc>,
        check_interval: Duration,
        recovery_threshold: u32,
    ) -> SweepReport {
        let mut report = SweepReport::default();
        let mut inner = self.inner.lock().unwrap();
        let Inner {
            workers,
            black_list,
        } = &mut *inner;

        for (address, info) in workers.iter_mut() {
            let gap = now - info.last_heartbeat;
            if gap.num_seconds() > check_interval.as_secs() as i64 {
                info.consecutive_count = 0;
                match info.status {
                    WorkerStatus::Running => {
                        tracing::warn!("Worker {} missed a check window, now Hangup", address);
                        info.status = WorkerStatus::Hangup;
                    }
                    WorkerStatus::Hangup => {
                        tracing::warn!("Worker {} missed two check windows, now Stopped", address);
                        info.status = WorkerStatus::Stopped;
                        black_list.insert(address.clone());
                        report.stopped.push(address.clone());
                    }
                    WorkerStatus::Stopped => {}
                }
            } else if info.consecutive_count >= recovery_threshold {
                if info.status != WorkerStatus::Running {
                    tracing::info!(
                        "Worker {} stable for {} heartbeats, trusted as Running again",
                        address,
                        info.consecutive_count
                    );
                    info.status = WorkerStatus::Running;
                    black_list.remove(address);
                }
                report.stable.push(address.clone());
            }
        }

        report
    }
}

impl Default for WorkerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
