//! Barrier
//!
//! One-shot synchronization over a fixed set of worker nodes: invoke one
//! operation on every target and block until all of them have responded or
//! failed. The barrier guarantees phase ordering for its caller (when `run`
//! returns, every target is done) but no atomicity across nodes: it never
//! rolls back state already applied on targets that succeeded. Call sites
//! decide whether a partial failure aborts (rollout phases) or is merely
//! logged (best-effort broadcasts).

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinSet;
use trawl_client::{ClientError, WorkerRpc};

/// Operation a barrier invokes on its targets
#[derive(Debug, Clone)]
pub enum WorkerOp {
    Prepare(String),
    RunJob(String),
    StopJob(String),
    ClearJob(String),
    Shutdown,
}

impl WorkerOp {
    pub fn name(&self) -> &'static str {
        match self {
            WorkerOp::Prepare(_) => "prepare",
            WorkerOp::RunJob(_) => "run_job",
            WorkerOp::StopJob(_) => "stop_job",
            WorkerOp::ClearJob(_) => "clear_job",
            WorkerOp::Shutdown => "shutdown",
        }
    }

    async fn invoke(&self, rpc: &dyn WorkerRpc, target: &str) -> Result<(), ClientError> {
        match self {
            WorkerOp::Prepare(job) => rpc.prepare(target, job).await,
            WorkerOp::RunJob(job) => rpc.run_job(target, job).await,
            WorkerOp::StopJob(job) => rpc.stop_job(target, job).await,
            WorkerOp::ClearJob(job) => rpc.clear_job(target, job).await,
            WorkerOp::Shutdown => rpc.shutdown(target).await,
        }
    }
}

/// Per-target results of one barrier run
#[derive(Debug, Default)]
pub struct BarrierOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, ClientError)>,
}

impl BarrierOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum BarrierError {
    /// One or more targets failed the operation
    #[error("{op} barrier incomplete: {} of {total} target(s) failed ({})", failed.len(), failed.join(", "))]
    Incomplete {
        op: &'static str,
        total: usize,
        failed: Vec<String>,
    },
}

/// A one-shot synchronized multi-node call
pub struct Barrier {
    targets: Vec<String>,
    rpc: Arc<dyn WorkerRpc>,
    op: WorkerOp,
}

impl Barrier {
    pub fn new(targets: Vec<String>, rpc: Arc<dyn WorkerRpc>, op: WorkerOp) -> Self {
        Self { targets, rpc, op }
    }

    /// Invokes the operation on every target concurrently and waits for all
    /// of them to resolve.
    ///
    /// With `wait_for_all` the barrier demands a complete pass: any failed
    /// target turns into `BarrierError::Incomplete`. Without it, failures
    /// are logged and reported in the outcome but the barrier still
    /// succeeds — the policy for best-effort phases like the global
    /// shutdown broadcast.
    ///
    /// Per-call timeouts come from the transport, so a hung target counts
    /// as failed instead of stalling the barrier.
    pub async fn run(&self, wait_for_all: bool) -> Result<BarrierOutcome, BarrierError> {
        tracing::debug!(
            "running {} barrier over {} target(s)",
            self.op.name(),
            self.targets.len()
        );

        let mut tasks = JoinSet::new();
        for target in &self.targets {
            let rpc = Arc::clone(&self.rpc);
            let op = self.op.clone();
            let target = target.clone();
            tasks.spawn(async move {
                let result = op.invoke(rpc.as_ref(), &target).await;
                (target, result)
            });
        }

        let mut outcome = BarrierOutcome::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((target, Ok(()))) => outcome.succeeded.push(target),
                Ok((target, Err(e))) => {
                    tracing::warn!("{} failed on {}: {}", self.op.name(), target, e);
                    outcome.failed.push((target, e));
                }
                Err(e) => {
                    tracing::error!("{} barrier task panicked: {}", self.op.name(), e);
                    outcome.failed.push((
                        "<task>".to_string(),
                        ClientError::worker_error(0, e.to_string()),
                    ));
                }
            }
        }

        if wait_for_all && !outcome.is_complete() {
            return Err(BarrierError::Incomplete {
                op: self.op.name(),
                total: self.targets.len(),
                failed: outcome.failed.iter().map(|(t, _)| t.clone()).collect(),
            });
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockRpc;

    fn targets(addrs: &[&str]) -> Vec<String> {
        addrs.iter().map(|a| a.to_string()).collect()
    }

    #[tokio::test]
    async fn test_barrier_reaches_every_target() {
        let rpc = Arc::new(MockRpc::new());
        let barrier = Barrier::new(
            targets(&["a:1", "b:1", "c:1"]),
            rpc.clone(),
            WorkerOp::Prepare("crawl1".to_string()),
        );

        let outcome = barrier.run(true).await.unwrap();

        assert_eq!(outcome.succeeded.len(), 3);
        assert!(outcome.is_complete());
        let mut calls = rpc.calls();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                "prepare a:1 crawl1".to_string(),
                "prepare b:1 crawl1".to_string(),
                "prepare c:1 crawl1".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_strict_barrier_fails_on_partial_failure() {
        let rpc = Arc::new(MockRpc::new());
        rpc.fail_op("prepare");
        let barrier = Barrier::new(
            targets(&["a:1", "b:1"]),
            rpc,
            WorkerOp::Prepare("crawl1".to_string()),
        );

        let err = barrier.run(true).await.unwrap_err();
        match err {
            BarrierError::Incomplete { op, total, failed } => {
                assert_eq!(op, "prepare");
                assert_eq!(total, 2);
                assert_eq!(failed.len(), 2);
            }
        }
    }

    #[tokio::test]
    async fn test_best_effort_barrier_tolerates_failures() {
        let rpc = Arc::new(MockRpc::new());
        rpc.fail_op("shutdown");
        let barrier = Barrier::new(targets(&["a:1", "b:1"]), rpc.clone(), WorkerOp::Shutdown);

        let outcome = barrier.run(false).await.unwrap();

        assert_eq!(outcome.failed.len(), 2);
        assert!(!outcome.is_complete());
        // Both targets were still attempted
        assert_eq!(rpc.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_target_set_completes_immediately() {
        let rpc = Arc::new(MockRpc::new());
        let barrier = Barrier::new(Vec::new(), rpc, WorkerOp::StopJob("crawl1".to_string()));

        let outcome = barrier.run(true).await.unwrap();
        assert!(outcome.succeeded.is_empty());
        assert!(outcome.is_complete());
    }
}
