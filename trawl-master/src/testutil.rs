//! Test support
//!
//! A recording mock of the worker RPC contract. Every call appends a line
//! of the form `"<op> <address> [arg]"` so tests can assert exactly which
//! remote calls were issued and in what order. Individual operations can be
//! made to fail by name.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use trawl_client::error::{ClientError, Result};
use trawl_client::WorkerRpc;

pub struct MockRpc {
    calls: Mutex<Vec<String>>,
    has_job: AtomicBool,
    fail_ops: Mutex<HashSet<String>>,
}

impl MockRpc {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            has_job: AtomicBool::new(false),
            fail_ops: Mutex::new(HashSet::new()),
        }
    }

    /// Sets the answer every `has_job` call returns
    pub fn set_has_job(&self, value: bool) {
        self.has_job.store(value, Ordering::SeqCst);
    }

    /// Makes every call of the named operation fail
    pub fn fail_op(&self, op: &str) {
        self.fail_ops.lock().unwrap().insert(op.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Index of the first recorded call starting with `prefix`
    pub fn first_index_of(&self, prefix: &str) -> Option<usize> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .position(|c| c.starts_with(prefix))
    }

    /// Index of the last recorded call starting with `prefix`
    pub fn last_index_of(&self, prefix: &str) -> Option<usize> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rposition(|c| c.starts_with(prefix))
    }

    fn record(&self, op: &str, line: String) -> Result<()> {
        self.calls.lock().unwrap().push(line);
        if self.fail_ops.lock().unwrap().contains(op) {
            return Err(ClientError::worker_error(500, format!("injected {op} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl WorkerRpc for MockRpc {
    async fn has_job(&self, address: &str) -> Result<bool> {
        self.record("has_job", format!("has_job {address}"))?;
        Ok(self.has_job.load(Ordering::SeqCst))
    }

    async fn prepare(&self, address: &str, job_name: &str) -> Result<()> {
        self.record("prepare", format!("prepare {address} {job_name}"))
    }

    async fn run_job(&self, address: &str, job_name: &str) -> Result<()> {
        self.record("run_job", format!("run_job {address} {job_name}"))
    }

    async fn stop_job(&self, address: &str, job_name: &str) -> Result<()> {
        self.record("stop_job", format!("stop_job {address} {job_name}"))
    }

    async fn clear_job(&self, address: &str, job_name: &str) -> Result<()> {
        self.record("clear_job", format!("clear_job {address} {job_name}"))
    }

    async fn add_node(&self, address: &str, peer: &str) -> Result<()> {
        self.record("add_node", format!("add_node {address} {peer}"))
    }

    async fn remove_node(&self, address: &str, peer: &str) -> Result<()> {
        self.record("remove_node", format!("remove_node {address} {peer}"))
    }

    async fn shutdown(&self, address: &str) -> Result<()> {
        self.record("shutdown", format!("shutdown {address}"))
    }

    async fn push_archive(&self, address: &str, job_name: &str, _bytes: Vec<u8>) -> Result<()> {
        self.record("push_archive", format!("push_archive {address} {job_name}"))
    }
}
