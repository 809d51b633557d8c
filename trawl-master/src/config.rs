//! Master configuration
//!
//! Defines all configurable parameters for the master including the
//! heartbeat timing contract, the job completion poll interval, and the
//! worker RPC timeout.

use std::path::PathBuf;
use std::time::Duration;

/// Master configuration
///
/// The heartbeat constants form the cluster timing protocol: workers
/// heartbeat every `heartbeat_interval`, the master sweeps liveness every
/// `heartbeat_check_interval` (three heartbeats), and a failed worker must
/// sustain `recovery_threshold` consecutive on-time heartbeats before it is
/// trusted as Running again.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the master's RPC surface binds to
    pub bind_addr: String,

    /// Deployment working directory; all master state lives under
    /// `<working_dir>/master/`
    pub working_dir: PathBuf,

    /// Interval at which workers send heartbeats
    pub heartbeat_interval: Duration,

    /// Interval at which the liveness checker sweeps the worker registry
    pub heartbeat_check_interval: Duration,

    /// Consecutive on-time heartbeats required before a failed worker is
    /// trusted as Running again
    pub recovery_threshold: u32,

    /// Interval at which running jobs are polled for completion
    pub job_check_interval: Duration,

    /// Timeout applied to every remote call against a worker
    pub rpc_timeout: Duration,
}

const DEFAULT_HEARTBEAT_SECS: u64 = 20;

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(bind_addr: String, working_dir: PathBuf) -> Self {
        Self {
            bind_addr,
            working_dir,
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            heartbeat_check_interval: Duration::from_secs(3 * DEFAULT_HEARTBEAT_SECS),
            recovery_threshold: 90,
            job_check_interval: Duration::from_secs(5),
            rpc_timeout: Duration::from_secs(30),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - MASTER_BIND_ADDR (optional, default: 0.0.0.0:9100)
    /// - TRAWL_WORKING_DIR (optional, default: ./data)
    /// - HEARTBEAT_INTERVAL (optional, seconds, default: 20; the check
    ///   interval is always three times this)
    /// - RECOVERY_THRESHOLD (optional, default: 90)
    /// - JOB_CHECK_INTERVAL (optional, seconds, default: 5)
    /// - RPC_TIMEOUT (optional, seconds, default: 30)
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("MASTER_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9100".to_string());

        let working_dir = std::env::var("TRAWL_WORKING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let heartbeat_secs = std::env::var("HEARTBEAT_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HEARTBEAT_SECS);

        let recovery_threshold = std::env::var("RECOVERY_THRESHOLD")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(90);

        let job_check_interval = std::env::var("JOB_CHECK_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(5));

        let rpc_timeout = std::env::var("RPC_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Ok(Self {
            bind_addr,
            working_dir,
            heartbeat_interval: Duration::from_secs(heartbeat_secs),
            heartbeat_check_interval: Duration::from_secs(3 * heartbeat_secs),
            recovery_threshold,
            job_check_interval,
            rpc_timeout,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.heartbeat_interval.as_secs() == 0 {
            anyhow::bail!("heartbeat_interval must be greater than 0");
        }

        if self.heartbeat_check_interval < self.heartbeat_interval {
            anyhow::bail!("heartbeat_check_interval must be at least heartbeat_interval");
        }

        if self.recovery_threshold == 0 {
            anyhow::bail!("recovery_threshold must be greater than 0");
        }

        if self.job_check_interval.as_secs() == 0 {
            anyhow::bail!("job_check_interval must be greater than 0");
        }

        if self.rpc_timeout.as_secs() == 0 {
            anyhow::bail!("rpc_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("0.0.0.0:9100".to_string(), PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.heartbeat_interval, Duration::from_secs(20));
        assert_eq!(config.heartbeat_check_interval, Duration::from_secs(60));
        assert_eq!(config.recovery_threshold, 90);
        assert_eq!(config.job_check_interval, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        // Empty bind address should fail
        config.bind_addr = String::new();
        assert!(config.validate().is_err());

        config.bind_addr = "0.0.0.0:9100".to_string();

        // Check interval shorter than heartbeat interval should fail
        config.heartbeat_check_interval = Duration::from_secs(1);
        assert!(config.validate().is_err());

        config.heartbeat_check_interval = Duration::from_secs(60);
        assert!(config.validate().is_ok());

        // Zero recovery threshold should fail
        config.recovery_threshold = 0;
        assert!(config.validate().is_err());
    }
}
