//! Job domain types

use serde::{Deserialize, Serialize};

/// Description of a crawl job
///
/// Loaded from `job.json` inside the extracted job package. The task
/// definition itself (seed URLs, parsers, crawl code) is opaque to the
/// master; only the settings drive orchestration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescription {
    /// Unique job name, doubles as the package and directory name
    pub name: String,

    /// Orchestration settings for this job
    #[serde(default)]
    pub settings: JobSettings,
}

/// Per-job orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSettings {
    /// Number of crawl instances each worker runs for this job
    #[serde(default = "default_instances")]
    pub instances: u32,

    /// Total work-unit budget for the job, 0 means unbounded
    #[serde(default)]
    pub budget: u64,

    /// Optional per-worker request rate cap (requests per second)
    #[serde(default)]
    pub max_rate: Option<u32>,
}

fn default_instances() -> u32 {
    1
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            instances: default_instances(),
            budget: 0,
            max_rate: None,
        }
    }
}

impl JobDescription {
    /// Validates the description after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("job name cannot be empty".to_string());
        }
        if self.settings.instances == 0 {
            return Err("instances must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Status reported by a job's budget service
///
/// The budget subsystem owns work-unit accounting; the master only consumes
/// its terminal signal to drive job teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetStatus {
    /// Work units remain outstanding
    InProgress,

    /// Every work unit has been applied and finished
    AllFinished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let desc: JobDescription = serde_json::from_str(r#"{"name": "crawl1"}"#).unwrap();
        assert_eq!(desc.settings.instances, 1);
        assert_eq!(desc.settings.budget, 0);
        assert!(desc.settings.max_rate.is_none());
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let desc = JobDescription {
            name: "  ".to_string(),
            settings: JobSettings::default(),
        };
        assert!(desc.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_instances() {
        let desc = JobDescription {
            name: "crawl1".to_string(),
            settings: JobSettings {
                instances: 0,
                ..JobSettings::default()
            },
        };
        assert!(desc.validate().is_err());
    }
}
