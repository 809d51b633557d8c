//! Job Store
//!
//! Filesystem layout for job packages and descriptions under the master's
//! working directory:
//!
//! - `master/zip/<job>.zip` — received job archives
//! - `master/jobs/<job>/` — extracted job code, including `job.json`
//! - `master/tracker/<job>/` — per-job resource-control state
//!
//! Extraction and description loading sit at the edge of the core: the
//! archive format and the job code itself stay opaque to orchestration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use trawl_core::domain::job::JobDescription;
use zip::ZipArchive;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("no job package uploaded for {0}")]
    PackageMissing(String),

    #[error("no job description found for {0}")]
    DescriptionMissing(String),

    #[error("invalid job description for {name}: {reason}")]
    InvalidDescription { name: String, reason: String },
}

/// Filesystem store for job packages, code, and tracker state
pub struct JobStore {
    zip_dir: PathBuf,
    job_dir: PathBuf,
    tracker_dir: PathBuf,
}

impl JobStore {
    /// Creates the store, allocating the master directory layout
    pub fn new(working_dir: &Path) -> io::Result<Self> {
        let master_dir = working_dir.join("master");
        let zip_dir = master_dir.join("zip");
        let job_dir = master_dir.join("jobs");
        let tracker_dir = master_dir.join("tracker");

        fs::create_dir_all(&zip_dir)?;
        fs::create_dir_all(&job_dir)?;
        fs::create_dir_all(&tracker_dir)?;

        Ok(Self {
            zip_dir,
            job_dir,
            tracker_dir,
        })
    }

    /// Root directory for per-job resource-control state
    pub fn tracker_dir(&self) -> &Path {
        &self.tracker_dir
    }

    /// Path the archive for a job is expected at
    pub fn zip_path(&self, job_name: &str) -> PathBuf {
        self.zip_dir.join(format!("{job_name}.zip"))
    }

    /// Extracts a job's archive into the jobs directory.
    ///
    /// A missing archive is a no-op: the job code may already have been
    /// extracted by an earlier run.
    pub fn unzip(&self, job_name: &str) -> Result<(), StoreError> {
        let zip_path = self.zip_path(job_name);
        if !zip_path.exists() {
            tracing::debug!("no archive at {:?}, skipping extraction", zip_path);
            return Ok(());
        }

        tracing::info!("Extracting {:?} into {:?}", zip_path, self.job_dir);
        let file = fs::File::open(&zip_path)?;
        let mut archive = ZipArchive::new(file)?;
        archive.extract(&self.job_dir)?;
        Ok(())
    }

    /// Loads and validates the description of an extracted job
    pub fn load_description(&self, job_name: &str) -> Result<JobDescription, StoreError> {
        let path = self.job_dir.join(job_name).join("job.json");
        if !path.exists() {
            return Err(StoreError::DescriptionMissing(job_name.to_string()));
        }

        let contents = fs::read_to_string(&path)?;
        let description: JobDescription =
            serde_json::from_str(&contents).map_err(|e| StoreError::InvalidDescription {
                name: job_name.to_string(),
                reason: e.to_string(),
            })?;

        description
            .validate()
            .map_err(|reason| StoreError::InvalidDescription {
                name: job_name.to_string(),
                reason,
            })?;

        Ok(description)
    }

    /// Reads a job's archive for pushing to workers
    pub fn read_archive(&self, job_name: &str) -> Result<Vec<u8>, StoreError> {
        let zip_path = self.zip_path(job_name);
        match fs::read(&zip_path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::PackageMissing(job_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn store() -> (tempfile::TempDir, JobStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = JobStore::new(tmp.path()).unwrap();
        (tmp, store)
    }

    fn write_description(store: &JobStore, job_name: &str, contents: &str) {
        let dir = store.job_dir.join(job_name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("job.json"), contents).unwrap();
    }

    #[test]
    fn test_new_creates_layout() {
        let (tmp, store) = store();
        assert!(tmp.path().join("master/zip").is_dir());
        assert!(tmp.path().join("master/jobs").is_dir());
        assert!(store.tracker_dir().is_dir());
    }

    #[test]
    fn test_load_description() {
        let (_tmp, store) = store();
        write_description(
            &store,
            "crawl1",
            r#"{"name": "crawl1", "settings": {"instances": 2, "budget": 1000}}"#,
        );

        let desc = store.load_description("crawl1").unwrap();
        assert_eq!(desc.name, "crawl1");
        assert_eq!(desc.settings.instances, 2);
        assert_eq!(desc.settings.budget, 1000);
    }

    #[test]
    fn test_load_description_missing() {
        let (_tmp, store) = store();
        assert!(matches!(
            store.load_description("nope"),
            Err(StoreError::DescriptionMissing(_))
        ));
    }

    #[test]
    fn test_load_description_invalid() {
        let (_tmp, store) = store();
        write_description(&store, "crawl1", r#"{"name": ""}"#);

        assert!(matches!(
            store.load_description("crawl1"),
            Err(StoreError::InvalidDescription { .. })
        ));
    }

    #[test]
    fn test_unzip_missing_archive_is_noop() {
        let (_tmp, store) = store();
        assert!(store.unzip("crawl1").is_ok());
    }

    #[test]
    fn test_unzip_extracts_job_code() {
        let (_tmp, store) = store();

        let file = fs::File::create(store.zip_path("crawl1")).unwrap();
        let mut writer = ZipWriter::new(file);
        writer
            .start_file("crawl1/job.json", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(br#"{"name": "crawl1"}"#).unwrap();
        writer.finish().unwrap();

        store.unzip("crawl1").unwrap();

        let desc = store.load_description("crawl1").unwrap();
        assert_eq!(desc.name, "crawl1");
    }

    #[test]
    fn test_read_archive() {
        let (_tmp, store) = store();
        fs::write(store.zip_path("crawl1"), b"package-bytes").unwrap();

        assert_eq!(store.read_archive("crawl1").unwrap(), b"package-bytes");
        assert!(matches!(
            store.read_archive("nope"),
            Err(StoreError::PackageMissing(_))
        ));
    }
}
