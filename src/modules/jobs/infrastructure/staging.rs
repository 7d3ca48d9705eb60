/// On-disk staging of uploaded files
///
/// Every upload is written to a unique path inside the staging directory,
/// collision-avoided by prefixing the launch timestamp to the original name.
/// The timestamp doubles as the identifying launch-time job parameter.
use crate::log_info;
use crate::shared::errors::{AppError, AppResult};
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct StagedFile {
    pub path: PathBuf,
    pub launch_time: i64,
}

#[derive(Debug, Clone)]
pub struct FileStagingArea {
    directory: PathBuf,
}

impl FileStagingArea {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &PathBuf {
        &self.directory
    }

    fn ensure_directory(&self) -> AppResult<()> {
        fs::create_dir_all(&self.directory).map_err(|e| {
            AppError::IoError(format!(
                "Failed to create upload directory '{}': {}",
                self.directory.display(),
                e
            ))
        })
    }

    /// Stage an upload, returning its unique path plus the launch timestamp
    pub fn stage(&self, original_name: &str, contents: &[u8]) -> AppResult<StagedFile> {
        self.ensure_directory()?;

        let name = if original_name.trim().is_empty() {
            "uploaded_file"
        } else {
            original_name
        };
        let launch_time = Utc::now().timestamp_millis();
        let path = self.directory.join(format!("{}_{}", launch_time, name));

        fs::write(&path, contents).map_err(|e| {
            AppError::IoError(format!("Failed to stage '{}': {}", path.display(), e))
        })?;

        log_info!("Staged upload at {}", path.display());
        Ok(StagedFile { path, launch_time })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_writes_contents_under_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let staging = FileStagingArea::new(dir.path());

        let staged = staging.stage("results.csv", b"header\nS1,Math,95\n").unwrap();
        let file_name = staged.path.file_name().unwrap().to_str().unwrap();

        assert!(file_name.ends_with("_results.csv"));
        assert!(file_name.starts_with(&staged.launch_time.to_string()));
        assert_eq!(
            fs::read_to_string(&staged.path).unwrap(),
            "header\nS1,Math,95\n"
        );
    }

    #[test]
    fn test_blank_original_name_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let staging = FileStagingArea::new(dir.path());

        let staged = staging.stage("  ", b"data").unwrap();
        let file_name = staged.path.file_name().unwrap().to_str().unwrap();
        assert!(file_name.ends_with("_uploaded_file"));
    }

    #[test]
    fn test_missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("uploads").join("batch");
        let staging = FileStagingArea::new(&nested);

        staging.stage("a.csv", b"x").unwrap();
        assert!(nested.exists());
    }
}
