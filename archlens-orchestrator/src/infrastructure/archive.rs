//! Archive extraction into a per-project workspace.
//!
//! Lays out `{work_dir}/{project_id}/source` and `/output`, stores the
//! uploaded zip next to them, and unpacks into the source tree. Entries
//! escaping the target directory are skipped. Corrupt archives are a
//! permanent failure: retrying an unreadable archive cannot succeed.

use std::fs;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Source and output directories for one run
#[derive(Debug, Clone)]
pub struct ProjectWorkspace {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    work_dir: PathBuf,
}

impl ArchiveExtractor {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// Unpack the uploaded archive into a fresh project workspace.
    pub fn extract(
        &self,
        project_id: &str,
        data: &[u8],
    ) -> Result<ProjectWorkspace, ExtractionError> {
        if project_id.is_empty()
            || project_id.contains(['/', '\\'])
            || project_id == "."
            || project_id == ".."
        {
            return Err(ExtractionError::InvalidProjectId(project_id.to_string()));
        }

        let project_dir = self.work_dir.join(project_id);
        let source_dir = project_dir.join("source");
        let output_dir = project_dir.join("output");
        fs::create_dir_all(&source_dir)?;
        fs::create_dir_all(&output_dir)?;

        let zip_path = project_dir.join(format!("{}.zip", project_id));
        fs::write(&zip_path, data)?;
        debug!(path = %zip_path.display(), bytes = data.len(), "Archive stored");

        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut extracted = 0usize;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let relative = match entry.enclosed_name() {
                Some(path) => path.to_owned(),
                None => {
                    warn!(entry = %entry.name(), "Skipping archive entry escaping the target");
                    continue;
                }
            };

            let target = source_dir.join(relative);
            if entry.is_dir() {
                fs::create_dir_all(&target)?;
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;
            fs::write(&target, contents)?;
            extracted += 1;
        }

        info!(project_id, files = extracted, "Archive extracted");

        Ok(ProjectWorkspace {
            source_dir,
            output_dir,
        })
    }

    /// Remove project workspaces whose content is older than `max_age`.
    /// Returns the number of workspaces removed.
    pub fn cleanup_older_than(&self, max_age: Duration) -> Result<usize, std::io::Error> {
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let mut removed = 0usize;

        let entries = match fs::read_dir(&self.work_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            if modified < cutoff {
                if let Err(e) = fs::remove_dir_all(entry.path()) {
                    warn!(path = %entry.path().display(), error = %e, "Failed to remove stale workspace");
                } else {
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            info!(removed, "Stale project workspaces cleaned up");
        }
        Ok(removed)
    }
}

/// Extraction failures; permanent from the retry policy's viewpoint
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt or unreadable archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid project identifier: {0}")]
    InvalidProjectId(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn sample_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(*name, FileOptions::default())
                .expect("start file");
            writer.write_all(content.as_bytes()).expect("write entry");
        }
        writer.finish().expect("finish zip").into_inner()
    }

    #[test]
    fn extracts_into_source_and_output_layout() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = ArchiveExtractor::new(dir.path());
        let data = sample_zip(&[("src/App.java", "public class App {}")]);

        let workspace = extractor.extract("p1", &data).expect("extract");
        assert!(workspace.source_dir.join("src/App.java").exists());
        assert!(workspace.output_dir.exists());
        assert!(dir.path().join("p1/p1.zip").exists());
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = ArchiveExtractor::new(dir.path());
        assert!(matches!(
            extractor.extract("p1", b"definitely not a zip"),
            Err(ExtractionError::Archive(_))
        ));
    }

    #[test]
    fn project_id_with_separators_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = ArchiveExtractor::new(dir.path());
        assert!(matches!(
            extractor.extract("../escape", b""),
            Err(ExtractionError::InvalidProjectId(_))
        ));
    }

    #[test]
    fn cleanup_ignores_fresh_workspaces() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = ArchiveExtractor::new(dir.path());
        let data = sample_zip(&[("A.java", "class A {}")]);
        extractor.extract("fresh", &data).unwrap();

        let removed = extractor
            .cleanup_older_than(Duration::from_secs(3600))
            .unwrap();
        assert_eq!(removed, 0);
        assert!(dir.path().join("fresh").exists());
    }
}
