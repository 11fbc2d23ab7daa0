//! Project file collection.
//!
//! Walks the extracted source tree and yields one record per analyzable
//! file, filtering build artifacts, binaries, and oversized files. Build
//! and config descriptors are always collected regardless of extension
//! rules. Read errors skip the file with a warning; collection never fails
//! a run because of a single unreadable entry.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;
use tracing::{debug, warn};
use walkdir::WalkDir;

use archlens_core::domain::SourceRecord;

use super::classifier::classify_by_name;

static EXCLUDE_DIRS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        ".git", "build", "out", ".idea", "target", "bin", ".mvn", "logs", ".gradle", "gradle",
    ]
    .into_iter()
    .collect()
});

static EXCLUDE_FILES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [".gitattributes", ".gitignore", "HELP.md", "gradlew", "gradlew.bat"]
        .into_iter()
        .collect()
});

static EXCLUDE_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "class", "jar", "war", "exe", "dll", "so", "dylib", "png", "jpg", "jpeg", "gif", "ico",
        "pdf", "log", "iml",
    ]
    .into_iter()
    .collect()
});

const IMPORTANT_FILES: &[&str] = &[
    "build.gradle",
    "build.gradle.kts",
    "settings.gradle",
    "settings.gradle.kts",
    "pom.xml",
    "application.yml",
    "application.yaml",
    "application.properties",
];

const README_CANDIDATES: &[&str] = &["README.md", "README.txt", "readme.md"];

/// Result of collecting one project tree
#[derive(Debug)]
pub struct CollectedProject {
    pub records: Vec<SourceRecord>,
    pub readme: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FileCollector {
    max_file_size: u64,
}

impl FileCollector {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Collect every analyzable file under `root`, in a stable walk order.
    pub fn collect(&self, root: &Path) -> Result<CollectedProject, std::io::Error> {
        let mut records = Vec::new();
        let mut skipped_size = 0usize;

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir() && Self::is_excluded_dir(entry.file_name()))
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().to_string();
            if !self.should_collect(&entry, &file_name, &mut skipped_size) {
                continue;
            }

            let relative = match entry.path().strip_prefix(root) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            let path = normalize_path(relative);
            let package = normalize_path(relative.parent().unwrap_or_else(|| Path::new("")));

            let content = match std::fs::read(entry.path()) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    warn!(file = %entry.path().display(), error = %e, "Failed to read file");
                    continue;
                }
            };

            let role = classify_by_name(&file_name);
            records.push(SourceRecord {
                path,
                package,
                content,
                role,
            });
        }

        let readme = Self::find_readme(root);

        debug!(
            file_count = records.len(),
            skipped_oversized = skipped_size,
            "File collection completed"
        );

        Ok(CollectedProject { records, readme })
    }

    fn should_collect(
        &self,
        entry: &walkdir::DirEntry,
        file_name: &str,
        skipped_size: &mut usize,
    ) -> bool {
        if EXCLUDE_FILES.contains(file_name) {
            return false;
        }

        // Descriptors are collected even when their extension is excluded
        if IMPORTANT_FILES.contains(&file_name) {
            return true;
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        if let Some(extension) = extension {
            if EXCLUDE_EXTENSIONS.contains(extension.as_str()) {
                return false;
            }
        }

        match entry.metadata() {
            Ok(metadata) if metadata.len() > self.max_file_size => {
                warn!(
                    file = %entry.path().display(),
                    size = metadata.len(),
                    "Skipping oversized file"
                );
                *skipped_size += 1;
                false
            }
            Ok(_) => true,
            Err(e) => {
                warn!(file = %entry.path().display(), error = %e, "Failed to stat file");
                false
            }
        }
    }

    fn is_excluded_dir(name: &std::ffi::OsStr) -> bool {
        name.to_str().map(|n| EXCLUDE_DIRS.contains(n)).unwrap_or(false)
    }

    fn find_readme(root: &Path) -> Option<String> {
        for candidate in README_CANDIDATES {
            let path = root.join(candidate);
            if path.exists() {
                match std::fs::read(&path) {
                    Ok(bytes) => return Some(String::from_utf8_lossy(&bytes).into_owned()),
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "Failed to read README");
                    }
                }
            }
        }
        None
    }
}

fn normalize_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
