//! Collected source files and their classification

use serde::{Deserialize, Serialize};

use super::structure::ClassStructure;

/// Role a file plays inside the analyzed project.
///
/// Assigned once during classification by a prioritized rule chain; files
/// matching no rule stay [`FileRole::Unclassified`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    Controller,
    Service,
    Repository,
    Entity,
    Config,
    Dto,
    Mapper,
    Util,
    Domain,
    Build,
    Resource,
    Unclassified,
}

impl FileRole {
    /// Report label; unclassified files carry no label in emitted documents.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            FileRole::Controller => Some("controller"),
            FileRole::Service => Some("service"),
            FileRole::Repository => Some("repository"),
            FileRole::Entity => Some("entity"),
            FileRole::Config => Some("config"),
            FileRole::Dto => Some("dto"),
            FileRole::Mapper => Some("mapper"),
            FileRole::Util => Some("util"),
            FileRole::Domain => Some("domain"),
            FileRole::Build => Some("build"),
            FileRole::Resource => Some("resource"),
            FileRole::Unclassified => None,
        }
    }
}

/// One collected project file.
///
/// Immutable after classification; owned exclusively by the run that
/// produced it.
#[derive(Debug, Clone)]
pub struct SourceRecord {
    /// Path relative to the project root, forward slashes
    pub path: String,
    /// Parent directory of `path`
    pub package: String,
    pub content: String,
    pub role: FileRole,
}

impl SourceRecord {
    pub fn is_java(&self) -> bool {
        self.path.ends_with(".java")
    }
}

/// Additive complexity metrics for one source file.
///
/// `cyclomatic` = conditional branches + loops + try blocks + 1, so it is
/// at least 1 for any input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityMetrics {
    pub lines: usize,
    pub methods: usize,
    pub conditional_branches: usize,
    pub loops: usize,
    pub try_catch: usize,
    pub cyclomatic: usize,
}

/// A source record enriched by the structural extraction pass
#[derive(Debug, Clone)]
pub struct AnalyzedSource {
    pub record: SourceRecord,
    pub structure: Option<ClassStructure>,
    pub complexity: Option<ComplexityMetrics>,
    pub javadocs: Vec<String>,
    pub todos: Vec<String>,
}

impl AnalyzedSource {
    /// Wrap a record that needs no structural pass (config, build, resources)
    pub fn plain(record: SourceRecord) -> Self {
        Self {
            record,
            structure: None,
            complexity: None,
            javadocs: Vec::new(),
            todos: Vec::new(),
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        self.structure.as_ref().map(|s| s.name.as_str())
    }

    pub fn role(&self) -> FileRole {
        self.record.role
    }
}
