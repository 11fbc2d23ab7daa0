//! Full analysis run over one extracted project tree.
//!
//! The run is pure CPU/string work and executes on the blocking pool; the
//! cancellation token is checked between stages and per analyzed file, so a
//! cancelled run returns promptly at the next checkpoint instead of being
//! aborted mid-write.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use archlens_core::config::AnalysisConfig;
use archlens_core::domain::{AnalyzedSource, FileRole, ProjectMetadata, SourceRecord};

use crate::domain::buckets::ProjectStructure;
use crate::infrastructure::build::parse_build_descriptor;
use crate::infrastructure::business::BusinessAnalyzer;
use crate::infrastructure::classifier::classify_java;
use crate::infrastructure::collector::FileCollector;
use crate::infrastructure::config_scan::analyze_config_files;
use crate::infrastructure::docs::{extract_javadocs, extract_todos};
use crate::infrastructure::endpoints::EndpointAnalyzer;
use crate::infrastructure::extractor::{PatternExtractor, StructuralExtractor};
use crate::infrastructure::framework::FrameworkAnalyzer;
use crate::infrastructure::metrics::{calculate_complexity, remove_imports};
use crate::infrastructure::relationships::RelationshipAnalyzer;
use crate::infrastructure::report::{ReportAssembler, ReportInput, WriteError};

/// Result of one completed analysis run
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub analysis_file: PathBuf,
    pub summary_file: PathBuf,
    pub files_processed: usize,
}

/// Orchestrates the whole pipeline: collect, extract, analyze, assemble.
#[derive(Clone)]
pub struct AnalyzeProjectUseCase {
    collector: FileCollector,
    extractor: Arc<dyn StructuralExtractor>,
    business: BusinessAnalyzer,
}

impl AnalyzeProjectUseCase {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self::with_extractor(config, Arc::new(PatternExtractor::new()))
    }

    /// Swap in a different structural extraction strategy.
    pub fn with_extractor(config: &AnalysisConfig, extractor: Arc<dyn StructuralExtractor>) -> Self {
        Self {
            collector: FileCollector::new(config.max_file_size_bytes),
            extractor,
            business: BusinessAnalyzer::new(config.annotation_window),
        }
    }

    /// Run the full analysis off the async runtime's worker threads.
    #[instrument(skip(self, token), fields(project = %project_name))]
    pub async fn execute(
        &self,
        project_name: &str,
        source_dir: &Path,
        output_dir: &Path,
        token: CancellationToken,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let this = self.clone();
        let project = project_name.to_string();
        let source = source_dir.to_path_buf();
        let output = output_dir.to_path_buf();

        tokio::task::spawn_blocking(move || this.run(&project, &source, &output, &token))
            .await
            .map_err(|e| AnalysisError::Internal(format!("analysis task panicked: {}", e)))?
    }

    fn run(
        &self,
        project_name: &str,
        source_dir: &Path,
        output_dir: &Path,
        token: &CancellationToken,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        info!("Starting analysis run");

        let collected = self.collector.collect(source_dir)?;
        ensure_active(token)?;

        let structure = ProjectStructure::classify(&collected.records);

        let metadata = Self::parse_metadata(&collected.records);
        let configuration = analyze_config_files(
            collected
                .records
                .iter()
                .filter(|r| r.role == FileRole::Config),
        );
        ensure_active(token)?;

        // Java sources get the structural pass; everything else is carried
        // through untouched. Plain files come first in document order.
        let mut plain = Vec::new();
        let mut java = Vec::new();
        for record in collected.records {
            ensure_active(token)?;
            if record.is_java() {
                java.push(self.analyze_java(record));
            } else {
                plain.push(AnalyzedSource::plain(record));
            }
        }
        let java_count = java.len();
        let mut files = plain;
        files.extend(java);

        ensure_active(token)?;
        let relationships = RelationshipAnalyzer::analyze(&files);

        ensure_active(token)?;
        let business_objects = self.business.find_objects(&files);

        ensure_active(token)?;
        let endpoints = EndpointAnalyzer::analyze(&files);

        ensure_active(token)?;
        let business_logic = BusinessAnalyzer::extract_logic(&files);

        ensure_active(token)?;
        let data_flows = BusinessAnalyzer::analyze_flows(&files, &relationships);

        ensure_active(token)?;
        let features = FrameworkAnalyzer::analyze(&files);

        ensure_active(token)?;
        let files_processed = files.len();
        let (document, summary) = ReportAssembler::assemble(ReportInput {
            project_name,
            metadata: &metadata,
            structure,
            readme: collected.readme,
            configuration,
            files: &files,
            relationships,
            business_objects,
            endpoints,
            business_logic,
            data_flows,
            features,
        });

        let (analysis_file, summary_file) =
            ReportAssembler::write_documents(output_dir, project_name, &document, &summary)?;

        info!(
            files_processed,
            java_files = java_count,
            "Analysis run completed"
        );

        Ok(AnalysisOutcome {
            analysis_file,
            summary_file,
            files_processed,
        })
    }

    fn analyze_java(&self, record: SourceRecord) -> AnalyzedSource {
        let cleaned = remove_imports(&record.content);
        let role = classify_java(&record.path, &record.content);
        let structure = self.extractor.extract(&cleaned);
        let complexity = calculate_complexity(&cleaned);
        let javadocs = extract_javadocs(&record.content);
        let todos = extract_todos(&record.content);

        AnalyzedSource {
            record: SourceRecord {
                path: record.path,
                package: record.package,
                content: cleaned,
                role,
            },
            structure,
            complexity: Some(complexity),
            javadocs,
            todos,
        }
    }

    /// Last parsed descriptor wins when a project carries several.
    fn parse_metadata(records: &[SourceRecord]) -> ProjectMetadata {
        let mut metadata = ProjectMetadata::default();
        for record in records.iter().filter(|r| r.role == FileRole::Build) {
            let file_name = record.path.rsplit('/').next().unwrap_or(&record.path);
            metadata = parse_build_descriptor(file_name, &record.content);
        }
        metadata
    }
}

fn ensure_active(token: &CancellationToken) -> Result<(), AnalysisError> {
    if token.is_cancelled() {
        warn!("Analysis run cancelled");
        Err(AnalysisError::Cancelled)
    } else {
        Ok(())
    }
}

/// Errors raised by a single analysis run.
///
/// Any stage failing is caught at the job boundary; partial results from
/// earlier stages are discarded, never partially published.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact write error: {0}")]
    Write(#[from] WriteError),

    #[error("Analysis run cancelled")]
    Cancelled,

    #[error("Internal analysis error: {0}")]
    Internal(String),
}
