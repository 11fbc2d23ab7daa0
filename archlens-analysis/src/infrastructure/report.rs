//! Report assembly.
//!
//! Pure aggregation: merges the analyzer outputs and project metadata into
//! the full document and the condensed summary, then persists both as
//! timestamped JSON artifacts. No analysis happens here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use archlens_core::domain::{
    AnalyzedSource, BusinessObject, DataFlow, Endpoint, MethodProfile, ProjectMetadata,
    Relationship,
};

use crate::domain::buckets::ProjectStructure;
use crate::domain::documents::{
    AnalysisDocument, ApiSection, Architecture, BasicInfo, BusinessFieldEntry,
    BusinessObjectEntry, ComplexitySummary, DependencySummary, DomainSection, EndpointSummary,
    LogicMethod, ObjectSummary, ProjectSummary, SourceFileEntry, SummaryDocument,
};
use crate::domain::features::FrameworkFeatures;

const TOP_ROUTES: usize = 5;
const TOP_OBJECTS: usize = 5;
const TOP_DEPENDENCIES: usize = 7;

/// Everything the assembler merges for one run
pub struct ReportInput<'a> {
    pub project_name: &'a str,
    pub metadata: &'a ProjectMetadata,
    pub structure: ProjectStructure,
    pub readme: Option<String>,
    pub configuration: BTreeMap<String, String>,
    pub files: &'a [AnalyzedSource],
    pub relationships: Vec<Relationship>,
    pub business_objects: Vec<BusinessObject>,
    pub endpoints: Vec<Endpoint>,
    pub business_logic: Vec<(String, Vec<MethodProfile>)>,
    pub data_flows: Vec<DataFlow>,
    pub features: FrameworkFeatures,
}

pub struct ReportAssembler;

impl ReportAssembler {
    pub fn assemble(input: ReportInput<'_>) -> (AnalysisDocument, SummaryDocument) {
        let basic_info = BasicInfo {
            group: ProjectMetadata::or_placeholder(&input.metadata.group).to_string(),
            version: ProjectMetadata::or_placeholder(&input.metadata.version).to_string(),
            spring_boot_version: ProjectMetadata::or_placeholder(
                &input.metadata.framework_version,
            )
            .to_string(),
            java_version: ProjectMetadata::or_placeholder(&input.metadata.language_version)
                .to_string(),
        };

        let component_counts: BTreeMap<String, usize> = input
            .structure
            .component_counts()
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();

        let summary = Self::assemble_summary(&input, basic_info.clone(), &component_counts);

        let business_objects: Vec<BusinessObjectEntry> = input
            .business_objects
            .iter()
            .map(|object| BusinessObjectEntry {
                name: object.name.clone(),
                category: object.category.label().to_string(),
                fields: object
                    .fields
                    .iter()
                    .map(|field| BusinessFieldEntry {
                        name: field.name.clone(),
                        field_type: field.field_type.clone(),
                        annotations: field.annotations.clone(),
                    })
                    .collect(),
                relationships: object.relationships.clone(),
            })
            .collect();

        let business_logic: BTreeMap<String, Vec<LogicMethod>> = input
            .business_logic
            .into_iter()
            .map(|(service, profiles)| {
                let methods = profiles
                    .into_iter()
                    .map(|profile| LogicMethod {
                        name: profile.name,
                        summary: profile.summary,
                    })
                    .collect();
                (service, methods)
            })
            .collect();

        let source_files: Vec<SourceFileEntry> = input
            .files
            .iter()
            .filter(|file| !is_test_path(&file.record.path))
            .map(|file| SourceFileEntry {
                path: file.record.path.clone(),
                package: file.record.package.clone(),
                content: file.record.content.clone(),
                file_type: file.role().label().map(str::to_string),
                class_name: file.class_name().map(str::to_string),
                complexity: file.complexity,
                javadocs: file.javadocs.clone(),
                todos: file.todos.clone(),
            })
            .collect();

        let document = AnalysisDocument {
            project_summary: ProjectSummary {
                name: input.project_name.to_string(),
                generated: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                basic_info,
                architecture: Architecture {
                    typical_flows: typical_flows(&input.structure),
                    component_counts,
                },
                readme: input.readme,
            },
            api: ApiSection {
                endpoints: input.endpoints,
            },
            domain: DomainSection { business_objects },
            project_structure: input.structure,
            relationships: input.relationships,
            business_logic,
            data_flows: input.data_flows,
            spring_features: input.features,
            configuration: input.configuration,
            source_files,
        };

        (document, summary)
    }

    fn assemble_summary(
        input: &ReportInput<'_>,
        build_info: BasicInfo,
        component_counts: &BTreeMap<String, usize>,
    ) -> SummaryDocument {
        let java_metrics: Vec<(&str, _)> = input
            .files
            .iter()
            .filter(|f| f.record.is_java())
            .filter_map(|f| f.complexity.map(|c| (f.record.path.as_str(), c)))
            .collect();

        let mut complexity_metrics = ComplexitySummary {
            avg_method_count: 0.0,
            avg_complexity: 0.0,
            max_complexity: 0,
            complex_files: String::new(),
        };

        if !java_metrics.is_empty() {
            let total_methods: usize = java_metrics.iter().map(|(_, c)| c.methods).sum();
            let total_complexity: usize = java_metrics.iter().map(|(_, c)| c.cyclomatic).sum();
            let file_count = java_metrics.len() as f64;

            for (path, metrics) in &java_metrics {
                if metrics.cyclomatic > complexity_metrics.max_complexity {
                    complexity_metrics.max_complexity = metrics.cyclomatic;
                    complexity_metrics.complex_files = path.to_string();
                }
            }

            complexity_metrics.avg_method_count = round2(total_methods as f64 / file_count);
            complexity_metrics.avg_complexity = round2(total_complexity as f64 / file_count);
        }

        SummaryDocument {
            project_name: input.project_name.to_string(),
            generated: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            build_info,
            components: component_counts.clone(),
            api_endpoints: EndpointSummary {
                count: input.endpoints.len(),
                routes: input
                    .endpoints
                    .iter()
                    .take(TOP_ROUTES)
                    .map(|e| format!("{} {}", e.method, e.path))
                    .collect(),
            },
            business_objects: ObjectSummary {
                count: input.business_objects.len(),
                names: input
                    .business_objects
                    .iter()
                    .take(TOP_OBJECTS)
                    .map(|o| o.name.clone())
                    .collect(),
            },
            complexity_metrics,
            dependencies: DependencySummary {
                count: input.metadata.dependencies.len(),
                top_deps: input
                    .metadata
                    .dependencies
                    .iter()
                    .take(TOP_DEPENDENCIES)
                    .cloned()
                    .collect(),
            },
        }
    }

    /// Persist both documents as timestamped JSON artifacts.
    ///
    /// Filenames are not collision-free across rapid repeated runs for the
    /// same project within one second; callers needing strict uniqueness
    /// append their own run identifier.
    pub fn write_documents(
        output_dir: &Path,
        project_name: &str,
        document: &AnalysisDocument,
        summary: &SummaryDocument,
    ) -> Result<(PathBuf, PathBuf), WriteError> {
        std::fs::create_dir_all(output_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let analysis_path =
            output_dir.join(format!("{}-{}-analysis.json", timestamp, project_name));
        let summary_path = output_dir.join(format!("{}-{}-summary.json", timestamp, project_name));

        std::fs::write(&analysis_path, serde_json::to_string_pretty(document)?)?;
        std::fs::write(&summary_path, serde_json::to_string_pretty(summary)?)?;

        info!(
            analysis = %analysis_path.display(),
            summary = %summary_path.display(),
            "Analysis artifacts written"
        );

        Ok((analysis_path, summary_path))
    }
}

fn typical_flows(structure: &ProjectStructure) -> Vec<String> {
    let mut flows = Vec::new();
    if structure.has_controllers() && structure.has_services() {
        let mut flow = "Controller → Service".to_string();
        if structure.has_repositories() {
            flow.push_str(" → Repository");
        }
        flows.push(flow);
    }
    flows
}

/// Test-tree files are excluded from the emitted document
fn is_test_path(path: &str) -> bool {
    path.split('/').any(|segment| segment == "test" || segment == "tests")
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Error raised while persisting the analysis artifacts
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use archlens_core::domain::{ComplexityMetrics, FileRole, SourceRecord};

    fn java_file(path: &str, cyclomatic: usize, methods: usize) -> AnalyzedSource {
        AnalyzedSource {
            record: SourceRecord {
                path: path.to_string(),
                package: String::new(),
                content: String::new(),
                role: FileRole::Service,
            },
            structure: None,
            complexity: Some(ComplexityMetrics {
                lines: 10,
                methods,
                conditional_branches: cyclomatic.saturating_sub(1),
                loops: 0,
                try_catch: 0,
                cyclomatic,
            }),
            javadocs: Vec::new(),
            todos: Vec::new(),
        }
    }

    fn empty_input<'a>(
        metadata: &'a ProjectMetadata,
        files: &'a [AnalyzedSource],
    ) -> ReportInput<'a> {
        ReportInput {
            project_name: "demo",
            metadata,
            structure: ProjectStructure::default(),
            readme: None,
            configuration: BTreeMap::new(),
            files,
            relationships: Vec::new(),
            business_objects: Vec::new(),
            endpoints: Vec::new(),
            business_logic: Vec::new(),
            data_flows: Vec::new(),
            features: FrameworkFeatures::default(),
        }
    }

    #[test]
    fn missing_build_fields_render_as_placeholder() {
        let metadata = ProjectMetadata::default();
        let files = Vec::new();
        let (document, summary) = ReportAssembler::assemble(empty_input(&metadata, &files));
        assert_eq!(document.project_summary.basic_info.group, "N/A");
        assert_eq!(summary.build_info.spring_boot_version, "N/A");
    }

    #[test]
    fn complexity_summary_tracks_maximum_and_owner() {
        let metadata = ProjectMetadata::default();
        let files = vec![
            java_file("src/main/java/A.java", 3, 2),
            java_file("src/main/java/B.java", 7, 4),
        ];
        let (_, summary) = ReportAssembler::assemble(empty_input(&metadata, &files));
        assert_eq!(summary.complexity_metrics.max_complexity, 7);
        assert_eq!(summary.complexity_metrics.complex_files, "src/main/java/B.java");
        assert_eq!(summary.complexity_metrics.avg_complexity, 5.0);
        assert_eq!(summary.complexity_metrics.avg_method_count, 3.0);
    }

    #[test]
    fn test_tree_files_are_excluded_from_document() {
        let metadata = ProjectMetadata::default();
        let files = vec![
            java_file("src/main/java/A.java", 1, 0),
            java_file("src/test/java/ATest.java", 1, 0),
        ];
        let (document, _) = ReportAssembler::assemble(empty_input(&metadata, &files));
        assert_eq!(document.source_files.len(), 1);
        assert_eq!(document.source_files[0].path, "src/main/java/A.java");
    }

    #[test]
    fn documents_serialize_with_contract_field_names() {
        let metadata = ProjectMetadata::default();
        let files = Vec::new();
        let (document, summary) = ReportAssembler::assemble(empty_input(&metadata, &files));

        let doc_json = serde_json::to_value(&document).unwrap();
        assert!(doc_json.get("projectSummary").is_some());
        assert!(doc_json.get("springFeatures").is_some());
        assert!(doc_json["api"].get("endpoints").is_some());
        assert!(doc_json["projectSummary"]["basicInfo"]
            .get("springBootVersion")
            .is_some());

        let summary_json = serde_json::to_value(&summary).unwrap();
        assert!(summary_json.get("projectName").is_some());
        assert!(summary_json["dependencies"].get("topDeps").is_some());
        assert!(summary_json["complexityMetrics"].get("avg_method_count").is_some());
    }
}
