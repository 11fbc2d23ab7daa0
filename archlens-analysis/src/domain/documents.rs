//! Emitted analysis documents.
//!
//! Field names are an external interop contract consumed by the companion
//! result API; renaming any serialized key is a breaking change.

use std::collections::BTreeMap;

use serde::Serialize;

use archlens_core::domain::{
    AssociationLink, ComplexityMetrics, DataFlow, Endpoint, Relationship,
};

use super::buckets::ProjectStructure;
use super::features::FrameworkFeatures;

/// Full analysis document, produced once per run and never mutated
#[derive(Debug, Serialize)]
pub struct AnalysisDocument {
    #[serde(rename = "projectSummary")]
    pub project_summary: ProjectSummary,
    pub api: ApiSection,
    pub domain: DomainSection,
    #[serde(rename = "projectStructure")]
    pub project_structure: ProjectStructure,
    pub relationships: Vec<Relationship>,
    #[serde(rename = "businessLogic")]
    pub business_logic: BTreeMap<String, Vec<LogicMethod>>,
    #[serde(rename = "dataFlows")]
    pub data_flows: Vec<DataFlow>,
    #[serde(rename = "springFeatures")]
    pub spring_features: FrameworkFeatures,
    pub configuration: BTreeMap<String, String>,
    #[serde(rename = "sourceFiles")]
    pub source_files: Vec<SourceFileEntry>,
}

#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub generated: String,
    #[serde(rename = "basicInfo")]
    pub basic_info: BasicInfo,
    pub architecture: Architecture,
    pub readme: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BasicInfo {
    pub group: String,
    pub version: String,
    #[serde(rename = "springBootVersion")]
    pub spring_boot_version: String,
    #[serde(rename = "javaVersion")]
    pub java_version: String,
}

#[derive(Debug, Serialize)]
pub struct Architecture {
    #[serde(rename = "typicalFlows")]
    pub typical_flows: Vec<String>,
    #[serde(rename = "componentCounts")]
    pub component_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct ApiSection {
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Serialize)]
pub struct DomainSection {
    #[serde(rename = "businessObjects")]
    pub business_objects: Vec<BusinessObjectEntry>,
}

#[derive(Debug, Serialize)]
pub struct BusinessObjectEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    pub fields: Vec<BusinessFieldEntry>,
    pub relationships: Vec<AssociationLink>,
}

#[derive(Debug, Serialize)]
pub struct BusinessFieldEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub annotations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LogicMethod {
    pub name: String,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct SourceFileEntry {
    pub path: String,
    pub package: String,
    pub content: String,
    #[serde(rename = "fileType")]
    pub file_type: Option<String>,
    #[serde(rename = "className")]
    pub class_name: Option<String>,
    pub complexity: Option<ComplexityMetrics>,
    pub javadocs: Vec<String>,
    pub todos: Vec<String>,
}

/// Condensed summary document emitted next to the full document
#[derive(Debug, Serialize)]
pub struct SummaryDocument {
    #[serde(rename = "projectName")]
    pub project_name: String,
    pub generated: String,
    #[serde(rename = "buildInfo")]
    pub build_info: BasicInfo,
    pub components: BTreeMap<String, usize>,
    #[serde(rename = "apiEndpoints")]
    pub api_endpoints: EndpointSummary,
    #[serde(rename = "businessObjects")]
    pub business_objects: ObjectSummary,
    #[serde(rename = "complexityMetrics")]
    pub complexity_metrics: ComplexitySummary,
    pub dependencies: DependencySummary,
}

#[derive(Debug, Serialize)]
pub struct EndpointSummary {
    pub count: usize,
    /// Top routes, capped for brevity
    pub routes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ObjectSummary {
    pub count: usize,
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ComplexitySummary {
    pub avg_method_count: f64,
    pub avg_complexity: f64,
    pub max_complexity: usize,
    /// Path of the file owning the maximum cyclomatic complexity
    pub complex_files: String,
}

#[derive(Debug, Serialize)]
pub struct DependencySummary {
    pub count: usize,
    #[serde(rename = "topDeps")]
    pub top_deps: Vec<String>,
}
