//! Structural model shared by the analyzers and the task pipeline

pub mod business;
pub mod endpoint;
pub mod metadata;
pub mod relationship;
pub mod source;
pub mod structure;

pub use business::{
    BusinessCategory, BusinessObject, DataFlow, FlowEndpoint, MethodProfile, OperationTag,
};
pub use endpoint::Endpoint;
pub use metadata::ProjectMetadata;
pub use relationship::{AssociationKind, AssociationLink, RelationKind, Relationship};
pub use source::{AnalyzedSource, ComplexityMetrics, FileRole, SourceRecord};
pub use structure::{
    bare_type, element_type, ClassStructure, FieldDecl, MethodDecl, ParamDecl, TypeKind,
    DEFAULT_VISIBILITY, RECORD_FIELD_VISIBILITY,
};
