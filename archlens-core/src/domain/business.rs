//! Business objects, service behavior profiles, and traced data flows

use serde::{Deserialize, Serialize};

use super::relationship::AssociationLink;
use super::structure::{FieldDecl, ParamDecl};

/// Category of a business object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusinessCategory {
    Entity,
    #[serde(rename = "DTO")]
    Dto,
}

impl BusinessCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BusinessCategory::Entity => "Entity",
            BusinessCategory::Dto => "DTO",
        }
    }
}

/// A domain entity or data-transfer object surfaced as a first-class
/// structural unit. DTO objects always carry an empty relationship list.
#[derive(Debug, Clone)]
pub struct BusinessObject {
    pub name: String,
    pub category: BusinessCategory,
    pub fields: Vec<FieldDecl>,
    pub relationships: Vec<AssociationLink>,
}

/// Heuristic operation tag attached to a service method body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationTag {
    #[serde(rename = "data_access")]
    DataAccess,
    #[serde(rename = "data_transformation")]
    DataTransformation,
    #[serde(rename = "business_rule_validation")]
    BusinessRuleValidation,
    #[serde(rename = "transactional")]
    Transactional,
}

impl OperationTag {
    pub fn label(&self) -> &'static str {
        match self {
            OperationTag::DataAccess => "data_access",
            OperationTag::DataTransformation => "data_transformation",
            OperationTag::BusinessRuleValidation => "business_rule_validation",
            OperationTag::Transactional => "transactional",
        }
    }
}

/// Behavior summary for one service method
#[derive(Debug, Clone)]
pub struct MethodProfile {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<ParamDecl>,
    pub operations: Vec<OperationTag>,
    pub summary: String,
}

impl MethodProfile {
    /// Render the human-readable summary line for a set of operation tags
    pub fn summarize(operations: &[OperationTag]) -> String {
        if operations.is_empty() {
            "Utility method".to_string()
        } else {
            let tags: Vec<&str> = operations.iter().map(|op| op.label()).collect();
            format!("Performs: {}", tags.join(", "))
        }
    }
}

/// Call chain traced from one controller handler downwards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEndpoint {
    pub method: String,
    /// Rendered chain, e.g. `UserController → UserService → UserRepository`
    pub flow: String,
}

/// Data flows grouped per controller; controllers with no resolvable
/// downstream dependency are omitted entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFlow {
    pub controller: String,
    pub endpoints: Vec<FlowEndpoint>,
}
