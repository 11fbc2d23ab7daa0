//! Inter-class relationships derived from structural records

use serde::{Deserialize, Serialize};

/// Kind of class-graph relationship.
///
/// Relationships are derived, not authoritative: the same (source, target,
/// kind) triple may appear once per textual occurrence, and consumers
/// de-duplicate when they need set semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    #[serde(rename = "extends")]
    Extends,
    #[serde(rename = "implements")]
    Implements,
    #[serde(rename = "has_field")]
    HasField,
    #[serde(rename = "returns")]
    Returns,
    #[serde(rename = "uses_param")]
    UsesParam,
    #[serde(rename = "autowires")]
    Autowires,
}

/// A directed edge in the class graph.
///
/// `target` always names a class present in the run's class index; edges to
/// types outside the project are dropped at extraction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
}

impl Relationship {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
        }
    }
}

/// Persistence association detected on an entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssociationKind {
    OneToMany,
    ManyToOne,
    OneToOne,
    ManyToMany,
}

/// Association edge attached to a business object.
///
/// Unlike [`Relationship`], the target is the field's element type and is
/// not required to resolve inside the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationLink {
    pub from_class: String,
    pub to_class: String,
    #[serde(rename = "type")]
    pub kind: AssociationKind,
    pub field: Option<String>,
}
