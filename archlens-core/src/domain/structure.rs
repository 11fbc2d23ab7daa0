//! Class-level structure recovered from source text

use serde::{Deserialize, Serialize};

/// Visibility recorded when a declaration carries no modifier
pub const DEFAULT_VISIBILITY: &str = "default";

/// Visibility attributed to record components
pub const RECORD_FIELD_VISIBILITY: &str = "private final";

/// Kind of type declaration matched by the structural extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    AnnotationType,
}

impl TypeKind {
    pub fn label(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
            TypeKind::AnnotationType => "@interface",
        }
    }
}

/// Structure of the primary type declared in a source file.
///
/// Extraction is pattern-based: fields and methods are gathered by flat
/// regex passes over the whole file, so members of nested types are captured
/// as if they belonged to the primary type. `name` is never empty when a
/// structure exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassStructure {
    pub visibility: String,
    pub kind: TypeKind,
    pub name: String,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub annotations: Vec<String>,
}

/// A field declaration.
///
/// `annotations` are attached post-hoc by a preceding-window proximity scan,
/// not strict binding; the scan anchors at the name's first textual
/// occurrence, which misattributes when the name recurs earlier in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub visibility: String,
    pub field_type: String,
    pub name: String,
    pub annotations: Vec<String>,
}

/// A method declaration.
///
/// `is_interface_implementation` is a class-level heuristic: true whenever
/// the owning type declares any `implements` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub visibility: String,
    pub return_type: String,
    pub name: String,
    pub parameters: Vec<ParamDecl>,
    pub is_interface_implementation: bool,
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub param_type: String,
    pub name: String,
}

/// Strip the generic arguments from a type name: `List<User>` becomes `List`.
pub fn bare_type(type_name: &str) -> &str {
    match type_name.split_once('<') {
        Some((outer, _)) => outer.trim(),
        None => type_name.trim(),
    }
}

/// Element type of a single-argument generic: `List<User>` becomes `User`.
///
/// Multi-argument generics fall back to the bare container name; a plain
/// type is returned unchanged.
pub fn element_type(type_name: &str) -> &str {
    match type_name.split_once('<') {
        Some((outer, rest)) => {
            let inner = rest.trim_end().trim_end_matches('>').trim();
            if inner.is_empty() || inner.contains(',') {
                outer.trim()
            } else {
                inner
            }
        }
        None => type_name.trim(),
    }
}
