//! Pattern-driven class structure extraction.
//!
//! A type declaration is recognized by one of two mutually exclusive
//! patterns: a conventional type header (class/interface/enum/annotation
//! type) or a record header. Field and method extraction are flat passes
//! over the whole file text, independent of the header, so members of
//! nested types are captured as if they were top level. Malformed input
//! never fails extraction; the absence of a match yields an empty result.

use once_cell::sync::Lazy;
use regex::Regex;

use archlens_core::domain::{
    ClassStructure, FieldDecl, MethodDecl, ParamDecl, TypeKind, DEFAULT_VISIBILITY,
    RECORD_FIELD_VISIBILITY,
};

static TYPE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(public|private|protected)?\s*(class|interface|enum|@interface)\s+(\w+)(?:\s+extends\s+(\w+))?(?:\s+implements\s+([\w\s,]+))?",
    )
    .expect("type header pattern")
});

static RECORD_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(public|private|protected)?\s*record\s+(\w+)\s*\((.*?)\)(?:\s+implements\s+([\w\s,]+))?"#,
    )
    .expect("record header pattern")
});

static FIELD_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(public|private|protected)?\s+(?:static\s+)?(?:final\s+)?([\w<>\[\]]+)\s+(\w+)\s*(?:=\s*[^;]+)?;",
    )
    .expect("field pattern")
});

static METHOD_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(public|private|protected)?\s+(?:static\s+)?(?:final\s+)?([\w<>\[\]]+)\s+(\w+)\s*\((.*?)\)\s*(?:throws\s+[\w,\s]+)?\s*(\{|;)",
    )
    .expect("method pattern")
});

static ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(\w+)(?:\([^)]*\))?").expect("annotation pattern"));

/// Seam for the structural extraction pass.
///
/// Implementations must be pure: identical input text yields identical
/// output, with no state carried between calls.
pub trait StructuralExtractor: Send + Sync {
    fn extract(&self, content: &str) -> Option<ClassStructure>;
}

/// Regex-based extractor matching the documented heuristics
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_type_header(content: &str) -> Option<ClassStructure> {
        let caps = TYPE_HEADER.captures(content)?;
        let kind = match caps.get(2).map(|m| m.as_str()) {
            Some("class") => TypeKind::Class,
            Some("interface") => TypeKind::Interface,
            Some("enum") => TypeKind::Enum,
            Some("@interface") => TypeKind::AnnotationType,
            _ => return None,
        };

        Some(ClassStructure {
            visibility: visibility_of(caps.get(1).map(|m| m.as_str())),
            kind,
            name: caps[3].to_string(),
            extends: caps.get(4).map(|m| m.as_str().to_string()),
            implements: split_names(caps.get(5).map(|m| m.as_str())),
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
        })
    }

    fn extract_record_header(content: &str) -> Option<ClassStructure> {
        let caps = RECORD_HEADER.captures(content)?;

        let mut fields = Vec::new();
        if let Some(components) = caps.get(3) {
            for component in components.as_str().split(',') {
                let component = component.trim();
                if component.is_empty() {
                    continue;
                }
                let parts: Vec<&str> = component.split_whitespace().collect();
                if parts.len() >= 2 {
                    fields.push(FieldDecl {
                        visibility: RECORD_FIELD_VISIBILITY.to_string(),
                        field_type: parts[..parts.len() - 1].join(" "),
                        name: parts[parts.len() - 1].to_string(),
                        annotations: Vec::new(),
                    });
                }
            }
        }

        Some(ClassStructure {
            visibility: visibility_of(caps.get(1).map(|m| m.as_str())),
            kind: TypeKind::Record,
            name: caps[2].to_string(),
            extends: None,
            implements: split_names(caps.get(4).map(|m| m.as_str())),
            fields,
            methods: Vec::new(),
            annotations: Vec::new(),
        })
    }

    fn extract_fields(content: &str) -> Vec<FieldDecl> {
        FIELD_DECL
            .captures_iter(content)
            .map(|caps| FieldDecl {
                visibility: visibility_of(caps.get(1).map(|m| m.as_str())),
                field_type: caps[2].to_string(),
                name: caps[3].to_string(),
                annotations: Vec::new(),
            })
            .collect()
    }

    fn extract_methods(content: &str, is_implementation: bool) -> Vec<MethodDecl> {
        METHOD_DECL
            .captures_iter(content)
            .map(|caps| MethodDecl {
                visibility: visibility_of(caps.get(1).map(|m| m.as_str())),
                return_type: caps[2].to_string(),
                name: caps[3].to_string(),
                parameters: parse_parameters(caps.get(4).map(|m| m.as_str()).unwrap_or("")),
                is_interface_implementation: is_implementation,
            })
            .collect()
    }

    fn extract_annotations(content: &str) -> Vec<String> {
        ANNOTATION
            .captures_iter(content)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}

impl StructuralExtractor for PatternExtractor {
    fn extract(&self, content: &str) -> Option<ClassStructure> {
        let mut structure =
            Self::extract_type_header(content).or_else(|| Self::extract_record_header(content))?;

        // Record components already became fields; conventional types get
        // the flat field pass instead.
        if structure.kind != TypeKind::Record {
            structure.fields = Self::extract_fields(content);
        }

        let is_implementation = !structure.implements.is_empty();
        structure.methods = Self::extract_methods(content, is_implementation);
        structure.annotations = Self::extract_annotations(content);

        Some(structure)
    }
}

fn visibility_of(modifier: Option<&str>) -> String {
    modifier.unwrap_or(DEFAULT_VISIBILITY).to_string()
}

fn split_names(list: Option<&str>) -> Vec<String> {
    list.map(|s| {
        s.split(',')
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn parse_parameters(params: &str) -> Vec<ParamDecl> {
    params
        .split(',')
        .filter_map(|param| {
            let parts: Vec<&str> = param.split_whitespace().collect();
            if parts.len() >= 2 {
                Some(ParamDecl {
                    param_type: parts[..parts.len() - 1].join(" "),
                    name: parts[parts.len() - 1].to_string(),
                })
            } else {
                None
            }
        })
        .collect()
}
