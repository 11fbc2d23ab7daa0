//! Business object, service behavior, and data flow analysis

use std::collections::{HashMap, HashSet};

use tracing::debug;

use archlens_core::domain::{
    element_type, AnalyzedSource, AssociationKind, AssociationLink, BusinessCategory,
    BusinessObject, DataFlow, FileRole, FlowEndpoint, MethodProfile, OperationTag, RelationKind,
    Relationship,
};

/// Persistence markers probed in the preceding-text window, in check order.
/// The first association marker found names the relationship kind.
const ASSOCIATION_MARKERS: [(&str, Option<AssociationKind>); 5] = [
    ("@OneToMany", Some(AssociationKind::OneToMany)),
    ("@ManyToOne", Some(AssociationKind::ManyToOne)),
    ("@OneToOne", Some(AssociationKind::OneToOne)),
    ("@ManyToMany", Some(AssociationKind::ManyToMany)),
    ("@JoinColumn", None),
];

#[derive(Debug, Clone)]
pub struct BusinessAnalyzer {
    /// Width of the preceding-text window scanned for field annotations
    annotation_window: usize,
}

impl BusinessAnalyzer {
    pub fn new(annotation_window: usize) -> Self {
        Self { annotation_window }
    }

    /// Surface entity and DTO classes as business objects.
    ///
    /// Entity fields get their persistence annotations attached by the
    /// proximity scan; DTO objects always carry an empty relationship list.
    pub fn find_objects(&self, files: &[AnalyzedSource]) -> Vec<BusinessObject> {
        let mut objects = Vec::new();

        for file in files.iter().filter(|f| f.role() == FileRole::Entity) {
            let structure = match &file.structure {
                Some(structure) => structure,
                None => continue,
            };

            let mut fields = structure.fields.clone();
            let mut relationships = Vec::new();

            for field in &mut fields {
                let annotations =
                    self.associate_annotations(&file.record.content, &field.name);
                if let Some(kind) = annotations
                    .iter()
                    .find_map(|marker| association_kind(marker))
                {
                    relationships.push(AssociationLink {
                        from_class: structure.name.clone(),
                        to_class: element_type(&field.field_type).to_string(),
                        kind,
                        field: Some(field.name.clone()),
                    });
                }
                field.annotations = annotations;
            }

            objects.push(BusinessObject {
                name: structure.name.clone(),
                category: BusinessCategory::Entity,
                fields,
                relationships,
            });
        }

        for file in files.iter().filter(|f| {
            f.role() == FileRole::Dto || f.record.path.to_lowercase().contains("dto")
        }) {
            let structure = match &file.structure {
                Some(structure) => structure,
                None => continue,
            };

            objects.push(BusinessObject {
                name: structure.name.clone(),
                category: BusinessCategory::Dto,
                fields: structure.fields.clone(),
                relationships: Vec::new(),
            });
        }

        debug!(count = objects.len(), "Business object discovery completed");
        objects
    }

    /// Heuristic annotation association: markers found within a fixed-width
    /// window immediately preceding the field name's FIRST textual
    /// occurrence. The first occurrence anchors the window even when the
    /// name recurs later, which misattributes annotations on name reuse; a
    /// known precision limit kept for output compatibility.
    fn associate_annotations(&self, content: &str, field_name: &str) -> Vec<String> {
        let position = match content.find(field_name) {
            Some(position) => position,
            None => return Vec::new(),
        };

        let window_start = position.saturating_sub(self.annotation_window);
        let window = safe_slice(content, window_start, position);

        ASSOCIATION_MARKERS
            .iter()
            .filter(|(marker, _)| window.contains(marker))
            .map(|(marker, _)| marker.trim_start_matches('@').to_string())
            .collect()
    }

    /// Summarize service-method behavior by scanning an approximated method
    /// body (brace-balanced substring) for operation markers. Constructors
    /// and accessor-named methods are excluded; methods whose signature does
    /// not occur textually produce no entry.
    pub fn extract_logic(files: &[AnalyzedSource]) -> Vec<(String, Vec<MethodProfile>)> {
        let mut logic = Vec::new();

        for file in files.iter().filter(|f| f.role() == FileRole::Service) {
            let structure = match &file.structure {
                Some(structure) => structure,
                None => continue,
            };
            let content = &file.record.content;

            let mut profiles = Vec::new();
            for method in &structure.methods {
                if method.name == structure.name
                    || method.name.starts_with("get")
                    || method.name.starts_with("set")
                {
                    continue;
                }

                let signature =
                    format!("{} {} {}", method.visibility, method.return_type, method.name);
                let signature_pos = match content.find(&signature) {
                    Some(position) => position,
                    None => continue,
                };

                let body = match method_body(content, signature_pos) {
                    Some(body) => body,
                    None => continue,
                };

                let mut operations = Vec::new();
                if body.contains("repository.find") || body.contains("repository.save") {
                    operations.push(OperationTag::DataAccess);
                }
                if body.contains(".stream().map(") || body.contains(".builder()") {
                    operations.push(OperationTag::DataTransformation);
                }
                if body.contains("if") && (body.contains("throw") || body.contains("Exception")) {
                    operations.push(OperationTag::BusinessRuleValidation);
                }
                if content[..signature_pos].contains("@Transactional") {
                    operations.push(OperationTag::Transactional);
                }

                let summary = MethodProfile::summarize(&operations);
                profiles.push(MethodProfile {
                    name: method.name.clone(),
                    return_type: method.return_type.clone(),
                    parameters: method.parameters.clone(),
                    operations,
                    summary,
                });
            }

            if !profiles.is_empty() {
                logic.push((structure.name.clone(), profiles));
            }
        }

        logic
    }

    /// Trace controller → service → repository chains along injection and
    /// field edges. Controllers with no resolvable downstream dependency
    /// are omitted from the result, not reported as empty.
    pub fn analyze_flows(
        files: &[AnalyzedSource],
        relationships: &[Relationship],
    ) -> Vec<DataFlow> {
        let services: HashSet<&str> = files
            .iter()
            .filter(|f| f.role() == FileRole::Service)
            .filter_map(|f| f.class_name())
            .collect();
        let repositories: HashSet<&str> = files
            .iter()
            .filter(|f| f.role() == FileRole::Repository)
            .filter_map(|f| f.class_name())
            .collect();

        let mut relation_map: HashMap<&str, Vec<&str>> = HashMap::new();
        for relationship in relationships {
            if matches!(relationship.kind, RelationKind::HasField | RelationKind::Autowires) {
                relation_map
                    .entry(relationship.source.as_str())
                    .or_default()
                    .push(relationship.target.as_str());
            }
        }

        let mut flows = Vec::new();

        for file in files.iter().filter(|f| f.role() == FileRole::Controller) {
            let structure = match &file.structure {
                Some(structure) => structure,
                None => continue,
            };
            let controller_deps = relation_map
                .get(structure.name.as_str())
                .cloned()
                .unwrap_or_default();

            let mut endpoints = Vec::new();
            for method in &structure.methods {
                if method.name.starts_with("get") || method.name.starts_with("set") {
                    continue;
                }

                let mut chain = vec![structure.name.as_str()];
                for dep in &controller_deps {
                    if services.contains(dep) {
                        chain.push(dep);
                        if let Some(service_deps) = relation_map.get(dep) {
                            for downstream in service_deps {
                                if repositories.contains(downstream) {
                                    chain.push(downstream);
                                }
                            }
                        }
                    }
                }

                if chain.len() > 1 {
                    endpoints.push(FlowEndpoint {
                        method: method.name.clone(),
                        flow: chain.join(" → "),
                    });
                }
            }

            if !endpoints.is_empty() {
                flows.push(DataFlow {
                    controller: structure.name.clone(),
                    endpoints,
                });
            }
        }

        debug!(count = flows.len(), "Data flow tracing completed");
        flows
    }
}

fn association_kind(marker: &str) -> Option<AssociationKind> {
    ASSOCIATION_MARKERS
        .iter()
        .find(|(name, _)| name.trim_start_matches('@') == marker)
        .and_then(|(_, kind)| *kind)
}

fn safe_slice(content: &str, mut start: usize, end: usize) -> &str {
    while start > 0 && !content.is_char_boundary(start) {
        start -= 1;
    }
    &content[start..end]
}

fn method_body(content: &str, signature_pos: usize) -> Option<&str> {
    let open = content[signature_pos..].find('{')? + signature_pos;
    let bytes = content.as_bytes();
    let mut balance = 1usize;
    let mut end = open + 1;

    while balance > 0 && end < bytes.len() {
        match bytes[end] {
            b'{' => balance += 1,
            b'}' => balance = balance.saturating_sub(1),
            _ => {}
        }
        end += 1;
    }

    Some(content[open..end].trim())
}
