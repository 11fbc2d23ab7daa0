//! Inter-class relationship extraction.
//!
//! Operates on the name-indexed set of extracted class structures. The
//! class index is the closed world: relationships whose target is not a
//! class in the current run are dropped, so unresolved external supertypes
//! never appear in the graph.

use std::collections::HashSet;

use regex::Regex;
use tracing::debug;

use archlens_core::domain::{bare_type, AnalyzedSource, RelationKind, Relationship};

pub struct RelationshipAnalyzer;

impl RelationshipAnalyzer {
    /// Derive the relationship list from every file carrying a class
    /// structure, in file order. No de-duplication is performed; consumers
    /// needing set semantics de-duplicate themselves.
    pub fn analyze(files: &[AnalyzedSource]) -> Vec<Relationship> {
        // Name-indexed view of the run's classes, in encounter order
        let classes: Vec<(&str, &AnalyzedSource)> = files
            .iter()
            .filter_map(|f| f.class_name().map(|name| (name, f)))
            .collect();
        let index: HashSet<&str> = classes.iter().map(|(name, _)| *name).collect();

        // One DI pattern per candidate target, compiled up front
        let autowire_patterns: Vec<(&str, Regex)> = classes
            .iter()
            .filter_map(|(name, _)| {
                Regex::new(&format!(r"@Autowired[^;]*{}", regex::escape(name)))
                    .ok()
                    .map(|pattern| (*name, pattern))
            })
            .collect();

        let mut relationships = Vec::new();

        for (source_name, file) in &classes {
            let structure = match &file.structure {
                Some(structure) => structure,
                None => continue,
            };

            if let Some(parent) = &structure.extends {
                if index.contains(parent.as_str()) {
                    relationships.push(Relationship::new(
                        *source_name,
                        parent.clone(),
                        RelationKind::Extends,
                    ));
                }
            }

            for interface in &structure.implements {
                if index.contains(interface.as_str()) {
                    relationships.push(Relationship::new(
                        *source_name,
                        interface.clone(),
                        RelationKind::Implements,
                    ));
                }
            }

            for field in &structure.fields {
                let target = bare_type(&field.field_type);
                if index.contains(target) {
                    relationships.push(Relationship::new(
                        *source_name,
                        target,
                        RelationKind::HasField,
                    ));
                }
            }

            for method in &structure.methods {
                let return_target = bare_type(&method.return_type);
                if index.contains(return_target) {
                    relationships.push(Relationship::new(
                        *source_name,
                        return_target,
                        RelationKind::Returns,
                    ));
                }

                for param in &method.parameters {
                    let param_target = bare_type(&param.param_type);
                    if index.contains(param_target) {
                        relationships.push(Relationship::new(
                            *source_name,
                            param_target,
                            RelationKind::UsesParam,
                        ));
                    }
                }
            }

            // Injection wiring: a DI marker followed (same statement span)
            // by a known class name. Quadratic in text-search terms per
            // file; acceptable at project scale, never run on combined
            // cross-project input.
            for (target_name, pattern) in &autowire_patterns {
                if pattern.is_match(&file.record.content) {
                    relationships.push(Relationship::new(
                        *source_name,
                        *target_name,
                        RelationKind::Autowires,
                    ));
                }
            }
        }

        debug!(count = relationships.len(), "Relationship extraction completed");
        relationships
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::extractor::{PatternExtractor, StructuralExtractor};
    use archlens_core::domain::{FileRole, SourceRecord};

    fn analyzed(path: &str, content: &str, role: FileRole) -> AnalyzedSource {
        AnalyzedSource {
            structure: PatternExtractor.extract(content),
            record: SourceRecord {
                path: path.to_string(),
                package: String::new(),
                content: content.to_string(),
                role,
            },
            complexity: None,
            javadocs: Vec::new(),
            todos: Vec::new(),
        }
    }

    #[test]
    fn inheritance_and_field_edges_resolve_in_index() {
        let files = vec![
            analyzed("Base.java", "public class Base {}", FileRole::Unclassified),
            analyzed(
                "User.java",
                "public class User extends Base {\n    private Profile profile;\n}",
                FileRole::Entity,
            ),
            analyzed("Profile.java", "public class Profile {}", FileRole::Entity),
        ];

        let relationships = RelationshipAnalyzer::analyze(&files);
        assert!(relationships.iter().any(|r| {
            r.source == "User" && r.target == "Base" && r.kind == RelationKind::Extends
        }));
        assert!(relationships.iter().any(|r| {
            r.source == "User" && r.target == "Profile" && r.kind == RelationKind::HasField
        }));
    }

    #[test]
    fn edges_to_unknown_types_are_dropped() {
        let files = vec![analyzed(
            "User.java",
            "public class User extends BaseEntity {\n    private List<String> tags;\n}",
            FileRole::Entity,
        )];

        let relationships = RelationshipAnalyzer::analyze(&files);
        let index: std::collections::HashSet<&str> =
            files.iter().filter_map(|f| f.class_name()).collect();
        assert!(relationships.iter().all(|r| index.contains(r.target.as_str())));
    }

    #[test]
    fn generic_wrappers_reduce_to_bare_container() {
        let files = vec![
            analyzed("Box.java", "public class Box {}", FileRole::Unclassified),
            analyzed(
                "Shelf.java",
                "public class Shelf {\n    private Box<Item> slot;\n}",
                FileRole::Unclassified,
            ),
        ];

        let relationships = RelationshipAnalyzer::analyze(&files);
        assert!(relationships.iter().any(|r| {
            r.source == "Shelf" && r.target == "Box" && r.kind == RelationKind::HasField
        }));
    }

    #[test]
    fn autowired_dependency_detected() {
        let files = vec![
            analyzed(
                "OrderController.java",
                "@RestController\npublic class OrderController {\n    @Autowired\n    private OrderService orderService;\n}",
                FileRole::Controller,
            ),
            analyzed(
                "OrderService.java",
                "@Service\npublic class OrderService {}",
                FileRole::Service,
            ),
        ];

        let relationships = RelationshipAnalyzer::analyze(&files);
        assert!(relationships.iter().any(|r| {
            r.source == "OrderController"
                && r.target == "OrderService"
                && r.kind == RelationKind::Autowires
        }));
    }

    #[test]
    fn return_and_parameter_coupling() {
        let files = vec![
            analyzed("User.java", "public class User {}", FileRole::Entity),
            analyzed(
                "UserService.java",
                "@Service\npublic class UserService {\n    public User rename(User user) { return user; }\n}",
                FileRole::Service,
            ),
        ];

        let relationships = RelationshipAnalyzer::analyze(&files);
        assert!(relationships.iter().any(|r| {
            r.source == "UserService" && r.target == "User" && r.kind == RelationKind::Returns
        }));
        assert!(relationships.iter().any(|r| {
            r.source == "UserService" && r.target == "User" && r.kind == RelationKind::UsesParam
        }));
    }
}
