//! Project structure buckets.
//!
//! Every Java path in the project is bucketed by annotation first, then
//! naming convention. The buckets drive the architecture component counts
//! in both emitted documents.

use serde::Serialize;

use archlens_core::domain::SourceRecord;

/// Annotation- and naming-based buckets over every Java path in the project
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectStructure {
    pub controllers: Vec<String>,
    pub services: Vec<String>,
    pub repositories: Vec<String>,
    pub entities: Vec<String>,
    pub configs: Vec<String>,
    pub dtos: Vec<String>,
    pub models: Vec<String>,
    pub utils: Vec<String>,
    pub aspects: Vec<String>,
    pub interceptors: Vec<String>,
    pub exceptions: Vec<String>,
    pub tests: Vec<String>,
}

impl ProjectStructure {
    /// Bucket every Java record; first matching rule wins.
    pub fn classify(records: &[SourceRecord]) -> Self {
        let mut structure = Self::default();

        for record in records.iter().filter(|r| r.is_java()) {
            let path = record.path.clone();
            let path_lower = record.path.to_lowercase();
            let content = &record.content;

            if content.contains("@Controller") || content.contains("@RestController") {
                structure.controllers.push(path);
            } else if content.contains("@Service") {
                structure.services.push(path);
            } else if content.contains("@Repository") {
                structure.repositories.push(path);
            } else if content.contains("@Entity") {
                structure.entities.push(path);
            } else if content.contains("@Configuration") {
                structure.configs.push(path);
            } else if content.contains("@Aspect") {
                structure.aspects.push(path);
            } else if content.contains("HandlerInterceptor") {
                structure.interceptors.push(path);
            } else if path.ends_with("DTO.java")
                || path.ends_with("Dto.java")
                || path_lower.contains("dto")
            {
                structure.dtos.push(path);
            } else if path.ends_with("Exception.java") || path_lower.contains("exception") {
                structure.exceptions.push(path);
            } else if path.ends_with("Model.java") || path_lower.contains("model") {
                structure.models.push(path);
            } else if path.ends_with("Util.java")
                || path.ends_with("Utils.java")
                || path_lower.contains("util")
            {
                structure.utils.push(path);
            } else if content.contains("@Test") {
                structure.tests.push(path);
            }
        }

        structure
    }

    /// Count of files per non-empty bucket, in bucket declaration order.
    pub fn component_counts(&self) -> Vec<(&'static str, usize)> {
        [
            ("controllers", self.controllers.len()),
            ("services", self.services.len()),
            ("repositories", self.repositories.len()),
            ("entities", self.entities.len()),
            ("configs", self.configs.len()),
            ("dtos", self.dtos.len()),
            ("models", self.models.len()),
            ("utils", self.utils.len()),
            ("aspects", self.aspects.len()),
            ("interceptors", self.interceptors.len()),
            ("exceptions", self.exceptions.len()),
            ("tests", self.tests.len()),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect()
    }

    pub fn has_controllers(&self) -> bool {
        !self.controllers.is_empty()
    }

    pub fn has_services(&self) -> bool {
        !self.services.is_empty()
    }

    pub fn has_repositories(&self) -> bool {
        !self.repositories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archlens_core::domain::FileRole;

    fn record(path: &str, content: &str) -> SourceRecord {
        SourceRecord {
            path: path.to_string(),
            package: String::new(),
            content: content.to_string(),
            role: FileRole::Unclassified,
        }
    }

    #[test]
    fn buckets_by_annotation_first() {
        let records = vec![
            record("a/UserController.java", "@RestController class UserController {}"),
            record("a/UserService.java", "@Service class UserService {}"),
            record("a/UserRepository.java", "@Repository interface UserRepository {}"),
            record("a/api/UserDto.java", "class UserDto {}"),
            record("a/NotFoundException.java", "class NotFoundException {}"),
        ];
        let structure = ProjectStructure::classify(&records);
        assert_eq!(structure.controllers.len(), 1);
        assert_eq!(structure.services.len(), 1);
        assert_eq!(structure.repositories.len(), 1);
        assert_eq!(structure.dtos.len(), 1);
        assert_eq!(structure.exceptions.len(), 1);

        let counts = structure.component_counts();
        assert!(counts.contains(&("controllers", 1)));
        assert!(!counts.iter().any(|(name, _)| *name == "tests"));
    }

    #[test]
    fn non_java_files_are_ignored() {
        let records = vec![record("application.yml", "server:\n  port: 8080\n")];
        let structure = ProjectStructure::classify(&records);
        assert!(structure.component_counts().is_empty());
    }
}
