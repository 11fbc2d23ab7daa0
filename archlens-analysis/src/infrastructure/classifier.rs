//! File role classification

use archlens_core::domain::FileRole;

const BUILD_FILES: &[&str] = &[
    "build.gradle",
    "build.gradle.kts",
    "settings.gradle",
    "settings.gradle.kts",
    "pom.xml",
];

const CONFIG_FILES: &[&str] = &["application.yml", "application.yaml", "application.properties"];

/// Classify a collected file by its name alone.
///
/// Java sources return [`FileRole::Unclassified`] here; they are refined by
/// [`classify_java`] once their content has been preprocessed.
pub fn classify_by_name(file_name: &str) -> FileRole {
    if BUILD_FILES.contains(&file_name) {
        FileRole::Build
    } else if CONFIG_FILES.contains(&file_name) {
        FileRole::Config
    } else if file_name.ends_with(".java") {
        FileRole::Unclassified
    } else if file_name.ends_with(".yml")
        || file_name.ends_with(".yaml")
        || file_name.ends_with(".properties")
    {
        FileRole::Config
    } else {
        FileRole::Resource
    }
}

/// Prioritized role chain for Java sources; first match wins.
///
/// Stereotype markers for controller/service/repository are gated by a
/// path-name hint; entity and configuration markers alone suffice; the rest
/// falls back to naming and path-segment conventions.
pub fn classify_java(path: &str, content: &str) -> FileRole {
    let path_lower = path.to_lowercase();
    let content_lower = content.to_lowercase();

    if path.contains("Controller")
        && (content.contains("@Controller") || content.contains("@RestController"))
    {
        FileRole::Controller
    } else if path.contains("Service") && content.contains("@Service") {
        FileRole::Service
    } else if path.contains("Repository") && content.contains("@Repository") {
        FileRole::Repository
    } else if content.contains("@Entity") {
        FileRole::Entity
    } else if content.contains("@Configuration") {
        FileRole::Config
    } else if path.contains("DTO")
        || path.contains("Dto")
        || path_lower.contains("dto")
        || path.contains("Request")
        || path.contains("Response")
        || content_lower.contains("record")
    {
        FileRole::Dto
    } else if path.contains("Mapper") {
        FileRole::Mapper
    } else if path.contains("Util") || path.contains("Utils") {
        FileRole::Util
    } else if has_segment(&path_lower, "domain") {
        FileRole::Domain
    } else {
        FileRole::Unclassified
    }
}

fn has_segment(path_lower: &str, segment: &str) -> bool {
    path_lower.split(['/', '.']).any(|part| part == segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_requires_path_hint_and_marker() {
        assert_eq!(
            classify_java("web/UserController.java", "@RestController class UserController {}"),
            FileRole::Controller
        );
        // Marker without the path hint falls through the chain
        assert_eq!(
            classify_java("web/Users.java", "@RestController class Users {}"),
            FileRole::Unclassified
        );
    }

    #[test]
    fn entity_marker_alone_suffices() {
        assert_eq!(
            classify_java("model/User.java", "@Entity public class User {}"),
            FileRole::Entity
        );
    }

    #[test]
    fn stereotype_outranks_naming_convention() {
        // An @Entity under a dto directory is still an entity
        assert_eq!(
            classify_java("dto/User.java", "@Entity public class User {}"),
            FileRole::Entity
        );
    }

    #[test]
    fn dto_naming_conventions() {
        assert_eq!(classify_java("api/UserDTO.java", "class UserDTO {}"), FileRole::Dto);
        assert_eq!(
            classify_java("api/CreateUserRequest.java", "class CreateUserRequest {}"),
            FileRole::Dto
        );
        assert_eq!(
            classify_java("api/Point.java", "public record Point(int x, int y) {}"),
            FileRole::Dto
        );
    }

    #[test]
    fn domain_path_segment_classification() {
        assert_eq!(
            classify_java("com/acme/domain/Money.java", "public class Money {}"),
            FileRole::Domain
        );
    }

    #[test]
    fn build_and_config_names() {
        assert_eq!(classify_by_name("build.gradle"), FileRole::Build);
        assert_eq!(classify_by_name("pom.xml"), FileRole::Build);
        assert_eq!(classify_by_name("application.yml"), FileRole::Config);
        assert_eq!(classify_by_name("custom.properties"), FileRole::Config);
        assert_eq!(classify_by_name("logo.svg"), FileRole::Resource);
    }
}
