//! Framework-level cross-cutting pattern detection.
//!
//! Every classified component file is scanned independently; each detection
//! appends an entry to a named bucket. Bucket names and entry shapes are an
//! interop contract with downstream document consumers.

use once_cell::sync::Lazy;
use regex::Regex;

use archlens_core::domain::{AnalyzedSource, FileRole};

use crate::domain::features::{
    ExceptionHandling, FrameworkFeatures, InjectionStyle, ProfileUsage, PropertyUsage,
};

static FIELD_INJECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@Autowired\s+private").expect("field injection pattern"));

static SETTER_INJECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@Autowired\s+(?:public|protected|private)\s+void\s+set")
        .expect("setter injection pattern")
});

static PROFILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@Profile\(["']([^"']+)["']\)"#).expect("profile pattern"));

static PROPERTY_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@Value\(["'](\$\{[^"']+\})["']"#).expect("property reference pattern")
});

pub struct FrameworkAnalyzer;

impl FrameworkAnalyzer {
    pub fn analyze(files: &[AnalyzedSource]) -> FrameworkFeatures {
        let mut features = FrameworkFeatures::default();

        for file in files {
            if !matches!(
                file.role(),
                FileRole::Controller
                    | FileRole::Service
                    | FileRole::Repository
                    | FileRole::Config
                    | FileRole::Entity
            ) {
                continue;
            }

            let content = &file.record.content;
            let class_name = file.class_name().unwrap_or("Unknown").to_string();

            if content.contains("@EnableAutoConfiguration")
                || content.contains("@SpringBootApplication")
            {
                features.auto_configuration.push(file.record.path.clone());
            }

            let mut patterns = Vec::new();
            if content.contains("@Autowired") && content.contains(&format!("public {}", class_name))
            {
                patterns.push("constructor".to_string());
            }
            if FIELD_INJECTION.is_match(content) {
                patterns.push("field".to_string());
            }
            if SETTER_INJECTION.is_match(content) {
                patterns.push("setter".to_string());
            }
            if !patterns.is_empty() {
                features.dependency_injection_patterns.push(InjectionStyle {
                    class: class_name.clone(),
                    patterns,
                });
            }

            if content.contains("@Profile") {
                let profiles: Vec<String> = PROFILE
                    .captures_iter(content)
                    .map(|caps| caps[1].to_string())
                    .collect();
                if !profiles.is_empty() {
                    features.profiles.push(ProfileUsage {
                        class: class_name.clone(),
                        profiles,
                    });
                }
            }

            if content.contains("@Value") {
                let properties: Vec<String> = PROPERTY_REF
                    .captures_iter(content)
                    .map(|caps| caps[1].to_string())
                    .collect();
                if !properties.is_empty() {
                    features.properties_usage.push(PropertyUsage {
                        class: class_name.clone(),
                        properties,
                    });
                }
            }

            if content.contains("@ExceptionHandler") || content.contains("@ControllerAdvice") {
                features.exception_handling.push(ExceptionHandling {
                    class: class_name,
                    global: content.contains("@ControllerAdvice"),
                });
            }
        }

        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::extractor::{PatternExtractor, StructuralExtractor};
    use archlens_core::domain::SourceRecord;

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
    fn field_injection_detected() {
        let file = analyzed(
            "UserService.java",
            "@Service\npublic class UserService {\n    @Autowired\n    private UserRepository repo;\n}",
            FileRole::Service,
        );

        let features = FrameworkAnalyzer::analyze(&[file]);
        assert_eq!(features.dependency_injection_patterns.len(), 1);
        let style = &features.dependency_injection_patterns[0];
        assert_eq!(style.class, "UserService");
        assert!(style.patterns.contains(&"field".to_string()));
    }

    #[test]
    fn profiles_and_properties_collected() {
        let file = analyzed(
            "AppConfig.java",
            r#"
@Configuration
@Profile("prod")
public class AppConfig {
    @Value("${app.timeout}")
    private int timeout;
}
"#,
            FileRole::Config,
        );

        let features = FrameworkAnalyzer::analyze(&[file]);
        assert_eq!(features.profiles[0].profiles, vec!["prod"]);
        assert_eq!(features.properties_usage[0].properties, vec!["${app.timeout}"]);
    }

    #[test]
    fn controller_advice_marks_global_exception_handling() {
        let file = analyzed(
            "ErrorController.java",
            "@ControllerAdvice\npublic class ErrorController {\n    @ExceptionHandler\n    public String onError() { return \"err\"; }\n}",
            FileRole::Controller,
        );

        let features = FrameworkAnalyzer::analyze(&[file]);
        assert_eq!(features.exception_handling.len(), 1);
        assert!(features.exception_handling[0].global);
    }

    #[test]
    fn unclassified_files_are_ignored() {
        let file = analyzed(
            "App.java",
            "@SpringBootApplication\npublic class App {}",
            FileRole::Unclassified,
        );
        let features = FrameworkAnalyzer::analyze(&[file]);
        assert!(features.auto_configuration.is_empty());
    }
}
