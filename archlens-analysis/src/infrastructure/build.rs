//! Build descriptor scraping (Gradle and Maven).
//!
//! Best-effort key extraction; fields the descriptor does not mention stay
//! empty and render as `"N/A"` in emitted documents.

use once_cell::sync::Lazy;
use regex::Regex;

use archlens_core::domain::ProjectMetadata;

static GRADLE_PLUGIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"id ['"](.*?)['"]( version ['"](.*?)['"])?"#).expect("gradle plugin pattern")
});

static GRADLE_DEPENDENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(implementation|compileOnly|runtimeOnly|annotationProcessor) ['"](.*?)['"]"#)
        .expect("gradle dependency pattern")
});

static GRADLE_BOOT_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:org\.springframework\.boot['"] version ['"]|id\(['"]org\.springframework\.boot['"](?:\) version ['"])|id\s*=\s*['"]*org\.springframework\.boot['"]*(?:\s*version\s*=\s*['"]))(.*?)['"]"#,
    )
    .expect("gradle boot version pattern")
});

static GRADLE_JAVA_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"JavaLanguageVersion\.of\((\d+)\)").expect("gradle java version pattern")
});

static GRADLE_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"group = ['"](.*?)['"]"#).expect("gradle group pattern"));

static GRADLE_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"version = ['"](.*?)['"]"#).expect("gradle version pattern"));

static MAVEN_PARENT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<parent>.*?</parent>").expect("maven parent pattern"));

static MAVEN_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<groupId>(.*?)</groupId>").expect("maven group pattern"));

static MAVEN_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<version>(.*?)</version>").expect("maven version pattern"));

static MAVEN_DEPENDENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)<dependency>\s*<groupId>(.*?)</groupId>\s*<artifactId>(.*?)</artifactId>\s*(?:<version>(.*?)</version>)?",
    )
    .expect("maven dependency pattern")
});

static MAVEN_BOOT_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)<parent>\s*<groupId>org\.springframework\.boot</groupId>\s*<artifactId>spring-boot-starter-parent</artifactId>\s*<version>(.*?)</version>",
    )
    .expect("maven boot version pattern")
});

static MAVEN_JAVA_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<java\.version>(.*?)</java\.version>").expect("maven java version pattern")
});

static MAVEN_PLUGIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)<plugin>\s*<groupId>(.*?)</groupId>\s*<artifactId>(.*?)</artifactId>\s*(?:<version>(.*?)</version>)?",
    )
    .expect("maven plugin pattern")
});

/// Dispatch on the descriptor file name.
pub fn parse_build_descriptor(file_name: &str, content: &str) -> ProjectMetadata {
    if file_name.ends_with(".xml") {
        parse_maven(content)
    } else {
        parse_gradle(content)
    }
}

/// Scrape project information from a `build.gradle`/`build.gradle.kts`.
pub fn parse_gradle(content: &str) -> ProjectMetadata {
    let mut metadata = ProjectMetadata::default();

    for caps in GRADLE_PLUGIN.captures_iter(content) {
        let mut plugin = caps[1].to_string();
        if let Some(version) = caps.get(3) {
            plugin.push(' ');
            plugin.push_str(version.as_str());
        }
        metadata.plugins.push(plugin);
    }

    for caps in GRADLE_DEPENDENCY.captures_iter(content) {
        metadata
            .dependencies
            .push(format!("{}: {}", &caps[1], &caps[2]));
    }

    if let Some(caps) = GRADLE_BOOT_VERSION.captures(content) {
        metadata.framework_version = caps[1].to_string();
    }

    if let Some(caps) = GRADLE_JAVA_VERSION.captures(content) {
        metadata.language_version = caps[1].to_string();
    }

    if let Some(caps) = GRADLE_GROUP.captures(content) {
        metadata.group = caps[1].to_string();
    }

    if let Some(caps) = GRADLE_VERSION.captures(content) {
        metadata.version = caps[1].to_string();
    }

    metadata
}

/// Scrape project information from a `pom.xml`.
pub fn parse_maven(content: &str) -> ProjectMetadata {
    let mut metadata = ProjectMetadata::default();

    // Identity comes from the first coordinates outside the <parent> block
    let without_parent = MAVEN_PARENT_BLOCK.replace_all(content, "");

    if let Some(caps) = MAVEN_GROUP.captures(&without_parent) {
        metadata.group = caps[1].to_string();
    }
    if let Some(caps) = MAVEN_VERSION.captures(&without_parent) {
        metadata.version = caps[1].to_string();
    }

    for caps in MAVEN_DEPENDENCY.captures_iter(content) {
        let version = caps.get(3).map(|m| m.as_str()).unwrap_or("managed");
        metadata
            .dependencies
            .push(format!("{}:{}:{}", &caps[1], &caps[2], version));
    }

    if let Some(caps) = MAVEN_BOOT_VERSION.captures(content) {
        metadata.framework_version = caps[1].to_string();
    }

    if let Some(caps) = MAVEN_JAVA_VERSION.captures(content) {
        metadata.language_version = caps[1].to_string();
    }

    for caps in MAVEN_PLUGIN.captures_iter(content) {
        let version = caps.get(3).map(|m| m.as_str()).unwrap_or("managed");
        metadata
            .plugins
            .push(format!("{}:{}:{}", &caps[1], &caps[2], version));
    }

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradle_descriptor_is_scraped() {
        let content = r#"
plugins {
    id 'java'
    id 'org.springframework.boot' version '3.2.1'
}

group = 'com.example'
version = '0.0.1-SNAPSHOT'

java {
    toolchain {
        languageVersion = JavaLanguageVersion.of(17)
    }
}

dependencies {
    implementation 'org.springframework.boot:spring-boot-starter-web'
    runtimeOnly 'com.h2database:h2'
}
"#;
        let metadata = parse_gradle(content);
        assert_eq!(metadata.group, "com.example");
        assert_eq!(metadata.version, "0.0.1-SNAPSHOT");
        assert_eq!(metadata.framework_version, "3.2.1");
        assert_eq!(metadata.language_version, "17");
        assert!(metadata
            .plugins
            .contains(&"org.springframework.boot 3.2.1".to_string()));
        assert!(metadata
            .dependencies
            .contains(&"implementation: org.springframework.boot:spring-boot-starter-web".to_string()));
        assert!(metadata.dependencies.contains(&"runtimeOnly: com.h2database:h2".to_string()));
    }

    #[test]
    fn maven_descriptor_ignores_parent_coordinates() {
        let content = r#"
<project>
    <parent>
        <groupId>org.springframework.boot</groupId>
        <artifactId>spring-boot-starter-parent</artifactId>
        <version>3.1.0</version>
    </parent>
    <groupId>com.example</groupId>
    <artifactId>demo</artifactId>
    <version>1.0.0</version>
    <properties>
        <java.version>17</java.version>
    </properties>
    <dependencies>
        <dependency>
            <groupId>org.springframework.boot</groupId>
            <artifactId>spring-boot-starter-web</artifactId>
        </dependency>
    </dependencies>
</project>
"#;
        let metadata = parse_maven(content);
        assert_eq!(metadata.group, "com.example");
        assert_eq!(metadata.version, "1.0.0");
        assert_eq!(metadata.framework_version, "3.1.0");
        assert_eq!(metadata.language_version, "17");
        assert_eq!(
            metadata.dependencies,
            vec!["org.springframework.boot:spring-boot-starter-web:managed"]
        );
    }

    #[test]
    fn missing_fields_stay_empty() {
        let metadata = parse_gradle("dependencies {}\n");
        assert!(metadata.group.is_empty());
        assert_eq!(ProjectMetadata::or_placeholder(&metadata.group), "N/A");
    }
}
