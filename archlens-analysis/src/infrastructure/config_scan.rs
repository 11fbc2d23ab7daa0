//! Externalized configuration scraping (YAML and properties files)

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use archlens_core::domain::SourceRecord;

static SERVER_PORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"server:\s*\n\s*port:\s*(\d+)").expect("server port probe"));

static DATASOURCE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"datasource:\s*\n\s*url:\s*([^\n]+)").expect("datasource url probe"));

static JPA_DDL_AUTO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"jpa:\s*\n(?:[^\n]+\n)*\s*hibernate:\s*\n(?:[^\n]+\n)*\s*ddl-auto:\s*([^\n]+)")
        .expect("jpa ddl-auto probe")
});

/// Merge the key/value entries of every config-tagged record.
pub fn analyze_config_files<'a>(
    files: impl Iterator<Item = &'a SourceRecord>,
) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();

    for file in files {
        if file.path.ends_with(".yml") || file.path.ends_with(".yaml") {
            entries.extend(analyze_yaml(&file.content));
        } else if file.path.ends_with(".properties") {
            entries.extend(analyze_properties(&file.content));
        }
    }

    entries
}

/// Probe a YAML file for the handful of keys the report surfaces.
/// Not a YAML parser; targeted regex probes only.
pub fn analyze_yaml(content: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();

    if let Some(caps) = SERVER_PORT.captures(content) {
        entries.insert("server.port".to_string(), caps[1].to_string());
    }
    if let Some(caps) = DATASOURCE_URL.captures(content) {
        entries.insert(
            "spring.datasource.url".to_string(),
            caps[1].trim().to_string(),
        );
    }
    if let Some(caps) = JPA_DDL_AUTO.captures(content) {
        entries.insert(
            "spring.jpa.hibernate.ddl-auto".to_string(),
            caps[1].trim().to_string(),
        );
    }

    entries
}

/// Full key=value parse of a properties file, comments skipped.
pub fn analyze_properties(content: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_probes_find_port_and_datasource() {
        let content = "server:\n  port: 8080\nspring:\n  datasource:\n    url: jdbc:h2:mem:test\n";
        let entries = analyze_yaml(content);
        assert_eq!(entries.get("server.port").map(String::as_str), Some("8080"));
        assert_eq!(
            entries.get("spring.datasource.url").map(String::as_str),
            Some("jdbc:h2:mem:test")
        );
    }

    #[test]
    fn properties_lines_are_parsed() {
        let content = "# comment\nserver.port=9090\nspring.profiles.active = dev\n\nbroken-line\n";
        let entries = analyze_properties(content);
        assert_eq!(entries.get("server.port").map(String::as_str), Some("9090"));
        assert_eq!(
            entries.get("spring.profiles.active").map(String::as_str),
            Some("dev")
        );
        assert_eq!(entries.len(), 2);
    }
}
