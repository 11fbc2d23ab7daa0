//! Project metadata scraped from build descriptors

use serde::{Deserialize, Serialize};

/// Best-effort record scraped from `build.gradle`/`pom.xml`.
///
/// Scalar fields stay empty when the descriptor does not mention them and
/// render as `"N/A"` in emitted documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub group: String,
    pub version: String,
    pub framework_version: String,
    pub language_version: String,
    pub dependencies: Vec<String>,
    pub plugins: Vec<String>,
}

impl ProjectMetadata {
    /// Render an empty scalar as the document placeholder
    pub fn or_placeholder(value: &str) -> &str {
        if value.is_empty() {
            "N/A"
        } else {
            value
        }
    }
}
