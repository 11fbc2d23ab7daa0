//! Normalized API surface derived from controller files

use serde::{Deserialize, Serialize};

/// One route-handler declaration found in a controller.
///
/// `path` is the class-level base path joined with the method-level path,
/// with doubled separators collapsed. Endpoints are reported in encounter
/// order; no conflict or duplicate detection is performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub method: String,
    pub path: String,
    pub handler: String,
    pub description: Option<String>,
    pub request_params: Vec<String>,
    /// First body-bound parameter, rendered as `"Type name"`
    pub request_body: Option<String>,
    pub response_type: String,
}

/// Join a class-level base path and a method-level path.
///
/// Concatenates and collapses any doubled separator; if either side is
/// empty the other is returned unchanged.
pub fn join_paths(base: &str, method: &str) -> String {
    format!("{}{}", base, method).replace("//", "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_collapses_doubled_separator() {
        assert_eq!(join_paths("/api", "/users"), "/api/users");
    }

    #[test]
    fn join_with_empty_base_keeps_method_path() {
        assert_eq!(join_paths("", "/users"), "/users");
    }

    #[test]
    fn join_with_empty_method_keeps_base_path() {
        assert_eq!(join_paths("/api", ""), "/api");
    }
}
