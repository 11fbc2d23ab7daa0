//! API surface extraction from controller files.
//!
//! Scans controller-tagged records for route-mapping annotations. Explicit
//! verb mappings are tried first, then the generic mapping form that names
//! its verb through an enum-style token. The handler signature is recovered
//! by scanning forward from the annotation to the next opening brace.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use archlens_core::domain::endpoint::join_paths;
use archlens_core::domain::{AnalyzedSource, Endpoint, FileRole};

static CLASS_MAPPING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@RequestMapping\(["']([^"']+)["']\)"#).expect("class mapping pattern")
});

static GET_MAPPING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@GetMapping\(["']([^"']+)["']\)"#).expect("get mapping pattern"));
static POST_MAPPING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@PostMapping\(["']([^"']+)["']\)"#).expect("post mapping pattern"));
static PUT_MAPPING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@PutMapping\(["']([^"']+)["']\)"#).expect("put mapping pattern"));
static DELETE_MAPPING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@DeleteMapping\(["']([^"']+)["']\)"#).expect("delete mapping pattern")
});
static PATCH_MAPPING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@PatchMapping\(["']([^"']+)["']\)"#).expect("patch mapping pattern")
});

/// Generic mapping fallback: requires an explicit enum-style method token
static REQUEST_MAPPING_WITH_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@RequestMapping\(\s*value\s*=\s*["']([^"']+)["'][^)]*method\s*=\s*RequestMethod\.(\w+)"#)
        .expect("generic mapping pattern")
});

static HANDLER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:public|private|protected)?\s+(?:\w+)(?:<[^>]+>)?\s+(\w+)\s*\(")
        .expect("handler name pattern")
});

static RESPONSE_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:public|private|protected)?\s+(\w+(?:<[^>]+>)?)\s+\w+\s*\(")
        .expect("response type pattern")
});

static REQUEST_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@RequestParam\([^)]*\)\s+\w+\s+(\w+)").expect("request param pattern")
});

static REQUEST_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@RequestBody\s+(\w+(?:<[^>]+>)?)\s+(\w+)").expect("request body pattern")
});

static OPERATION_SUMMARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@Operation\([^)]*summary\s*=\s*["']([^"']+)["']"#)
        .expect("operation summary pattern")
});

pub struct EndpointAnalyzer;

impl EndpointAnalyzer {
    /// Extract every endpoint from the controller-tagged records, in
    /// encounter order. No conflict or duplicate-path detection.
    pub fn analyze(files: &[AnalyzedSource]) -> Vec<Endpoint> {
        let mut endpoints = Vec::new();

        for file in files.iter().filter(|f| f.role() == FileRole::Controller) {
            let content = &file.record.content;

            let base_path = CLASS_MAPPING
                .captures(content)
                .map(|caps| caps[1].to_string())
                .unwrap_or_default();

            let explicit: [(&Lazy<Regex>, &str); 5] = [
                (&GET_MAPPING, "GET"),
                (&POST_MAPPING, "POST"),
                (&PUT_MAPPING, "PUT"),
                (&DELETE_MAPPING, "DELETE"),
                (&PATCH_MAPPING, "PATCH"),
            ];

            for (pattern, method) in explicit {
                for caps in pattern.captures_iter(content) {
                    let annotation_end = caps.get(0).map(|m| m.end()).unwrap_or(0);
                    let annotation_start = caps.get(0).map(|m| m.start()).unwrap_or(0);
                    endpoints.push(Self::build_endpoint(
                        content,
                        &base_path,
                        &caps[1],
                        method,
                        annotation_start,
                        annotation_end,
                    ));
                }
            }

            for caps in REQUEST_MAPPING_WITH_METHOD.captures_iter(content) {
                let annotation_end = caps.get(0).map(|m| m.end()).unwrap_or(0);
                let annotation_start = caps.get(0).map(|m| m.start()).unwrap_or(0);
                let method = caps[2].to_uppercase();
                endpoints.push(Self::build_endpoint(
                    content,
                    &base_path,
                    &caps[1],
                    &method,
                    annotation_start,
                    annotation_end,
                ));
            }
        }

        debug!(count = endpoints.len(), "Endpoint extraction completed");
        endpoints
    }

    fn build_endpoint(
        content: &str,
        base_path: &str,
        method_path: &str,
        http_method: &str,
        annotation_start: usize,
        annotation_end: usize,
    ) -> Endpoint {
        // Signature span: from the annotation to the handler's opening brace
        let rest = &content[annotation_end..];
        let method_block = rest.split('{').next().unwrap_or(rest);

        let handler = HANDLER_NAME
            .captures(method_block)
            .map(|caps| caps[1].to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let response_type = RESPONSE_TYPE
            .captures(method_block)
            .map(|caps| caps[1].to_string())
            .unwrap_or_else(|| "void".to_string());

        let request_params = REQUEST_PARAM
            .captures_iter(method_block)
            .map(|caps| caps[1].to_string())
            .collect();

        let request_body = REQUEST_BODY
            .captures(method_block)
            .map(|caps| format!("{} {}", &caps[1], &caps[2]));

        let description = OPERATION_SUMMARY
            .captures(&content[..annotation_start])
            .map(|caps| caps[1].to_string());

        Endpoint {
            method: http_method.to_uppercase(),
            path: join_paths(base_path, method_path),
            handler,
            description,
            request_params,
            request_body,
            response_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archlens_core::domain::SourceRecord;

    fn controller(content: &str) -> AnalyzedSource {
        AnalyzedSource::plain(SourceRecord {
            path: "web/PingController.java".to_string(),
            package: "web".to_string(),
            content: content.to_string(),
            role: FileRole::Controller,
        })
    }

    #[test]
    fn get_mapping_with_base_path() {
        let files = vec![controller(
            r#"
@RestController
@RequestMapping("/api")
public class PingController {
    @GetMapping("/users")
    public List<User> listUsers(@RequestParam("active") boolean active) {
        return service.list(active);
    }
}
"#,
        )];

        let endpoints = EndpointAnalyzer::analyze(&files);
        assert_eq!(endpoints.len(), 1);
        let ep = &endpoints[0];
        assert_eq!(ep.method, "GET");
        assert_eq!(ep.path, "/api/users");
        assert_eq!(ep.handler, "listUsers");
        assert_eq!(ep.request_params, vec!["active"]);
        assert_eq!(ep.response_type, "List<User>");
    }

    #[test]
    fn simple_ping_endpoint() {
        let files = vec![controller(
            r#"
@RestController
public class PingController {
    @GetMapping("/ping")
    public String ping() {
        return "pong";
    }
}
"#,
        )];

        let endpoints = EndpointAnalyzer::analyze(&files);
        assert_eq!(endpoints.len(), 1);
        let ep = &endpoints[0];
        assert_eq!(ep.method, "GET");
        assert_eq!(ep.path, "/ping");
        assert_eq!(ep.handler, "ping");
        assert_eq!(ep.response_type, "String");
        assert!(ep.request_params.is_empty());
        assert!(ep.request_body.is_none());
    }

    #[test]
    fn request_body_is_reported_as_type_and_name() {
        let files = vec![controller(
            r#"
@RestController
public class UserController {
    @PostMapping("/users")
    public UserDto create(@RequestBody CreateUserRequest request) {
        return service.create(request);
    }
}
"#,
        )];

        let endpoints = EndpointAnalyzer::analyze(&files);
        assert_eq!(endpoints.len(), 1);
        assert_eq!(
            endpoints[0].request_body.as_deref(),
            Some("CreateUserRequest request")
        );
        assert_eq!(endpoints[0].method, "POST");
    }

    #[test]
    fn generic_mapping_requires_method_token() {
        let files = vec![controller(
            r#"
@RestController
public class LegacyController {
    @RequestMapping(value = "/legacy", method = RequestMethod.PUT)
    public String update() {
        return "ok";
    }
}
"#,
        )];

        let endpoints = EndpointAnalyzer::analyze(&files);
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].method, "PUT");
        assert_eq!(endpoints[0].path, "/legacy");
    }

    #[test]
    fn description_from_preceding_operation_annotation() {
        let files = vec![controller(
            r#"
@RestController
public class DocController {
    @Operation(summary = "Health probe")
    @GetMapping("/health")
    public String health() {
        return "up";
    }
}
"#,
        )];

        let endpoints = EndpointAnalyzer::analyze(&files);
        assert_eq!(endpoints[0].description.as_deref(), Some("Health probe"));
    }

    #[test]
    fn non_controller_files_yield_nothing() {
        let mut file = controller("@GetMapping(\"/x\") public String x() { return \"\"; }");
        file.record.role = FileRole::Service;
        assert!(EndpointAnalyzer::analyze(&[file]).is_empty());
    }
}
