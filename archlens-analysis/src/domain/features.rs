//! Framework-level cross-cutting feature report.
//!
//! Bucket names and entry shapes are an interop contract with downstream
//! document consumers; do not rename fields.

use serde::Serialize;

/// Cross-cutting feature report, one named bucket per concern
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameworkFeatures {
    pub auto_configuration: Vec<String>,
    pub dependency_injection_patterns: Vec<InjectionStyle>,
    pub profiles: Vec<ProfileUsage>,
    pub properties_usage: Vec<PropertyUsage>,
    pub exception_handling: Vec<ExceptionHandling>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InjectionStyle {
    pub class: String,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUsage {
    pub class: String,
    pub profiles: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyUsage {
    pub class: String,
    pub properties: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExceptionHandling {
    pub class: String,
    /// True when the handler is a controller-advice (centralized) handler
    pub global: bool,
}
