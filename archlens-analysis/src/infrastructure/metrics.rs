//! Additive complexity metrics and source preprocessing

use once_cell::sync::Lazy;
use regex::Regex;

use archlens_core::domain::ComplexityMetrics;

static METHOD_SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(public|private|protected)\s+\w+\s+\w+\s*\(").expect("method count pattern")
});

static CONDITIONAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(if|else if|case)\b").expect("conditional pattern"));

static LOOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(for|while|do)\b").expect("loop pattern"));

static TRY_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\btry\b").expect("try pattern"));

static IMPORT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(package\s+[\w.]+;)\s*(import\s+[\w.*]+;\s*)*").expect("import block pattern")
});

/// Compute the additive complexity metrics for one file.
///
/// No control-flow graph is built; every term is a flat count, and the
/// cyclomatic approximation carries a base term of 1.
pub fn calculate_complexity(content: &str) -> ComplexityMetrics {
    let conditional_branches = CONDITIONAL.find_iter(content).count();
    let loops = LOOP.find_iter(content).count();
    let try_catch = TRY_BLOCK.find_iter(content).count();

    ComplexityMetrics {
        lines: content.lines().count(),
        methods: METHOD_SIGNATURE.find_iter(content).count(),
        conditional_branches,
        loops,
        try_catch,
        cyclomatic: conditional_branches + loops + try_catch + 1,
    }
}

/// Drop the import block, keeping the package statement.
pub fn remove_imports(content: &str) -> String {
    IMPORT_BLOCK.replace_all(content, "${1}\n\n").into_owned()
}
