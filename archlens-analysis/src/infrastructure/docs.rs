//! Doc comment and task marker extraction

use once_cell::sync::Lazy;
use regex::Regex;

static JAVADOC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*\*\s*(.*?)\s*\*/").expect("javadoc pattern"));

static JAVADOC_CONTINUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\*\s*").expect("javadoc continuation pattern"));

static TODO_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(?://|/\*|^\s*\*)\s*(TODO|FIXME):\s*(.*?)(?:\*/|\n)")
        .expect("todo marker pattern")
});

/// Extract doc comment blocks, with leading asterisks normalized away.
pub fn extract_javadocs(content: &str) -> Vec<String> {
    JAVADOC
        .captures_iter(content)
        .map(|caps| {
            JAVADOC_CONTINUATION
                .replace_all(&caps[1], "\n")
                .trim()
                .to_string()
        })
        .collect()
}

/// Extract TODO and FIXME markers from comments.
pub fn extract_todos(content: &str) -> Vec<String> {
    TODO_MARKER
        .captures_iter(content)
        .map(|caps| format!("{}: {}", &caps[1], caps[2].trim()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn javadoc_blocks_are_normalized() {
        let source = "/**\n * Finds a user.\n * @param id the id\n */\npublic User find(Long id) {}";
        let docs = extract_javadocs(source);
        assert_eq!(docs.len(), 1);
        assert!(docs[0].starts_with("Finds a user."));
        assert!(docs[0].contains("@param id the id"));
        assert!(!docs[0].contains('*'));
    }

    #[test]
    fn todo_and_fixme_markers_are_collected() {
        let source = "// TODO: add paging\n/* FIXME: handle nulls */\nint x;\n";
        let todos = extract_todos(source);
        assert_eq!(
            todos,
            vec!["TODO: add paging".to_string(), "FIXME: handle nulls".to_string()]
        );
    }
}
