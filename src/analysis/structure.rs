//! Lexical structure scan for C/C++ sources
//!
//! This is a best-effort pattern scan, not a grammar parse. Nested braces,
//! preprocessor conditionals, and macro-obscured declarations are not
//! specially handled, so both false positives (non-type braces matching the
//! pattern) and false negatives are possible and accepted.

use regex::Regex;
use std::sync::OnceLock;

/// Structure extracted from one file's contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuralSummary {
    /// Lines with at least one non-whitespace character.
    pub line_count: usize,
    /// Include directive targets, first-appearance order, duplicates kept.
    pub declared_includes: Vec<String>,
    /// Names of class/struct *definitions* (forward declarations excluded).
    pub declared_types: Vec<String>,
}

fn include_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?m)^\s*#\s*include\s+["<](.*?)[">]"#).unwrap())
}

fn type_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Definitions only: the name must be followed by an optional final
    // qualifier or inheritance list and then an opening brace.
    RE.get_or_init(|| {
        Regex::new(r"\b(?:class|struct)\s+([A-Za-z0-9_]+)\s*(?:final|:\s*[^{]+)?\s*\{").unwrap()
    })
}

/// Scan file contents for line count, includes, and type definitions.
pub fn scan_source(content: &str) -> StructuralSummary {
    let line_count = content.lines().filter(|l| !l.trim().is_empty()).count();

    let declared_includes = include_pattern()
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect();

    let declared_types = type_pattern()
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect();

    StructuralSummary {
        line_count,
        declared_includes,
        declared_types,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_non_blank_lines_only() {
        let src = "int a;\n\n   \nint b;\n\t\nint c;\n";
        assert_eq!(scan_source(src).line_count, 3);
    }

    #[test]
    fn test_includes_in_declared_order_with_duplicates() {
        let src = "#include <iostream>\n#include \"b.h\"\n#include <iostream>\n";
        let summary = scan_source(src);
        assert_eq!(summary.declared_includes, vec!["iostream", "b.h", "iostream"]);
    }

    #[test]
    fn test_include_forms() {
        let src = "  #include <vector>\n#  include \"deep/path/x.hpp\"\n";
        let summary = scan_source(src);
        assert_eq!(summary.declared_includes, vec!["vector", "deep/path/x.hpp"]);
    }

    #[test]
    fn test_type_definitions_counted() {
        let src = "class MyClass {\n  int x;\n};\nstruct Point { int x; int y; };\n";
        let summary = scan_source(src);
        assert_eq!(summary.declared_types, vec!["MyClass", "Point"]);
    }

    #[test]
    fn test_forward_declarations_skipped() {
        let src = "class Forward;\nstruct AlsoForward;\nclass Real {\n};\n";
        assert_eq!(scan_source(src).declared_types, vec!["Real"]);
    }

    #[test]
    fn test_inheritance_and_final() {
        let src = "class Derived : public Base {\n};\nclass Sealed final {\n};\n";
        assert_eq!(scan_source(src).declared_types, vec!["Derived", "Sealed"]);
    }

    #[test]
    fn test_empty_content_yields_default() {
        assert_eq!(scan_source(""), StructuralSummary::default());
    }

    #[test]
    fn test_header_with_class_sample() {
        let src = "#include <iostream>\n#include \"myheader.h\"\n\nclass MyClass {\n  int x;\n};\n";
        let summary = scan_source(src);
        assert_eq!(summary.line_count, 5);
        assert_eq!(summary.declared_includes.len(), 2);
        assert!(summary.declared_includes.contains(&"iostream".to_string()));
        assert_eq!(summary.declared_types, vec!["MyClass"]);
    }
}
