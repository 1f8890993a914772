//! Ownership rules file parsing and path matching
//!
//! Rules files use the CODEOWNERS format: one `<pattern> <owner>` pair per
//! line, `#` comments, last matching rule wins. Only the first owner on a
//! line is tracked.

use crate::reporter::Reporter;
use globset::{Glob, GlobMatcher};
use std::fs;
use std::path::Path;

/// Owner assigned when no rule matches a path.
pub const UNASSIGNED_OWNER: &str = "Unassigned";

/// Locations probed for a rules file, in order; first found wins.
const CANDIDATE_LOCATIONS: &[&str] = &[
    "CODEOWNERS",
    ".github/CODEOWNERS",
    ".gitlab/CODEOWNERS",
    "docs/CODEOWNERS",
];

/// One `(pattern, owner)` pair; declaration order is significant.
#[derive(Debug, Clone)]
struct OwnershipRule {
    pattern: String,
    owner: String,
    /// Compiled glob for non-directory patterns.
    matcher: Option<GlobMatcher>,
}

/// Ordered ownership rule set for one repository.
#[derive(Debug, Clone, Default)]
pub struct OwnershipRules {
    rules: Vec<OwnershipRule>,
}

impl OwnershipRules {
    /// Load rules from the first candidate location that exists. A missing
    /// rules file yields an empty set, resolving every path to Unassigned.
    pub fn load(repo_root: &Path, reporter: &Reporter) -> Self {
        for location in CANDIDATE_LOCATIONS {
            let candidate = repo_root.join(location);
            if candidate.exists() {
                reporter.debug(format!("Using ownership rules from {}", location));
                let content = match fs::read_to_string(&candidate) {
                    Ok(content) => content,
                    Err(e) => {
                        reporter.debug(format!("Failed to read {}: {}", location, e));
                        return Self::default();
                    }
                };
                return Self::parse(&content, reporter);
            }
        }
        Self::default()
    }

    /// Parse rules file contents into an ordered rule set.
    pub fn parse(content: &str, reporter: &Reporter) -> Self {
        let mut rules = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let (Some(pattern), Some(owner)) = (tokens.next(), tokens.next()) else {
                continue;
            };
            // Additional owners on the line are ignored; only the primary
            // owner is tracked.

            let matcher = if pattern.ends_with('/') {
                None
            } else {
                // `*` is allowed to cross `/` here, matching shell-glob
                // (fnmatch) semantics rather than gitignore semantics.
                match Glob::new(pattern) {
                    Ok(glob) => Some(glob.compile_matcher()),
                    Err(e) => {
                        reporter.debug(format!("Skipping unparseable pattern {}: {}", pattern, e));
                        continue;
                    }
                }
            };

            rules.push(OwnershipRule {
                pattern: pattern.to_string(),
                owner: owner.to_string(),
                matcher,
            });
        }

        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve the owner for a forward-slash-normalized relative path.
    ///
    /// Rules are scanned in reverse declaration order so the last declared
    /// matching rule has the highest precedence.
    pub fn resolve(&self, rel_path: &str) -> &str {
        for rule in self.rules.iter().rev() {
            if rule.pattern.ends_with('/') {
                let dir = &rule.pattern[..rule.pattern.len() - 1];
                if rel_path.starts_with(rule.pattern.as_str()) || rel_path == dir {
                    return &rule.owner;
                }
            } else if let Some(matcher) = &rule.matcher {
                if matcher.is_match(rel_path) {
                    return &rule.owner;
                }
            }
        }
        UNASSIGNED_OWNER
    }
}
