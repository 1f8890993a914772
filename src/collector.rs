//! Per-file metric collection
//!
//! Orchestrates the per-file resolvers into a flat list of `FileRecord`s,
//! then derives the reverse-include relation across the whole set. One bad
//! file never aborts the scan: record-level failures are logged and the file
//! is dropped; history-only failures degrade to the default record.

use crate::analysis::{
    scan_source, ExternalMetrics, ExternalMetricsProvider, HistoryInfo, HistoryOutcome,
    HistoryResolver, OwnershipRules, StructuralSummary, StubProvider,
};
use crate::reporter::Reporter;
use crate::scan;
use indicatif::ProgressBar;
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// One scanned file with every attached metric. Built once per run and
/// immutable afterward; `relative_path` is the unique join key.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub name: String,
    pub absolute_path: PathBuf,
    /// Relative to the repository root, forward-slash segments.
    pub relative_path: String,
    pub size_bytes: u64,
    pub line_count: usize,
    pub declared_types: Vec<String>,
    pub declared_includes: Vec<String>,
    /// Relative paths of files whose includes name this file's basename.
    pub included_by: Vec<String>,
    pub owner: String,
    /// `None` when the history backend had nothing for this path; consumers
    /// substitute `HistoryInfo::default()`.
    pub history: Option<HistoryInfo>,
    pub external: ExternalMetrics,
}

/// Scans a repository into `FileRecord`s.
pub struct MetricsCollector<'a> {
    repo_root: PathBuf,
    reporter: &'a Reporter,
    history: HistoryResolver,
    ownership: OwnershipRules,
    external: Box<dyn ExternalMetricsProvider>,
}

impl<'a> MetricsCollector<'a> {
    pub fn new(repo_root: &Path, reporter: &'a Reporter) -> Self {
        let ownership = OwnershipRules::load(repo_root, reporter);
        if ownership.is_empty() {
            reporter.debug("No ownership rules found; all files will be Unassigned.");
        }
        Self {
            repo_root: repo_root.to_path_buf(),
            reporter,
            history: HistoryResolver::new(repo_root),
            ownership,
            external: Box::new(StubProvider),
        }
    }

    #[allow(dead_code)]
    pub fn with_external_provider(mut self, provider: Box<dyn ExternalMetricsProvider>) -> Self {
        self.external = provider;
        self
    }

    /// Enumerate candidate files and build a record for each one.
    pub fn collect(&self) -> Vec<FileRecord> {
        let files = scan::collect_files(&self.repo_root, self.reporter);

        let progress = if self.reporter.debug_enabled() {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(files.len() as u64)
        };
        progress.set_message("Analyzing files");

        let mut records = Vec::new();
        for path in &files {
            if let Some(record) = self.build_record(path) {
                records.push(record);
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        compute_included_by(&mut records);
        records
    }

    fn build_record(&self, path: &Path) -> Option<FileRecord> {
        let Some(relative_path) = relative_slash_path(&self.repo_root, path) else {
            self.reporter.error(format!(
                "Failed to analyze {}: path is outside the repository root",
                path.display()
            ));
            return None;
        };
        let name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&relative_path)
            .to_string();

        let size_bytes = match fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                self.reporter
                    .error(format!("Failed to analyze {}: {}", path.display(), e));
                return None;
            }
        };

        // Unreadable or binary content degrades to zero structure values;
        // the file itself stays in the record set.
        let summary = match fs::read(path) {
            Ok(bytes) => scan_source(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                self.reporter
                    .debug(format!("Unreadable {}: {} (zero values)", relative_path, e));
                StructuralSummary::default()
            }
        };

        let history = match self.history.lookup(&relative_path) {
            HistoryOutcome::Found(info) => Some(info),
            HistoryOutcome::Absent => {
                self.reporter
                    .debug(format!("No history for {}", relative_path));
                None
            }
            HistoryOutcome::Failed(reason) => {
                self.reporter
                    .debug(format!("History lookup failed for {}: {}", relative_path, reason));
                None
            }
        };

        let owner = self.ownership.resolve(&relative_path).to_string();
        let external = self.external.metrics_for(path);

        Some(FileRecord {
            name,
            absolute_path: path.to_path_buf(),
            relative_path,
            size_bytes,
            line_count: summary.line_count,
            declared_types: summary.declared_types,
            declared_includes: summary.declared_includes,
            included_by: Vec::new(),
            owner,
            history,
            external,
        })
    }
}

/// Derive the reverse-include relation across the record set.
///
/// Matching is by bare basename on both sides: the directory part of an
/// include directive is discarded, and any record whose filename equals a
/// declared target is considered included. This over-matches same-named
/// files in different directories and under-matches subpath includes; the
/// imprecision is accepted.
fn compute_included_by(records: &mut [FileRecord]) {
    let mut include_map: HashMap<String, Vec<String>> = HashMap::new();

    for record in records.iter() {
        for target in &record.declared_includes {
            let basename = target.rsplit('/').next().unwrap_or(target);
            include_map
                .entry(basename.to_string())
                .or_default()
                .push(record.relative_path.clone());
        }
    }

    for record in records.iter_mut() {
        if let Some(including) = include_map.get(&record.name) {
            record.included_by = including.clone();
        }
    }
}

fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let segments: Vec<&str> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, rel: &str, includes: &[&str]) -> FileRecord {
        FileRecord {
            name: name.to_string(),
            absolute_path: PathBuf::from("/repo").join(rel),
            relative_path: rel.to_string(),
            size_bytes: 0,
            line_count: 0,
            declared_types: Vec::new(),
            declared_includes: includes.iter().map(|s| s.to_string()).collect(),
            included_by: Vec::new(),
            owner: "Unassigned".to_string(),
            history: None,
            external: ExternalMetrics::default(),
        }
    }

    #[test]
    fn test_included_by_matches_basename() {
        let mut records = vec![
            record("a.cpp", "src/a.cpp", &["b.h"]),
            record("b.h", "src/b.h", &[]),
        ];
        compute_included_by(&mut records);
        assert!(records[0].included_by.is_empty());
        assert_eq!(records[1].included_by, vec!["src/a.cpp"]);
    }

    #[test]
    fn test_included_by_ignores_directory_parts() {
        let mut records = vec![
            record("a.cpp", "src/a.cpp", &["util/b.h"]),
            record("b.h", "other/b.h", &[]),
        ];
        compute_included_by(&mut records);
        // Basename-only: other/b.h matches even though util/b.h was named.
        assert_eq!(records[1].included_by, vec!["src/a.cpp"]);
    }

    #[test]
    fn test_included_by_retains_duplicates() {
        let mut records = vec![
            record("a.cpp", "src/a.cpp", &["b.h", "b.h"]),
            record("b.h", "src/b.h", &[]),
        ];
        compute_included_by(&mut records);
        assert_eq!(records[1].included_by, vec!["src/a.cpp", "src/a.cpp"]);
    }

    #[test]
    fn test_relative_slash_path() {
        let root = Path::new("/repo");
        assert_eq!(
            relative_slash_path(root, Path::new("/repo/src/a.cpp")),
            Some("src/a.cpp".to_string())
        );
        assert_eq!(relative_slash_path(root, Path::new("/elsewhere/a.cpp")), None);
        assert_eq!(relative_slash_path(root, Path::new("/repo")), None);
    }

    #[test]
    fn test_collect_builds_records() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(
            root.join("src/a.cpp"),
            "#include \"b.h\"\n\nclass Foo {\n  int x;\n};\n\nint main() { return 0; }\n",
        )
        .unwrap();
        std::fs::write(root.join("src/b.h"), "#pragma once\n").unwrap();
        std::fs::write(root.join("CODEOWNERS"), "src/* TeamX\n").unwrap();
        std::fs::write(root.join("README.md"), "not scanned\n").unwrap();

        let reporter = Reporter::new(false);
        let collector = MetricsCollector::new(root, &reporter);
        let mut records = collector.collect();
        records.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        // CODEOWNERS itself is collected; README.md is not.
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "CODEOWNERS");
        assert_eq!(records[0].owner, "Unassigned");

        let a = &records[1];
        assert_eq!(a.relative_path, "src/a.cpp");
        assert_eq!(a.line_count, 5);
        assert_eq!(a.declared_types, vec!["Foo"]);
        assert_eq!(a.declared_includes, vec!["b.h"]);
        assert_eq!(a.owner, "TeamX");
        assert!(a.included_by.is_empty());

        let b = &records[2];
        assert_eq!(b.relative_path, "src/b.h");
        assert_eq!(b.included_by, vec!["src/a.cpp"]);
        assert_eq!(b.owner, "TeamX");

        // Not a git repository: every record degrades to absent history.
        assert!(records.iter().all(|r| r.history.is_none()));
    }

    struct FixedCoverage;

    impl ExternalMetricsProvider for FixedCoverage {
        fn metrics_for(&self, _path: &Path) -> ExternalMetrics {
            ExternalMetrics {
                coverage: 85.5,
                ..Default::default()
            }
        }
    }

    #[test]
    fn test_external_provider_is_pluggable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.cpp"), "int x;\n").unwrap();

        let reporter = Reporter::new(false);
        let records = MetricsCollector::new(dir.path(), &reporter)
            .with_external_provider(Box::new(FixedCoverage))
            .collect();
        assert_eq!(records[0].external.coverage, 85.5);
    }

    #[test]
    fn test_collect_tolerates_binary_content() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blob.cpp"), [0xffu8, 0xfe, 0x00, 0x01]).unwrap();

        let reporter = Reporter::new(false);
        let records = MetricsCollector::new(dir.path(), &reporter).collect();
        assert_eq!(records.len(), 1);
    }
}
