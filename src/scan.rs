//! Repository file enumeration
//!
//! Walks the repository root and collects every path worth analyzing:
//! C/C++ sources and headers, plus ownership rules files by name.

use crate::reporter::Reporter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions included in a scan, compared case-insensitively.
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cpp", "h", "hpp", "cc", "cxx", "hxx"];

/// Canonical filename of the ownership rules file.
pub const OWNERSHIP_FILE_NAME: &str = "CODEOWNERS";

/// True if the path carries one of the supported source extensions.
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            SOURCE_EXTENSIONS.iter().any(|known| *known == ext)
        })
        .unwrap_or(false)
}

/// Collect absolute paths of all candidate files under `repo_root`.
///
/// Hidden directories (name starting with `.`) are pruned entirely, so the
/// walk never descends into `.git` and friends. Hidden *files* still qualify
/// if they pass the extension check.
pub fn collect_files(repo_root: &Path, reporter: &Reporter) -> Vec<PathBuf> {
    let mut files = Vec::new();

    // The root itself is exempt from the hidden check so a repository that
    // happens to live in a dot-directory still scans.
    for entry in WalkDir::new(repo_root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e.path(), e.file_type().is_dir()))
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if is_source_file(path) || name == OWNERSHIP_FILE_NAME {
            files.push(path.to_path_buf());
        }
    }

    reporter.debug(format!("Found {} files to analyze.", files.len()));
    files
}

fn is_hidden_dir(path: &Path, is_dir: bool) -> bool {
    if !is_dir {
        return false;
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_is_source_file() {
        assert!(is_source_file(Path::new("main.cpp")));
        assert!(is_source_file(Path::new("utils.h")));
        assert!(is_source_file(Path::new("lib.c")));
        assert!(is_source_file(Path::new("engine.HPP")));
        assert!(!is_source_file(Path::new("readme.md")));
        assert!(!is_source_file(Path::new("script.py")));
        assert!(!is_source_file(Path::new("Makefile")));
    }

    #[test]
    fn test_collect_skips_hidden_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        fs::write(dir.path().join("src/a.cpp"), "int x;\n").unwrap();
        fs::write(dir.path().join(".git/objects/b.cpp"), "int y;\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "hi\n").unwrap();

        let reporter = Reporter::new(false);
        let files = collect_files(dir.path(), &reporter);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/a.cpp"));
    }

    #[test]
    fn test_collect_includes_ownership_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("CODEOWNERS"), "* @team\n").unwrap();
        fs::write(dir.path().join("x.cc"), "int x;\n").unwrap();

        let reporter = Reporter::new(false);
        let mut files = collect_files(dir.path(), &reporter);
        files.sort();
        assert_eq!(files.len(), 2);
    }
}
