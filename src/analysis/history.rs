//! Commit-history lookup per file
//!
//! Two read-only git queries against the repository root: the last commit
//! touching a path (timestamp + author), and the number of commits touching
//! it within the last three years. Lookup failure never propagates; the
//! outcome is an explicit enum and the caller substitutes a default record.

use chrono::Utc;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Days of silence at which the staleness score saturates (three years).
const STALENESS_SATURATION_DAYS: f64 = 1095.0;

const SECONDS_PER_DAY: f64 = 24.0 * 3600.0;

/// History facts for one tracked file.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryInfo {
    pub days_since_last_change: f64,
    pub last_author: String,
    pub recent_change_count: u32,
    /// 0-100, saturating once the file has been silent for three years.
    pub staleness_score: f64,
    /// Unix seconds of the last commit touching the file.
    pub last_change_timestamp: f64,
}

impl Default for HistoryInfo {
    /// The zero/"Unknown" record substituted when lookup yields nothing.
    fn default() -> Self {
        Self {
            days_since_last_change: 0.0,
            last_author: "Unknown".to_string(),
            recent_change_count: 0,
            staleness_score: 0.0,
            last_change_timestamp: 0.0,
        }
    }
}

/// Result of a history lookup.
///
/// `Absent` covers untracked files and history-backend refusals; `Failed`
/// covers process-level faults (missing git binary, timeout). Callers treat
/// both as "use the default record" but the distinction stays visible for
/// logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryOutcome {
    Found(HistoryInfo),
    Absent,
    Failed(String),
}

impl HistoryOutcome {
    #[allow(dead_code)]
    pub fn into_found(self) -> Option<HistoryInfo> {
        match self {
            HistoryOutcome::Found(info) => Some(info),
            _ => None,
        }
    }
}

/// Staleness score in [0, 100] for a given silence span.
pub fn staleness_score(days_since_last_change: f64) -> f64 {
    let score = (days_since_last_change / STALENESS_SATURATION_DAYS) * 100.0;
    round2(score.min(100.0))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Resolves commit history by shelling out to git in the repository root.
#[derive(Debug, Clone)]
pub struct HistoryResolver {
    repo_root: PathBuf,
    /// Per-query deadline. `None` leaves each git call unbounded.
    timeout: Option<Duration>,
}

impl HistoryResolver {
    pub fn new(repo_root: &Path) -> Self {
        Self {
            repo_root: repo_root.to_path_buf(),
            timeout: None,
        }
    }

    #[allow(dead_code)]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Look up history for a repo-relative path.
    pub fn lookup(&self, rel_path: &str) -> HistoryOutcome {
        let log_line = match self.run_git(&["log", "-1", "--format=%ct|%an", "--", rel_path]) {
            Ok(Some(output)) => output,
            Ok(None) => return HistoryOutcome::Absent,
            Err(reason) => return HistoryOutcome::Failed(reason),
        };

        let line = log_line.trim();
        if line.is_empty() {
            return HistoryOutcome::Absent;
        }
        let Some((timestamp_str, author)) = line.split_once('|') else {
            return HistoryOutcome::Failed(format!("unexpected git log output: {}", line));
        };
        let Ok(last_change_timestamp) = timestamp_str.parse::<f64>() else {
            return HistoryOutcome::Failed(format!("bad commit timestamp: {}", timestamp_str));
        };

        let now = Utc::now().timestamp() as f64;
        let days_since_last_change = ((now - last_change_timestamp) / SECONDS_PER_DAY).max(0.0);

        // A failed count query degrades to zero rather than discarding the
        // last-change facts we already have.
        let recent_change_count = self
            .run_git(&[
                "rev-list",
                "--count",
                "--since=3.years.ago",
                "HEAD",
                "--",
                rel_path,
            ])
            .ok()
            .flatten()
            .and_then(|output| output.trim().parse::<u32>().ok())
            .unwrap_or(0);

        HistoryOutcome::Found(HistoryInfo {
            days_since_last_change: round2(days_since_last_change),
            last_author: author.to_string(),
            recent_change_count,
            staleness_score: staleness_score(days_since_last_change),
            last_change_timestamp,
        })
    }

    /// Run one git query. `Ok(None)` means git refused (non-zero exit, e.g.
    /// not a repository); `Err` means the process itself could not run.
    fn run_git(&self, args: &[&str]) -> Result<Option<String>, String> {
        let mut command = Command::new("git");
        command.args(args).current_dir(&self.repo_root);

        let result = run_command_with_timeout(&mut command, self.timeout)?;
        if result.timed_out {
            return Err(format!("git {} timed out", args.first().unwrap_or(&"")));
        }
        match result.status {
            Some(status) if status.success() => Ok(Some(result.stdout)),
            _ => Ok(None),
        }
    }
}

struct CommandRunResult {
    status: Option<std::process::ExitStatus>,
    stdout: String,
    timed_out: bool,
}

fn run_command_with_timeout(
    command: &mut Command,
    timeout: Option<Duration>,
) -> Result<CommandRunResult, String> {
    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("Failed to start command: {}", e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| "Failed to capture stdout".to_string())?;

    let stdout_handle = thread::spawn(move || {
        let mut buf = Vec::new();
        let mut reader = BufReader::new(stdout);
        let _ = reader.read_to_end(&mut buf);
        buf
    });

    let start = Instant::now();
    let mut timed_out = false;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {
                if let Some(deadline) = timeout {
                    if start.elapsed() >= deadline {
                        timed_out = true;
                        let _ = child.kill();
                        match child.wait() {
                            Ok(status) => break Some(status),
                            Err(_) => break None,
                        }
                    }
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(e) => return Err(format!("Failed to wait for command: {}", e)),
        }
    };

    let stdout_bytes = stdout_handle.join().unwrap_or_default();

    Ok(CommandRunResult {
        status,
        stdout: String::from_utf8_lossy(&stdout_bytes).to_string(),
        timed_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staleness_is_monotonic() {
        assert!(staleness_score(10.0) <= staleness_score(20.0));
        assert!(staleness_score(0.0) <= staleness_score(1.0));
        assert!(staleness_score(1000.0) <= staleness_score(2000.0));
    }

    #[test]
    fn test_staleness_clamps_at_three_years() {
        assert_eq!(staleness_score(1095.0), 100.0);
        assert_eq!(staleness_score(4000.0), 100.0);
        assert_eq!(staleness_score(0.0), 0.0);
    }

    #[test]
    fn test_staleness_midpoint() {
        // Half the saturation span scores 50.
        assert_eq!(staleness_score(547.5), 50.0);
    }

    #[test]
    fn test_default_record_is_unknown() {
        let info = HistoryInfo::default();
        assert_eq!(info.last_author, "Unknown");
        assert_eq!(info.recent_change_count, 0);
        assert_eq!(info.staleness_score, 0.0);
        assert_eq!(info.last_change_timestamp, 0.0);
    }

    #[test]
    fn test_lookup_outside_repository_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.cpp"), "int x;\n").unwrap();

        let resolver = HistoryResolver::new(dir.path());
        // Absent when git refuses (not a repository), Failed when git itself
        // is unavailable. Either way, never Found.
        let outcome = resolver.lookup("a.cpp");
        assert!(outcome.into_found().is_none());
    }

    #[test]
    fn test_lookup_with_timeout_configured() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = HistoryResolver::new(dir.path()).with_timeout(Duration::from_secs(5));
        assert!(resolver.lookup("missing.cpp").into_found().is_none());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005), 1.0); // binary float, rounds down here
        assert_eq!(round2(2.675000001), 2.68);
        assert_eq!(round2(3.0), 3.0);
    }
}
