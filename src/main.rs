//! codeatlas - repository metrics dashboard generator
//!
//! Scans a git repository for C/C++ sources, attaches structural, history,
//! ownership, and external quality metrics to every file, and folds the
//! results into a folder tree with bottom-up rolled-up statistics for a
//! dashboard to consume.

mod aggregate;
mod analysis;
mod build_info;
mod collector;
mod output;
mod reporter;
mod scan;

use aggregate::TreeNode;
use anyhow::Result;
use clap::Parser;
use collector::MetricsCollector;
use reporter::Reporter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "codeatlas",
    about = "Analyze a repository for code metrics, staleness, and ownership",
    version
)]
struct Args {
    /// Path to the local git repository
    path: PathBuf,

    /// Output JSON filename
    #[arg(short, long, default_value = "dashboard_data.json")]
    output: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Print build metadata and exit
    #[arg(long)]
    build_info: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.build_info {
        build_info::print_build_info();
        return ExitCode::SUCCESS;
    }

    let reporter = Reporter::new(args.debug);

    // Configuration errors are fatal before any scanning begins.
    let repo_path = match args.path.canonicalize() {
        Ok(path) if path.is_dir() => path,
        _ => {
            reporter.error(format!("Invalid repository path: {}", args.path.display()));
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    reporter.info(format!("Starting analysis of {}", repo_path.display()));

    match run(&repo_path, &args.output, &reporter) {
        Ok(()) => {
            let duration = start.elapsed().as_secs_f64();
            reporter.info(format!("Analysis complete in {:.2} seconds.", duration));
            reporter.info(format!("Dashboard data written to {}", args.output.display()));
            ExitCode::SUCCESS
        }
        Err(e) => {
            reporter.error(format!("An error occurred during analysis: {:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(repo_path: &Path, output_path: &Path, reporter: &Reporter) -> Result<()> {
    reporter.info("Scanning repository and collecting metrics...");
    let collector = MetricsCollector::new(repo_path, reporter);
    let records = collector.collect();
    reporter.info(format!("Collected metrics for {} files.", records.len()));

    reporter.info("Aggregating folder metrics...");
    let tree = TreeNode::Folder(aggregate::build_report_tree(&records, repo_path));

    reporter.info("Generating dashboard data...");
    output::write_report(&tree, output_path)?;

    Ok(())
}
