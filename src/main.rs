use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use git_additions::{AdditionFilter, BranchDiff, EmptyFiles, Options, Report};
use std::fmt::Write;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "git-additions", version)]
#[command(about = "Write the lines added between two git branches into a mirrored directory tree")]
struct Cli {
    /// Base revision (e.g. main)
    #[arg(required_unless_present_any = ["completions", "man"])]
    base_branch: Option<String>,

    /// Revision to compare against the base
    #[arg(required_unless_present_any = ["completions", "man"])]
    compare_branch: Option<String>,

    /// Path to the repository checkout
    #[arg(required_unless_present_any = ["completions", "man"])]
    repo_path: Option<PathBuf>,

    /// Output directory (defaults to the repository's directory name)
    output_dir: Option<PathBuf>,

    /// Do not write files that have no added lines
    #[arg(long)]
    skip_empty: bool,

    /// Treat added lines starting with "++" as content instead of header artifacts
    #[arg(long)]
    keep_double_plus: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL", exclusive = true)]
    completions: Option<Shell>,

    /// Print a man page and exit
    #[arg(long, exclusive = true)]
    man: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

/// Operator-facing summary of a run
fn summary(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Wrote {} file(s) to {}",
        report.written.len(),
        report.output_dir.display()
    );
    if !report.skipped.is_empty() {
        let _ = writeln!(out, "Skipped {} file(s):", report.skipped.len());
        for skipped in &report.skipped {
            let _ = writeln!(out, "  {} ({})", skipped.name, skipped.reason);
        }
    }
    if !report.empty.is_empty() {
        let _ = writeln!(out, "Left out {} file(s) with no added lines:", report.empty.len());
        for path in &report.empty {
            let _ = writeln!(out, "  {}", path.display());
        }
    }
    out
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "git-additions", &mut io::stdout());
        return ExitCode::SUCCESS;
    }
    if cli.man {
        return match clap_mangen::Man::new(Cli::command()).render(&mut io::stdout()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    init_logging(cli.verbose);

    let (Some(base), Some(compare), Some(repo_path)) =
        (cli.base_branch, cli.compare_branch, cli.repo_path)
    else {
        Cli::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "BASE_BRANCH, COMPARE_BRANCH and REPO_PATH are required",
            )
            .exit();
    };

    let options = Options {
        output_dir: cli.output_dir,
        work_dir: PathBuf::new(),
        filter: if cli.keep_double_plus {
            AdditionFilter::AllAdditions
        } else {
            AdditionFilter::ExcludeHeaderArtifacts
        },
        empty_files: if cli.skip_empty {
            EmptyFiles::Skip
        } else {
            EmptyFiles::Write
        },
    };

    match BranchDiff::new(&repo_path).materialize(&base, &compare, &options) {
        Ok(report) => {
            print!("{}", summary(&report));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
