use error_set::error_set;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

pub mod diff;
pub mod extract;
pub mod materialize;
pub mod output;

pub use diff::{Diff, Hunk, Patch};
pub use extract::AdditionFilter;
pub use materialize::{EmptyFiles, MaterializeError, Materializer, Report, Skipped};
pub use output::{Destination, OutputError, SkipReason};

error_set! {
    /// Top-level error for git-additions operations
    GitAdditionsError := {
        #[display("Refusing to replace {output}: it contains the repository {repo}")]
        OutputOverlapsRepository { output: String, repo: String },
        OutputError(OutputError),
        MaterializeError(MaterializeError),
    } || GitCommandError

    /// Errors from git command execution
    GitCommandError := {
        #[display("Failed to run git diff: {message}")]
        DiffFailed { message: String },
        #[display("git diff failed: {stderr}")]
        DiffExitError { stderr: String },
    }
}

/// Settings for one materialization run
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Output directory; defaults to the repository's directory name
    pub output_dir: Option<PathBuf>,
    /// Directory the output directory is created in; empty means the current directory
    pub work_dir: PathBuf,
    pub filter: AdditionFilter,
    pub empty_files: EmptyFiles,
}

/// Main interface for comparing two branches of a repository
pub struct BranchDiff<'a> {
    repo_path: &'a Path,
}

impl<'a> BranchDiff<'a> {
    /// Create a new BranchDiff for the given repository path
    pub fn new(repo_path: &'a Path) -> Self {
        Self { repo_path }
    }

    /// Write the lines added between `base` and `compare` to an output tree
    ///
    /// # Examples
    /// ```no_run
    /// # use git_additions::{BranchDiff, Options};
    /// # use std::path::Path;
    /// let report = BranchDiff::new(Path::new("../my-repo"))
    ///     .materialize("main", "feature", &Options::default())
    ///     .unwrap();
    /// println!("wrote {} files to {}", report.written.len(), report.output_dir.display());
    /// ```
    pub fn materialize(
        &self,
        base: &str,
        compare: &str,
        options: &Options,
    ) -> Result<Report, GitAdditionsError> {
        let output_dir = self.output_dir(options)?;
        self.ensure_disjoint(&output_dir)?;

        let raw = self.raw_diff(base, compare)?;
        let diff = Diff::parse(&raw);
        info!(
            base,
            compare,
            patches = diff.patches.len(),
            "parsed diff"
        );

        Ok(Materializer::new(output_dir)
            .filter(options.filter)
            .empty_files(options.empty_files)
            .run(&diff)?)
    }

    /// Output directory for a run: explicit override or the repository's name
    pub fn output_dir(&self, options: &Options) -> Result<PathBuf, OutputError> {
        let name = match &options.output_dir {
            Some(dir) => dir.clone(),
            None => PathBuf::from(output::output_dir_name(self.repo_path)?),
        };
        Ok(options.work_dir.join(name))
    }

    /// Get the unified diff between two revisions, as the bytes git printed
    ///
    /// Prefixes are forced to `a/` and `b/` so user configuration such as
    /// `diff.noprefix` cannot change the names the output mapping strips.
    pub fn raw_diff(&self, base: &str, compare: &str) -> Result<Vec<u8>, GitCommandError> {
        let args = [
            "diff",
            "--no-color",
            "--no-ext-diff",
            "--no-textconv",
            "--src-prefix=a/",
            "--dst-prefix=b/",
            base,
            compare,
            "--",
        ];
        debug!(repo = %self.repo_path.display(), ?args, "running git");

        let output = Command::new("git")
            .arg("-C")
            .arg(self.repo_path)
            .args(args)
            .output()
            .map_err(|e| GitCommandError::DiffFailed {
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitCommandError::DiffExitError {
                stderr: stderr.trim_end().to_string(),
            });
        }

        Ok(output.stdout)
    }

    /// Refuse to clear an output path that is the repository or one of its parents
    fn ensure_disjoint(&self, output_dir: &Path) -> Result<(), GitAdditionsError> {
        let (Ok(output), Ok(repo)) = (output_dir.canonicalize(), self.repo_path.canonicalize())
        else {
            return Ok(());
        };

        if repo.starts_with(&output) {
            return Err(GitAdditionsError::OutputOverlapsRepository {
                output: output.display().to_string(),
                repo: repo.display().to_string(),
            });
        }
        Ok(())
    }
}
