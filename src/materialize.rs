//! Writing extracted additions to disk.
//!
//! All filesystem mutation in the crate happens here. A run clears the output
//! directory, then handles patches one at a time in diff order. A failure
//! stops the run; files already written stay where they are.

use crate::diff::Diff;
use crate::extract::{AdditionFilter, added_lines, join_lines};
use crate::output::{Destination, SkipReason, destination};
use error_set::error_set;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

error_set! {
    /// Filesystem errors while materializing, each naming the path involved
    MaterializeError := {
        #[display("Failed to remove existing output {path}: {message}")]
        ClearFailed { path: String, message: String },
        #[display("Failed to create directory {path}: {message}")]
        CreateDirFailed { path: String, message: String },
        #[display("Failed to write {path}: {message}")]
        WriteFailed { path: String, message: String },
    }
}

/// What to do with a file that has no added lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyFiles {
    /// Write an empty file, so every surviving file in the diff appears in the output
    #[default]
    Write,
    Skip,
}

/// A patch that produced no file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// Best available name from the diff headers
    pub name: String,
    pub reason: SkipReason,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub output_dir: PathBuf,
    /// Files written, in diff order
    pub written: Vec<PathBuf>,
    pub skipped: Vec<Skipped>,
    /// Files left out because they had no added lines under [`EmptyFiles::Skip`]
    pub empty: Vec<PathBuf>,
}

/// Writes each patch's added lines under an output directory.
///
/// # Examples
///
/// ```no_run
/// # use git_additions::{Diff, Materializer, EmptyFiles};
/// let diff = Diff::parse("--- a/x\n+++ b/x\n@@ -0,0 +1 @@\n+hello\n");
/// let report = Materializer::new("out")
///     .empty_files(EmptyFiles::Skip)
///     .run(&diff)
///     .unwrap();
/// assert_eq!(report.written.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Materializer {
    output_dir: PathBuf,
    filter: AdditionFilter,
    empty_files: EmptyFiles,
}

impl Materializer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            filter: AdditionFilter::default(),
            empty_files: EmptyFiles::default(),
        }
    }

    pub fn filter(mut self, filter: AdditionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn empty_files(mut self, empty_files: EmptyFiles) -> Self {
        self.empty_files = empty_files;
        self
    }

    /// Clear the output directory and write one file per patch
    pub fn run(&self, diff: &Diff) -> Result<Report, MaterializeError> {
        self.clear()?;
        create_dir(&self.output_dir)?;

        let mut report = Report {
            output_dir: self.output_dir.clone(),
            written: Vec::new(),
            skipped: Vec::new(),
            empty: Vec::new(),
        };
        let mut seen = HashSet::new();

        for patch in &diff.patches {
            let target = match destination(patch, &self.output_dir) {
                Destination::File(target) => target,
                Destination::Skip(reason) => {
                    let name = patch
                        .new_name
                        .as_deref()
                        .or(patch.old_name.as_deref())
                        .unwrap_or_default()
                        .to_string();
                    debug!(%name, %reason, "skipping patch");
                    report.skipped.push(Skipped { name, reason });
                    continue;
                }
            };

            let lines = added_lines(&patch.hunks, self.filter);
            if lines.is_empty() && self.empty_files == EmptyFiles::Skip {
                debug!(path = %target.display(), "no added lines, not writing");
                report.empty.push(target);
                continue;
            }

            if !seen.insert(target.clone()) {
                warn!(path = %target.display(), "file appears twice in diff, overwriting");
            }

            if let Some(parent) = target.parent() {
                create_dir(parent)?;
            }
            write_file(&target, &join_lines(&lines))?;
            debug!(path = %target.display(), lines = lines.len(), "wrote additions");
            report.written.push(target);
        }

        info!(
            output = %self.output_dir.display(),
            written = report.written.len(),
            skipped = report.skipped.len(),
            "materialized additions"
        );
        Ok(report)
    }

    /// Remove any previous output so stale files never mix with this run's
    fn clear(&self) -> Result<(), MaterializeError> {
        let path = &self.output_dir;
        let Ok(metadata) = fs::symlink_metadata(path) else {
            return Ok(());
        };

        info!(path = %path.display(), "removing existing output");
        let removed = if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        removed.map_err(|e| MaterializeError::ClearFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

fn create_dir(path: &Path) -> Result<(), MaterializeError> {
    fs::create_dir_all(path).map_err(|e| MaterializeError::CreateDirFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn write_file(path: &Path, content: &[u8]) -> Result<(), MaterializeError> {
    fs::write(path, content).map_err(|e| MaterializeError::WriteFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
