//! Mapping from patch names to destination paths.

use crate::diff::Patch;
use error_set::error_set;
use std::path::{Component, Path, PathBuf};

error_set! {
    /// Errors from deriving the output directory name
    OutputError := {
        /// Repository path has no usable final segment (e.g. `/`)
        #[display("Cannot derive an output directory name from '{repo}'")]
        UnresolvableName { repo: String },
    }
}

/// Why a patch produces no output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The file no longer exists on the compare side
    Deleted,
    /// Git reported no textual diff for the file
    Binary,
    /// The new name was present but empty after removing its prefix
    EmptyPath,
    /// The name would resolve outside the output directory
    UnsafePath(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Deleted => write!(f, "deleted"),
            SkipReason::Binary => write!(f, "binary"),
            SkipReason::EmptyPath => write!(f, "empty path"),
            SkipReason::UnsafePath(path) => write!(f, "unsafe path '{path}'"),
        }
    }
}

/// Where a patch's added lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    File(PathBuf),
    Skip(SkipReason),
}

/// Name of the output directory for a repository: its final path segment.
///
/// Trailing separators are ignored and a path without separators is its own
/// name. `.` and `..` are resolved through the filesystem.
pub fn output_dir_name(repo_path: &Path) -> Result<String, OutputError> {
    let raw = repo_path.to_string_lossy();
    let trimmed = raw.trim_end_matches(std::path::is_separator);
    let segment = trimmed
        .rsplit(std::path::is_separator)
        .next()
        .unwrap_or(trimmed);

    if !segment.is_empty() && segment != "." && segment != ".." {
        return Ok(segment.to_string());
    }

    repo_path
        .canonicalize()
        .ok()
        .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
        .ok_or_else(|| OutputError::UnresolvableName {
            repo: raw.into_owned(),
        })
}

/// Remove the diff's synthetic root segment (`b/` and the like).
///
/// Everything up to and including the first `/` is dropped; a name without
/// `/` is returned unchanged.
pub fn strip_synthetic_prefix(name: &str) -> &str {
    match name.split_once('/') {
        Some((_, rest)) => rest,
        None => name,
    }
}

/// Destination of `patch` under `output_dir`
pub fn destination(patch: &Patch, output_dir: &Path) -> Destination {
    if patch.binary {
        return Destination::Skip(SkipReason::Binary);
    }

    let Some(name) = patch.new_name.as_deref() else {
        return Destination::Skip(SkipReason::Deleted);
    };

    let relative = strip_synthetic_prefix(name);
    if relative.is_empty() {
        return Destination::Skip(SkipReason::EmptyPath);
    }

    let relative_path = Path::new(relative);
    let escapes = relative_path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Destination::Skip(SkipReason::UnsafePath(relative.to_string()));
    }

    Destination::File(output_dir.join(relative_path))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn patch(new_name: Option<&str>) -> Patch {
        Patch {
            old_name: None,
            new_name: new_name.map(str::to_string),
            hunks: vec![],
            binary: false,
        }
    }

    #[test]
    fn dir_name_is_last_segment() {
        assert_eq!(output_dir_name(Path::new("/home/me/projects/app")).unwrap(), "app");
        assert_eq!(output_dir_name(Path::new("../app/")).unwrap(), "app");
        assert_eq!(output_dir_name(Path::new("app//")).unwrap(), "app");
        assert_eq!(output_dir_name(Path::new("app")).unwrap(), "app");
    }

    #[test]
    fn dir_name_resolves_current_directory() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("checkout");
        std::fs::create_dir(&repo).unwrap();
        assert_eq!(output_dir_name(&repo.join(".")).unwrap(), "checkout");
        assert!(output_dir_name(&repo.join("sub/..")).is_err());
    }

    #[test]
    fn dir_name_of_root_is_an_error() {
        assert!(matches!(
            output_dir_name(Path::new("/")),
            Err(OutputError::UnresolvableName { .. })
        ));
    }

    #[test]
    fn strip_prefix_variants() {
        assert_eq!(strip_synthetic_prefix("b/src/a.txt"), "src/a.txt");
        assert_eq!(strip_synthetic_prefix("w/README"), "README");
        assert_eq!(strip_synthetic_prefix("README"), "README");
        assert_eq!(strip_synthetic_prefix("b/"), "");
    }

    #[test]
    fn destination_preserves_directories() {
        assert_eq!(
            destination(&patch(Some("b/src/deep/mod.rs")), Path::new("app")),
            Destination::File(PathBuf::from("app/src/deep/mod.rs"))
        );
    }

    #[test]
    fn deleted_patch_is_skipped() {
        assert_eq!(
            destination(&patch(None), Path::new("app")),
            Destination::Skip(SkipReason::Deleted)
        );
    }

    #[test]
    fn binary_patch_is_skipped() {
        let mut binary = patch(Some("b/logo.png"));
        binary.binary = true;
        assert_eq!(
            destination(&binary, Path::new("app")),
            Destination::Skip(SkipReason::Binary)
        );
    }

    #[test]
    fn empty_name_is_skipped() {
        assert_eq!(
            destination(&patch(Some("b/")), Path::new("app")),
            Destination::Skip(SkipReason::EmptyPath)
        );
    }

    #[test]
    fn escaping_names_are_refused() {
        assert_eq!(
            destination(&patch(Some("b/../../etc/passwd")), Path::new("app")),
            Destination::Skip(SkipReason::UnsafePath("../../etc/passwd".into()))
        );
        assert_eq!(
            destination(&patch(Some("b//etc/passwd")), Path::new("app")),
            Destination::Skip(SkipReason::UnsafePath("/etc/passwd".into()))
        );
    }
}
