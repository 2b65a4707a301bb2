//! Unified diff parsing.
//!
//! [`Diff::parse`] turns `git diff` output (or any unified diff) into
//! [`Patch`] records, one per file, each holding its [`Hunk`]s in order.

pub mod file;
pub mod full;
pub mod hunk;
mod lines;
pub mod path;

pub use file::Patch;
pub use full::Diff;
pub use hunk::{Hunk, LineKind, Range};
