use super::file::Patch;
use super::lines::Lines;

/// A complete unified diff containing changes for multiple files
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diff {
    pub patches: Vec<Patch>,
}

impl Diff {
    /// Parse unified diff output into per-file patches.
    ///
    /// Parsing is best effort: anything that cannot be read as a file entry
    /// is skipped, so malformed input yields fewer (or no) patches rather
    /// than an error. The input does not have to be valid UTF-8.
    pub fn parse(input: impl AsRef<[u8]>) -> Self {
        let mut lines = Lines::new(input.as_ref());
        let mut patches = Vec::new();

        while let Some(patch) = Patch::parse(&mut lines) {
            patches.push(patch);
        }

        Diff { patches }
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}
