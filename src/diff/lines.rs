/// Line cursor over raw diff bytes.
///
/// Lines are split on `\n` only, so a `\r` that belongs to the file content
/// stays attached to its line. No decoding happens here: file content in a
/// diff can be in any encoding.
pub struct Lines<'a> {
    lines: Vec<&'a [u8]>,
    pos: usize,
}

impl<'a> Lines<'a> {
    pub fn new(text: &'a [u8]) -> Self {
        let body = text.strip_suffix(b"\n").unwrap_or(text);
        let lines = if text.is_empty() {
            Vec::new()
        } else {
            body.split(|&b| b == b'\n').collect()
        };
        Self { lines, pos: 0 }
    }

    /// Current line without consuming it
    pub fn peek(&self) -> Option<&'a [u8]> {
        self.peek_nth(0)
    }

    /// Line `n` positions ahead of the current one
    pub fn peek_nth(&self, n: usize) -> Option<&'a [u8]> {
        self.lines.get(self.pos + n).copied()
    }

    pub fn advance(&mut self) {
        if self.pos < self.lines.len() {
            self.pos += 1;
        }
    }

    /// Whether the current line opens a new file entry.
    ///
    /// That is either a `diff --git` line or a `---` line immediately
    /// followed by a `+++` line.
    pub fn at_patch_start(&self) -> bool {
        match self.peek() {
            Some(line) if line.starts_with(b"diff --git ") => true,
            Some(line) if line.starts_with(b"--- ") => self
                .peek_nth(1)
                .is_some_and(|next| next.starts_with(b"+++ ")),
            _ => false,
        }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.peek()?;
        self.advance();
        Some(line)
    }
}
