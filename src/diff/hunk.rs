use super::lines::Lines;
use bstr::{BStr, BString, ByteSlice};
use nom::{
    IResult, Parser,
    bytes::complete::tag,
    character::complete::{char, u32 as line_number},
    combinator::opt,
    sequence::preceded,
};

/// Line range from one side of a hunk header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: u32,
    pub count: u32,
}

/// A single hunk from a unified diff.
///
/// `lines` holds the raw body lines in diff order, each still carrying its
/// one-character marker (`+`, `-`, ` ` or `\`), as the exact bytes git
/// printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old: Range,
    pub new: Range,
    /// Text after the closing `@@`, usually the enclosing function
    pub section: String,
    pub lines: Vec<BString>,
}

/// Classification of one hunk body line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `+` line; the payload is everything after the marker
    Added(&'a BStr),
    Removed(&'a BStr),
    Context(&'a BStr),
    /// `\ No newline at end of file`
    NoNewline,
}

impl<'a> LineKind<'a> {
    pub fn of(line: &'a [u8]) -> Self {
        if let Some(content) = line.strip_prefix(b"+") {
            LineKind::Added(content.as_bstr())
        } else if let Some(content) = line.strip_prefix(b"-") {
            LineKind::Removed(content.as_bstr())
        } else if line.starts_with(b"\\") {
            LineKind::NoNewline
        } else {
            // Some tools strip the space from empty context lines
            LineKind::Context(line.strip_prefix(b" ").unwrap_or(line).as_bstr())
        }
    }
}

impl Hunk {
    /// Parse a hunk starting at the cursor's `@@` header.
    ///
    /// The body is bounded by the counts in the header, so header-looking
    /// lines after the hunk are left for the caller. Returns `None` without
    /// consuming anything if the header is malformed.
    pub fn parse(lines: &mut Lines<'_>) -> Option<Self> {
        let (section, (old, new)) = header(lines.peek()?.trim_end_with(|c| c == '\r')).ok()?;
        lines.advance();

        let mut old_left = old.count;
        let mut new_left = new.count;
        let mut body = Vec::new();

        while old_left > 0 || new_left > 0 {
            let Some(line) = lines.peek().filter(|l| is_body_line(l)) else {
                break;
            };
            match LineKind::of(line) {
                LineKind::Added(_) if new_left > 0 => new_left -= 1,
                LineKind::Removed(_) if old_left > 0 => old_left -= 1,
                LineKind::Context(_) if old_left > 0 && new_left > 0 => {
                    old_left -= 1;
                    new_left -= 1;
                }
                LineKind::NoNewline => {}
                _ => break,
            }
            body.push(BString::from(line));
            lines.advance();
        }

        // Markers for the final line of either side come after the counts run out
        while let Some(line) = lines.peek().filter(|l| l.starts_with(b"\\")) {
            body.push(BString::from(line));
            lines.advance();
        }

        Some(Hunk {
            old,
            new,
            section: section.to_str_lossy().trim_start().to_string(),
            lines: body,
        })
    }

    /// Body lines with their markers interpreted
    pub fn classified(&self) -> impl Iterator<Item = LineKind<'_>> {
        self.lines.iter().map(|line| LineKind::of(line))
    }
}

fn is_body_line(line: &[u8]) -> bool {
    matches!(line.first(), None | Some(b' ' | b'+' | b'-' | b'\\' | b'\r'))
}

/// Parse a range like `136,0` or `137` (count defaults to 1)
fn range(input: &[u8]) -> IResult<&[u8], Range> {
    (line_number, opt(preceded(char(','), line_number)))
        .map(|(start, count)| Range {
            start,
            count: count.unwrap_or(1),
        })
        .parse(input)
}

/// Parse `@@ -a,b +c,d @@ section`, returning the section text as the remainder
fn header(input: &[u8]) -> IResult<&[u8], (Range, Range)> {
    (tag("@@ -"), range, tag(" +"), range, tag(" @@"))
        .map(|(_, old, _, new, _)| (old, new))
        .parse(input)
}
