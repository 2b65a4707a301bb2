//! File names as they appear in diff headers.
//!
//! Git writes names containing unusual bytes as C-style quoted strings
//! (`"b/caf\303\251.txt"`), and other diff tools append a tab followed by a
//! timestamp. Both are normalised here so the rest of the crate only sees
//! plain `a/...` / `b/...` names.

/// Name used for the missing side of a created or deleted file
pub const DEV_NULL: &str = "/dev/null";

/// Parse the name from a `--- ` or `+++ ` header line (prefix already removed).
///
/// Returns `None` for `/dev/null` and for an empty name.
pub fn parse_header_name(raw: &str) -> Option<String> {
    let raw = raw.trim_end_matches('\r');
    let name = if raw.starts_with('"') {
        unquote(raw)?.0
    } else {
        raw.split('\t').next().unwrap_or(raw).to_string()
    };

    if name.is_empty() || name == DEV_NULL {
        None
    } else {
        Some(name)
    }
}

/// Split the two names of a `diff --git a/X b/Y` line (prefix already removed).
///
/// Unquoted names with spaces are ambiguous; when both sides name the same
/// path the split is placed between them, otherwise at the last ` b/`.
pub fn parse_git_names(raw: &str) -> Option<(String, String)> {
    let raw = raw.trim_end_matches('\r');

    if raw.starts_with('"') {
        let (old, rest) = unquote(raw)?;
        return Some((old, second_git_name(rest.trim_start())?));
    }

    let candidates: Vec<usize> = raw.match_indices(" b/").map(|(i, _)| i).collect();
    let split = candidates
        .iter()
        .copied()
        .find(|&i| raw[..i].strip_prefix("a/") == Some(&raw[i + 3..]))
        .or_else(|| candidates.last().copied());

    match split {
        Some(i) => Some((raw[..i].to_string(), second_git_name(&raw[i + 1..])?)),
        None => {
            // Prefix-less output: `diff --git x y`
            let (old, new) = raw.split_once(' ')?;
            Some((old.to_string(), second_git_name(new)?))
        }
    }
}

fn second_git_name(raw: &str) -> Option<String> {
    if raw.starts_with('"') {
        unquote(raw).map(|(name, _)| name)
    } else if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Decode a C-style quoted string at the start of `input`.
///
/// Returns the decoded name and the text after the closing quote.
fn unquote(input: &str) -> Option<(String, &str)> {
    let body = input.strip_prefix('"')?;
    let mut bytes = Vec::with_capacity(body.len());
    let mut chars = body.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                let name = String::from_utf8_lossy(&bytes).into_owned();
                return Some((name, &body[i + 1..]));
            }
            '\\' => {
                let (_, escaped) = chars.next()?;
                match escaped {
                    'n' => bytes.push(b'\n'),
                    't' => bytes.push(b'\t'),
                    'r' => bytes.push(b'\r'),
                    'a' => bytes.push(0x07),
                    'b' => bytes.push(0x08),
                    'f' => bytes.push(0x0c),
                    'v' => bytes.push(0x0b),
                    '0'..='7' => {
                        let mut value = escaped.to_digit(8)?;
                        for _ in 0..2 {
                            let (_, digit) = chars.next()?;
                            value = value * 8 + digit.to_digit(8)?;
                        }
                        bytes.push(u8::try_from(value).ok()?);
                    }
                    other => {
                        let mut buf = [0; 4];
                        bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
                    }
                }
            }
            other => {
                let mut buf = [0; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    None
}
