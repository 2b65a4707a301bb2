use super::hunk::Hunk;
use super::lines::Lines;
use super::path::{parse_git_names, parse_header_name};
use bstr::ByteSlice;

/// A complete diff entry for a single file.
///
/// Names keep the synthetic `a/` / `b/` prefix of the diff headers. They are
/// decoded lossily; hunk content is kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Name from the `---` header; `None` for a created file
    pub old_name: Option<String>,
    /// Name from the `+++` header; `None` for a deleted file
    pub new_name: Option<String>,
    /// All hunks for this file, in diff order
    pub hunks: Vec<Hunk>,
    /// Whether git reported the file as binary
    pub binary: bool,
}

/// What the git extended header lines told us about a file
#[derive(Default)]
struct GitHeader {
    old_name: Option<String>,
    new_name: Option<String>,
    deleted: bool,
    binary: bool,
}

impl Patch {
    /// Parse the next file entry from the cursor.
    ///
    /// Lines before the first `diff --git` or `---`/`+++` header pair are
    /// skipped. Returns `None` once the input is exhausted.
    #[must_use]
    pub fn parse(lines: &mut Lines<'_>) -> Option<Self> {
        while !lines.at_patch_start() {
            lines.next()?;
        }

        let git = Self::parse_git_header(lines);

        let mut headers = None;
        if lines.peek().is_some_and(|l| l.starts_with(b"--- "))
            && lines.peek_nth(1).is_some_and(|l| l.starts_with(b"+++ "))
        {
            let old = lines.next().and_then(|l| parse_header_name(&l[4..].to_str_lossy()));
            let new = lines.next().and_then(|l| parse_header_name(&l[4..].to_str_lossy()));
            headers = Some((old, new));
        }

        let hunks = Self::parse_hunks(lines);

        let binary = git.binary;
        let (old_name, new_name) = match headers {
            Some((old, new)) => (old, new.filter(|_| !git.deleted)),
            None if git.deleted => (git.old_name, None),
            None => (git.old_name, git.new_name),
        };

        Some(Patch {
            old_name,
            new_name,
            hunks,
            binary,
        })
    }

    /// Consume the `diff --git` line and its extended headers, if present
    fn parse_git_header(lines: &mut Lines<'_>) -> GitHeader {
        let mut header = GitHeader::default();

        let Some(first) = lines.peek().and_then(|l| l.strip_prefix(b"diff --git ")) else {
            return header;
        };
        if let Some((old, new)) = parse_git_names(&first.to_str_lossy()) {
            header.old_name = Some(old);
            header.new_name = Some(new);
        }
        lines.advance();

        while let Some(line) = lines.peek() {
            if line.starts_with(b"@@ ") || lines.at_patch_start() {
                break;
            }
            let line = line.to_str_lossy();
            let line = line.trim_end_matches('\r');

            if line.starts_with("deleted file mode") {
                header.deleted = true;
            } else if let Some(name) = line
                .strip_prefix("rename to ")
                .or_else(|| line.strip_prefix("copy to "))
            {
                // Extended header names carry no a/ b/ prefix
                if let Some(name) = parse_header_name(name) {
                    header.new_name = Some(format!("b/{name}"));
                }
            } else if line.starts_with("Binary files ") || line == "GIT binary patch" {
                header.binary = true;
            }
            lines.advance();
        }

        header
    }

    /// Parse hunks until something that is neither a hunk nor a stray body line
    fn parse_hunks(lines: &mut Lines<'_>) -> Vec<Hunk> {
        let mut hunks = Vec::new();

        while let Some(line) = lines.peek() {
            if line.starts_with(b"@@ ") {
                match Hunk::parse(lines) {
                    Some(hunk) => hunks.push(hunk),
                    // Malformed header; its body is skipped as orphaned lines
                    None => lines.advance(),
                }
            } else if lines.at_patch_start() {
                break;
            } else if matches!(line.first(), Some(b' ' | b'+' | b'-' | b'\\')) {
                lines.advance();
            } else {
                break;
            }
        }

        hunks
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn parse_one(text: &str) -> Patch {
        Patch::parse(&mut Lines::new(text.as_bytes())).unwrap()
    }

    #[test]
    fn parse_modification() {
        let patch = parse_one(
            r#"diff --git a/flake.nix b/flake.nix
index abc1234..def5678 100644
--- a/flake.nix
+++ b/flake.nix
@@ -136,0 +137 @@
+      debug = true;
"#,
        );
        assert_eq!(patch.old_name.as_deref(), Some("a/flake.nix"));
        assert_eq!(patch.new_name.as_deref(), Some("b/flake.nix"));
        assert_eq!(patch.hunks.len(), 1);
        assert_eq!(patch.hunks[0].lines, vec!["+      debug = true;"]);
        assert!(!patch.binary);
    }

    #[test]
    fn parse_multiple_hunks() {
        let patch = parse_one(
            r#"diff --git a/config.nix b/config.nix
index fa2da6e..41114ff 100644
--- a/config.nix
+++ b/config.nix
@@ -2,0 +3 @@ line 2
+# FIRST INSERTION
@@ -8,0 +10 @@ line 8
+# SECOND INSERTION
"#,
        );
        assert_eq!(patch.hunks.len(), 2);
        assert_eq!(patch.hunks[0].section, "line 2");
        assert_eq!(patch.hunks[1].lines, vec!["+# SECOND INSERTION"]);
    }

    #[test]
    fn parse_new_file() {
        let patch = parse_one(
            r#"diff --git a/docs/new.md b/docs/new.md
new file mode 100644
index 0000000..3b18e51
--- /dev/null
+++ b/docs/new.md
@@ -0,0 +1,2 @@
+# Title
+body
"#,
        );
        assert_eq!(patch.old_name, None);
        assert_eq!(patch.new_name.as_deref(), Some("b/docs/new.md"));
    }

    #[test]
    fn parse_deleted_file() {
        let patch = parse_one(
            r#"diff --git a/gone.txt b/gone.txt
deleted file mode 100644
index 3b18e51..0000000
--- a/gone.txt
+++ /dev/null
@@ -1 +0,0 @@
-bye
"#,
        );
        assert_eq!(patch.old_name.as_deref(), Some("a/gone.txt"));
        assert_eq!(patch.new_name, None);
    }

    #[test]
    fn parse_empty_deleted_file() {
        // An empty file's deletion has no ---/+++ headers at all
        let patch = parse_one(
            "diff --git a/empty.txt b/empty.txt\ndeleted file mode 100644\nindex e69de29..0000000\n",
        );
        assert_eq!(patch.new_name, None);
        assert!(patch.hunks.is_empty());
    }

    #[test]
    fn parse_pure_rename() {
        let patch = parse_one(
            r#"diff --git a/old/name.rs b/new/name.rs
similarity index 100%
rename from old/name.rs
rename to new/name.rs
"#,
        );
        assert_eq!(patch.old_name.as_deref(), Some("a/old/name.rs"));
        assert_eq!(patch.new_name.as_deref(), Some("b/new/name.rs"));
        assert!(patch.hunks.is_empty());
    }

    #[test]
    fn parse_mode_change() {
        let patch = parse_one("diff --git a/run.sh b/run.sh\nold mode 100644\nnew mode 100755\n");
        assert_eq!(patch.new_name.as_deref(), Some("b/run.sh"));
        assert!(patch.hunks.is_empty());
    }

    #[test]
    fn parse_binary_file() {
        let patch = parse_one(
            r#"diff --git a/logo.png b/logo.png
index 1111111..2222222 100644
Binary files a/logo.png and b/logo.png differ
"#,
        );
        assert!(patch.binary);
        assert_eq!(patch.new_name.as_deref(), Some("b/logo.png"));
    }

    #[test]
    fn parse_plain_unified_diff() {
        let patch = parse_one("--- a/x.txt\t2024-01-01\n+++ b/x.txt\t2024-01-02\n@@ -1 +1 @@\n-a\n+b\n");
        assert_eq!(patch.old_name.as_deref(), Some("a/x.txt"));
        assert_eq!(patch.new_name.as_deref(), Some("b/x.txt"));
        assert_eq!(patch.hunks[0].lines, vec!["-a", "+b"]);
    }

    #[test]
    fn malformed_hunk_does_not_hide_later_hunks() {
        let patch = parse_one(
            "--- a/x\n+++ b/x\n@@ -1 +1 @@ ok\n-a\n+b\n@@ bogus @@\n+orphan\n@@ -9 +9 @@\n-c\n+d\n",
        );
        assert_eq!(patch.hunks.len(), 2);
        assert_eq!(patch.hunks[1].lines, vec!["-c", "+d"]);
    }

    #[test]
    fn skips_preamble() {
        let patch = parse_one("From 1234 Mon Sep 17 00:00:00 2001\nSubject: x\n\n---\n--- a/y\n+++ b/y\n@@ -0,0 +1 @@\n+z\n");
        assert_eq!(patch.new_name.as_deref(), Some("b/y"));
    }

    #[test]
    fn exhausted_input_yields_none() {
        assert!(Patch::parse(&mut Lines::new(b"just some text\n")).is_none());
    }

    #[test]
    fn latin1_content_does_not_disturb_headers() {
        let text = b"diff --git a/legacy.txt b/legacy.txt\nnew file mode 100644\n--- /dev/null\n+++ b/legacy.txt\n@@ -0,0 +1 @@\n+caf\xe9\n";
        let patch = Patch::parse(&mut Lines::new(text)).unwrap();
        assert_eq!(patch.new_name.as_deref(), Some("b/legacy.txt"));
        assert_eq!(patch.hunks[0].lines, vec![&b"+caf\xe9"[..]]);
    }
}
