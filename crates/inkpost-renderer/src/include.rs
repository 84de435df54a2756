//! `::include[path]` directive expansion.
//!
//! An include line is replaced with the contents of the referenced file,
//! resolved against the directory of the file containing the directive.
//! Lines inside fenced code blocks are left untouched.

use std::path::Path;

/// Maximum include nesting depth.
const MAX_INCLUDE_DEPTH: usize = 8;

/// Expand include directives in `text`, pushing a warning for every include
/// that cannot be resolved.
///
/// `line_offset` is the number of source lines preceding `text`, so warning
/// line numbers match the file the text was taken from.
pub(crate) fn expand_includes(
    text: &str,
    base_dir: &Path,
    line_offset: usize,
    warnings: &mut Vec<String>,
) -> String {
    expand(text, base_dir, line_offset, 0, warnings)
}

fn expand(
    text: &str,
    base_dir: &Path,
    line_offset: usize,
    depth: usize,
    warnings: &mut Vec<String>,
) -> String {
    let mut output = String::with_capacity(text.len());
    let mut fence: Option<(char, usize)> = None;

    for (index, line) in text.lines().enumerate() {
        if let Some((marker, length)) = fence {
            if closes_fence(line, marker, length) {
                fence = None;
            }
        } else if let Some(opening) = opens_fence(line) {
            fence = Some(opening);
        } else if let Some(target) = parse_directive(line) {
            let line_no = line_offset + index + 1;
            if depth >= MAX_INCLUDE_DEPTH {
                warnings.push(format!(
                    "line {line_no}: include depth limit reached for '{target}'"
                ));
                continue;
            }

            let path = base_dir.join(target);
            match std::fs::read_to_string(&path) {
                Ok(contents) => {
                    let nested_dir = path.parent().unwrap_or(base_dir);
                    output.push_str(&expand(&contents, nested_dir, 0, depth + 1, warnings));
                    if !output.ends_with('\n') {
                        output.push('\n');
                    }
                }
                Err(e) => {
                    warnings.push(format!("line {line_no}: failed to include '{target}': {e}"));
                }
            }
            continue;
        }

        output.push_str(line);
        output.push('\n');
    }

    output
}

/// Length of the leading run of `marker` characters.
fn marker_run(text: &str, marker: char) -> usize {
    text.chars().take_while(|&c| c == marker).count()
}

/// Return the marker character and run length if `line` opens a code fence.
fn opens_fence(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start();
    let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let length = marker_run(trimmed, marker);
    (length >= 3).then_some((marker, length))
}

/// A fence closes on a run of the same marker at least as long as the opening,
/// with nothing but whitespace after it.
fn closes_fence(line: &str, marker: char, length: usize) -> bool {
    let trimmed = line.trim();
    let run = marker_run(trimmed, marker);
    run >= length && run == trimmed.chars().count()
}

/// Return the include target if `line` is an include directive.
fn parse_directive(line: &str) -> Option<&str> {
    line.trim()
        .strip_prefix("::include[")?
        .strip_suffix(']')
        .map(str::trim)
        .filter(|target| !target.is_empty())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_directive() {
        assert_eq!(parse_directive("::include[a.md]"), Some("a.md"));
        assert_eq!(parse_directive("  ::include[ dir/b.md ]  "), Some("dir/b.md"));
        assert_eq!(parse_directive("::include[]"), None);
        assert_eq!(parse_directive("text ::include[a.md]"), None);
    }

    #[test]
    fn test_expand_include() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("part.md"), "Included text").unwrap();

        let mut warnings = Vec::new();
        let output = expand_includes("Before\n::include[part.md]\nAfter", dir.path(), 0, &mut warnings);

        assert_eq!(output, "Before\nIncluded text\nAfter\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_nested_include_resolves_against_including_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("shared")).unwrap();
        std::fs::write(dir.path().join("shared/outer.md"), "::include[inner.md]\n").unwrap();
        std::fs::write(dir.path().join("shared/inner.md"), "deep\n").unwrap();

        let mut warnings = Vec::new();
        let output = expand_includes("::include[shared/outer.md]", dir.path(), 0, &mut warnings);

        assert_eq!(output, "deep\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_include_warns() {
        let dir = tempfile::tempdir().unwrap();
        let mut warnings = Vec::new();
        let output = expand_includes("a\n::include[missing.md]\nb", dir.path(), 0, &mut warnings);

        assert_eq!(output, "a\nb\n");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("line 2: failed to include 'missing.md'"));
    }

    #[test]
    fn test_include_inside_fence_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let text = "```\n::include[missing.md]\n```";
        let mut warnings = Vec::new();
        let output = expand_includes(text, dir.path(), 0, &mut warnings);

        assert_eq!(output, "```\n::include[missing.md]\n```\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_longer_fence_not_closed_by_shorter_run() {
        let dir = tempfile::tempdir().unwrap();
        let text = "````markdown\n```\n::include[missing.md]\n```\n````";
        let mut warnings = Vec::new();
        let output = expand_includes(text, dir.path(), 0, &mut warnings);

        assert_eq!(output, format!("{text}\n"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_fence_kinds_do_not_close_each_other() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("part.md"), "inside").unwrap();
        let text = "~~~\n```\n::include[part.md]\n~~~\n::include[part.md]";
        let mut warnings = Vec::new();
        let output = expand_includes(text, dir.path(), 0, &mut warnings);

        assert_eq!(output, "~~~\n```\n::include[part.md]\n~~~\ninside\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_warning_line_counts_preceding_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut warnings = Vec::new();
        expand_includes("a\n::include[missing.md]", dir.path(), 4, &mut warnings);

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("line 6: failed to include 'missing.md'"));
    }

    #[test]
    fn test_recursive_include_stops_at_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("self.md"), "x\n::include[self.md]\n").unwrap();

        let mut warnings = Vec::new();
        let output = expand_includes("::include[self.md]", dir.path(), 0, &mut warnings);

        assert_eq!(output.matches('x').count(), MAX_INCLUDE_DEPTH);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("depth limit"));
    }
}
