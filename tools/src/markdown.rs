//! Normalization applied to content written by `write_markdown`.

/// Longest run of blank lines kept in formatted output.
const MAX_BLANK_RUN: usize = 2;

/// Normalize markdown for writing.
///
/// Line endings become `\n`, trailing spaces and tabs are trimmed from each
/// line, runs of blank lines are capped at two, and the result ends with
/// exactly one newline.
#[must_use]
pub fn format_markdown(content: &str) -> String {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines: Vec<&str> = Vec::new();
    let mut blank_run = 0;
    for line in normalized.split('\n') {
        let trimmed = line.trim_end_matches([' ', '\t']);
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run <= MAX_BLANK_RUN {
                lines.push("");
            }
        } else {
            blank_run = 0;
            lines.push(trimmed);
        }
    }

    let mut out = lines.join("\n").trim_end_matches('\n').to_string();
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::format_markdown;

    #[test]
    fn collapses_excessive_blank_lines() {
        assert_eq!(
            format_markdown("# Title\n\n\n\n\nBody\n\n\n\nTail"),
            "# Title\n\n\nBody\n\n\nTail\n"
        );
    }

    #[test]
    fn trims_trailing_spaces() {
        assert_eq!(
            format_markdown("Line 1   \nLine 2\t\t\nLine 3"),
            "Line 1\nLine 2\nLine 3\n"
        );
    }

    #[test]
    fn normalizes_line_endings() {
        assert_eq!(
            format_markdown("Line 1\r\nLine 2\rLine 3"),
            "Line 1\nLine 2\nLine 3\n"
        );
    }

    #[test]
    fn ensures_single_trailing_newline() {
        assert_eq!(format_markdown("Content"), "Content\n");
        assert_eq!(format_markdown("Content\n\n\n\n"), "Content\n");
    }

    #[test]
    fn whitespace_only_lines_count_as_blank() {
        assert_eq!(format_markdown("a\n \n\t\n  \n\nb"), "a\n\n\nb\n");
    }

    #[test]
    fn leading_whitespace_is_kept() {
        assert_eq!(
            format_markdown("- item\n  - nested  \n"),
            "- item\n  - nested\n"
        );
    }
}
