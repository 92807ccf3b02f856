// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Shared reporting helpers used by the CLI to render assembler errors.

use crate::core::error::AsmError;

/// Highlight a byte span of `line`, either with ANSI color or with a caret
/// row underneath.
pub fn highlight_line(line: &str, col: usize, len: usize, use_color: bool) -> String {
    let line = line.trim_end_matches('\n');
    let len = len.max(1);
    if col >= line.len() {
        if use_color {
            return format!("{line}\x1b[31m^\x1b[0m");
        }
        return format!("{line}^");
    }
    let end = (col + len).min(line.len());
    if use_color {
        format!(
            "{}\x1b[31m{}\x1b[0m{}",
            &line[..col],
            &line[col..end],
            &line[end..]
        )
    } else {
        let mut out = String::with_capacity(line.len() * 2 + 2);
        out.push_str(line);
        out.push('\n');
        for _ in 0..col {
            out.push(' ');
        }
        for _ in col..end {
            out.push('^');
        }
        out
    }
}

/// Render an error with its source-line context. Lines and columns are shown
/// one-based to match editor conventions.
pub fn render_error(err: &AsmError, use_color: bool) -> String {
    let header = if use_color {
        format!(
            "{}:{}: \x1b[31merror\x1b[0m: {}",
            err.line + 1,
            err.col + 1,
            err.message
        )
    } else {
        format!("{}:{}: error: {}", err.line + 1, err.col + 1, err.message)
    };
    let mut out = header;
    if !err.source_line.trim().is_empty() {
        out.push('\n');
        out.push_str("  ");
        let ctx = highlight_line(&err.source_line, err.col, err.len, use_color);
        out.push_str(&ctx.replace('\n', "\n  "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AsmErrorKind;

    #[test]
    fn caret_row_spans_region() {
        let out = highlight_line("addi r3, r4, oops", 13, 4, false);
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("addi r3, r4, oops"));
        assert_eq!(lines.next(), Some("             ^^^^"));
    }

    #[test]
    fn column_past_line_end_appends_caret() {
        assert_eq!(highlight_line("mr r5", 10, 1, false), "mr r5^");
    }

    #[test]
    fn render_includes_message_and_context() {
        let err = AsmError::new(AsmErrorKind::Syntax, "Expected ','", "li r3 1", 4, 6, 1);
        let out = render_error(&err, false);
        assert!(out.starts_with("5:7: error"));
        assert!(out.contains("li r3 1"));
    }
}
