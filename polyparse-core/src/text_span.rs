// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use crate::error::ParseError;
use crate::lexer::{Pos, PosSpan};

pub trait GetLine {
    /// Gets line number n, where n = 1 for the first line. Returns an empty string past the
    /// last line.
    fn get_line(&self, n: usize) -> &str;
}

impl GetLine for str {
    fn get_line(&self, n: usize) -> &str {
        n.checked_sub(1)
            .and_then(|i| self.split('\n').nth(i))
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .unwrap_or("")
    }
}

impl GetLine for String {
    fn get_line(&self, n: usize) -> &str {
        self.as_str().get_line(n)
    }
}

/// Splits `line` at the character column `col` (0-based).
fn split_at_col(line: &str, col: usize) -> (&str, &str) {
    let at = line.char_indices().nth(col).map(|(i, _)| i).unwrap_or(line.len());
    line.split_at(at)
}

pub trait GetTextSpan: GetLine {
    /// Extracts the text corresponding to `span`. Columns are 0-based character counts and
    /// the last position is included.
    fn extract_text(&self, span: &PosSpan) -> String {
        if span.is_empty() { return String::new() }
        let &PosSpan { first: Pos(l1, c1), last: Pos(l2, c2) } = span;
        if l1 == l2 {
            self.get_line(l1 as usize).chars().skip(c1 as usize).take((c2 - c1) as usize + 1).collect()
        } else {
            let mut result = self.get_line(l1 as usize).chars().skip(c1 as usize).collect::<String>();
            for i in (l1 as usize) + 1..(l2 as usize) {
                result.push('\n');
                result.push_str(self.get_line(i));
            }
            result.push('\n');
            result.push_str(&self.get_line(l2 as usize).chars().take(c2 as usize + 1).collect::<String>());
            result
        }
    }

    /// Returns all the line(s) corresponding to `span`, annotating them with line numbers and
    /// coloured text for the actual span content.
    fn annotate_text(&self, span: &PosSpan) -> String {
        const BEFORE_ANSI: &str = "\u{1b}[1;36m";
        const AFTER_ANSI : &str = "\u{1b}[0m";

        if span.is_empty() { return String::new() }
        let &PosSpan { first: Pos(l1, c1), last: Pos(l2, c2) } = span;
        let (mut l1, c1, l2, c2) = (l1 as usize, c1 as usize, l2 as usize, c2 as usize);
        let (before, rest) = split_at_col(self.get_line(l1), c1);
        if l1 == l2 {
            let (inside, after) = split_at_col(rest, c2 + 1 - c1);
            format!("{l1:4}: {before}{BEFORE_ANSI}{inside}{AFTER_ANSI}{after}")
        } else {
            let mut result = format!("{l1:4}: {before}{BEFORE_ANSI}{rest}{AFTER_ANSI}");
            while l1 + 1 < l2 {
                l1 += 1;
                result.push_str(&format!("\n{l1:4}: {BEFORE_ANSI}{}{AFTER_ANSI}", self.get_line(l1)));
            }
            let (inside, after) = split_at_col(self.get_line(l2), c2 + 1);
            result.push_str(&format!("\n{l2:4}: {BEFORE_ANSI}{inside}{AFTER_ANSI}{after}"));
            result
        }
    }

    /// Returns the line of `error` with a caret under its column, without colours:
    ///
    /// ```text
    ///    3: a = (1 + 2; print b;
    ///                 ^
    /// ```
    fn annotate_error(&self, error: &ParseError) -> String {
        let line = self.get_line(error.line as usize);
        let width = line.chars().take(error.column as usize).count();
        format!("{:4}: {line}\n      {}^", error.line, " ".repeat(width))
    }
}

impl<T: GetLine + ?Sized> GetTextSpan for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_extract() {
        let text = "first line\nsecond\r\nthird";
        let tests = vec![
            (PosSpan::new(Pos(1, 0), Pos(1, 4)), "first"),
            (PosSpan::new(Pos(1, 6), Pos(2, 2)), "line\nsec"),
            (PosSpan::new(Pos(1, 6), Pos(3, 0)), "line\nsecond\nt"),
            (PosSpan::empty(), ""),
        ];
        for (id, (span, expected)) in tests.into_iter().enumerate() {
            assert_eq!(text.extract_text(&span), expected, "test {id} failed");
        }
        assert_eq!(text.get_line(2), "second");
        assert_eq!(text.get_line(4), "");
        assert_eq!(text.get_line(0), "");
    }

    #[test]
    fn test_annotate() {
        let text = "é = 1;\nx";
        let span = PosSpan::new(Pos(1, 2), Pos(1, 2));
        assert_eq!(text.annotate_text(&span), "   1: é \u{1b}[1;36m=\u{1b}[0m 1;");
        let error = ParseError::new(ErrorKind::MissingToken, Pos(1, 5), 6, "missing ';' at '<EOF>'");
        assert_eq!(text.annotate_error(&error), "   1: é = 1;\n           ^");
    }
}
