//! Comment stripping and whitespace normalization.
//!
//! Placeholder rewriting counts positional placeholders left to right, so a
//! `?` inside a comment must never reach the placeholder scanner. Each
//! comment span collapses to a single space, which keeps the relative order
//! of the surviving tokens intact. Comment markers inside string or quoted
//! identifier literals are content, not comments.

/// Strips `--` line comments and `/* ... */` block comments.
///
/// Block comments match non-greedily and may span newlines. An unterminated
/// block comment runs to the end of the input. Idempotent: stripping twice
/// yields the same text as stripping once.
pub fn strip_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                out.push(c);
                copy_quoted(&mut chars, &mut out, c);
            }
            '-' if chars.peek() == Some(&'-') => {
                chars.next();
                while let Some(&next) = chars.peek() {
                    if next == '\r' || next == '\n' {
                        break;
                    }
                    chars.next();
                }
                out.push(' ');
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    out
}

/// Collapses whitespace runs outside string/identifier literals to a single
/// space and trims the ends. Token order and all non-whitespace content are
/// preserved exactly.
pub fn collapse_whitespace(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                out.push(c);
                copy_quoted(&mut chars, &mut out, c);
            }
            c if c.is_whitespace() => {
                while chars.peek().is_some_and(|next| next.is_whitespace()) {
                    chars.next();
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    out.trim().to_string()
}

/// Copies a quoted literal through to `out`, handling the doubled-quote
/// escape form (`''` / `""`). The opening quote has already been written.
fn copy_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, out: &mut String, quote: char) {
    while let Some(c) = chars.next() {
        out.push(c);
        if c == quote {
            if chars.peek() == Some(&quote) {
                out.push(quote);
                chars.next();
            } else {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn removes_line_comment() {
        assert_eq!(
            strip_comments("SELECT * FROM authors -- this is a comment"),
            "SELECT * FROM authors  "
        );
    }

    #[test]
    fn removes_block_comment() {
        assert_eq!(
            strip_comments("SELECT * /* comment */ FROM authors"),
            "SELECT *   FROM authors"
        );
    }

    #[test]
    fn line_comment_runs_to_end_of_line_only() {
        assert_eq!(strip_comments("-- comment with ?\nSELECT ?"), " \nSELECT ?");
    }

    #[test]
    fn block_comment_spans_newlines() {
        assert_eq!(strip_comments("SELECT /* a\nb\nc */ 1"), "SELECT   1");
    }

    #[test]
    fn unterminated_block_comment_runs_to_end() {
        assert_eq!(strip_comments("SELECT 1 /* trailing"), "SELECT 1  ");
    }

    #[test]
    fn question_mark_in_comment_does_not_survive() {
        let sql = "INSERT INTO authors (name, bio) VALUES (?, ?) -- comment with ?";
        let stripped = strip_comments(sql);
        assert_eq!(stripped.matches('?').count(), 2);
        assert_eq!(stripped, "INSERT INTO authors (name, bio) VALUES (?, ?)  ");
    }

    #[test]
    fn mixed_comments() {
        let sql = "-- Header comment\nSELECT * FROM authors /* inline */ WHERE id = ? -- trailing";
        let stripped = strip_comments(sql);
        assert!(stripped.contains("SELECT * FROM authors"));
        assert!(stripped.contains("WHERE id = ?"));
        assert!(!stripped.contains("--"));
        assert!(!stripped.contains("/*"));
        assert!(!stripped.contains("*/"));
    }

    #[test]
    fn comment_markers_inside_string_literals_are_content() {
        let sql = "SELECT '-- not a comment', '/* neither */' FROM t";
        assert_eq!(strip_comments(sql), sql);
    }

    #[test]
    fn comment_markers_inside_quoted_identifiers_are_content() {
        let sql = "SELECT \"weird--name\" FROM t";
        assert_eq!(strip_comments(sql), sql);
    }

    #[test]
    fn doubled_quote_escape_stays_inside_literal() {
        let sql = "SELECT 'it''s -- fine' FROM t";
        assert_eq!(strip_comments(sql), sql);
    }

    #[test]
    fn stripping_is_idempotent() {
        let sql = "SELECT * /* one */ FROM t -- two";
        let once = strip_comments(sql);
        assert_eq!(strip_comments(&once), once);
    }

    #[test]
    fn collapse_squeezes_runs() {
        assert_eq!(
            collapse_whitespace("SELECT   *    FROM     authors"),
            "SELECT * FROM authors"
        );
    }

    #[test]
    fn collapse_preserves_literal_whitespace() {
        assert_eq!(
            collapse_whitespace("SELECT  'two  spaces'  FROM t"),
            "SELECT 'two  spaces' FROM t"
        );
    }

    #[test]
    fn collapse_trims_and_flattens_newlines() {
        assert_eq!(
            collapse_whitespace("\nSELECT *\n  FROM authors\n"),
            "SELECT * FROM authors"
        );
    }
}
