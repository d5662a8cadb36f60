//! Positional placeholder scanning and rewriting.

/// The placeholder shape used by the source dialect's parser output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSyntax {
    /// `?`, as produced for MySQL and SQLite queries.
    Question,

    /// `$N`, as produced for PostgreSQL queries.
    Dollar,
}

/// Rewrites positional placeholders left to right.
///
/// The *i*-th placeholder occurrence (0-based, counted after comment
/// stripping) is replaced with `targets[i]` verbatim. The occurrence index
/// is what matters, never the digits of a `$N` placeholder: the upstream
/// parser's numbering may repeat or arrive out of order, while the target
/// list is aligned with occurrence order. Occurrences beyond the end of
/// `targets` are left untouched. Placeholders inside string or quoted
/// identifier literals are content and are not rewritten.
pub fn rewrite_placeholders(sql: &str, syntax: SourceSyntax, targets: &[String]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut occurrence = 0;

    let mut substitute = |out: &mut String, original: &str| {
        match targets.get(occurrence) {
            Some(target) => out.push_str(target),
            None => out.push_str(original),
        }
        occurrence += 1;
    };

    while let Some(c) = chars.next() {
        match (syntax, c) {
            (_, '\'') | (_, '"') => {
                out.push(c);
                while let Some(inner) = chars.next() {
                    out.push(inner);
                    if inner == c {
                        if chars.peek() == Some(&c) {
                            out.push(c);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                }
            }
            (SourceSyntax::Question, '?') => substitute(&mut out, "?"),
            (SourceSyntax::Dollar, '$') if chars.peek().is_some_and(|c| c.is_ascii_digit()) => {
                let mut original = String::from('$');
                while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                    original.push(chars.next().unwrap());
                }
                substitute(&mut out, &original);
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn targets(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn question_placeholders_rewrite_in_order() {
        let sql = "INSERT INTO authors (id, name, bio) VALUES (?, ?, ?)";
        let rewritten = rewrite_placeholders(
            sql,
            SourceSyntax::Question,
            &targets(&["@id", "@name", "@bio"]),
        );
        assert_eq!(
            rewritten,
            "INSERT INTO authors (id, name, bio) VALUES (@id, @name, @bio)"
        );
    }

    #[test]
    fn dollar_placeholders_rewrite_by_occurrence_not_by_digit() {
        // The parser numbered the placeholders backwards; occurrence order
        // still wins.
        let sql = "SELECT * FROM t WHERE a = $2 AND b = $1";
        let rewritten =
            rewrite_placeholders(sql, SourceSyntax::Dollar, &targets(&["$1", "$2"]));
        assert_eq!(rewritten, "SELECT * FROM t WHERE a = $1 AND b = $2");
    }

    #[test]
    fn multi_digit_dollar_placeholder_is_one_occurrence() {
        let sql = "SELECT $10";
        let rewritten = rewrite_placeholders(sql, SourceSyntax::Dollar, &targets(&["@p"]));
        assert_eq!(rewritten, "SELECT @p");
    }

    #[test]
    fn bare_dollar_is_not_a_placeholder() {
        let sql = "SELECT '$' || name FROM t WHERE id = $1";
        let rewritten = rewrite_placeholders(sql, SourceSyntax::Dollar, &targets(&["@id"]));
        assert_eq!(rewritten, "SELECT '$' || name FROM t WHERE id = @id");
    }

    #[test]
    fn placeholders_inside_literals_are_content() {
        let sql = "SELECT 'a?b', \"c?d\" FROM t WHERE x = ?";
        let rewritten = rewrite_placeholders(sql, SourceSyntax::Question, &targets(&["@x"]));
        assert_eq!(rewritten, "SELECT 'a?b', \"c?d\" FROM t WHERE x = @x");
    }

    #[test]
    fn excess_occurrences_are_left_untouched() {
        let sql = "SELECT ? + ?";
        let rewritten = rewrite_placeholders(sql, SourceSyntax::Question, &targets(&["@only"]));
        assert_eq!(rewritten, "SELECT @only + ?");
    }

    #[test]
    fn repeated_name_targets_render_identically() {
        let sql = "SELECT 1 WHERE a = ? OR a = ? OR b = ?";
        let rewritten = rewrite_placeholders(
            sql,
            SourceSyntax::Question,
            &targets(&["@a", "@a", "@b"]),
        );
        assert_eq!(rewritten, "SELECT 1 WHERE a = @a OR a = @a OR b = @b");
    }
}
