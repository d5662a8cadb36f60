//! Slice-parameter sentinel machinery.
//!
//! SQL text is static but a slice parameter's length is a runtime value, so
//! expansion happens in two passes. At generation time the placeholder is
//! replaced with a sentinel that carries the parameter name; at call time
//! the generated code expands the sentinel into one sub-placeholder per
//! element, once the slice length is known.

/// Renders the generation-time sentinel for a slice parameter, e.g.
/// `/*SLICE:ids*/@ids`.
pub fn slice_sentinel(name: &str, placeholder: &str) -> String {
    format!("/*SLICE:{name}*/{placeholder}")
}

/// The runtime pass: expands a slice sentinel into `slice_size`
/// individually-named placeholders (`@idsArg0`, `@idsArg1`, ...), joined by
/// commas. `prefix` is the driver's named-placeholder prefix. A matching
/// helper is emitted into the generated code so the expansion can run at
/// call time.
pub fn expand_slice_placeholder(sql: &str, slice_size: usize, name: &str, prefix: char) -> String {
    let needle = format!("/*SLICE:{name}*/{prefix}{name}");
    let args = (0..slice_size)
        .map(|i| format!("{prefix}{name}Arg{i}"))
        .collect::<Vec<_>>()
        .join(",");
    sql.replace(&needle, &args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sentinel_shape() {
        assert_eq!(slice_sentinel("ids", "@ids"), "/*SLICE:ids*/@ids");
    }

    #[test]
    fn expands_to_one_placeholder_per_element() {
        let sql = "SELECT * FROM authors WHERE id IN (/*SLICE:ids*/@ids)";
        assert_eq!(
            expand_slice_placeholder(sql, 3, "ids", '@'),
            "SELECT * FROM authors WHERE id IN (@idsArg0,@idsArg1,@idsArg2)"
        );
    }

    #[test]
    fn expands_with_colon_prefix() {
        let sql = "SELECT * FROM authors WHERE id IN (/*SLICE:ids*/:ids)";
        assert_eq!(
            expand_slice_placeholder(sql, 2, "ids", ':'),
            "SELECT * FROM authors WHERE id IN (:idsArg0,:idsArg1)"
        );
    }

    #[test]
    fn empty_slice_expands_to_nothing() {
        let sql = "WHERE id IN (/*SLICE:ids*/@ids)";
        assert_eq!(expand_slice_placeholder(sql, 0, "ids", '@'), "WHERE id IN ()");
    }

    #[test]
    fn other_sentinels_are_untouched() {
        let sql = "IN (/*SLICE:ids*/@ids) AND x IN (/*SLICE:other*/@other)";
        assert_eq!(
            expand_slice_placeholder(sql, 1, "ids", '@'),
            "IN (@idsArg0) AND x IN (/*SLICE:other*/@other)"
        );
    }
}
