//! Per-driver type mapping tables.
//!
//! Each driver declares an ordered slice of [`TypeMapping`] entries. Lookup
//! is first-match-wins in declaration order, so an entry with a length
//! qualifier (e.g. MySQL's `tinyint(1)` → `bool`) must precede the
//! unqualified entry for the same source type. Within one driver at most one
//! entry may match a given (source type, length) pair.

use crate::host::HostType;

use quarry_core::Column;

/// Renders the expression reading a column at `ordinal` from the driver's
/// row value.
pub type ReaderFn = fn(ordinal: usize, db_type: &str) -> String;

/// Rewrites the argument expression bound for a parameter. Receives the
/// source type name, the effective nullability, and the ORM/legacy flags so
/// a conversion can adapt to the execution mode.
pub type WriterFn =
    fn(expr: &str, db_type: &str, not_null: bool, use_orm: bool, legacy: bool) -> String;

/// Converts the scalar produced by a last-insert-id retrieval into the
/// inferred id column's host type.
pub type ConvertFn = fn(expr: &str) -> String;

/// A source type name accepted by a mapping entry, with an optional length
/// qualifier that must match the column's declared length exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbType {
    pub name: &'static str,
    pub length: Option<i32>,
}

impl DbType {
    pub const fn plain(name: &'static str) -> Self {
        Self { name, length: None }
    }

    pub const fn with_length(name: &'static str, length: i32) -> Self {
        Self {
            name,
            length: Some(length),
        }
    }
}

/// One host type's entry in a driver's mapping table.
pub struct TypeMapping {
    pub host: HostType,
    pub db_types: &'static [DbType],
    pub read: ReaderFn,
    pub read_array: Option<ReaderFn>,
    pub write: Option<WriterFn>,
    pub convert: Option<ConvertFn>,
    pub uses: &'static [&'static str],
    /// Source snippet registering an ORM type adapter, emitted into the
    /// generated utils when a query touches this mapping.
    pub orm_adapter: Option<&'static str>,
}

impl TypeMapping {
    /// Whether this entry matches the column's lower-cased source type name
    /// and, if the entry declares a length qualifier, its declared length.
    pub fn applies_to(&self, column: &Column) -> bool {
        let ty = column.ty.to_lowercase();
        self.db_types
            .iter()
            .any(|db| db.name == ty && db.length.is_none_or(|length| length == column.length))
    }
}
