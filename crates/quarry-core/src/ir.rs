//! The query/catalog intermediate representation handed to the engine by the
//! upstream SQL parser.
//!
//! These types mirror the parser's wire shape and deserialize directly from
//! it. The engine treats them as read-only input, with one exception: a
//! normalization pass fills in empty parameter names before generation
//! starts. Everything downstream of that pass is pure.

use serde::{Deserialize, Serialize};

/// A reference to a table by schema and name. An empty schema refers to the
/// catalog's default schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

/// A column as described by the upstream parser, used both for table columns
/// and for query result columns / parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Column {
    /// May be empty for synthesized expression columns; the engine's
    /// normalization pass assigns a name before generation.
    pub name: String,

    /// The source (database) type name, e.g. `bigint` or `varchar`.
    #[serde(rename = "type")]
    pub ty: String,

    pub not_null: bool,

    /// True for native array columns (PostgreSQL).
    pub is_array: bool,

    /// True for runtime-length slice parameters that require placeholder
    /// expansion proportional to the slice length.
    pub is_slice: bool,

    /// Declared length qualifier, e.g. the `1` in `tinyint(1)`. Zero when
    /// the declaration carries no length.
    pub length: i32,

    /// When set, this column stands for all columns of the referenced table
    /// inlined at this position.
    pub embed_table: Option<TableRef>,
}

/// One parameter position in a query. Several parameters may share a column
/// name when the same named placeholder is used at multiple SQL positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    /// 1-based position as assigned by the upstream parser.
    pub number: i32,
    pub column: Column,
}

/// How a query executes and what it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Execute, no result rows.
    #[serde(rename = ":exec")]
    Exec,

    /// Execute, return the affected row count.
    #[serde(rename = ":execrows")]
    ExecRows,

    /// Execute an insert, then return the generated id.
    #[serde(rename = ":execlastid")]
    ExecLastId,

    /// Return at most one row.
    #[serde(rename = ":one")]
    One,

    /// Return all rows.
    #[serde(rename = ":many")]
    Many,

    /// Stream rows through the driver's bulk-load path.
    #[serde(rename = ":copyfrom")]
    CopyFrom,
}

impl CommandKind {
    /// True for command kinds that materialize result rows.
    pub fn returns_rows(self) -> bool {
        matches!(self, CommandKind::One | CommandKind::Many)
    }
}

/// A parsed SQL query with its typed result columns and parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub name: String,
    pub cmd: CommandKind,
    pub text: String,

    #[serde(default)]
    pub columns: Vec<Column>,

    #[serde(default)]
    pub params: Vec<Parameter>,

    /// The table an insert statement targets, when the parser could
    /// determine one. Used for last-insert-id column inference.
    #[serde(default)]
    pub insert_into_table: Option<TableRef>,
}

impl Query {
    pub fn has_slice_param(&self) -> bool {
        self.params.iter().any(|p| p.column.is_slice)
    }
}

/// A table in the source catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Table {
    pub rel: TableRef,
    pub columns: Vec<Column>,
}

/// One schema of the source catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaIr {
    pub name: String,
    pub tables: Vec<Table>,
}

/// The source catalog as supplied by the upstream parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogIr {
    pub default_schema: String,
    pub schemas: Vec<SchemaIr>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_kind_wire_tags() {
        let cmd: CommandKind = serde_json::from_str("\":execlastid\"").unwrap();
        assert_eq!(cmd, CommandKind::ExecLastId);
        assert_eq!(serde_json::to_string(&CommandKind::Many).unwrap(), "\":many\"");
    }

    #[test]
    fn query_deserializes_with_defaults() {
        let query: Query = serde_json::from_str(
            r#"{"name": "ListAuthors", "cmd": ":many", "text": "SELECT id FROM authors"}"#,
        )
        .unwrap();
        assert!(query.columns.is_empty());
        assert!(query.params.is_empty());
        assert!(query.insert_into_table.is_none());
        assert!(!query.has_slice_param());
    }
}
