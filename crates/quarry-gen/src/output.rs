//! The engine's output: source fragments per query plus run-wide
//! aggregates, handed to the (external) file assembler.

use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Everything generated for one query.
#[derive(Debug)]
pub struct GeneratedQuery {
    pub name: String,

    /// The `pub const ...` fragment holding the transformed SQL text.
    /// Absent for bulk-copy queries, whose transform yields no text.
    pub constant: Option<String>,

    /// The argument struct, when the query takes parameters.
    pub args_struct: Option<String>,

    /// The result-row struct, for row-returning queries.
    pub row_struct: Option<String>,

    /// The raw-driver method. Always produced.
    pub raw_method: String,

    /// The ORM-helper method, produced alongside the raw method when the
    /// ORM helper is enabled.
    pub orm_method: Option<String>,

    /// Import paths required by the type mappings this query touched.
    pub uses: BTreeSet<String>,
}

/// The aggregated result of one generation run.
#[derive(Debug)]
pub struct Output {
    pub queries: Vec<GeneratedQuery>,

    /// Model structs for tables embedded by any query, each emitted once.
    pub models: Vec<String>,

    /// The access-struct scaffold for the selected driver variant.
    pub scaffold: String,

    /// Support fragments: the error alias, the runtime slice-expansion
    /// helper when a slice query exists, and any ORM type adapters.
    pub utils: Vec<String>,

    /// Union of the per-query import sets plus the driver's base imports.
    pub uses: BTreeSet<String>,

    /// External package references (name → version pin) the generated code
    /// needs, gated on actual usage.
    pub package_references: IndexMap<String, String>,
}
