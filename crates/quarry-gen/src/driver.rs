//! The driver abstraction: one shared capability contract over the closed
//! set of dialect/runtime variants.
//!
//! Everything that varies between backends lives behind [`Driver`]:
//! placeholder syntax, connection/command construction, parameter binding,
//! last-insert-id retrieval, and the type mapping table. The trait carries
//! default bodies for the common connection-per-call shape; the pooled
//! data-source variant (PostgreSQL) overrides the pieces it does
//! differently.

mod mysql;
pub use mysql::MysqlDriver;

mod postgres;
pub use postgres::PostgresDriver;

mod sqlite;
pub use sqlite::SqliteDriver;

use crate::host::HostType;
use crate::mapping::{TypeMapping, WriterFn};
use crate::params;

use quarry_core::{
    Catalog, Column, CommandKind, DriverKind, Error, Options, Override, Query, Result, TableRef,
};
use quarry_sql::{
    collapse_whitespace, rewrite_placeholders, slice_sentinel, strip_comments, SourceSyntax,
};

use heck::ToUpperCamelCase;
use indexmap::IndexMap;
use std::collections::BTreeSet;

const DEFAULT_SQLX_VERSION: &str = "0.7.4";
const DEFAULT_SERDE_JSON_VERSION: &str = "1.0.132";
const DEFAULT_CHRONO_VERSION: &str = "0.4.38";
const DEFAULT_UUID_VERSION: &str = "1.11.0";
const DEFAULT_RUST_DECIMAL_VERSION: &str = "1.36.0";

/// Constructs the driver variant selected by the options.
pub fn new_driver(options: Options, catalog: Catalog) -> Box<dyn Driver> {
    let context = Context { options, catalog };
    match context.options.driver {
        DriverKind::Postgres => Box::new(PostgresDriver::new(context)),
        DriverKind::Mysql => Box::new(MysqlDriver::new(context)),
        DriverKind::Sqlite => Box::new(SqliteDriver::new(context)),
    }
}

/// Read-only state shared by every driver variant.
pub struct Context {
    pub options: Options,
    pub catalog: Catalog,
}

/// How a variant obtains a connection: the acquisition statement and an
/// optional explicit open statement (empty for drivers whose acquisition
/// already yields a live connection).
pub struct ConnectionFragments {
    pub establish: String,
    pub open: String,
}

/// A column's resolved host type.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Host { host: HostType, array: bool },
    /// Forced by an override naming a type outside the built-in set.
    Custom { name: String, array: bool },
    /// An embedded table rendered as a generated model struct.
    Model { name: String },
}

impl Resolved {
    pub fn render(&self) -> String {
        match self {
            Resolved::Host { host, array: false } => host.render().to_string(),
            Resolved::Host { host, array: true } => format!("Vec<{}>", host.render()),
            Resolved::Custom { name, array: false } => name.clone(),
            Resolved::Custom { name, array: true } => format!("Vec<{name}>"),
            Resolved::Model { name } => name.clone(),
        }
    }
}

/// Synthesizes the model-type name for an embedded table. Tables outside
/// the default schema carry the schema as a prefix.
pub fn model_name(rel: &TableRef, default_schema: &str) -> String {
    let table = rel.name.to_upper_camel_case();
    if rel.schema.is_empty() || rel.schema == default_schema {
        table
    } else {
        format!("{}{}", rel.schema.to_upper_camel_case(), table)
    }
}

/// Wraps a body's final value: the no-transaction branch returns early out
/// of its guard block, the with-transaction branch is the method tail.
pub(crate) fn finish(expr: String, in_transaction: bool) -> String {
    if in_transaction {
        expr
    } else {
        format!("return {expr};")
    }
}

fn join_fragments(fragments: &[String]) -> String {
    fragments
        .iter()
        .filter(|fragment| !fragment.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

pub trait Driver {
    fn name(&self) -> &'static str;
    fn context(&self) -> &Context;
    fn mappings(&self) -> &'static [TypeMapping];
    fn source_syntax(&self) -> SourceSyntax;

    fn options(&self) -> &Options {
        &self.context().options
    }

    fn catalog(&self) -> &Catalog {
        &self.context().catalog
    }

    // ---- placeholder syntax ----

    /// Renders one named parameter in the driver's placeholder syntax.
    fn placeholder(&self, query: &Query, name: &str) -> String;

    /// Named-placeholder prefix used by slice sentinels and their runtime
    /// expansion.
    fn slice_prefix(&self) -> char {
        '@'
    }

    /// Whether slice parameters expand into per-element sub-placeholders.
    /// Variants with native array binding skip the sentinel machinery.
    fn expands_slices(&self) -> bool {
        true
    }

    /// The dialect's trailing statement for insert-returning-id queries.
    fn last_id_suffix(&self, query: &Query) -> Result<String>;

    // ---- query text transformation ----

    /// Rewrites the raw query text for this dialect: comments stripped,
    /// positional placeholders replaced left-to-right with the matching
    /// parameter's name in the target syntax, slice placeholders left as
    /// sentinels, and the id-retrieval suffix appended for `ExecLastId`.
    /// Bulk-copy commands yield the empty string.
    fn transform_query_text(&self, query: &Query) -> Result<String> {
        if query.cmd == CommandKind::CopyFrom {
            return Ok(String::new());
        }

        let stripped = strip_comments(&query.text);

        let targets: Vec<String> = query
            .params
            .iter()
            .map(|param| {
                let placeholder = self.placeholder(query, &param.column.name);
                if param.column.is_slice && self.expands_slices() {
                    slice_sentinel(&param.column.name, &placeholder)
                } else {
                    placeholder
                }
            })
            .collect();

        let rewritten = rewrite_placeholders(&stripped, self.source_syntax(), &targets);
        let mut text = collapse_whitespace(&rewritten);

        if query.cmd == CommandKind::ExecLastId {
            text.push_str(&self.last_id_suffix(query)?);
        }

        Ok(text)
    }

    // ---- type resolution ----

    fn find_override(&self, query: Option<&Query>, column: &Column) -> Option<&Override> {
        let query = query?;
        self.options()
            .overrides
            .iter()
            .find(|o| o.matches(&query.name, &column.name))
    }

    /// The column's nullability with any matching override applied.
    fn effective_not_null(&self, column: &Column, query: Option<&Query>) -> bool {
        match self.find_override(query, column) {
            Some(o) => o.rust_type.not_null,
            None => column.not_null,
        }
    }

    fn resolve(&self, column: &Column, query: Option<&Query>) -> Result<Resolved> {
        if let Some(embed) = &column.embed_table {
            return Ok(Resolved::Model {
                name: model_name(embed, self.catalog().default_schema()),
            });
        }

        if column.ty.is_empty() {
            return Ok(Resolved::Host {
                host: HostType::Object,
                array: column.is_array,
            });
        }

        let array = column.is_array || column.is_slice;

        if let Some(o) = self.find_override(query, column) {
            return Ok(match HostType::parse(&o.rust_type.ty) {
                Some(host) => Resolved::Host { host, array },
                None => Resolved::Custom {
                    name: o.rust_type.ty.clone(),
                    array,
                },
            });
        }

        match self.mapping_for_column(column) {
            Some(mapping) => Ok(Resolved::Host {
                host: mapping.host,
                array,
            }),
            None => Err(Error::UnsupportedType {
                column: column.name.clone(),
                ty: column.ty.clone(),
                driver: self.name(),
            }),
        }
    }

    /// First mapping entry matching the column's source type and length, in
    /// table order.
    fn mapping_for_column(&self, column: &Column) -> Option<&'static TypeMapping> {
        self.mappings().iter().find(|m| m.applies_to(column))
    }

    fn mapping_for_resolved(&self, resolved: &Resolved) -> Option<&'static TypeMapping> {
        match resolved {
            Resolved::Host { host, .. } => self.mappings().iter().find(|m| m.host == *host),
            Resolved::Custom { name, .. } => self
                .mappings()
                .iter()
                .find(|m| m.host.render() == name.as_str()),
            Resolved::Model { .. } => None,
        }
    }

    /// The rendered host type without the nullable projection.
    fn host_type(&self, column: &Column, query: Option<&Query>) -> Result<String> {
        Ok(self.resolve(column, query)?.render())
    }

    /// Whether the resolved type supports a nullable projection: value-like
    /// types always do, everything else only under the modern runtime.
    fn is_type_nullable(&self, resolved: &Resolved) -> bool {
        let value_like = match resolved {
            Resolved::Host { host, array: false } => host.is_value_like(),
            Resolved::Custom { name, array: false } => self
                .mappings()
                .iter()
                .find(|m| m.host.render() == name.as_str())
                .is_some_and(|m| m.host.is_value_like()),
            _ => false,
        };
        value_like || self.options().runtime.is_modern()
    }

    /// The full rendered Rust type, wrapped in `Option` exactly when the
    /// column is effectively nullable and the type supports the projection.
    fn rust_type(&self, column: &Column, query: Option<&Query>) -> Result<String> {
        let resolved = self.resolve(column, query)?;
        let rendered = resolved.render();
        if !self.effective_not_null(column, query) && self.is_type_nullable(&resolved) {
            Ok(format!("Option<{rendered}>"))
        } else {
            Ok(rendered)
        }
    }

    /// Identifier fragment for synthesized parameter names.
    fn type_slug(&self, column: &Column, query: Option<&Query>) -> Result<String> {
        Ok(match self.resolve(column, query)? {
            Resolved::Host { host, array: false } => host.slug().to_string(),
            Resolved::Host { host, array: true } => format!("{}_arr", host.slug()),
            Resolved::Custom { name, array } => {
                let base: String = name
                    .chars()
                    .map(|c| {
                        if c.is_ascii_alphanumeric() {
                            c.to_ascii_lowercase()
                        } else {
                            '_'
                        }
                    })
                    .collect();
                if array {
                    format!("{base}_arr")
                } else {
                    base
                }
            }
            Resolved::Model { name } => name.to_lowercase(),
        })
    }

    // ---- readers and writers ----

    fn column_reader(&self, column: &Column, ordinal: usize, query: Option<&Query>) -> Result<String> {
        let resolved = self.resolve(column, query)?;
        let mapping =
            self.mapping_for_resolved(&resolved)
                .ok_or_else(|| Error::UnsupportedType {
                    column: column.name.clone(),
                    ty: column.ty.clone(),
                    driver: self.name(),
                })?;

        if column.is_array {
            let read_array = mapping.read_array.ok_or_else(|| Error::MissingArrayReader {
                ty: resolved.render(),
                driver: self.name(),
            })?;
            Ok(read_array(ordinal, &column.ty))
        } else {
            Ok((mapping.read)(ordinal, &column.ty))
        }
    }

    /// The writer applied to a parameter's argument expression before
    /// binding. `None` means the expression binds as-is (`Option` values
    /// already carry SQL NULL through every supported backend API).
    fn writer_for(&self, column: &Column, query: &Query) -> Option<WriterFn> {
        let resolved = self.resolve(column, Some(query)).ok()?;
        self.mapping_for_resolved(&resolved)?.write
    }

    // ---- id-column inference ----

    /// Locates the id column of the query's insert target: exact
    /// case-insensitive match on `id` first, then the first column whose
    /// name contains `id`, then the table's first column. The heuristic is
    /// inherited from the source catalog giving no primary-key marker.
    fn id_column(&self, query: &Query) -> Option<&Column> {
        let rel = query.insert_into_table.as_ref()?;
        let table = self.catalog().resolve(rel)?;
        let columns = &table.columns;
        columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case("id"))
            .or_else(|| {
                columns
                    .iter()
                    .find(|c| c.name.to_ascii_lowercase().contains("id"))
            })
            .or_else(|| columns.first())
    }

    /// Statements executing the id retrieval and converting the scalar into
    /// the inferred id column's host type.
    fn last_insert_id_statements(
        &self,
        query: &Query,
        sql_expr: &str,
        in_transaction: bool,
    ) -> Result<Vec<String>> {
        let id_column = self
            .id_column(query)
            .cloned()
            .ok_or_else(|| Error::UnsupportedType {
                column: "id".to_string(),
                ty: String::new(),
                driver: self.name(),
            })?;

        let resolved = self.resolve(&id_column, Some(query))?;
        let convert = self
            .mapping_for_resolved(&resolved)
            .and_then(|mapping| mapping.convert)
            .ok_or_else(|| Error::MissingConvertFunc {
                ty: resolved.render(),
                driver: self.name(),
            })?;

        let mut lines = self.execute_scalar_statements(query, sql_expr, in_transaction);
        lines.push(finish(format!("Ok({})", convert("result")), in_transaction));
        Ok(lines)
    }

    /// Driver statements that run the id retrieval and leave the scalar in
    /// a local named `result`.
    fn execute_scalar_statements(
        &self,
        query: &Query,
        sql_expr: &str,
        in_transaction: bool,
    ) -> Vec<String>;

    // ---- connection and command construction ----

    fn establish_connection(&self, query: &Query) -> ConnectionFragments;

    fn create_command(&self, sql_expr: &str) -> String;

    /// Guard emitted ahead of the no-transaction branch; the data-source
    /// variant verifies the pool is present.
    fn pre_connection_guard(&self) -> String {
        String::new()
    }

    fn no_transaction_connection_code(&self, query: &Query) -> String {
        let ConnectionFragments { establish, open } = self.establish_connection(query);
        if open.is_empty() {
            establish
        } else {
            format!("{establish}\n{open}")
        }
    }

    fn with_transaction_connection_code(&self, _query: &Query) -> String {
        String::new()
    }

    fn no_transaction_command_code(&self, sql_expr: &str, _query: &Query) -> String {
        self.create_command(sql_expr)
    }

    fn with_transaction_command_code(&self, sql_expr: &str, query: &Query) -> String;

    /// Runtime guard re-binding the live transaction handle. The error arm
    /// is the generated counterpart of a missing transaction connection; it
    /// is a call-site failure, never a generation-time one.
    fn transaction_guard(&self) -> String {
        "let Some(transaction) = self.transaction.as_ref() else {\n\
         \x20   return Err(\"transaction is provided, but its connection is closed\".into());\n\
         };"
            .to_string()
    }

    // ---- parameter binding ----

    /// One bind statement per deduplicated parameter, in first-occurrence
    /// order; slice parameters bind one sub-placeholder per element.
    fn bind_parameters(&self, query: &Query) -> Result<String>;

    // ---- method bodies ----

    /// Executes the prepared command and produces the method's value. The
    /// shape depends on the command kind; dialect glue is the driver's.
    fn inner_body(&self, query: &Query, sql_expr: &str, in_transaction: bool) -> Result<String>;

    fn raw_no_transaction_body(&self, query: &Query, sql_expr: &str) -> Result<String> {
        Ok(join_fragments(&[
            self.no_transaction_connection_code(query),
            self.no_transaction_command_code(sql_expr, query),
            self.bind_parameters(query)?,
            self.inner_body(query, sql_expr, false)?,
        ]))
    }

    fn raw_with_transaction_body(&self, query: &Query, sql_expr: &str) -> Result<String> {
        Ok(join_fragments(&[
            self.transaction_guard(),
            self.with_transaction_connection_code(query),
            self.with_transaction_command_code(sql_expr, query),
            self.bind_parameters(query)?,
            self.inner_body(query, sql_expr, true)?,
        ]))
    }

    /// The ORM-helper execution path, when one exists for this variant.
    fn orm_no_transaction_body(&self, query: &Query, sql_expr: &str) -> Result<String>;

    fn orm_with_transaction_body(&self, query: &Query, sql_expr: &str) -> Result<String>;

    /// The streaming bulk-load body for `CopyFrom` queries.
    fn copy_from_body(&self, query: &Query) -> Result<String>;

    // ---- generated-surface details ----

    fn is_async(&self) -> bool {
        true
    }

    /// The ORM path is async even for drivers whose raw path is not.
    fn orm_is_async(&self) -> bool {
        true
    }

    fn raw_self_param(&self) -> &'static str {
        "&self"
    }

    fn orm_self_param(&self) -> &'static str {
        "&mut self"
    }

    /// The access-struct scaffold: holds the connection source and the
    /// optional transaction handle, with the `new`/`with_transaction`
    /// constructors.
    fn scaffold(&self) -> String;

    // ---- aggregation over the whole run ----

    fn base_uses(&self) -> Vec<&'static str>;

    fn uses_for_query(&self, query: &Query) -> Result<BTreeSet<String>> {
        let mut uses = BTreeSet::new();
        for column in &query.columns {
            self.collect_uses(&mut uses, column, Some(query))?;
        }
        for param in &query.params {
            self.collect_uses(&mut uses, &param.column, Some(query))?;
        }
        Ok(uses)
    }

    fn collect_uses(
        &self,
        uses: &mut BTreeSet<String>,
        column: &Column,
        query: Option<&Query>,
    ) -> Result<()> {
        if let Some(embed) = &column.embed_table {
            if let Some(table) = self.catalog().resolve(embed) {
                for table_column in &table.columns {
                    self.collect_uses(uses, table_column, None)?;
                }
            }
            return Ok(());
        }

        let resolved = self.resolve(column, query)?;
        if let Some(mapping) = self.mapping_for_resolved(&resolved) {
            uses.extend(mapping.uses.iter().map(|s| s.to_string()));
        }
        Ok(())
    }

    fn host_exists(&self, queries: &[Query], host: HostType) -> bool {
        queries.iter().any(|query| {
            query
                .columns
                .iter()
                .chain(query.params.iter().map(|p| &p.column))
                .any(|column| {
                    matches!(
                        self.resolve(column, Some(query)),
                        Ok(Resolved::Host { host: found, .. }) if found == host
                    )
                })
        })
    }

    /// External packages the generated code references, with version pins.
    /// Driver packages are unconditional; everything else is gated on a
    /// query actually touching the capability.
    fn package_references(&self, queries: &[Query]) -> IndexMap<String, String> {
        let options = self.options();
        let mut refs: IndexMap<String, String> = IndexMap::new();

        for (name, version) in self.driver_packages() {
            refs.insert((*name).to_string(), (*version).to_string());
        }

        if options.use_orm {
            if let Some((name, version)) = self.orm_package() {
                let version = options
                    .orm_version
                    .clone()
                    .unwrap_or_else(|| version.to_string());
                refs.insert(name.to_string(), version);
            }
        }

        if self.host_exists(queries, HostType::Json) || self.host_exists(queries, HostType::Object)
        {
            let version = options
                .json_version
                .clone()
                .unwrap_or_else(|| DEFAULT_SERDE_JSON_VERSION.to_string());
            refs.insert("serde_json".to_string(), version);
        }

        let needs_chrono = [
            HostType::Date,
            HostType::Time,
            HostType::DateTime,
            HostType::DateTimeUtc,
        ]
        .iter()
        .any(|host| self.host_exists(queries, *host));
        if needs_chrono {
            let version = options
                .time_version
                .clone()
                .unwrap_or_else(|| DEFAULT_CHRONO_VERSION.to_string());
            refs.insert("chrono".to_string(), version);
        }

        if self.host_exists(queries, HostType::Uuid) {
            refs.insert("uuid".to_string(), DEFAULT_UUID_VERSION.to_string());
        }

        if self.host_exists(queries, HostType::Decimal) {
            refs.insert(
                "rust_decimal".to_string(),
                DEFAULT_RUST_DECIMAL_VERSION.to_string(),
            );
        }

        refs
    }

    fn driver_packages(&self) -> &'static [(&'static str, &'static str)];

    /// The ORM helper package for this variant, if the ORM path uses one
    /// beyond the driver itself.
    fn orm_package(&self) -> Option<(&'static str, &'static str)> {
        Some(("sqlx", DEFAULT_SQLX_VERSION))
    }

    /// ORM type-adapter snippets for mappings touched by the run.
    fn orm_adapters(&self, queries: &[Query]) -> Vec<&'static str> {
        if !self.options().use_orm {
            return Vec::new();
        }
        self.mappings()
            .iter()
            .filter(|m| m.orm_adapter.is_some() && self.host_exists(queries, m.host))
            .filter_map(|m| m.orm_adapter)
            .collect()
    }
}

/// 1-based position of `name` within the query's deduplicated
/// first-occurrence parameter order.
pub(crate) fn unique_position(query: &Query, name: &str) -> usize {
    params::unique_names(query)
        .iter()
        .position(|n| *n == name)
        .map_or(query.params.len() + 1, |i| i + 1)
}

/// The conversion function for the inferred id column of an insert, shared
/// by the raw and ORM last-insert-id paths.
pub(crate) fn id_convert(driver: &dyn Driver, query: &Query) -> Result<crate::mapping::ConvertFn> {
    let id_column = driver
        .id_column(query)
        .cloned()
        .ok_or_else(|| Error::UnsupportedType {
            column: "id".to_string(),
            ty: String::new(),
            driver: driver.name(),
        })?;

    let resolved = driver.resolve(&id_column, Some(query))?;
    driver
        .mapping_for_resolved(&resolved)
        .and_then(|mapping| mapping.convert)
        .ok_or_else(|| Error::MissingConvertFunc {
            ty: resolved.render(),
            driver: driver.name(),
        })
}

/// Bind statements for the sqlx builder variable `q`: one `bind` per
/// deduplicated parameter, slice parameters binding element-wise.
pub(crate) fn orm_bind_statements(driver: &dyn Driver, query: &Query) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for param in params::deduplicate(driver, query)? {
        let field = crate::generate::common::field_name(&param.column.name);
        if param.column.is_slice {
            lines.push(format!("for v in &args.{field} {{\n    q = q.bind(v);\n}}"));
        } else {
            let expr = format!("args.{field}");
            let not_null = driver.effective_not_null(&param.column, Some(query));
            let value = match driver.writer_for(&param.column, query) {
                Some(write) => write(
                    &expr,
                    &param.column.ty,
                    not_null,
                    true,
                    driver.options().runtime.is_legacy(),
                ),
                None => expr,
            };
            lines.push(format!("q = q.bind(&{value});"));
        }
    }
    Ok(lines)
}

/// The ORM-helper body shared by the sqlx-backed variants: a builder-style
/// query with one bind per deduplicated parameter, dispatched to the pool
/// or the live transaction.
pub(crate) fn sqlx_orm_body(
    driver: &dyn Driver,
    query: &Query,
    sql_expr: &str,
    in_transaction: bool,
) -> Result<String> {
    let executor = if in_transaction {
        "&mut *transaction"
    } else {
        "pool"
    };

    let mut lines: Vec<String> = Vec::new();
    if in_transaction {
        lines.push(
            "let Some(transaction) = self.transaction.as_deref_mut() else {\n\
             \x20   return Err(\"transaction is provided, but its connection is closed\".into());\n\
             };"
                .to_string(),
        );
    } else {
        lines.push(
            "let Some(pool) = self.pool.as_ref() else {\n\
             \x20   return Err(\"transaction is null, but data source is also null\".into());\n\
             };"
                .to_string(),
        );
    }

    let binds = orm_bind_statements(driver, query)?;
    let q_let = if binds.is_empty() {
        "let q"
    } else {
        "let mut q"
    };
    let query_expr = match query.cmd {
        CommandKind::One | CommandKind::Many => format!(
            "sqlx::query_as::<_, {}>({sql_expr})",
            crate::generate::common::row_type_name(query)
        ),
        _ => format!("sqlx::query({sql_expr})"),
    };
    lines.push(format!("{q_let} = {query_expr};"));
    lines.extend(binds);

    match query.cmd {
        CommandKind::Exec => {
            lines.push(format!("q.execute({executor}).await?;"));
            lines.push(finish("Ok(())".to_string(), in_transaction));
        }
        CommandKind::ExecRows => {
            lines.push(format!("let result = q.execute({executor}).await?;"));
            lines.push(finish(
                "Ok(result.rows_affected())".to_string(),
                in_transaction,
            ));
        }
        CommandKind::ExecLastId => {
            let convert = id_convert(driver, query)?;
            lines.push(format!("let row = q.fetch_one({executor}).await?;"));
            lines.push("let result = row.try_get(0)?;".to_string());
            lines.push(finish(format!("Ok({})", convert("result")), in_transaction));
        }
        CommandKind::One => {
            lines.push(format!("let row = q.fetch_optional({executor}).await?;"));
            lines.push(finish("Ok(row)".to_string(), in_transaction));
        }
        CommandKind::Many => {
            lines.push(format!("let rows = q.fetch_all({executor}).await?;"));
            lines.push(finish("Ok(rows)".to_string(), in_transaction));
        }
        CommandKind::CopyFrom => {}
    }

    Ok(lines.join("\n"))
}

/// Resolves the bulk-copy target: the (possibly schema-qualified) table name
/// and the deduplicated column names being copied.
pub(crate) fn copy_target(driver: &dyn Driver, query: &Query) -> Result<(String, Vec<String>)> {
    let rel = query
        .insert_into_table
        .as_ref()
        .ok_or_else(|| Error::UnsupportedType {
            column: query.name.clone(),
            ty: String::new(),
            driver: driver.name(),
        })?;

    let table = if rel.schema.is_empty() || rel.schema == driver.catalog().default_schema() {
        rel.name.clone()
    } else {
        format!("{}.{}", rel.schema, rel.name)
    };

    let columns = params::deduplicate(driver, query)?
        .iter()
        .map(|param| param.column.name.clone())
        .collect();

    Ok((table, columns))
}
