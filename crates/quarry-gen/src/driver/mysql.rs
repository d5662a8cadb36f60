//! MySQL driver variant: `:name` placeholders resolved client-side,
//! `tinyint(1)` length tie-break for booleans, slice expansion, and
//! `SELECT LAST_INSERT_ID()` for id retrieval.
//!
//! The ORM-helper path uses the driver's own parameter-object form (the
//! `params!` macro) instead of an external helper crate; the raw path
//! assembles the named parameter list statement by statement.

use super::{copy_target, finish, ConnectionFragments, Context, Driver};
use crate::generate::common;
use crate::host::HostType;
use crate::mapping::{DbType, TypeMapping};
use crate::params;

use quarry_core::{CommandKind, Query, Result};
use quarry_sql::SourceSyntax;

pub struct MysqlDriver {
    context: Context,
}

impl MysqlDriver {
    pub(crate) fn new(context: Context) -> Self {
        Self { context }
    }

    /// The `params!` parameter-object fragment for queries without slice
    /// parameters.
    fn params_object(&self, query: &Query) -> Result<String> {
        let unique = params::deduplicate(self, query)?;
        if unique.is_empty() {
            return Ok("let params = mysql_async::Params::Empty;".to_string());
        }

        let mut pairs = Vec::new();
        for param in unique {
            let field = common::field_name(&param.column.name);
            let expr = format!("args.{field}");
            let not_null = self.effective_not_null(&param.column, Some(query));
            let value = match self.writer_for(&param.column, query) {
                Some(write) => write(
                    &expr,
                    &param.column.ty,
                    not_null,
                    true,
                    self.options().runtime.is_legacy(),
                ),
                None => expr,
            };
            pairs.push(format!("\"{}\" => &{value}", param.column.name));
        }

        Ok(format!(
            "let params = mysql_async::params! {{ {} }};",
            pairs.join(", ")
        ))
    }

    fn orm_body(&self, query: &Query, sql_expr: &str, in_transaction: bool) -> Result<String> {
        // The parameter-object form cannot bind a runtime-length slice;
        // those queries keep the statement-by-statement path.
        if query.has_slice_param() {
            return if in_transaction {
                self.raw_with_transaction_body(query, sql_expr)
            } else {
                self.raw_no_transaction_body(query, sql_expr)
            };
        }

        let mut fragments = Vec::new();
        if in_transaction {
            fragments.push(self.transaction_guard());
        } else {
            fragments.push(self.no_transaction_connection_code(query));
        }
        fragments.push(self.params_object(query)?);
        fragments.push(self.inner_body(query, sql_expr, in_transaction)?);

        Ok(fragments
            .into_iter()
            .filter(|fragment| !fragment.is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

fn read_row(ordinal: usize, _db_type: &str) -> String {
    format!("row.take({ordinal}).unwrap()")
}

fn write_json(expr: &str, _db_type: &str, not_null: bool, _use_orm: bool, _legacy: bool) -> String {
    if not_null {
        format!("{expr}.to_string()")
    } else {
        format!("{expr}.as_ref().map(|v| v.to_string())")
    }
}

fn convert_i8(expr: &str) -> String {
    format!("{expr} as i8")
}

fn convert_i16(expr: &str) -> String {
    format!("{expr} as i16")
}

fn convert_i32(expr: &str) -> String {
    format!("{expr} as i32")
}

fn convert_i64(expr: &str) -> String {
    format!("{expr} as i64")
}

static MAPPINGS: &[TypeMapping] = &[
    // tinyint(1) is the MySQL boolean; the entry must precede the plain
    // tinyint entry so the length tie-break wins.
    TypeMapping {
        host: HostType::Bool,
        db_types: &[
            DbType::with_length("tinyint", 1),
            DbType::plain("bool"),
            DbType::plain("boolean"),
        ],
        read: read_row,
        read_array: None,
        write: None,
        convert: None,
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::I8,
        db_types: &[DbType::plain("tinyint")],
        read: read_row,
        read_array: None,
        write: None,
        convert: Some(convert_i8),
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::I16,
        db_types: &[DbType::plain("smallint"), DbType::plain("year")],
        read: read_row,
        read_array: None,
        write: None,
        convert: Some(convert_i16),
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::I32,
        db_types: &[
            DbType::plain("int"),
            DbType::plain("integer"),
            DbType::plain("mediumint"),
        ],
        read: read_row,
        read_array: None,
        write: None,
        convert: Some(convert_i32),
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::I64,
        db_types: &[DbType::plain("bigint")],
        read: read_row,
        read_array: None,
        write: None,
        convert: Some(convert_i64),
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::F32,
        db_types: &[DbType::plain("float")],
        read: read_row,
        read_array: None,
        write: None,
        convert: None,
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::F64,
        db_types: &[DbType::plain("double"), DbType::plain("double precision")],
        read: read_row,
        read_array: None,
        write: None,
        convert: None,
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::Decimal,
        db_types: &[DbType::plain("decimal"), DbType::plain("numeric")],
        read: read_row,
        read_array: None,
        write: None,
        convert: None,
        uses: &["rust_decimal::Decimal"],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::String,
        db_types: &[
            DbType::plain("varchar"),
            DbType::plain("char"),
            DbType::plain("text"),
            DbType::plain("tinytext"),
            DbType::plain("mediumtext"),
            DbType::plain("longtext"),
            DbType::plain("enum"),
            DbType::plain("set"),
        ],
        read: read_row,
        read_array: None,
        write: None,
        convert: None,
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::Bytes,
        db_types: &[
            DbType::plain("blob"),
            DbType::plain("binary"),
            DbType::plain("varbinary"),
            DbType::plain("tinyblob"),
            DbType::plain("mediumblob"),
            DbType::plain("longblob"),
            DbType::plain("bit"),
        ],
        read: read_row,
        read_array: None,
        write: None,
        convert: None,
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::Date,
        db_types: &[DbType::plain("date")],
        read: read_row,
        read_array: None,
        write: None,
        convert: None,
        uses: &["chrono::NaiveDate"],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::Time,
        db_types: &[DbType::plain("time")],
        read: read_row,
        read_array: None,
        write: None,
        convert: None,
        uses: &["chrono::NaiveTime"],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::DateTime,
        db_types: &[DbType::plain("datetime"), DbType::plain("timestamp")],
        read: read_row,
        read_array: None,
        write: None,
        convert: None,
        uses: &["chrono::NaiveDateTime"],
        orm_adapter: None,
    },
    // JSON values normalize to their canonical text rendering on the way
    // in; the row side decodes through the driver's json support.
    TypeMapping {
        host: HostType::Json,
        db_types: &[DbType::plain("json")],
        read: read_row,
        read_array: None,
        write: Some(write_json),
        convert: None,
        uses: &[],
        orm_adapter: None,
    },
];

const SCAFFOLD: &str = r#"pub struct Queries<'a> {
    url: String,
    transaction: Option<&'a mut mysql_async::Transaction<'static>>,
}

impl<'a> Queries<'a> {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            transaction: None,
        }
    }

    pub fn with_transaction(transaction: &'a mut mysql_async::Transaction<'static>) -> Self {
        Self {
            url: String::new(),
            transaction: Some(transaction),
        }
    }
}"#;

impl Driver for MysqlDriver {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn context(&self) -> &Context {
        &self.context
    }

    fn mappings(&self) -> &'static [TypeMapping] {
        MAPPINGS
    }

    fn source_syntax(&self) -> SourceSyntax {
        SourceSyntax::Question
    }

    fn placeholder(&self, _query: &Query, name: &str) -> String {
        format!(":{name}")
    }

    fn slice_prefix(&self) -> char {
        ':'
    }

    fn last_id_suffix(&self, _query: &Query) -> Result<String> {
        Ok("; SELECT LAST_INSERT_ID()".to_string())
    }

    fn execute_scalar_statements(
        &self,
        _query: &Query,
        sql_expr: &str,
        in_transaction: bool,
    ) -> Vec<String> {
        let executor = if in_transaction { "transaction" } else { "conn" };
        vec![
            format!("{executor}.exec_drop({sql_expr}, mysql_async::Params::from(params)).await?;"),
            format!("let result = {executor}.last_insert_id().unwrap_or_default();"),
        ]
    }

    fn establish_connection(&self, _query: &Query) -> ConnectionFragments {
        ConnectionFragments {
            establish:
                "let mut conn = mysql_async::Conn::new(mysql_async::Opts::from_url(&self.url)?).await?;"
                    .to_string(),
            open: String::new(),
        }
    }

    // Commands prepare implicitly on execution.
    fn create_command(&self, _sql_expr: &str) -> String {
        String::new()
    }

    fn with_transaction_command_code(&self, _sql_expr: &str, _query: &Query) -> String {
        String::new()
    }

    fn transaction_guard(&self) -> String {
        "let Some(transaction) = self.transaction.as_deref_mut() else {\n\
         \x20   return Err(\"transaction is provided, but its connection is closed\".into());\n\
         };"
            .to_string()
    }

    fn bind_parameters(&self, query: &Query) -> Result<String> {
        let unique = params::deduplicate(self, query)?;
        if unique.is_empty() {
            return Ok("let params: Vec<(String, mysql_async::Value)> = Vec::new();".to_string());
        }

        let mut lines =
            vec!["let mut params: Vec<(String, mysql_async::Value)> = Vec::new();".to_string()];
        for param in unique {
            let field = common::field_name(&param.column.name);
            let name = &param.column.name;

            if param.column.is_slice {
                lines.push(format!(
                    "for (i, v) in args.{field}.iter().enumerate() {{"
                ));
                lines.push(format!(
                    "    params.push((format!(\"{name}Arg{{i}}\"), mysql_async::Value::from(v.clone())));"
                ));
                lines.push("}".to_string());
                continue;
            }

            let expr = format!("args.{field}");
            let not_null = self.effective_not_null(&param.column, Some(query));
            let value = match self.writer_for(&param.column, query) {
                Some(write) => write(
                    &expr,
                    &param.column.ty,
                    not_null,
                    self.options().use_orm,
                    self.options().runtime.is_legacy(),
                ),
                None => format!("{expr}.clone()"),
            };
            lines.push(format!(
                "params.push((\"{name}\".to_string(), mysql_async::Value::from({value})));"
            ));
        }
        Ok(lines.join("\n"))
    }

    fn inner_body(&self, query: &Query, sql_expr: &str, in_transaction: bool) -> Result<String> {
        let executor = if in_transaction { "transaction" } else { "conn" };

        Ok(match query.cmd {
            CommandKind::Exec => [
                format!(
                    "{executor}.exec_drop({sql_expr}, mysql_async::Params::from(params)).await?;"
                ),
                finish("Ok(())".to_string(), in_transaction),
            ]
            .join("\n"),
            CommandKind::ExecRows => [
                format!(
                    "{executor}.exec_drop({sql_expr}, mysql_async::Params::from(params)).await?;"
                ),
                format!("let rows_affected = {executor}.affected_rows();"),
                finish("Ok(rows_affected)".to_string(), in_transaction),
            ]
            .join("\n"),
            CommandKind::ExecLastId => self
                .last_insert_id_statements(query, sql_expr, in_transaction)?
                .join("\n"),
            CommandKind::One => {
                let init = common::row_init(self, query)?;
                let matched = format!(
                    "match row {{\n\
                     \x20   Some(mut row) => Some({init}),\n\
                     \x20   None => None,\n\
                     }}"
                );
                [
                    format!(
                        "let row: Option<mysql_async::Row> = {executor}.exec_first({sql_expr}, mysql_async::Params::from(params)).await?;"
                    ),
                    finish(format!("Ok({matched})"), in_transaction),
                ]
                .join("\n")
            }
            CommandKind::Many => {
                let init = common::row_init(self, query)?;
                [
                    format!(
                        "let rows: Vec<mysql_async::Row> = {executor}.exec({sql_expr}, mysql_async::Params::from(params)).await?;"
                    ),
                    "let mut result = Vec::new();".to_string(),
                    "for mut row in rows {".to_string(),
                    format!("    result.push({init});"),
                    "}".to_string(),
                    finish("Ok(result)".to_string(), in_transaction),
                ]
                .join("\n")
            }
            CommandKind::CopyFrom => String::new(),
        })
    }

    fn orm_no_transaction_body(&self, query: &Query, sql_expr: &str) -> Result<String> {
        self.orm_body(query, sql_expr, false)
    }

    fn orm_with_transaction_body(&self, query: &Query, sql_expr: &str) -> Result<String> {
        self.orm_body(query, sql_expr, true)
    }

    fn copy_from_body(&self, query: &Query) -> Result<String> {
        let (table, columns) = copy_target(self, query)?;
        let insert_stmt = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            columns
                .iter()
                .map(|c| format!(":{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let pairs = columns
            .iter()
            .map(|c| format!("\"{c}\" => &row.{}", common::field_name(c)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!(
            "let mut conn = mysql_async::Conn::new(mysql_async::Opts::from_url(&self.url)?).await?;\n\
             conn.exec_batch(\n\
             \x20   {insert_stmt:?},\n\
             \x20   rows.iter().map(|row| mysql_async::params! {{ {pairs} }}),\n\
             )\n\
             .await?;\n\
             Ok(rows.len() as u64)"
        ))
    }

    fn raw_self_param(&self) -> &'static str {
        "&mut self"
    }

    fn scaffold(&self) -> String {
        SCAFFOLD.to_string()
    }

    fn base_uses(&self) -> Vec<&'static str> {
        vec!["mysql_async::prelude::Queryable"]
    }

    fn driver_packages(&self) -> &'static [(&'static str, &'static str)] {
        &[("mysql_async", "0.35.1"), ("tokio", "1.18")]
    }

    fn orm_package(&self) -> Option<(&'static str, &'static str)> {
        None
    }
}
