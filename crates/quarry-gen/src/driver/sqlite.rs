//! SQLite driver variant: `@name` placeholders, synchronous execution over
//! a file or in-memory database, slice expansion, and
//! `SELECT last_insert_rowid()` for id retrieval.

use super::{copy_target, finish, sqlx_orm_body, ConnectionFragments, Context, Driver};
use crate::generate::common;
use crate::host::HostType;
use crate::mapping::{DbType, TypeMapping};
use crate::params;

use quarry_core::{CommandKind, Query, Result};
use quarry_sql::SourceSyntax;

pub struct SqliteDriver {
    context: Context,
}

impl SqliteDriver {
    pub(crate) fn new(context: Context) -> Self {
        Self { context }
    }
}

fn read_row(ordinal: usize, _db_type: &str) -> String {
    format!("row.get({ordinal})?")
}

fn write_json(expr: &str, _db_type: &str, not_null: bool, _use_orm: bool, _legacy: bool) -> String {
    if not_null {
        format!("{expr}.to_string()")
    } else {
        format!("{expr}.as_ref().map(|v| v.to_string())")
    }
}

fn convert_same(expr: &str) -> String {
    expr.to_string()
}

const JSON_ORM_ADAPTER: &str = r#"#[derive(Debug, Clone)]
pub struct JsonText(pub serde_json::Value);

impl sqlx::Type<sqlx::Sqlite> for JsonText {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for JsonText {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let text = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(JsonText(serde_json::from_str(&text)?))
    }
}"#;

static MAPPINGS: &[TypeMapping] = &[
    TypeMapping {
        host: HostType::Bool,
        db_types: &[DbType::plain("boolean"), DbType::plain("bool")],
        read: read_row,
        read_array: None,
        write: None,
        convert: None,
        uses: &[],
        orm_adapter: None,
    },
    // Integer affinity collapses to i64.
    TypeMapping {
        host: HostType::I64,
        db_types: &[
            DbType::plain("integer"),
            DbType::plain("int"),
            DbType::plain("bigint"),
            DbType::plain("smallint"),
            DbType::plain("tinyint"),
            DbType::plain("mediumint"),
            DbType::plain("int2"),
            DbType::plain("int8"),
        ],
        read: read_row,
        read_array: None,
        write: None,
        convert: Some(convert_same),
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::F64,
        db_types: &[
            DbType::plain("real"),
            DbType::plain("double"),
            DbType::plain("float"),
            DbType::plain("numeric"),
        ],
        read: read_row,
        read_array: None,
        write: None,
        convert: None,
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::String,
        db_types: &[
            DbType::plain("text"),
            DbType::plain("varchar"),
            DbType::plain("char"),
            DbType::plain("nvarchar"),
            DbType::plain("clob"),
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
        db_types: &[DbType::plain("blob")],
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
        host: HostType::DateTime,
        db_types: &[DbType::plain("datetime"), DbType::plain("timestamp")],
        read: read_row,
        read_array: None,
        write: None,
        convert: None,
        uses: &["chrono::NaiveDateTime"],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::Uuid,
        db_types: &[DbType::plain("uuid")],
        read: read_row,
        read_array: None,
        write: None,
        convert: None,
        uses: &["uuid::Uuid"],
        orm_adapter: None,
    },
    // JSON is stored as its canonical text rendering.
    TypeMapping {
        host: HostType::Json,
        db_types: &[DbType::plain("json")],
        read: read_row,
        read_array: None,
        write: Some(write_json),
        convert: None,
        uses: &[],
        orm_adapter: Some(JSON_ORM_ADAPTER),
    },
];

const SCAFFOLD: &str = r#"pub struct Queries<'a> {
    url: String,
    transaction: Option<&'a rusqlite::Transaction<'a>>,
}

impl<'a> Queries<'a> {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            transaction: None,
        }
    }

    pub fn with_transaction(transaction: &'a rusqlite::Transaction<'a>) -> Self {
        Self {
            url: String::new(),
            transaction: Some(transaction),
        }
    }
}"#;

const ORM_SCAFFOLD: &str = r#"pub struct Queries<'a> {
    pool: Option<sqlx::SqlitePool>,
    transaction: Option<&'a mut sqlx::Transaction<'a, sqlx::Sqlite>>,
}

impl<'a> Queries<'a> {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self {
            pool: Some(pool),
            transaction: None,
        }
    }

    pub fn with_transaction(transaction: &'a mut sqlx::Transaction<'a, sqlx::Sqlite>) -> Self {
        Self {
            pool: None,
            transaction: Some(transaction),
        }
    }
}"#;

impl Driver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
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
        format!("@{name}")
    }

    fn last_id_suffix(&self, _query: &Query) -> Result<String> {
        Ok("; SELECT last_insert_rowid()".to_string())
    }

    fn execute_scalar_statements(
        &self,
        _query: &Query,
        _sql_expr: &str,
        in_transaction: bool,
    ) -> Vec<String> {
        let connection = if in_transaction { "transaction" } else { "conn" };
        vec![
            "stmt.execute(param_refs.as_slice())?;".to_string(),
            format!("let result = {connection}.last_insert_rowid();"),
        ]
    }

    fn establish_connection(&self, _query: &Query) -> ConnectionFragments {
        ConnectionFragments {
            establish: "let conn = rusqlite::Connection::open(&self.url)?;".to_string(),
            open: String::new(),
        }
    }

    fn create_command(&self, sql_expr: &str) -> String {
        format!("let mut stmt = conn.prepare({sql_expr})?;")
    }

    fn with_transaction_command_code(&self, sql_expr: &str, _query: &Query) -> String {
        format!("let mut stmt = transaction.prepare({sql_expr})?;")
    }

    fn bind_parameters(&self, query: &Query) -> Result<String> {
        let unique = params::deduplicate(self, query)?;

        let mut lines = if unique.is_empty() {
            vec!["let params: Vec<(String, Box<dyn rusqlite::types::ToSql>)> = Vec::new();"
                .to_string()]
        } else {
            vec!["let mut params: Vec<(String, Box<dyn rusqlite::types::ToSql>)> = Vec::new();"
                .to_string()]
        };

        for param in unique {
            let field = common::field_name(&param.column.name);
            let name = &param.column.name;

            if param.column.is_slice {
                lines.push(format!(
                    "for (i, v) in args.{field}.iter().enumerate() {{"
                ));
                lines.push(format!(
                    "    params.push((format!(\"@{name}Arg{{i}}\"), Box::new(v.clone())));"
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
                "params.push((\"@{name}\".to_string(), Box::new({value})));"
            ));
        }

        lines.push(
            "let param_refs: Vec<(&str, &dyn rusqlite::types::ToSql)> = params\n\
             \x20   .iter()\n\
             \x20   .map(|(name, value)| (name.as_str(), value.as_ref()))\n\
             \x20   .collect();"
                .to_string(),
        );
        Ok(lines.join("\n"))
    }

    fn inner_body(&self, query: &Query, sql_expr: &str, in_transaction: bool) -> Result<String> {
        Ok(match query.cmd {
            CommandKind::Exec => [
                "stmt.execute(param_refs.as_slice())?;".to_string(),
                finish("Ok(())".to_string(), in_transaction),
            ]
            .join("\n"),
            CommandKind::ExecRows => [
                "let rows_affected = stmt.execute(param_refs.as_slice())? as u64;".to_string(),
                finish("Ok(rows_affected)".to_string(), in_transaction),
            ]
            .join("\n"),
            CommandKind::ExecLastId => self
                .last_insert_id_statements(query, sql_expr, in_transaction)?
                .join("\n"),
            CommandKind::One => {
                let init = common::row_init(self, query)?;
                let matched = format!(
                    "match rows.next()? {{\n\
                     \x20   Some(row) => Some({init}),\n\
                     \x20   None => None,\n\
                     }}"
                );
                [
                    "let mut rows = stmt.query(param_refs.as_slice())?;".to_string(),
                    finish(format!("Ok({matched})"), in_transaction),
                ]
                .join("\n")
            }
            CommandKind::Many => {
                let init = common::row_init(self, query)?;
                [
                    "let mut rows = stmt.query(param_refs.as_slice())?;".to_string(),
                    "let mut result = Vec::new();".to_string(),
                    "while let Some(row) = rows.next()? {".to_string(),
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
        sqlx_orm_body(self, query, sql_expr, false)
    }

    fn orm_with_transaction_body(&self, query: &Query, sql_expr: &str) -> Result<String> {
        sqlx_orm_body(self, query, sql_expr, true)
    }

    fn copy_from_body(&self, query: &Query) -> Result<String> {
        let (table, columns) = copy_target(self, query)?;
        let insert_stmt = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            columns
                .iter()
                .map(|c| format!("@{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let binds = columns
            .iter()
            .map(|c| format!("(\"@{c}\", &row.{} as &dyn rusqlite::types::ToSql)", common::field_name(c)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!(
            "let mut conn = rusqlite::Connection::open(&self.url)?;\n\
             let transaction = conn.transaction()?;\n\
             {{\n\
             \x20   let mut stmt = transaction.prepare({insert_stmt:?})?;\n\
             \x20   for row in &rows {{\n\
             \x20       stmt.execute(&[{binds}])?;\n\
             \x20   }}\n\
             }}\n\
             transaction.commit()?;\n\
             Ok(rows.len() as u64)"
        ))
    }

    fn is_async(&self) -> bool {
        false
    }

    fn scaffold(&self) -> String {
        if self.options().use_orm {
            ORM_SCAFFOLD.to_string()
        } else {
            SCAFFOLD.to_string()
        }
    }

    fn base_uses(&self) -> Vec<&'static str> {
        vec![]
    }

    fn driver_packages(&self) -> &'static [(&'static str, &'static str)] {
        &[("rusqlite", "0.32.1")]
    }
}
