//! PostgreSQL driver variant: `$N` placeholders indexed by deduplicated
//! parameter order, native array binding instead of slice expansion,
//! `RETURNING` for id retrieval, and a pooled data source instead of a
//! connection per call.

use super::{
    copy_target, finish, sqlx_orm_body, unique_position, ConnectionFragments, Context, Driver,
};
use crate::generate::common;
use crate::host::HostType;
use crate::mapping::{DbType, TypeMapping};
use crate::params;

use quarry_core::{CommandKind, Error, Query, Result};
use quarry_sql::SourceSyntax;

pub struct PostgresDriver {
    context: Context,
}

impl PostgresDriver {
    pub(crate) fn new(context: Context) -> Self {
        Self { context }
    }
}

fn read_row(ordinal: usize, _db_type: &str) -> String {
    format!("row.try_get({ordinal})?")
}

fn convert_same(expr: &str) -> String {
    expr.to_string()
}

static MAPPINGS: &[TypeMapping] = &[
    TypeMapping {
        host: HostType::Bool,
        db_types: &[
            DbType::plain("bool"),
            DbType::plain("boolean"),
            DbType::plain("pg_catalog.bool"),
        ],
        read: read_row,
        read_array: Some(read_row),
        write: None,
        convert: None,
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::I16,
        db_types: &[
            DbType::plain("smallint"),
            DbType::plain("int2"),
            DbType::plain("smallserial"),
            DbType::plain("serial2"),
            DbType::plain("pg_catalog.int2"),
        ],
        read: read_row,
        read_array: Some(read_row),
        write: None,
        convert: Some(convert_same),
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::I32,
        db_types: &[
            DbType::plain("integer"),
            DbType::plain("int"),
            DbType::plain("int4"),
            DbType::plain("serial"),
            DbType::plain("serial4"),
            DbType::plain("pg_catalog.int4"),
        ],
        read: read_row,
        read_array: Some(read_row),
        write: None,
        convert: Some(convert_same),
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::I64,
        db_types: &[
            DbType::plain("bigint"),
            DbType::plain("int8"),
            DbType::plain("bigserial"),
            DbType::plain("serial8"),
            DbType::plain("pg_catalog.int8"),
        ],
        read: read_row,
        read_array: Some(read_row),
        write: None,
        convert: Some(convert_same),
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::F32,
        db_types: &[
            DbType::plain("real"),
            DbType::plain("float4"),
            DbType::plain("pg_catalog.float4"),
        ],
        read: read_row,
        read_array: Some(read_row),
        write: None,
        convert: None,
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::F64,
        db_types: &[
            DbType::plain("double precision"),
            DbType::plain("float8"),
            DbType::plain("pg_catalog.float8"),
        ],
        read: read_row,
        read_array: Some(read_row),
        write: None,
        convert: None,
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::Decimal,
        db_types: &[
            DbType::plain("numeric"),
            DbType::plain("decimal"),
            DbType::plain("pg_catalog.numeric"),
        ],
        read: read_row,
        read_array: Some(read_row),
        write: None,
        convert: None,
        uses: &["rust_decimal::Decimal"],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::Uuid,
        db_types: &[DbType::plain("uuid")],
        read: read_row,
        read_array: Some(read_row),
        write: None,
        convert: Some(convert_same),
        uses: &["uuid::Uuid"],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::String,
        db_types: &[
            DbType::plain("text"),
            DbType::plain("varchar"),
            DbType::plain("character varying"),
            DbType::plain("character"),
            DbType::plain("char"),
            DbType::plain("bpchar"),
            DbType::plain("citext"),
            DbType::plain("name"),
            DbType::plain("pg_catalog.varchar"),
            DbType::plain("pg_catalog.bpchar"),
        ],
        read: read_row,
        read_array: Some(read_row),
        write: None,
        convert: None,
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::Bytes,
        db_types: &[DbType::plain("bytea"), DbType::plain("pg_catalog.bytea")],
        read: read_row,
        read_array: Some(read_row),
        write: None,
        convert: None,
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::Date,
        db_types: &[DbType::plain("date"), DbType::plain("pg_catalog.date")],
        read: read_row,
        read_array: Some(read_row),
        write: None,
        convert: None,
        uses: &["chrono::NaiveDate"],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::Time,
        db_types: &[
            DbType::plain("time"),
            DbType::plain("time without time zone"),
            DbType::plain("pg_catalog.time"),
        ],
        read: read_row,
        read_array: Some(read_row),
        write: None,
        convert: None,
        uses: &["chrono::NaiveTime"],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::DateTime,
        db_types: &[
            DbType::plain("timestamp"),
            DbType::plain("timestamp without time zone"),
            DbType::plain("pg_catalog.timestamp"),
        ],
        read: read_row,
        read_array: Some(read_row),
        write: None,
        convert: None,
        uses: &["chrono::NaiveDateTime"],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::DateTimeUtc,
        db_types: &[
            DbType::plain("timestamptz"),
            DbType::plain("timestamp with time zone"),
            DbType::plain("pg_catalog.timestamptz"),
        ],
        read: read_row,
        read_array: Some(read_row),
        write: None,
        convert: None,
        uses: &["chrono::DateTime", "chrono::Utc"],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::Json,
        db_types: &[
            DbType::plain("json"),
            DbType::plain("jsonb"),
            DbType::plain("pg_catalog.json"),
            DbType::plain("pg_catalog.jsonb"),
        ],
        read: read_row,
        read_array: None,
        write: None,
        convert: None,
        uses: &[],
        orm_adapter: None,
    },
    TypeMapping {
        host: HostType::IpAddr,
        db_types: &[DbType::plain("inet"), DbType::plain("cidr")],
        read: read_row,
        read_array: None,
        write: None,
        convert: None,
        uses: &["std::net::IpAddr"],
        orm_adapter: None,
    },
];

const SCAFFOLD: &str = r#"pub struct Queries<'a> {
    pool: Option<deadpool_postgres::Pool>,
    transaction: Option<&'a deadpool_postgres::Transaction<'a>>,
}

impl<'a> Queries<'a> {
    pub fn new(pool: deadpool_postgres::Pool) -> Self {
        Self {
            pool: Some(pool),
            transaction: None,
        }
    }

    pub fn with_transaction(transaction: &'a deadpool_postgres::Transaction<'a>) -> Self {
        Self {
            pool: None,
            transaction: Some(transaction),
        }
    }
}"#;

const ORM_SCAFFOLD: &str = r#"pub struct Queries<'a> {
    pool: Option<sqlx::PgPool>,
    transaction: Option<&'a mut sqlx::Transaction<'a, sqlx::Postgres>>,
}

impl<'a> Queries<'a> {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            pool: Some(pool),
            transaction: None,
        }
    }

    pub fn with_transaction(transaction: &'a mut sqlx::Transaction<'a, sqlx::Postgres>) -> Self {
        Self {
            pool: None,
            transaction: Some(transaction),
        }
    }
}"#;

impl Driver for PostgresDriver {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn context(&self) -> &Context {
        &self.context
    }

    fn mappings(&self) -> &'static [TypeMapping] {
        MAPPINGS
    }

    fn source_syntax(&self) -> SourceSyntax {
        SourceSyntax::Dollar
    }

    fn placeholder(&self, query: &Query, name: &str) -> String {
        format!("${}", unique_position(query, name))
    }

    // Slice parameters bind as native arrays; no sentinel expansion.
    fn expands_slices(&self) -> bool {
        false
    }

    fn last_id_suffix(&self, query: &Query) -> Result<String> {
        let id_column = self.id_column(query).ok_or_else(|| Error::UnsupportedType {
            column: "id".to_string(),
            ty: String::new(),
            driver: self.name(),
        })?;
        Ok(format!(" RETURNING {}", id_column.name))
    }

    fn execute_scalar_statements(
        &self,
        _query: &Query,
        _sql_expr: &str,
        in_transaction: bool,
    ) -> Vec<String> {
        let executor = if in_transaction { "transaction" } else { "client" };
        vec![
            format!("let row = {executor}.query_one(&stmt, &params).await?;"),
            "let result = row.try_get(0)?;".to_string(),
        ]
    }

    fn establish_connection(&self, _query: &Query) -> ConnectionFragments {
        ConnectionFragments {
            establish: "let client = pool.get().await?;".to_string(),
            open: String::new(),
        }
    }

    fn create_command(&self, sql_expr: &str) -> String {
        format!("let stmt = client.prepare({sql_expr}).await?;")
    }

    fn with_transaction_command_code(&self, sql_expr: &str, _query: &Query) -> String {
        format!("let stmt = transaction.prepare({sql_expr}).await?;")
    }

    fn pre_connection_guard(&self) -> String {
        "let Some(pool) = self.pool.as_ref() else {\n\
         \x20   return Err(\"transaction is null, but data source is also null\".into());\n\
         };"
            .to_string()
    }

    fn bind_parameters(&self, query: &Query) -> Result<String> {
        let unique = params::deduplicate(self, query)?;
        if unique.is_empty() {
            return Ok(
                "let params: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> = Vec::new();"
                    .to_string(),
            );
        }

        let mut lines =
            vec!["let mut params: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> = Vec::new();"
                .to_string()];
        for param in unique {
            let field = common::field_name(&param.column.name);
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
                None => expr,
            };
            lines.push(format!("params.push(&{value});"));
        }
        Ok(lines.join("\n"))
    }

    fn inner_body(&self, query: &Query, _sql_expr: &str, in_transaction: bool) -> Result<String> {
        let executor = if in_transaction { "transaction" } else { "client" };

        Ok(match query.cmd {
            CommandKind::Exec => [
                format!("{executor}.execute(&stmt, &params).await?;"),
                finish("Ok(())".to_string(), in_transaction),
            ]
            .join("\n"),
            CommandKind::ExecRows => [
                format!("let rows_affected = {executor}.execute(&stmt, &params).await?;"),
                finish("Ok(rows_affected)".to_string(), in_transaction),
            ]
            .join("\n"),
            CommandKind::ExecLastId => self
                .last_insert_id_statements(query, _sql_expr, in_transaction)?
                .join("\n"),
            CommandKind::One => {
                let init = common::row_init(self, query)?;
                let matched = format!(
                    "match {executor}.query_opt(&stmt, &params).await? {{\n\
                     \x20   Some(row) => Some({init}),\n\
                     \x20   None => None,\n\
                     }}"
                );
                finish(format!("Ok({matched})"), in_transaction)
            }
            CommandKind::Many => {
                let init = common::row_init(self, query)?;
                [
                    format!("let rows = {executor}.query(&stmt, &params).await?;"),
                    "let mut result = Vec::new();".to_string(),
                    "for row in rows {".to_string(),
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
        let copy_stmt = format!("COPY {table} ({}) FROM STDIN", columns.join(", "));
        let fields: Vec<String> = columns.iter().map(|c| common::field_name(c)).collect();
        let line_fmt = vec!["{}"; fields.len()].join("\\t");
        let line_args = fields
            .iter()
            .map(|field| format!("row.{field}"))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!(
            "{guard}\n\
             let client = pool.get().await?;\n\
             let sink = client.copy_in({copy_stmt:?}).await?;\n\
             let mut sink = std::pin::pin!(sink);\n\
             for row in &rows {{\n\
             \x20   let line = format!(\"{line_fmt}\\n\", {line_args});\n\
             \x20   futures_util::SinkExt::send(&mut sink, line.into()).await?;\n\
             }}\n\
             let rows_affected = sink.as_mut().finish().await?;\n\
             Ok(rows_affected)",
            guard = self.pre_connection_guard(),
        ))
    }

    fn scaffold(&self) -> String {
        if self.options().use_orm {
            ORM_SCAFFOLD.to_string()
        } else {
            SCAFFOLD.to_string()
        }
    }

    fn base_uses(&self) -> Vec<&'static str> {
        if self.options().use_orm {
            vec!["sqlx::Row"]
        } else {
            vec![]
        }
    }

    fn driver_packages(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("tokio-postgres", "0.7.13"),
            ("deadpool-postgres", "0.14.1"),
            ("futures-util", "0.3.31"),
            ("tokio", "1.18"),
        ]
    }
}
