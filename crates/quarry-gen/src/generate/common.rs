//! Naming, struct fragments, and method assembly shared by every command
//! kind.

use crate::driver::{model_name, Driver};
use crate::params;

use quarry_core::{Column, CommandKind, Error, Query, Result};

use heck::{ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use std::collections::BTreeSet;

pub fn method_name(query: &Query) -> String {
    query.name.to_snake_case()
}

pub fn const_name(query: &Query) -> String {
    query.name.to_shouty_snake_case()
}

pub fn args_type_name(query: &Query) -> String {
    format!("{}Args", query.name.to_upper_camel_case())
}

pub fn row_type_name(query: &Query) -> String {
    format!("{}Row", query.name.to_upper_camel_case())
}

pub fn field_name(column_name: &str) -> String {
    column_name.to_snake_case()
}

fn row_field_name(column: &Column) -> String {
    if column.name.is_empty() {
        if let Some(embed) = &column.embed_table {
            return embed.name.to_snake_case();
        }
    }
    field_name(&column.name)
}

/// The `pub const NAME: &str = "...";` fragment holding the transformed
/// query text. Bulk-copy queries have no text to hold.
pub fn sql_const(driver: &dyn Driver, query: &Query) -> Result<Option<String>> {
    if query.cmd == CommandKind::CopyFrom {
        return Ok(None);
    }
    let text = driver.transform_query_text(query)?;
    Ok(Some(format!(
        "pub const {}: &str = {:?};",
        const_name(query),
        text
    )))
}

/// The argument struct: one field per deduplicated parameter name, in
/// first-occurrence order. `None` when the query takes no parameters.
pub fn args_struct(driver: &dyn Driver, query: &Query) -> Result<Option<String>> {
    let unique = params::deduplicate(driver, query)?;
    if unique.is_empty() {
        return Ok(None);
    }

    let mut fields = Vec::new();
    for param in unique {
        fields.push(format!(
            "    pub {}: {},",
            field_name(&param.column.name),
            driver.rust_type(&param.column, Some(query))?
        ));
    }

    Ok(Some(format!(
        "#[derive(Debug, Clone)]\npub struct {} {{\n{}\n}}",
        args_type_name(query),
        fields.join("\n")
    )))
}

/// The result-row struct for row-returning command kinds.
pub fn row_struct(driver: &dyn Driver, query: &Query) -> Result<Option<String>> {
    if !query.cmd.returns_rows() || query.columns.is_empty() {
        return Ok(None);
    }

    let derives = if driver.options().use_orm && driver.orm_package().is_some() {
        "#[derive(Debug, Clone, sqlx::FromRow)]"
    } else {
        "#[derive(Debug, Clone)]"
    };

    let mut fields = Vec::new();
    for column in &query.columns {
        fields.push(format!(
            "    pub {}: {},",
            row_field_name(column),
            driver.rust_type(column, Some(query))?
        ));
    }

    Ok(Some(format!(
        "{derives}\npub struct {} {{\n{}\n}}",
        row_type_name(query),
        fields.join("\n")
    )))
}

/// Model structs for every table embedded by any query, each emitted once.
pub fn model_structs(driver: &dyn Driver, queries: &[Query]) -> Result<Vec<String>> {
    let mut seen = BTreeSet::new();
    let mut models = Vec::new();

    for query in queries {
        for column in &query.columns {
            let Some(embed) = &column.embed_table else {
                continue;
            };
            let name = model_name(embed, driver.catalog().default_schema());
            if !seen.insert(name.clone()) {
                continue;
            }

            let table = driver
                .catalog()
                .resolve(embed)
                .ok_or_else(|| Error::UnsupportedType {
                    column: column.name.clone(),
                    ty: embed.name.clone(),
                    driver: driver.name(),
                })?;

            let mut fields = Vec::new();
            for table_column in &table.columns {
                fields.push(format!(
                    "    pub {}: {},",
                    field_name(&table_column.name),
                    driver.rust_type(table_column, None)?
                ));
            }

            models.push(format!(
                "#[derive(Debug, Clone)]\npub struct {name} {{\n{}\n}}",
                fields.join("\n")
            ));
        }
    }

    Ok(models)
}

/// The row-construction expression, reading columns by ordinal from a local
/// named `row`. Embedded-table columns expand to a nested model-struct
/// construction consuming one ordinal per embedded column.
pub fn row_init(driver: &dyn Driver, query: &Query) -> Result<String> {
    let mut fields = Vec::new();
    let mut ordinal = 0usize;

    for column in &query.columns {
        if let Some(embed) = &column.embed_table {
            let table = driver
                .catalog()
                .resolve(embed)
                .ok_or_else(|| Error::UnsupportedType {
                    column: column.name.clone(),
                    ty: embed.name.clone(),
                    driver: driver.name(),
                })?;

            let mut inner = Vec::new();
            for table_column in &table.columns {
                inner.push(format!(
                    "{}: {}",
                    field_name(&table_column.name),
                    driver.column_reader(table_column, ordinal, None)?
                ));
                ordinal += 1;
            }

            fields.push(format!(
                "{}: {} {{ {} }}",
                row_field_name(column),
                model_name(embed, driver.catalog().default_schema()),
                inner.join(", ")
            ));
        } else {
            fields.push(format!(
                "{}: {}",
                row_field_name(column),
                driver.column_reader(column, ordinal, Some(query))?
            ));
            ordinal += 1;
        }
    }

    Ok(format!("{} {{ {} }}", row_type_name(query), fields.join(", ")))
}

/// The runtime slice-expansion preamble and the expression under which the
/// final SQL text is reachable. Queries without slice parameters execute
/// the constant directly.
pub fn slice_preamble(driver: &dyn Driver, query: &Query) -> Result<(String, String)> {
    let constant = const_name(query);

    if !driver.expands_slices() || !query.has_slice_param() {
        return Ok((String::new(), constant));
    }

    let mut lines = vec![format!("let mut sql = {constant}.to_string();")];
    for param in params::deduplicate(driver, query)? {
        if param.column.is_slice {
            lines.push(format!(
                "sql = expand_slice_placeholder(&sql, args.{}.len(), \"{}\");",
                field_name(&param.column.name),
                param.column.name
            ));
        }
    }

    Ok((lines.join("\n"), "&sql".to_string()))
}

/// `", args: FooArgs"` when the query takes parameters, empty otherwise.
pub fn method_params(driver: &dyn Driver, query: &Query) -> Result<String> {
    if params::deduplicate(driver, query)?.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!(", args: {}", args_type_name(query)))
    }
}

pub(crate) fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                line.to_string()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assembles the raw-driver method: slice preamble, then the runtime
/// transaction dispatch. Both branches are always emitted; the generated
/// call-site selects between them with the `transaction.is_none()` check.
pub fn assemble_raw_method(
    driver: &dyn Driver,
    query: &Query,
    return_type: &str,
) -> Result<String> {
    let (preamble, sql_expr) = slice_preamble(driver, query)?;
    let no_tx = driver.raw_no_transaction_body(query, &sql_expr)?;
    let with_tx = driver.raw_with_transaction_body(query, &sql_expr)?;

    assemble_method(
        driver,
        query,
        return_type,
        driver.is_async(),
        driver.raw_self_param(),
        &preamble,
        &driver.pre_connection_guard(),
        &no_tx,
        &with_tx,
    )
}

/// Assembles the ORM-helper method over the same dispatch skeleton.
pub fn assemble_orm_method(
    driver: &dyn Driver,
    query: &Query,
    return_type: &str,
) -> Result<String> {
    let (preamble, sql_expr) = slice_preamble(driver, query)?;
    let no_tx = driver.orm_no_transaction_body(query, &sql_expr)?;
    let with_tx = driver.orm_with_transaction_body(query, &sql_expr)?;

    assemble_method(
        driver,
        query,
        return_type,
        driver.orm_is_async(),
        driver.orm_self_param(),
        &preamble,
        "",
        &no_tx,
        &with_tx,
    )
}

#[allow(clippy::too_many_arguments)]
fn assemble_method(
    driver: &dyn Driver,
    query: &Query,
    return_type: &str,
    is_async: bool,
    self_param: &str,
    preamble: &str,
    pre_guard: &str,
    no_tx: &str,
    with_tx: &str,
) -> Result<String> {
    let async_kw = if is_async { "async " } else { "" };
    let name = method_name(query);
    let args = method_params(driver, query)?;

    let mut body = String::new();
    if !preamble.is_empty() {
        body.push_str(&indent(preamble, 4));
        body.push('\n');
    }
    body.push_str("    if self.transaction.is_none() {\n");
    if !pre_guard.is_empty() {
        body.push_str(&indent(pre_guard, 8));
        body.push('\n');
    }
    body.push_str(&indent(no_tx, 8));
    body.push_str("\n    }\n");
    body.push_str(&indent(with_tx, 4));
    body.push('\n');

    Ok(format!(
        "pub {async_kw}fn {name}({self_param}{args}) -> Result<{return_type}, Error> {{\n{body}}}"
    ))
}
