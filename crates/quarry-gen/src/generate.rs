//! Per-command-kind method generation.
//!
//! Each kind module decides the method's return type and delegates body
//! assembly to [`common`]; the dialect glue inside the bodies comes from the
//! driver. When the ORM helper is enabled every query yields both the
//! ORM-helper method and the raw-driver method; otherwise only the raw
//! method is produced.

pub mod common;

mod copy;
mod exec;
mod exec_last_id;
mod exec_rows;
mod many;
mod one;

use crate::driver::Driver;
use crate::output::GeneratedQuery;

use quarry_core::{CommandKind, Query, Result};

pub(crate) struct MethodPair {
    pub raw: String,
    pub orm: Option<String>,
}

/// Generates every source fragment for one query.
pub fn query_fragments(driver: &dyn Driver, query: &Query) -> Result<GeneratedQuery> {
    let pair = match query.cmd {
        CommandKind::Exec => exec::generate(driver, query)?,
        CommandKind::ExecRows => exec_rows::generate(driver, query)?,
        CommandKind::ExecLastId => exec_last_id::generate(driver, query)?,
        CommandKind::One => one::generate(driver, query)?,
        CommandKind::Many => many::generate(driver, query)?,
        CommandKind::CopyFrom => copy::generate(driver, query)?,
    };

    Ok(GeneratedQuery {
        name: query.name.clone(),
        constant: common::sql_const(driver, query)?,
        args_struct: common::args_struct(driver, query)?,
        row_struct: common::row_struct(driver, query)?,
        raw_method: pair.raw,
        orm_method: pair.orm,
        uses: driver.uses_for_query(query)?,
    })
}

/// The runtime slice-expansion helper emitted into the generated utils,
/// specialized to the driver's named-placeholder prefix.
pub(crate) fn slice_helper(prefix: char) -> String {
    format!(
        "pub(crate) fn expand_slice_placeholder(sql: &str, slice_size: usize, name: &str) -> String {{\n\
         \x20   let placeholders = (0..slice_size)\n\
         \x20       .map(|i| format!(\"{prefix}{{name}}Arg{{i}}\"))\n\
         \x20       .collect::<Vec<_>>()\n\
         \x20       .join(\",\");\n\
         \x20   sql.replace(&format!(\"/*SLICE:{{name}}*/{prefix}{{name}}\"), &placeholders)\n\
         }}"
    )
}
