use crate::ir::{CatalogIr, Table, TableRef};

use indexmap::IndexMap;

/// System schemas that never contribute tables to generated code.
const EXCLUDED_SCHEMAS: &[&str] = &["pg_catalog", "information_schema"];

/// Schema/table lookup built once from the source catalog IR.
///
/// Tables of the default schema are keyed under the empty schema name so that
/// unqualified references resolve without knowing the default schema's name.
/// Immutable after construction.
#[derive(Debug, Default)]
pub struct Catalog {
    default_schema: String,
    schemas: IndexMap<String, IndexMap<String, Table>>,
}

impl Catalog {
    pub fn from_ir(ir: &CatalogIr) -> Self {
        let mut schemas = IndexMap::new();

        for schema in &ir.schemas {
            if EXCLUDED_SCHEMAS.contains(&schema.name.as_str()) {
                continue;
            }

            let key = if schema.name == ir.default_schema {
                String::new()
            } else {
                schema.name.clone()
            };

            let tables = schema
                .tables
                .iter()
                .map(|table| (table.rel.name.clone(), table.clone()))
                .collect();

            schemas.insert(key, tables);
        }

        Self {
            default_schema: ir.default_schema.clone(),
            schemas,
        }
    }

    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    pub fn table(&self, schema: &str, name: &str) -> Option<&Table> {
        let key = if schema.is_empty() || schema == self.default_schema {
            ""
        } else {
            schema
        };
        self.schemas.get(key)?.get(name)
    }

    pub fn resolve(&self, rel: &TableRef) -> Option<&Table> {
        self.table(&rel.schema, &rel.name)
    }
}
